pub mod ab;
pub(crate) mod util;
