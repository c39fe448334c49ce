pub mod convert;
pub mod series;
