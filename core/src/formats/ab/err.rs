use miette::{Diagnostic, SourceSpan};
use ndarray::ShapeError;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("not an AB dataset: {path:?} (path must end in .b)")]
    #[diagnostic(code(ab::bad_extension))]
    BadExtension { path: String },

    #[error("AB datasets are read-only")]
    #[diagnostic(code(ab::read_only))]
    ReadOnly,

    #[error("missing dimension line ({prefix:?}) in .b metadata", prefix = super::bfile::DIM_PREFIX)]
    #[diagnostic(code(ab::missing_dim_line))]
    MissingDimLine,

    #[error(".b metadata contains no timesteps")]
    #[diagnostic(code(ab::no_timesteps))]
    NoTimesteps,

    #[error("malformed line in .b metadata")]
    #[diagnostic(code(ab::syntax))]
    Syntax {
        #[label("could not parse this line")]
        span: SourceSpan,
    },

    #[error("line in .b metadata is longer than {max} bytes")]
    #[diagnostic(code(ab::line_too_long))]
    LineTooLong {
        #[label("this line")]
        span: SourceSpan,
        max: usize,
    },

    #[error("name {name:?} is longer than {max} bytes")]
    #[diagnostic(code(ab::name_too_long))]
    NameTooLong { name: String, max: usize },

    #[error("no variable named {0:?} in this dataset")]
    #[diagnostic(code(ab::unknown_variable))]
    UnknownVariable(String),

    #[error("region out of range on axis {axis}: start {start} + count {count} > extent {extent}")]
    #[diagnostic(code(ab::out_of_range))]
    OutOfRange {
        axis: usize,
        start: usize,
        count: usize,
        extent: usize,
    },

    #[error("reshaping read data failed: {0}")]
    Shape(#[from] ShapeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
