use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    /// Declared vs. actual input/output width disagreement, including the
    /// network's inter-layer width contract.
    ShapeMismatch(String),
    /// Loss/gradient spans of unequal length.
    SizeMismatch(String),
    /// A caller-supplied value outside the accepted range (e.g. zero batch size).
    InvalidArgument(String),
    /// Batch index beyond `num_batches`.
    IndexOutOfRange(String),
    /// Call-sequence precondition violation (programmer error).
    LogicError(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ShapeMismatch(msg) => write!(f, "shape mismatch: {msg}"),
            Error::SizeMismatch(msg) => write!(f, "size mismatch: {msg}"),
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Error::IndexOutOfRange(msg) => write!(f, "index out of range: {msg}"),
            Error::LogicError(msg) => write!(f, "logic error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
