use thiserror::Error;

/// Errors raised by tempolag operations.
///
/// Missing values are not errors; they travel through transforms as `NA::NA`.
#[derive(Error, Debug)]
pub enum Error {
    /// A window, lag, order or decay parameter outside its valid range,
    /// or a pipeline definition that could not be accepted.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A value outside the domain of a logarithmic/geometric operation.
    #[error("domain error at index {index}: value {value} must be strictly positive")]
    DomainError { index: usize, value: f64 },

    #[error("length mismatch: expected {expected}, found {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Two series of equal length whose timestamps differ.
    #[error("timestamp indices differ at position {position}")]
    IndexMismatch { position: usize },

    /// Timestamps must be strictly ascending (which also rules out duplicates).
    #[error("timestamps are not strictly ascending at position {position}")]
    UnorderedIndex { position: usize },

    #[error("no data: {0}")]
    EmptyData(String),

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("format error: {0}")]
    Format(String),

    #[error("io error")]
    Io(#[source] std::io::Error),

    #[error("csv error")]
    Csv(#[source] csv::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err)
    }
}

// Pipeline definitions that fail to parse are configuration errors, not I/O errors.
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidConfiguration(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::InvalidConfiguration(err.to_string())
    }
}
