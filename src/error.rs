//! Error types for the buffer normalization engine.
//!
//! Only parsing can fail. Out-of-range counts and inconsistent triples are
//! not errors; the solver repairs them and records an adjustment instead.

/// Failure to read a size or pool token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid size value, must be an integer larger than 0: {0}")]
    InvalidSize(String),

    #[error("invalid size format, expected '<number> <size>', got: {0}")]
    InvalidPoolFormat(String),

    #[error("invalid number value, could not parse into unsigned integer: {0}")]
    InvalidPoolCount(String),

    #[error("could not parse size with unit: {field}")]
    InvalidPoolSize {
        field: String,
        #[source]
        source: Box<ParseError>,
    },
}

/// Failure while balancing an upstream record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BalanceError {
    /// The solver produced a pool the adapter could not read back.
    #[error("error balancing proxy values: {0}")]
    Pool(#[from] ParseError),
}
