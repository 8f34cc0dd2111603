use std::{error::Error as StdError, fmt, result::Result as StdResult};

/// Errors raised while parsing geometry values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A direction name was not one of `up`, `down`, `left` or `right`.
    ParseDirection(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseDirection(s) => write!(f, "unknown direction: {s:?}"),
        }
    }
}

impl StdError for Error {}

/// Result type for geometry parsing.
pub type Result<T> = StdResult<T, Error>;
