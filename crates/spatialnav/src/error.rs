use std::result::Result as StdResult;

use thiserror::Error;

use crate::key::FocusKey;

/// Result type for engine operations.
pub type Result<T> = StdResult<T, Error>;

/// Engine error type.
///
/// Failing to find a directional candidate is not an error: navigation
/// reports it as [`Navigation::NoCandidate`](crate::Navigation::NoCandidate).
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    /// An explicit key collided with a live node.
    #[error("duplicate focus key: {0}")]
    DuplicateKey(FocusKey),

    /// The key does not name a live node.
    #[error("unknown focus key: {0}")]
    UnknownKey(FocusKey),

    /// Nothing in the target subtree can take focus.
    #[error("not focusable: {0}")]
    NotFocusable(FocusKey),

    /// The engine is not in a state that allows this operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A requested key is malformed.
    #[error("invalid focus key: {0:?}")]
    InvalidKey(String),

    /// Internal error.
    #[error("internal: {0}")]
    Internal(String),
}
