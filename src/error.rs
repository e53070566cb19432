use thiserror::Error;

/// Errors returned by counter and set operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A grow-only counter was asked to move backwards.
    #[error("cannot decrement a grow-only counter (delta {delta})")]
    NegativeIncrement {
        /// The rejected delta.
        delta: i64,
    },

    /// The requested tie-break bias is not one of `add` or `remove`.
    #[error("no such bias: {name:?}")]
    NoSuchBias {
        /// The name that failed to parse.
        name: String,
    },

    /// A serialized counter snapshot could not be decoded.
    #[cfg(feature = "serde")]
    #[error("corrupt counter snapshot: {0}")]
    CorruptSnapshot(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
