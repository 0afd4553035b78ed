//! Error types for the keyring.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during keyring and store operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Sentinel for operations that require a prior unlock.
    #[error("keyring locked")]
    Locked,

    #[error("invalid auth")]
    InvalidAuth,

    #[error("no id")]
    NoId,

    #[error("keyring id prefix reserved {0}")]
    ReservedId(String),

    #[error("not an encoded keyring item")]
    NotAnItem,

    #[error("item decryption failed")]
    DecryptFailed,

    #[error("item encryption failed")]
    EncryptFailed,

    #[error("item encoding error: {0}")]
    Encoding(String),

    /// Backend failure, propagated verbatim.
    #[error("store error: {0}")]
    Store(String),
}
