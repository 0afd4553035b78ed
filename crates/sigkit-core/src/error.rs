//! Error types for the sigchain core.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during statement and sigchain operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no data")]
    NoData,

    #[error("invalid sigchain sign public key")]
    InvalidSignPublicKey,

    #[error("invalid revoke seq {0}")]
    InvalidRevokeSeq(u64),

    #[error("already revoked")]
    AlreadyRevoked,

    #[error("user seq mismatch")]
    UserSeqMismatch,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid kid: {0}")]
    InvalidKid(String),

    #[error("statement kid mismatch")]
    KidMismatch,

    #[error("invalid statement seq {got}, expected {expected}")]
    InvalidSeq { expected: u64, got: u64 },

    #[error("invalid statement prev hash")]
    InvalidPrev,

    #[error("invalid statement timestamp")]
    InvalidTimestamp,

    #[error("invalid encoding: {0}")]
    Encoding(String),

    #[error("invalid user service {0}")]
    InvalidUserService(String),

    #[error("invalid user name {0}")]
    InvalidUserName(String),

    #[error("invalid user url {0}")]
    InvalidUserUrl(String),

    #[error("invalid user seq")]
    InvalidUserSeq,
}
