//! Error types shared by the credential layer, the record stores and the
//! file-content storage.

use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Wrong password, forged or malformed token, or a token without an identity.
    #[error("invalid credential")]
    InvalidCredential,

    #[error("credential expired")]
    ExpiredCredential,

    #[error("failed to hash password: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("token lifetime {0} overflows the expiry timestamp")]
    TokenLifetime(chrono::Duration),

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Both kinds collapse to "unauthenticated" for callers.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, AuthError::InvalidCredential | AuthError::ExpiredCredential)
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("identity already registered: {0}")]
    DuplicateIdentity(String),

    #[error("referenced record does not exist: {0}")]
    InvalidReference(String),

    #[error("storage backend unavailable: {0}")]
    BackendUnavailable(#[from] sqlx::Error),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("invalid filename: {0:?}")]
    InvalidFilename(String),

    #[error("file exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
