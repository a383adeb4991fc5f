//! Account authentication: bcrypt password hashes and HS256 bearer tokens.

pub mod extractor;
pub mod handlers;
pub mod password;
pub mod token;

use thiserror::Error;

pub use extractor::AuthUser;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    Expired,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
    #[error("password hashing task aborted")]
    HashingAborted,
}
