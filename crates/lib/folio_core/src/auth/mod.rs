//! Authentication and authorization logic.
//!
//! Provides password hashing, credential verification, JWT issuance and
//! validation, and the privilege gate shared by every protected route.

pub mod access;
pub mod credentials;
pub mod jwt;
pub mod password;

use thiserror::Error;

use crate::store::StoreError;

/// Authentication errors.
///
/// The token variants are distinct so they can be logged and tested, but
/// callers facing clients must collapse them into one generic rejection.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account does not have admin privileges")]
    ForbiddenNotAdmin,

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Token subject {0} does not exist")]
    UnknownSubject(i64),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// True for every failure of a presented bearer token.
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken
                | AuthError::MalformedToken(_)
                | AuthError::UnsupportedAlgorithm(_)
                | AuthError::InvalidSignature
                | AuthError::Expired
                | AuthError::UnknownSubject(_)
        )
    }
}
