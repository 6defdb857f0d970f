//! Error types for the authentication core.

mod types;

pub use types::{ClaimError, KeyError, SigningError, VerificationError};

use sigil_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};
use thiserror::Error;

/// Top-level error for every operation the core exposes
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingCredentials,

    // Bridge to stage-specific error types
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Claim(#[from] ClaimError),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// How a failure should be reported to whoever triggered it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The presented credential is not acceptable
    Unauthenticated,
    /// The caller asked for something that can never succeed
    InvalidRequest,
    /// The service itself failed
    Internal,
}

impl AuthError {
    /// Classify the error for transport-level status mapping
    pub fn class(&self) -> ErrorClass {
        match self {
            AuthError::MissingCredentials => ErrorClass::Unauthenticated,
            AuthError::Key(_) => ErrorClass::Internal,
            AuthError::Signing(SigningError::Signature { .. }) => ErrorClass::Internal,
            AuthError::Signing(_) => ErrorClass::InvalidRequest,
            AuthError::Verification(_) | AuthError::Claim(_) => ErrorClass::Unauthenticated,
        }
    }

    /// Stable machine-readable code for clients
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => error_codes::UNAUTHORIZED,
            AuthError::Key(_) => error_codes::KEY_UNAVAILABLE,
            AuthError::Signing(SigningError::Signature { .. }) => error_codes::SIGNING_FAILED,
            AuthError::Signing(_) => error_codes::CLAIM_INVALID,
            AuthError::Verification(err) => match err {
                VerificationError::MalformedToken => error_codes::TOKEN_MALFORMED,
                VerificationError::AlgorithmMismatch { .. } => {
                    error_codes::TOKEN_ALGORITHM_MISMATCH
                }
                VerificationError::SignatureInvalid => error_codes::TOKEN_SIGNATURE_INVALID,
                VerificationError::MissingOrInvalidExpiry => error_codes::TOKEN_EXPIRY_INVALID,
                VerificationError::Expired => error_codes::TOKEN_EXPIRED,
            },
            AuthError::Claim(err) => match err {
                ClaimError::MissingClaim { .. } => error_codes::CLAIM_MISSING,
                ClaimError::InvalidClaimType { .. } => error_codes::CLAIM_INVALID,
                ClaimError::TokenTypeNotAllowed { .. } => error_codes::TOKEN_TYPE_NOT_ALLOWED,
            },
        }
    }

    pub fn is_internal(&self) -> bool {
        self.class() == ErrorClass::Internal
    }
}

impl IntoErrorResponse for AuthError {
    fn to_error_response(&self) -> ErrorResponse {
        // Internal failures may name file paths; clients only see the code.
        let message = if self.is_internal() {
            String::from("Authentication service unavailable")
        } else {
            self.to_string()
        };
        ErrorResponse::new(self.error_code(), message)
    }
}
