//! Error types for key custody, token signing, verification and claim access
//!
//! Each enum belongs to one stage of a token's life. Messages are short and
//! never include key material or token contents.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::entities::TokenType;

/// Key storage, generation and parsing errors
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Failed to access key file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid key material in {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("RSA key of {bits} bits is below the {minimum}-bit minimum")]
    WeakKey { bits: usize, minimum: usize },

    #[error("Key pair generation failed: {message}")]
    Generation { message: String },

    #[error("Key encoding failed: {message}")]
    Encoding { message: String },
}

/// Errors raised while building and signing a token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    #[error("Claim '{key}' has an unsupported value type: {found}")]
    InvalidClaimType { key: String, found: String },

    #[error("Claim '{key}' is reserved and set by the signer")]
    ReservedClaim { key: String },

    #[error("Claim '{key}' was supplied more than once")]
    DuplicateClaim { key: String },

    #[error("Token signature computation failed: {message}")]
    Signature { message: String },
}

/// Reasons a token string is rejected by the verifier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Malformed token")]
    MalformedToken,

    #[error("Unexpected signing algorithm: {algorithm}")]
    AlgorithmMismatch { algorithm: String },

    #[error("Token signature verification failed")]
    SignatureInvalid,

    #[error("Token expiry claim is missing or not a timestamp")]
    MissingOrInvalidExpiry,

    #[error("Token expired")]
    Expired,
}

/// Errors reading typed claims out of a decoded token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    #[error("Missing required claim: {key}")]
    MissingClaim { key: String },

    #[error("Claim '{key}' is not a valid {expected}")]
    InvalidClaimType { key: String, expected: &'static str },

    #[error("Token type {found} is not accepted here")]
    TokenTypeNotAllowed { found: TokenType },
}
