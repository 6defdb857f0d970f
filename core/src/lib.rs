//! # Sigil Core
//!
//! Key custody and token logic for Sigil.
//! This crate holds the RSA key manager, the RS256 token signer and
//! verifier, claim inspection, and the error types they report.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    Claim, ClaimMap, ClaimSource, ClaimValue, TokenClaims, TokenType, TokenTypePolicy,
    UnverifiedClaims, UnverifiedToken, VerifiedClaims, VerifiedToken,
};
pub use errors::*;
pub use services::keys::{FileInfo, FileSystem, KeyManager, KeyPair, KeyStore, MemoryFileSystem};
pub use services::token::{
    bearer_authorization, extract_bearer_token, Authenticator, TokenInspector, TokenSigner,
    TokenVerifier, TokenVerifierTrait,
};
