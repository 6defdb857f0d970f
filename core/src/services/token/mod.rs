//! Token module
//!
//! This module handles token-related operations:
//! - RS256 signing of claim sets
//! - Signature, algorithm and expiry verification
//! - Typed claim inspection, verified or not
//! - Bearer header authentication

mod authenticator;
mod bearer;
mod inspector;
mod signer;
mod traits;
mod verifier;

#[cfg(test)]
mod tests;

pub use authenticator::Authenticator;
pub use bearer::{bearer_authorization, extract_bearer_token, BEARER_SCHEME};
pub use inspector::TokenInspector;
pub use signer::TokenSigner;
pub use traits::TokenVerifierTrait;
pub use verifier::{TokenVerifier, ACCEPTED_ALGORITHMS, MAX_TOKEN_SIZE_BYTES};
