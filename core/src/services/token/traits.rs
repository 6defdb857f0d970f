//! Trait seam for token checking.

use crate::domain::entities::VerifiedToken;
use crate::errors::VerificationError;

/// Anything that can check a token string.
///
/// [`VerifiedToken`] can only be constructed inside this crate, so
/// implementations outside it must delegate to [`super::TokenVerifier`].
pub trait TokenVerifierTrait: Send + Sync {
    fn verify(&self, token: &str) -> Result<VerifiedToken, VerificationError>;
}
