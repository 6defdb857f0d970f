//! Domain entities: claims, token types and decoded tokens.

pub mod claim;
pub mod token;
pub mod token_type;

// Re-export commonly used types
pub use claim::{Claim, ClaimValue};
pub use token::{
    ClaimMap, ClaimSource, TokenClaims, UnverifiedClaims, UnverifiedToken, VerifiedClaims,
    VerifiedToken,
};
pub use token_type::{TokenType, TokenTypePolicy};
