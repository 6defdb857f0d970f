//! Token purposes and the policies that restrict them

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ClaimError;

/// Purpose a token was issued for, carried in the token type claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    #[serde(rename = "EmailVerificationTokenType")]
    EmailVerification,
    #[serde(rename = "ResetPasswordTokenType")]
    ResetPassword,
    #[serde(rename = "AccessTokenType")]
    Access,
    #[serde(rename = "RefreshTokenType")]
    Refresh,
}

impl TokenType {
    pub const ALL: [TokenType; 4] = [
        TokenType::EmailVerification,
        TokenType::ResetPassword,
        TokenType::Access,
        TokenType::Refresh,
    ];

    /// Wire representation used inside token payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::EmailVerification => "EmailVerificationTokenType",
            TokenType::ResetPassword => "ResetPasswordTokenType",
            TokenType::Access => "AccessTokenType",
            TokenType::Refresh => "RefreshTokenType",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TokenType::ALL
            .into_iter()
            .find(|token_type| token_type.as_str() == s)
            .ok_or_else(|| format!("Invalid token type: {}", s))
    }
}

/// Which token types an endpoint accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenTypePolicy {
    #[default]
    Any,
    Only(TokenType),
}

impl TokenTypePolicy {
    pub fn permits(&self, token_type: TokenType) -> bool {
        match self {
            TokenTypePolicy::Any => true,
            TokenTypePolicy::Only(allowed) => *allowed == token_type,
        }
    }

    pub fn check(&self, token_type: TokenType) -> Result<(), ClaimError> {
        if self.permits(token_type) {
            Ok(())
        } else {
            Err(ClaimError::TokenTypeNotAllowed { found: token_type })
        }
    }
}
