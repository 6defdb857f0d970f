//! JWT key storage and claim schema configuration

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Smallest RSA modulus accepted for signing keys, in bits
pub const MIN_RSA_KEY_BITS: usize = 2048;

/// JWT key management configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Directory holding `private.pem` and `public.pem`
    pub key_directory: String,

    /// RSA modulus size used when a new key pair is generated
    #[serde(default = "default_key_bits")]
    pub key_bits: usize,

    /// Claim names written by the signer and read by the verifier/inspector
    #[serde(default)]
    pub claim_keys: ClaimKeys,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            key_directory: String::from("keys"),
            key_bits: default_key_bits(),
            claim_keys: ClaimKeys::default(),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration for a key directory
    pub fn new(key_directory: impl Into<String>) -> Self {
        Self {
            key_directory: key_directory.into(),
            ..Default::default()
        }
    }

    /// Set the RSA modulus size for generated keys
    pub fn with_key_bits(mut self, bits: usize) -> Self {
        self.key_bits = bits;
        self
    }

    /// Replace the claim schema
    pub fn with_claim_keys(mut self, claim_keys: ClaimKeys) -> Self {
        self.claim_keys = claim_keys;
        self
    }

    /// Check whether the configured key size meets the minimum
    pub fn has_valid_key_bits(&self) -> bool {
        self.key_bits >= MIN_RSA_KEY_BITS
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Apply `JWT_KEYS_DIR` and `JWT_KEY_BITS` when they are set
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(
            std::env::var("JWT_KEYS_DIR").ok(),
            std::env::var("JWT_KEY_BITS").ok(),
        )
    }

    /// Apply a key directory and a textual key size.
    ///
    /// A key size that is not a whole number is an error rather than being
    /// replaced by the default.
    pub fn with_overrides(
        mut self,
        key_directory: Option<String>,
        key_bits: Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(dir) = key_directory {
            self.key_directory = dir;
        }
        if let Some(bits) = key_bits {
            self.key_bits = match bits.trim().parse() {
                Ok(parsed) => parsed,
                Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        name: "JWT_KEY_BITS",
                        value: bits,
                    })
                }
            };
        }
        Ok(self)
    }
}

/// Names of the claims making up a token's payload.
///
/// Passed to the signer, verifier and inspector at construction so that
/// separate signing domains can use separate schemas in one process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClaimKeys {
    #[serde(default = "default_email_claim")]
    pub email: String,

    #[serde(default = "default_expiry_claim")]
    pub expiry: String,

    #[serde(default = "default_issued_at_claim")]
    pub issued_at: String,

    #[serde(default = "default_nonce_claim")]
    pub nonce: String,

    #[serde(default = "default_type_claim")]
    pub token_type: String,

    #[serde(default = "default_user_id_claim")]
    pub user_id: String,
}

impl Default for ClaimKeys {
    fn default() -> Self {
        Self {
            email: default_email_claim(),
            expiry: default_expiry_claim(),
            issued_at: default_issued_at_claim(),
            nonce: default_nonce_claim(),
            token_type: default_type_claim(),
            user_id: default_user_id_claim(),
        }
    }
}

impl ClaimKeys {
    /// Claims the signer writes itself and callers may not supply
    pub fn is_reserved(&self, key: &str) -> bool {
        key == self.issued_at || key == self.nonce
    }
}

fn default_key_bits() -> usize {
    MIN_RSA_KEY_BITS
}

fn default_email_claim() -> String {
    String::from("email")
}

fn default_expiry_claim() -> String {
    String::from("exp")
}

fn default_issued_at_claim() -> String {
    String::from("iat")
}

fn default_nonce_claim() -> String {
    String::from("nonce")
}

fn default_type_claim() -> String {
    String::from("type")
}

fn default_user_id_claim() -> String {
    String::from("user_id")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_default() {
        let config = JwtConfig::default();
        assert_eq!(config.key_directory, "keys");
        assert_eq!(config.key_bits, 2048);
        assert!(config.has_valid_key_bits());
    }

    #[test]
    fn test_jwt_config_builder() {
        let config = JwtConfig::new("/etc/sigil").with_key_bits(1024);
        assert_eq!(config.key_directory, "/etc/sigil");
        assert!(!config.has_valid_key_bits());

        let config = config.with_key_bits(4096);
        assert!(config.has_valid_key_bits());
    }

    #[test]
    fn test_overrides_apply_directory_and_key_bits() {
        let config = JwtConfig::default()
            .with_overrides(Some("/srv/keys".into()), Some(" 4096 ".into()))
            .unwrap();
        assert_eq!(config.key_directory, "/srv/keys");
        assert_eq!(config.key_bits, 4096);

        let untouched = JwtConfig::new("/etc/sigil").with_overrides(None, None).unwrap();
        assert_eq!(untouched.key_directory, "/etc/sigil");
        assert_eq!(untouched.key_bits, 2048);
    }

    #[test]
    fn test_unparseable_key_bits_is_an_error() {
        for value in ["4k", "", "-2048", "2048.0"] {
            assert_eq!(
                JwtConfig::default()
                    .with_overrides(None, Some(value.to_string()))
                    .unwrap_err(),
                ConfigError::InvalidValue {
                    name: "JWT_KEY_BITS",
                    value: value.to_string(),
                }
            );
        }
    }

    #[test]
    fn test_claim_keys_canonical_schema() {
        let keys = ClaimKeys::default();
        assert_eq!(keys.email, "email");
        assert_eq!(keys.expiry, "exp");
        assert_eq!(keys.issued_at, "iat");
        assert_eq!(keys.nonce, "nonce");
        assert_eq!(keys.token_type, "type");
        assert_eq!(keys.user_id, "user_id");
    }

    #[test]
    fn test_reserved_claims() {
        let keys = ClaimKeys::default();
        assert!(keys.is_reserved("iat"));
        assert!(keys.is_reserved("nonce"));
        assert!(!keys.is_reserved("exp"));
        assert!(!keys.is_reserved("email"));
    }

    #[test]
    fn test_claim_keys_partial_override() {
        let keys: ClaimKeys = serde_json::from_str(r#"{"user_id": "sub"}"#).unwrap();
        assert_eq!(keys.user_id, "sub");
        assert_eq!(keys.expiry, "exp");
    }
}
