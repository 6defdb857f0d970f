//! Custody of the RS256 signing key pair

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use jsonwebtoken::{DecodingKey, EncodingKey};
use rand::rngs::OsRng;
use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sigil_shared::{JwtConfig, MIN_RSA_KEY_BITS};

use super::file_system::FileSystem;
use super::key_store::{encode_public_key_pem, KeyStore};
use crate::errors::KeyError;

/// An RSA key pair together with its derived signing and verification keys
pub struct KeyPair {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
    public_key_pem: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("bits", &self.bits())
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl KeyPair {
    /// Generate a fresh key pair with a modulus of `bits` bits
    pub fn generate(bits: usize) -> Result<Self, KeyError> {
        check_key_bits(bits)?;
        let private_key =
            RsaPrivateKey::new(&mut OsRng, bits).map_err(|e| KeyError::Generation {
                message: e.to_string(),
            })?;
        Self::from_private_key(private_key)
    }

    /// Build a key pair around an existing private key
    pub fn from_private_key(private_key: RsaPrivateKey) -> Result<Self, KeyError> {
        check_key_bits(private_key.n().bits())?;

        let public_key = private_key.to_public_key();
        let public_key_pem = encode_public_key_pem(&public_key)?;

        let private_der = private_key.to_pkcs1_der().map_err(|e| KeyError::Encoding {
            message: e.to_string(),
        })?;
        let public_der = public_key.to_pkcs1_der().map_err(|e| KeyError::Encoding {
            message: e.to_string(),
        })?;

        Ok(Self {
            encoding_key: EncodingKey::from_rsa_der(private_der.as_bytes()),
            decoding_key: DecodingKey::from_rsa_der(public_der.as_bytes()),
            private_key,
            public_key,
            public_key_pem,
        })
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    /// PKCS#1 PEM encoding of the public key
    pub fn public_key_pem(&self) -> &str {
        &self.public_key_pem
    }

    pub fn bits(&self) -> usize {
        self.public_key.n().bits()
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

fn check_key_bits(bits: usize) -> Result<(), KeyError> {
    if bits < MIN_RSA_KEY_BITS {
        return Err(KeyError::WeakKey {
            bits,
            minimum: MIN_RSA_KEY_BITS,
        });
    }
    Ok(())
}

/// Owns the active key pair and its on-disk copy.
///
/// Readers get an `Arc` snapshot of the current pair, so a token is always
/// signed or checked with one consistent pair even while a rotation runs.
/// Rotations are serialized among themselves.
pub struct KeyManager {
    store: KeyStore,
    key_bits: usize,
    current: RwLock<Arc<KeyPair>>,
    rotation: Mutex<()>,
}

impl std::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyManager")
            .field("location", &self.store.location())
            .field("key_bits", &self.key_bits)
            .finish()
    }
}

impl KeyManager {
    /// Load the key pair stored at `location`, generating one if absent
    pub fn load(location: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Result<Self, KeyError> {
        Self::load_with_key_bits(location, fs, MIN_RSA_KEY_BITS)
    }

    /// Load using the directory and key size from configuration
    pub fn from_config(config: &JwtConfig, fs: Arc<dyn FileSystem>) -> Result<Self, KeyError> {
        Self::load_with_key_bits(config.key_directory.as_str(), fs, config.key_bits)
    }

    /// Load the key pair, generating one of `key_bits` bits if none exists.
    ///
    /// A present `private.pem` is authoritative. A missing `public.pem`, or
    /// one that does not match the private key, is rewritten from it. An
    /// unreadable or unparseable file of either kind is an error.
    pub fn load_with_key_bits(
        location: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
        key_bits: usize,
    ) -> Result<Self, KeyError> {
        check_key_bits(key_bits)?;
        let store = KeyStore::new(location, fs);

        let pair = match store.load_private_key()? {
            Some(private_key) => {
                let pair = KeyPair::from_private_key(private_key)?;
                Self::reconcile_public_key(&store, &pair)?;
                tracing::info!(
                    location = %store.location().display(),
                    bits = pair.bits(),
                    event = "key_pair_loaded",
                    "Loaded existing signing key pair"
                );
                pair
            }
            None => {
                tracing::info!(
                    location = %store.location().display(),
                    bits = key_bits,
                    event = "key_pair_generating",
                    "No signing key found, generating a new key pair"
                );
                let pair = KeyPair::generate(key_bits)?;
                store.save(pair.private_key(), pair.public_key_pem())?;
                pair
            }
        };

        Ok(Self {
            store,
            key_bits,
            current: RwLock::new(Arc::new(pair)),
            rotation: Mutex::new(()),
        })
    }

    fn reconcile_public_key(store: &KeyStore, pair: &KeyPair) -> Result<(), KeyError> {
        match store.load_public_key()? {
            Some(stored) if stored == *pair.public_key() => Ok(()),
            Some(_) => {
                tracing::warn!(
                    path = %store.public_key_path().display(),
                    event = "public_key_mismatch",
                    "Stored public key does not match the private key, rewriting it"
                );
                store.save_public_key(pair.public_key_pem())
            }
            None => {
                tracing::warn!(
                    path = %store.public_key_path().display(),
                    event = "public_key_missing",
                    "Public key file missing, deriving it from the private key"
                );
                store.save_public_key(pair.public_key_pem())
            }
        }
    }

    /// Replace the active key pair with a freshly generated one.
    ///
    /// The new pair is persisted before it becomes active. On failure the
    /// previous pair stays active, and a `private.pem` already overwritten
    /// is put back. Tokens signed with the old key no longer verify once
    /// this returns `Ok`.
    pub fn generate_new_key_pair(&self) -> Result<(), KeyError> {
        let _rotation = self.rotation.lock().unwrap_or_else(PoisonError::into_inner);

        let pair = KeyPair::generate(self.key_bits)?;
        if let Err(err) = self.store.save_private_key(pair.private_key()) {
            self.log_rotation_failure(&err);
            return Err(err);
        }
        if let Err(err) = self.store.save_public_key(pair.public_key_pem()) {
            self.log_rotation_failure(&err);
            self.restore_private_key();
            return Err(err);
        }

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(pair);

        tracing::info!(
            location = %self.store.location().display(),
            bits = self.key_bits,
            event = "key_pair_rotated",
            "Signing key pair rotated"
        );
        Ok(())
    }

    fn log_rotation_failure(&self, err: &KeyError) {
        tracing::error!(
            location = %self.store.location().display(),
            error = %err,
            event = "key_rotation_failed",
            "Failed to persist rotated key pair"
        );
    }

    /// Write the active private key back over a half-finished rotation
    fn restore_private_key(&self) {
        let active = self.key_pair();
        match self.store.save_private_key(active.private_key()) {
            Ok(()) => tracing::warn!(
                path = %self.store.private_key_path().display(),
                event = "key_rotation_rolled_back",
                "Restored the active private key after a failed rotation"
            ),
            Err(err) => tracing::error!(
                path = %self.store.private_key_path().display(),
                error = %err,
                event = "key_files_diverged",
                "Stored private key no longer matches the active key pair; \
                 the next start will load the stored key"
            ),
        }
    }

    /// Snapshot of the active key pair
    pub fn key_pair(&self) -> Arc<KeyPair> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Active private key, for in-process signing only
    pub fn private_key(&self) -> RsaPrivateKey {
        self.key_pair().private_key().clone()
    }

    pub fn public_key(&self) -> RsaPublicKey {
        self.key_pair().public_key().clone()
    }

    /// Active public key as PKCS#1 PEM, for distribution to verifiers
    pub fn export_public_key(&self) -> String {
        self.key_pair().public_key_pem().to_string()
    }
}
