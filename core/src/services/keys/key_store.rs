//! PEM persistence of the signing key pair
//!
//! The private key lives in `private.pem` as a PKCS#1 `RSA PRIVATE KEY`
//! block, the public key in `public.pem` as a PKCS#1 `RSA PUBLIC KEY` block.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rsa::pkcs1::{
    DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding,
};
use rsa::pkcs8::DecodePublicKey;
use rsa::{RsaPrivateKey, RsaPublicKey};

use super::file_system::{FileSystem, KEY_DIRECTORY_MODE, PRIVATE_KEY_MODE, PUBLIC_KEY_MODE};
use crate::errors::KeyError;

pub const PRIVATE_KEY_FILE_NAME: &str = "private.pem";
pub const PUBLIC_KEY_FILE_NAME: &str = "public.pem";

/// Reads and writes the key pair files in one directory
#[derive(Clone)]
pub struct KeyStore {
    location: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore")
            .field("location", &self.location)
            .finish()
    }
}

impl KeyStore {
    pub fn new(location: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            location: location.into(),
            fs,
        }
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn private_key_path(&self) -> PathBuf {
        self.location.join(PRIVATE_KEY_FILE_NAME)
    }

    pub fn public_key_path(&self) -> PathBuf {
        self.location.join(PUBLIC_KEY_FILE_NAME)
    }

    /// Load the private key, or `None` when the file does not exist
    pub fn load_private_key(&self) -> Result<Option<RsaPrivateKey>, KeyError> {
        let path = self.private_key_path();
        let Some(pem) = self.read_optional(&path)? else {
            return Ok(None);
        };

        let key = RsaPrivateKey::from_pkcs1_pem(&pem).map_err(|e| KeyError::Parse {
            origin: path.display().to_string(),
            message: e.to_string(),
        })?;
        key.validate().map_err(|e| KeyError::Parse {
            origin: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Some(key))
    }

    /// Load the public key, or `None` when the file does not exist
    pub fn load_public_key(&self) -> Result<Option<RsaPublicKey>, KeyError> {
        let path = self.public_key_path();
        match self.read_optional(&path)? {
            Some(pem) => decode_public_key_pem(&pem, &path.display().to_string()).map(Some),
            None => Ok(None),
        }
    }

    /// Write both halves of a key pair, creating the directory if needed.
    ///
    /// The private key is written first. Each file is replaced atomically.
    pub fn save(&self, private_key: &RsaPrivateKey, public_key_pem: &str) -> Result<(), KeyError> {
        self.save_private_key(private_key)?;
        self.save_public_key(public_key_pem)
    }

    pub fn save_private_key(&self, private_key: &RsaPrivateKey) -> Result<(), KeyError> {
        self.ensure_directory()?;

        let path = self.private_key_path();
        let pem = private_key
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| KeyError::Encoding {
                message: e.to_string(),
            })?;
        self.fs
            .write_file(&path, pem.as_bytes(), PRIVATE_KEY_MODE)
            .map_err(|source| KeyError::Io { path, source })
    }

    pub fn save_public_key(&self, public_key_pem: &str) -> Result<(), KeyError> {
        self.ensure_directory()?;

        let path = self.public_key_path();
        self.fs
            .write_file(&path, public_key_pem.as_bytes(), PUBLIC_KEY_MODE)
            .map_err(|source| KeyError::Io { path, source })
    }

    fn ensure_directory(&self) -> Result<(), KeyError> {
        match self.fs.stat(&self.location) {
            Ok(info) if info.is_dir => Ok(()),
            Ok(_) => Err(KeyError::Io {
                path: self.location.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "key location exists and is not a directory",
                ),
            }),
            Err(err) if self.fs.is_not_exist(&err) => {
                tracing::info!(
                    location = %self.location.display(),
                    event = "key_directory_created",
                    "Creating key directory"
                );
                self.fs
                    .create_dir(&self.location, KEY_DIRECTORY_MODE)
                    .map_err(|source| KeyError::Io {
                        path: self.location.clone(),
                        source,
                    })
            }
            Err(source) => Err(KeyError::Io {
                path: self.location.clone(),
                source,
            }),
        }
    }

    fn read_optional(&self, path: &Path) -> Result<Option<String>, KeyError> {
        let bytes = match self.fs.read_file(path) {
            Ok(bytes) => bytes,
            Err(err) if self.fs.is_not_exist(&err) => return Ok(None),
            Err(source) => {
                return Err(KeyError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        String::from_utf8(bytes).map(Some).map_err(|_| KeyError::Parse {
            origin: path.display().to_string(),
            message: String::from("file is not valid UTF-8 PEM text"),
        })
    }
}

/// Encode a public key as a PKCS#1 `RSA PUBLIC KEY` PEM block
pub fn encode_public_key_pem(key: &RsaPublicKey) -> Result<String, KeyError> {
    key.to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| KeyError::Encoding {
            message: e.to_string(),
        })
}

/// Decode a public key from PKCS#1 or SubjectPublicKeyInfo PEM.
///
/// `origin` names where the text came from and is only used in errors.
pub fn decode_public_key_pem(pem: &str, origin: &str) -> Result<RsaPublicKey, KeyError> {
    RsaPublicKey::from_pkcs1_pem(pem)
        .or_else(|pkcs1_err| {
            RsaPublicKey::from_public_key_pem(pem).map_err(|_| pkcs1_err.to_string())
        })
        .map_err(|message| KeyError::Parse {
            origin: origin.to_string(),
            message,
        })
}
