//! Key management module
//!
//! This module owns the RSA key pair used for token signatures:
//! - `file_system` - Filesystem seam and the permission bits used for key files
//! - `key_store` - PEM persistence of `private.pem` and `public.pem`
//! - `key_manager` - Loading, generation and rotation of the active pair
//! - `memory` - In-memory filesystem

mod file_system;
mod key_manager;
mod key_store;
mod memory;

#[cfg(test)]
mod tests;

pub use file_system::{
    FileInfo, FileSystem, KEY_DIRECTORY_MODE, PRIVATE_KEY_MODE, PUBLIC_KEY_MODE,
};
pub use key_manager::{KeyManager, KeyPair};
pub use key_store::{
    decode_public_key_pem, encode_public_key_pem, KeyStore, PRIVATE_KEY_FILE_NAME,
    PUBLIC_KEY_FILE_NAME,
};
pub use memory::MemoryFileSystem;
