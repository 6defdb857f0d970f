//! Filesystem seam used by the key store

use std::io;
use std::path::Path;

/// Permission bits for `private.pem`
pub const PRIVATE_KEY_MODE: u32 = 0o600;
/// Permission bits for `public.pem`
pub const PUBLIC_KEY_MODE: u32 = 0o644;
/// Permission bits for a key directory created by the store
pub const KEY_DIRECTORY_MODE: u32 = 0o700;

/// Metadata returned by [`FileSystem::stat`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo {
    pub is_dir: bool,
    pub len: u64,
}

/// Minimal filesystem interface needed to persist key pairs.
///
/// Production code uses the OS-backed implementation in the infra crate;
/// tests use [`super::MemoryFileSystem`].
pub trait FileSystem: Send + Sync {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replace `path` with `data` so readers see either the old or the new
    /// contents, never a partial file. `mode` applies to the new file.
    fn write_file(&self, path: &Path, data: &[u8], mode: u32) -> io::Result<()>;

    fn stat(&self, path: &Path) -> io::Result<FileInfo>;

    fn create_dir(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Whether `err` means the path does not exist
    fn is_not_exist(&self, err: &io::Error) -> bool {
        err.kind() == io::ErrorKind::NotFound
    }
}
