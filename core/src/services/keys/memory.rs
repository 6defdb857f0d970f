//! In-memory [`FileSystem`] for tests and embedded use

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::file_system::{FileInfo, FileSystem};

#[derive(Debug, Clone)]
struct MemoryFile {
    data: Vec<u8>,
    mode: u32,
}

#[derive(Debug, Default)]
struct MemoryState {
    files: HashMap<PathBuf, MemoryFile>,
    dirs: HashMap<PathBuf, u32>,
    failing_writes: HashSet<PathBuf>,
}

/// Filesystem held entirely in memory.
///
/// Writes to a path registered with [`MemoryFileSystem::fail_writes_to`]
/// return `PermissionDenied`, which lets callers exercise partial failures.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    state: Mutex<MemoryState>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a file directly, bypassing failure injection
    pub fn insert(&self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) {
        let file = MemoryFile {
            data: data.into(),
            mode: 0o644,
        };
        self.state().files.insert(path.into(), file);
    }

    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.state().files.get(path).map(|file| file.data.clone())
    }

    pub fn mode(&self, path: &Path) -> Option<u32> {
        let state = self.state();
        if let Some(file) = state.files.get(path) {
            return Some(file.mode);
        }
        state.dirs.get(path).copied()
    }

    pub fn fail_writes_to(&self, path: impl Into<PathBuf>) {
        self.state().failing_writes.insert(path.into());
    }

    pub fn clear_failures(&self) {
        self.state().failing_writes.clear();
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.state()
            .files
            .get(path)
            .map(|file| file.data.clone())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    fn write_file(&self, path: &Path, data: &[u8], mode: u32) -> io::Result<()> {
        let mut state = self.state();
        if state.failing_writes.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "write rejected",
            ));
        }
        let file = MemoryFile {
            data: data.to_vec(),
            mode,
        };
        state.files.insert(path.to_path_buf(), file);
        Ok(())
    }

    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        let state = self.state();
        if state.dirs.contains_key(path) {
            return Ok(FileInfo { is_dir: true, len: 0 });
        }
        state
            .files
            .get(path)
            .map(|file| FileInfo {
                is_dir: false,
                len: file.data.len() as u64,
            })
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file or directory"))
    }

    fn create_dir(&self, path: &Path, mode: u32) -> io::Result<()> {
        let mut state = self.state();
        if state.files.contains_key(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "a file exists at this path",
            ));
        }
        state.dirs.insert(path.to_path_buf(), mode);
        Ok(())
    }
}
