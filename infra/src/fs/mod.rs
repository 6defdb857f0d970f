//! Filesystem implementations backing the key store

mod os;


pub use os::OsFileSystem;
