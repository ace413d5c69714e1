//! # Flash Filesystem Service
//!
//! This service adapts a flat, name-keyed flash volume to the POSIX-style
//! operations a scripting runtime expects from its `os` module.
//!
//! ## Philosophy
//!
//! - **The volume stays flat**: Directories exist only as name prefixes
//! - **Handles never leak**: Every open is paired with a close, error paths included
//! - **Two error classes**: Callers see I/O errors or invalid arguments, logs keep the rest
//!
//! ## Operations
//!
//! - `listdir(path)` / `ls(path)`: Names or descriptors under a prefix
//! - `chdir(path)` / `getcwd()`: The session cursor
//! - `write(path, offset, mode, data)` / `read(path, offset, mode, buf)`: Whole-call file I/O
//! - `remove(path)` / `rename(old, new)`: Object management
//! - `stat(path)` / `statvfs(path)`: Metadata
//! - `formatfs()`: Erase the volume
//! - `uname()` / `urandom(n)` / `import_stat(path)`: Host support

pub mod config;
pub mod operations;
pub mod service;
pub mod system;

pub use config::{ConfigError, FsConfig, UnameInfo};
pub use operations::{
    FileSystemOperations, ImportStat, OperationError, StatResult, StatVfsResult, EINVAL, EIO,
    SEEK_CUR, SEEK_END, SEEK_SET, S_IFDIR, S_IFREG_ALL,
};
pub use service::FlashFsService;
