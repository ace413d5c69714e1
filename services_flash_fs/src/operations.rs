//! Filesystem operations
//!
//! This module defines the operations the flash filesystem service offers
//! to its host, and the POSIX-shaped results they return.

use fs_view::PathError;
use hal::{ObjectStat, ObjectType};
use thiserror::Error;

/// Seek relative to the start of the object
pub const SEEK_SET: i32 = 0;
/// Seek relative to the current position
pub const SEEK_CUR: i32 = 1;
/// Seek relative to the end of the object
pub const SEEK_END: i32 = 2;

/// Directory mode bits
pub const S_IFDIR: u32 = 0o040000;
/// Regular file mode bits, readable/writable/executable by everyone
pub const S_IFREG_ALL: u32 = 0o100777;

/// errno for I/O failures
pub const EIO: i32 = 5;
/// errno for rejected arguments
pub const EINVAL: i32 = 22;

/// Errors that can occur during filesystem operations
///
/// The driver's own error codes are folded into these two classes; the
/// message keeps the detail for logs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OperationError {
    /// Storage failure of any kind
    #[error("I/O error: {0}")]
    Io(String),

    /// Argument rejected before reaching storage
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl OperationError {
    /// POSIX errno for this error class
    pub fn errno(&self) -> i32 {
        match self {
            OperationError::Io(_) => EIO,
            OperationError::InvalidArgument(_) => EINVAL,
        }
    }
}

impl From<PathError> for OperationError {
    fn from(err: PathError) -> Self {
        OperationError::Io(err.to_string())
    }
}

/// POSIX-like stat record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatResult {
    /// `S_IFDIR` or `S_IFREG_ALL`
    pub mode: u32,
    /// Driver-assigned object id, standing in for an inode number
    pub object_id: u32,
    /// Size in bytes
    pub size: u32,
}

impl StatResult {
    /// Synthesized record for the volume root
    pub fn root() -> Self {
        Self {
            mode: S_IFDIR,
            object_id: 0,
            size: 0,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.mode == S_IFDIR
    }

    /// `(mode, ino, dev, nlink, uid, gid, size, atime, mtime, ctime)`
    pub fn to_tuple(&self) -> [u64; 10] {
        let mut fields = [0u64; 10];
        fields[0] = self.mode as u64;
        fields[1] = self.object_id as u64;
        fields[6] = self.size as u64;
        fields
    }
}

impl From<ObjectStat> for StatResult {
    fn from(stat: ObjectStat) -> Self {
        let mode = match stat.object_type {
            ObjectType::Directory => S_IFDIR,
            _ => S_IFREG_ALL,
        };
        Self {
            mode,
            object_id: stat.object_id as u32,
            size: stat.size,
        }
    }
}

/// POSIX-like statvfs record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatVfsResult {
    pub total_bytes: u32,
    pub used_bytes: u32,
}

impl StatVfsResult {
    /// Total and used bytes in the first two slots, the rest zero
    pub fn to_tuple(&self) -> [u64; 10] {
        let mut fields = [0u64; 10];
        fields[0] = self.total_bytes as u64;
        fields[1] = self.used_bytes as u64;
        fields
    }
}

/// Answer to the host importer's "does this module exist" question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStat {
    NoExist,
    File,
}

/// Filesystem operations trait
///
/// Every call runs to completion against the storage driver before
/// returning; nothing is cached between calls except the cursor.
pub trait FileSystemOperations {
    /// Stored names under `path` (default: the current directory)
    fn listdir(&mut self, path: Option<&str>) -> Result<Vec<String>, OperationError>;

    /// Like `listdir`, rendered as `<type> <size> <name>` descriptors
    fn ls(&mut self, path: Option<&str>) -> Result<Vec<String>, OperationError>;

    /// Accepted for compatibility; the volume has no directory objects
    fn mkdir(&mut self, path: &str) -> Result<(), OperationError>;

    /// Accepted for compatibility; the volume has no directory objects
    fn rmdir(&mut self, path: &str) -> Result<(), OperationError>;

    /// Moves the current-directory cursor
    fn chdir(&mut self, path: &str);

    /// The current-directory cursor, with its trailing `/`
    fn getcwd(&self) -> String;

    /// Creates or truncates `path`, seeks, and writes all of `data`
    fn write(
        &mut self,
        path: &str,
        offset: i32,
        seek_mode: i32,
        data: &[u8],
    ) -> Result<(), OperationError>;

    /// Seeks in `path` and reads up to `buffer.len()` bytes
    ///
    /// Returns how many bytes were read; bytes past that are untouched.
    fn read(
        &mut self,
        path: &str,
        offset: i32,
        seek_mode: i32,
        buffer: &mut [u8],
    ) -> Result<usize, OperationError>;

    /// Deletes an object; the root and reserved paths are refused
    fn remove(&mut self, path: &str) -> Result<(), OperationError>;

    fn rename(&mut self, old_path: &str, new_path: &str) -> Result<(), OperationError>;

    fn stat(&mut self, path: &str) -> Result<StatResult, OperationError>;

    /// Volume usage; `path` is ignored
    fn statvfs(&mut self, path: &str) -> Result<StatVfsResult, OperationError>;

    /// Erases and re-initializes the volume
    ///
    /// The driver's outcome is logged, never returned; the cursor is kept.
    fn formatfs(&mut self) -> Result<(), OperationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_root() {
        let root = StatResult::root();
        assert!(root.is_dir());
        assert_eq!(root.to_tuple(), [S_IFDIR as u64, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_stat_from_object() {
        let file = StatResult::from(ObjectStat {
            object_id: 7,
            object_type: ObjectType::File,
            size: 100,
        });
        assert_eq!(file.mode, 0o100777);
        assert_eq!(file.to_tuple(), [0o100777, 7, 0, 0, 0, 0, 100, 0, 0, 0]);

        let dir = StatResult::from(ObjectStat {
            object_id: 3,
            object_type: ObjectType::Directory,
            size: 0,
        });
        assert!(dir.is_dir());

        let link = StatResult::from(ObjectStat {
            object_id: 4,
            object_type: ObjectType::SoftLink,
            size: 5,
        });
        assert_eq!(link.mode, S_IFREG_ALL);
    }

    #[test]
    fn test_statvfs_tuple() {
        let vfs = StatVfsResult {
            total_bytes: 4096,
            used_bytes: 128,
        };
        assert_eq!(vfs.to_tuple(), [4096, 128, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_errno() {
        assert_eq!(OperationError::Io("x".into()).errno(), EIO);
        assert_eq!(OperationError::InvalidArgument("/".into()).errno(), EINVAL);
    }

    #[test]
    fn test_path_error_is_io() {
        let err: OperationError = PathError::Allocation { requested: 9 }.into();
        assert_eq!(err.errno(), EIO);
    }
}
