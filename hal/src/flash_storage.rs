//! Flash storage driver abstraction
//!
//! Describes the narrow surface a flat flash filesystem driver exposes:
//! objects are addressed by name only, there are no directory objects, and
//! the driver owns a single global directory iterator.
use thiserror::Error;

/// Default maximum object name length, including the terminating byte the
/// on-flash format reserves. A stored name must be strictly shorter.
pub const OBJ_NAME_LEN: usize = 32;

/// Flash driver errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlashError {
    /// No object with the given name
    #[error("object not found")]
    NotFound,
    /// Target name already exists (rename)
    #[error("object already exists")]
    Exists,
    /// Name is empty or too long for the volume
    #[error("bad object name")]
    BadName,
    /// Handle is not open (or was already closed)
    #[error("bad file descriptor")]
    BadDescriptor,
    /// Seek target is negative or the whence value is unknown
    #[error("invalid seek")]
    InvalidSeek,
    /// Handle was not opened with the required access
    #[error("access not permitted by open flags")]
    NotPermitted,
    /// Volume has no room left
    #[error("volume full")]
    Full,
    /// Too many open handles
    #[error("out of file descriptors")]
    OutOfDescriptors,
    /// Directory iterator could not be opened
    #[error("directory iterator unavailable")]
    DirUnavailable,
    /// Generic driver / hardware failure
    #[error("I/O error")]
    IoError,
}

/// Open flags, combined with `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenFlags(u8);

impl OpenFlags {
    pub const READ: OpenFlags = OpenFlags(0x01);
    pub const WRITE: OpenFlags = OpenFlags(0x02);
    pub const READ_WRITE: OpenFlags = OpenFlags(0x03);
    pub const CREATE: OpenFlags = OpenFlags(0x04);
    pub const TRUNCATE: OpenFlags = OpenFlags(0x08);

    /// Returns true if every flag in `other` is set
    pub fn contains(self, other: OpenFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl core::ops::BitOr for OpenFlags {
    type Output = OpenFlags;

    fn bitor(self, rhs: OpenFlags) -> OpenFlags {
        OpenFlags(self.0 | rhs.0)
    }
}

/// Seek origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// Absolute offset
    Set,
    /// Relative to the current position
    Current,
    /// Relative to the end of the object
    End,
}

impl Whence {
    /// Decodes the numeric seek mode used by callers (0, 1, 2)
    pub fn from_raw(mode: i32) -> Option<Whence> {
        match mode {
            0 => Some(Whence::Set),
            1 => Some(Whence::Current),
            2 => Some(Whence::End),
            _ => None,
        }
    }
}

/// Handle to an open object, only meaningful to the driver that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileHandle(pub u16);

/// Object type as recorded by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    File,
    Directory,
    HardLink,
    SoftLink,
    /// Any type code the adapter does not know about
    Other(u8),
}

impl ObjectType {
    /// Decodes the raw on-flash type code
    pub fn from_raw(code: u8) -> ObjectType {
        match code {
            1 => ObjectType::File,
            2 => ObjectType::Directory,
            3 => ObjectType::HardLink,
            4 => ObjectType::SoftLink,
            other => ObjectType::Other(other),
        }
    }

    pub fn raw(self) -> u8 {
        match self {
            ObjectType::File => 1,
            ObjectType::Directory => 2,
            ObjectType::HardLink => 3,
            ObjectType::SoftLink => 4,
            ObjectType::Other(code) => code,
        }
    }
}

/// Native stat record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStat {
    pub object_id: u16,
    pub object_type: ObjectType,
    pub size: u32,
}

/// One entry yielded by the directory iterator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashDirEntry {
    /// Full stored name, e.g. `/lib/util.py`
    pub name: String,
    pub object_type: ObjectType,
    pub size: u32,
    pub object_id: u16,
}

/// Volume usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashInfo {
    pub total_bytes: u32,
    pub used_bytes: u32,
}

/// Flat flash filesystem driver
///
/// Implementers own the on-flash layout. Callers are expected to pair every
/// successful `open` with a `close`, and every `opendir` with a `closedir`.
/// There is only one directory iterator per volume: opening a new one
/// replaces whatever iteration state existed before.
pub trait FlashStorage {
    /// Maximum object name length (names must be strictly shorter)
    fn max_name_len(&self) -> usize {
        OBJ_NAME_LEN
    }

    /// Opens an object by name
    fn open(&mut self, name: &str, flags: OpenFlags) -> Result<FileHandle, FlashError>;

    /// Reads up to `buffer.len()` bytes at the handle position
    ///
    /// Returns the number of bytes read; 0 at end of object.
    fn read(&mut self, handle: FileHandle, buffer: &mut [u8]) -> Result<usize, FlashError>;

    /// Writes `data` at the handle position, returning the bytes written
    fn write(&mut self, handle: FileHandle, data: &[u8]) -> Result<usize, FlashError>;

    /// Moves the handle position, returning the new absolute position
    fn lseek(&mut self, handle: FileHandle, offset: i32, whence: Whence)
        -> Result<u32, FlashError>;

    /// Flushes cached writes for the handle
    fn flush(&mut self, handle: FileHandle) -> Result<(), FlashError>;

    /// Releases the handle
    fn close(&mut self, handle: FileHandle) -> Result<(), FlashError>;

    /// Native stat by name
    fn stat(&mut self, name: &str) -> Result<ObjectStat, FlashError>;

    /// Renames an object
    fn rename(&mut self, old: &str, new: &str) -> Result<(), FlashError>;

    /// Deletes an object
    fn remove(&mut self, name: &str) -> Result<(), FlashError>;

    /// Volume-wide usage
    fn info(&mut self) -> Result<FlashInfo, FlashError>;

    /// (Re)opens the global directory iterator
    ///
    /// Flat volumes enumerate every object regardless of `name`; the name is
    /// recorded for drivers that care.
    fn opendir(&mut self, name: &str) -> Result<(), FlashError>;

    /// Next entry of the global iterator, `None` when exhausted or closed
    fn readdir(&mut self) -> Option<FlashDirEntry>;

    /// Closes the global iterator
    fn closedir(&mut self);

    /// Erases and re-initializes the volume
    fn format(&mut self) -> Result<(), FlashError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_flags_combine() {
        let flags = OpenFlags::CREATE | OpenFlags::TRUNCATE | OpenFlags::READ_WRITE;
        assert!(flags.contains(OpenFlags::READ));
        assert!(flags.contains(OpenFlags::WRITE));
        assert!(flags.contains(OpenFlags::CREATE));
        assert!(!OpenFlags::READ.contains(OpenFlags::WRITE));
        assert_eq!(flags.bits(), 0x0f);
    }

    #[test]
    fn test_whence_from_raw() {
        assert_eq!(Whence::from_raw(0), Some(Whence::Set));
        assert_eq!(Whence::from_raw(1), Some(Whence::Current));
        assert_eq!(Whence::from_raw(2), Some(Whence::End));
        assert_eq!(Whence::from_raw(3), None);
        assert_eq!(Whence::from_raw(-1), None);
    }

    #[test]
    fn test_object_type_codes() {
        for code in 1..=4u8 {
            assert_eq!(ObjectType::from_raw(code).raw(), code);
        }
        assert_eq!(ObjectType::from_raw(9), ObjectType::Other(9));
        assert_eq!(ObjectType::from_raw(2), ObjectType::Directory);
    }
}
