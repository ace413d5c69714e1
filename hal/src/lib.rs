//! # Hardware Abstraction Layer (HAL)
//!
//! This crate defines the hardware-facing traits the flash filesystem
//! adapter is written against.
//!
//! ## Philosophy
//!
//! **The storage driver is a collaborator, not a dependency.**
//!
//! The adapter never assumes a particular flash chip or driver build.
//! Everything it needs goes through `FlashStorage` and `EntropySource`.
//!
//! ## Design Principles
//!
//! 1. **Flat namespace**: Objects are addressed by full name only
//! 2. **Trait-based**: All driver operations go through traits
//! 3. **Testable**: `RamFlash` stands in for real flash in tests and on hosts

pub mod entropy;
pub mod flash_storage;
#[cfg(feature = "alloc")]
pub mod ram_flash;

pub use entropy::{EntropySource, SoftwareEntropy};
pub use flash_storage::{
    FileHandle, FlashDirEntry, FlashError, FlashInfo, FlashStorage, ObjectStat, ObjectType,
    OpenFlags, Whence, OBJ_NAME_LEN,
};
#[cfg(feature = "alloc")]
pub use ram_flash::{DirCursor, RamFlash, MAX_OPEN_HANDLES};
