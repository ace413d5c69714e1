//! # Filesystem View
//!
//! This crate provides a directory-shaped view over a flat flash volume.
//!
//! ## Philosophy
//!
//! - **Directories are views, not objects**: A directory is a name prefix
//! - **One cursor per session**: Relative paths resolve against it
//! - **No tree is materialized**: Listing filters the flat key space
//!
//! ## Design
//!
//! - `CurrentDirectory` holds the session's cursor, always `/`-terminated
//! - `PathResolver` turns user paths into stored names
//! - `entries_under` derives a directory's contents by prefix

pub mod directory;
pub mod path;

pub use directory::{entries_under, matches_prefix, DirectoryEntry, EntryKind, ListingMode};
pub use path::{is_root, CurrentDirectory, PathError, PathResolver, ROOT};
