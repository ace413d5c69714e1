//! Directory entry types and prefix grouping
//!
//! There are no directory objects on the volume. A directory listing is the
//! set of stored names that start with the directory's path, which is all
//! this module derives.

use hal::{FlashDirEntry, ObjectType};

/// Kind of a listed entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Unknown,
    File,
    Directory,
    HardLink,
    SoftLink,
}

impl EntryKind {
    /// Single-character tag used by descriptor listings
    pub fn type_char(self) -> char {
        match self {
            EntryKind::Unknown => '?',
            EntryKind::File => 'f',
            EntryKind::Directory => 'd',
            EntryKind::HardLink => 'h',
            EntryKind::SoftLink => 's',
        }
    }
}

impl From<ObjectType> for EntryKind {
    fn from(object_type: ObjectType) -> Self {
        match object_type {
            ObjectType::File => EntryKind::File,
            ObjectType::Directory => EntryKind::Directory,
            ObjectType::HardLink => EntryKind::HardLink,
            ObjectType::SoftLink => EntryKind::SoftLink,
            ObjectType::Other(_) => EntryKind::Unknown,
        }
    }
}

/// A single listed entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Full stored name
    pub name: String,
    /// Kind of object
    pub kind: EntryKind,
    /// Size in bytes
    pub size: u32,
}

impl DirectoryEntry {
    /// Creates a new directory entry
    pub fn new(name: impl Into<String>, kind: EntryKind, size: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            size,
        }
    }

    /// Compact `<type> <size> <name>` form, size right-aligned in 6 columns
    pub fn descriptor(&self) -> String {
        format!("{} {:>6} {}", self.kind.type_char(), self.size, self.name)
    }
}

impl From<FlashDirEntry> for DirectoryEntry {
    fn from(entry: FlashDirEntry) -> Self {
        Self {
            name: entry.name,
            kind: entry.object_type.into(),
            size: entry.size,
        }
    }
}

/// How listed entries are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingMode {
    /// Stored name only
    Names,
    /// `<type> <size> <name>`
    Descriptor,
}

impl ListingMode {
    pub fn render(self, entry: &DirectoryEntry) -> String {
        match self {
            ListingMode::Names => entry.name.clone(),
            ListingMode::Descriptor => entry.descriptor(),
        }
    }
}

/// Returns true if `name` is listed under `target`
pub fn matches_prefix(name: &str, target: &str) -> bool {
    name.starts_with(target)
}

/// Keeps the entries whose names fall under `target`
pub fn entries_under<'a, I>(entries: I, target: &'a str) -> impl Iterator<Item = DirectoryEntry> + 'a
where
    I: IntoIterator<Item = DirectoryEntry>,
    I::IntoIter: 'a,
{
    entries
        .into_iter()
        .filter(move |entry| matches_prefix(&entry.name, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_entry_creation() {
        let entry = DirectoryEntry::new("/test.txt", EntryKind::File, 12);
        assert_eq!(entry.name, "/test.txt");
        assert_eq!(entry.kind, EntryKind::File);
        assert_eq!(entry.size, 12);
    }

    #[test]
    fn test_type_chars() {
        let chars: String = [
            EntryKind::Unknown,
            EntryKind::File,
            EntryKind::Directory,
            EntryKind::HardLink,
            EntryKind::SoftLink,
        ]
        .iter()
        .map(|k| k.type_char())
        .collect();
        assert_eq!(chars, "?fdhs");
    }

    #[test]
    fn test_descriptor_format() {
        let entry = DirectoryEntry::new("/boot.py", EntryKind::File, 42);
        assert_eq!(entry.descriptor(), "f     42 /boot.py");

        let wide = DirectoryEntry::new("/big", EntryKind::File, 1234567);
        assert_eq!(wide.descriptor(), "f 1234567 /big");

        let dir = DirectoryEntry::new("/lib", EntryKind::Directory, 0);
        assert_eq!(dir.descriptor(), "d      0 /lib");
    }

    #[test]
    fn test_listing_mode_render() {
        let entry = DirectoryEntry::new("/a", EntryKind::Unknown, 3);
        assert_eq!(ListingMode::Names.render(&entry), "/a");
        assert_eq!(ListingMode::Descriptor.render(&entry), "?      3 /a");
    }

    #[test]
    fn test_from_flash_entry() {
        let raw = FlashDirEntry {
            name: "/x".to_string(),
            object_type: ObjectType::Other(7),
            size: 9,
            object_id: 4,
        };
        let entry = DirectoryEntry::from(raw);
        assert_eq!(entry.kind, EntryKind::Unknown);
        assert_eq!(entry.size, 9);
    }

    #[test]
    fn test_entries_under_prefix() {
        let entries = vec![
            DirectoryEntry::new("/a/one", EntryKind::File, 1),
            DirectoryEntry::new("/a/two", EntryKind::File, 2),
            DirectoryEntry::new("/ab", EntryKind::File, 3),
            DirectoryEntry::new("/b", EntryKind::File, 4),
        ];

        let names: Vec<String> = entries_under(entries.clone(), "/a/")
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["/a/one", "/a/two"]);

        // Prefix matching is purely textual
        assert_eq!(entries_under(entries.clone(), "/a").count(), 3);
        assert_eq!(entries_under(entries, "/").count(), 4);
    }
}
