//! RAM flash - an in-memory flat flash volume
//!
//! Useful for testing and for the host daemon. Data is lost when the value
//! is dropped. Behaves like a small flat flash filesystem: names are the
//! only addressing, the directory iterator is a single global cursor, and
//! every open handle must be closed explicitly.
extern crate alloc;

use crate::flash_storage::{
    FileHandle, FlashDirEntry, FlashError, FlashInfo, FlashStorage, ObjectStat, ObjectType,
    OpenFlags, Whence, OBJ_NAME_LEN,
};
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

/// Maximum simultaneously open handles
pub const MAX_OPEN_HANDLES: usize = 8;

#[derive(Debug, Clone)]
struct StoredObject {
    id: u16,
    object_type: ObjectType,
    data: Vec<u8>,
}

#[derive(Debug, Clone)]
struct OpenObject {
    name: String,
    position: u32,
    flags: OpenFlags,
}

/// State of the volume's single directory iterator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirCursor {
    /// Name the iterator was opened with
    pub root: String,
    /// Number of entries already yielded
    pub position: usize,
}

/// In-memory flat flash volume
#[derive(Debug, Clone)]
pub struct RamFlash {
    capacity: u32,
    max_name_len: usize,
    objects: BTreeMap<String, StoredObject>,
    handles: BTreeMap<FileHandle, OpenObject>,
    dir: Option<DirCursor>,
    next_id: u16,
    next_handle: u16,
    formats: usize,
}

impl RamFlash {
    /// Create an empty volume with the given capacity in bytes
    pub fn new(capacity: u32) -> Self {
        Self::with_name_len(capacity, OBJ_NAME_LEN)
    }

    /// Create an empty volume with a custom maximum name length
    pub fn with_name_len(capacity: u32, max_name_len: usize) -> Self {
        Self {
            capacity,
            max_name_len,
            objects: BTreeMap::new(),
            handles: BTreeMap::new(),
            dir: None,
            next_id: 1,
            next_handle: 1,
            formats: 0,
        }
    }

    /// Store an object directly, bypassing handles (test fixtures)
    pub fn insert_object(
        &mut self,
        name: &str,
        object_type: ObjectType,
        data: &[u8],
    ) -> Result<u16, FlashError> {
        self.check_name(name)?;
        if self.used_bytes() + data.len() as u64 > self.capacity as u64 {
            return Err(FlashError::Full);
        }
        let id = self.allocate_id();
        self.objects.insert(
            String::from(name),
            StoredObject {
                id,
                object_type,
                data: data.to_vec(),
            },
        );
        Ok(id)
    }

    /// Raw contents of an object (test inspection)
    pub fn contents(&self, name: &str) -> Option<&[u8]> {
        self.objects.get(name).map(|o| o.data.as_slice())
    }

    /// Number of handles currently open
    pub fn open_handle_count(&self) -> usize {
        self.handles.len()
    }

    /// Current state of the global directory iterator
    pub fn dir_cursor(&self) -> Option<&DirCursor> {
        self.dir.as_ref()
    }

    /// Number of times the volume has been formatted
    pub fn format_count(&self) -> usize {
        self.formats
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn used_bytes(&self) -> u64 {
        self.objects.values().map(|o| o.data.len() as u64).sum()
    }

    fn allocate_id(&mut self) -> u16 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    fn check_name(&self, name: &str) -> Result<(), FlashError> {
        if name.is_empty() || name.len() >= self.max_name_len {
            return Err(FlashError::BadName);
        }
        Ok(())
    }

    fn handle(&self, handle: FileHandle) -> Result<&OpenObject, FlashError> {
        self.handles.get(&handle).ok_or(FlashError::BadDescriptor)
    }
}

impl FlashStorage for RamFlash {
    fn max_name_len(&self) -> usize {
        self.max_name_len
    }

    fn open(&mut self, name: &str, flags: OpenFlags) -> Result<FileHandle, FlashError> {
        self.check_name(name)?;
        if self.handles.len() >= MAX_OPEN_HANDLES {
            return Err(FlashError::OutOfDescriptors);
        }

        match self.objects.get_mut(name) {
            Some(object) => {
                if flags.contains(OpenFlags::TRUNCATE) {
                    if !flags.contains(OpenFlags::WRITE) {
                        return Err(FlashError::NotPermitted);
                    }
                    object.data.clear();
                }
            }
            None if flags.contains(OpenFlags::CREATE) => {
                let id = self.allocate_id();
                self.objects.insert(
                    String::from(name),
                    StoredObject {
                        id,
                        object_type: ObjectType::File,
                        data: Vec::new(),
                    },
                );
            }
            None => return Err(FlashError::NotFound),
        }

        let handle = FileHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1).max(1);
        self.handles.insert(
            handle,
            OpenObject {
                name: String::from(name),
                position: 0,
                flags,
            },
        );
        Ok(handle)
    }

    fn read(&mut self, handle: FileHandle, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let open = self.handle(handle)?;
        if !open.flags.contains(OpenFlags::READ) {
            return Err(FlashError::NotPermitted);
        }
        let object = self.objects.get(&open.name).ok_or(FlashError::NotFound)?;

        let start = (open.position as usize).min(object.data.len());
        let count = buffer.len().min(object.data.len() - start);
        buffer[..count].copy_from_slice(&object.data[start..start + count]);

        if let Some(open) = self.handles.get_mut(&handle) {
            open.position += count as u32;
        }
        Ok(count)
    }

    fn write(&mut self, handle: FileHandle, data: &[u8]) -> Result<usize, FlashError> {
        let open = self.handle(handle)?.clone();
        if !open.flags.contains(OpenFlags::WRITE) {
            return Err(FlashError::NotPermitted);
        }

        let used = self.used_bytes();
        let object = self.objects.get_mut(&open.name).ok_or(FlashError::NotFound)?;
        let start = open.position as usize;
        let end = start + data.len();
        let growth = end.saturating_sub(object.data.len()) as u64;
        if used + growth > self.capacity as u64 {
            return Err(FlashError::Full);
        }

        // Gaps left by seeking past the end read back as zeros
        if object.data.len() < end {
            object.data.resize(end, 0);
        }
        object.data[start..end].copy_from_slice(data);

        if let Some(open) = self.handles.get_mut(&handle) {
            open.position = end as u32;
        }
        Ok(data.len())
    }

    fn lseek(
        &mut self,
        handle: FileHandle,
        offset: i32,
        whence: Whence,
    ) -> Result<u32, FlashError> {
        let open = self.handle(handle)?;
        let size = self
            .objects
            .get(&open.name)
            .map(|o| o.data.len() as i64)
            .ok_or(FlashError::NotFound)?;

        let base = match whence {
            Whence::Set => 0,
            Whence::Current => open.position as i64,
            Whence::End => size,
        };
        let target = base + offset as i64;
        if target < 0 || target > u32::MAX as i64 {
            return Err(FlashError::InvalidSeek);
        }

        if let Some(open) = self.handles.get_mut(&handle) {
            open.position = target as u32;
        }
        Ok(target as u32)
    }

    fn flush(&mut self, handle: FileHandle) -> Result<(), FlashError> {
        self.handle(handle).map(|_| ())
    }

    fn close(&mut self, handle: FileHandle) -> Result<(), FlashError> {
        self.handles
            .remove(&handle)
            .map(|_| ())
            .ok_or(FlashError::BadDescriptor)
    }

    fn stat(&mut self, name: &str) -> Result<ObjectStat, FlashError> {
        let object = self.objects.get(name).ok_or(FlashError::NotFound)?;
        Ok(ObjectStat {
            object_id: object.id,
            object_type: object.object_type,
            size: object.data.len() as u32,
        })
    }

    fn rename(&mut self, old: &str, new: &str) -> Result<(), FlashError> {
        self.check_name(new)?;
        if self.objects.contains_key(new) {
            return Err(FlashError::Exists);
        }
        let object = self.objects.remove(old).ok_or(FlashError::NotFound)?;
        self.objects.insert(String::from(new), object);
        for open in self.handles.values_mut().filter(|h| h.name == old) {
            open.name = String::from(new);
        }
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<(), FlashError> {
        self.objects
            .remove(name)
            .map(|_| ())
            .ok_or(FlashError::NotFound)
    }

    fn info(&mut self) -> Result<FlashInfo, FlashError> {
        Ok(FlashInfo {
            total_bytes: self.capacity,
            used_bytes: self.used_bytes() as u32,
        })
    }

    fn opendir(&mut self, name: &str) -> Result<(), FlashError> {
        self.dir = Some(DirCursor {
            root: String::from(name),
            position: 0,
        });
        Ok(())
    }

    fn readdir(&mut self) -> Option<FlashDirEntry> {
        let cursor = self.dir.as_mut()?;
        let (name, object) = self.objects.iter().nth(cursor.position)?;
        cursor.position += 1;
        Some(FlashDirEntry {
            name: name.clone(),
            object_type: object.object_type,
            size: object.data.len() as u32,
            object_id: object.id,
        })
    }

    fn closedir(&mut self) {
        self.dir = None;
    }

    fn format(&mut self) -> Result<(), FlashError> {
        self.objects.clear();
        self.handles.clear();
        self.dir = None;
        self.next_id = 1;
        self.formats += 1;
        Ok(())
    }
}
