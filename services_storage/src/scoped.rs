//! # Scoped Storage Resources
//!
//! Guards that tie a driver handle or the driver's directory iterator to a
//! Rust scope. Dropping a guard releases the resource, so early returns
//! through `?` can never leak a handle.

use hal::{FileHandle, FlashDirEntry, FlashError, FlashStorage, OpenFlags, Whence};

/// An open object, closed when the guard goes out of scope
pub struct ObjectGuard<'a, S: FlashStorage + ?Sized> {
    storage: &'a mut S,
    handle: Option<FileHandle>,
}

impl<'a, S: FlashStorage + ?Sized> ObjectGuard<'a, S> {
    /// Opens `name` on `storage`
    pub fn open(storage: &'a mut S, name: &str, flags: OpenFlags) -> Result<Self, FlashError> {
        let handle = storage.open(name, flags)?;
        Ok(Self {
            storage,
            handle: Some(handle),
        })
    }

    fn handle(&self) -> Result<FileHandle, FlashError> {
        self.handle.ok_or(FlashError::BadDescriptor)
    }

    pub fn seek(&mut self, offset: i32, whence: Whence) -> Result<u32, FlashError> {
        let handle = self.handle()?;
        self.storage.lseek(handle, offset, whence)
    }

    pub fn read(&mut self, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let handle = self.handle()?;
        self.storage.read(handle, buffer)
    }

    pub fn write(&mut self, data: &[u8]) -> Result<usize, FlashError> {
        let handle = self.handle()?;
        self.storage.write(handle, data)
    }

    pub fn flush(&mut self) -> Result<(), FlashError> {
        let handle = self.handle()?;
        self.storage.flush(handle)
    }

    /// Closes the handle, reporting the driver's close result
    pub fn close(mut self) -> Result<(), FlashError> {
        match self.handle.take() {
            Some(handle) => self.storage.close(handle),
            None => Ok(()),
        }
    }
}

impl<S: FlashStorage + ?Sized> Drop for ObjectGuard<'_, S> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            // Close errors on an abandoned handle have nowhere to go
            let _ = self.storage.close(handle);
        }
    }
}

/// A scan of the driver's global directory iterator
///
/// On drop the iterator is closed and immediately re-opened at `reset_to`,
/// so the next user of the iterator starts from a fresh cursor.
pub struct DirScan<'a, S: FlashStorage + ?Sized> {
    storage: &'a mut S,
    reset_to: String,
}

impl<'a, S: FlashStorage + ?Sized> DirScan<'a, S> {
    /// Opens the iterator at `target`; `reset_to` is where it is left afterwards
    pub fn open(
        storage: &'a mut S,
        target: &str,
        reset_to: impl Into<String>,
    ) -> Result<Self, FlashError> {
        storage.opendir(target)?;
        Ok(Self {
            storage,
            reset_to: reset_to.into(),
        })
    }
}

impl<S: FlashStorage + ?Sized> Iterator for DirScan<'_, S> {
    type Item = FlashDirEntry;

    fn next(&mut self) -> Option<FlashDirEntry> {
        self.storage.readdir()
    }
}

impl<S: FlashStorage + ?Sized> Drop for DirScan<'_, S> {
    fn drop(&mut self) {
        self.storage.closedir();
        // A failed re-open is left for the next caller to surface
        let _ = self.storage.opendir(&self.reset_to);
    }
}
