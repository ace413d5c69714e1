//! Flash Filesystem Service implementation
//!
//! This module provides the actual service that implements filesystem
//! operations on top of a flat flash driver.

use crate::config::FsConfig;
use crate::operations::{FileSystemOperations, OperationError, StatResult, StatVfsResult};
use fs_view::{
    entries_under, is_root, CurrentDirectory, DirectoryEntry, ListingMode, PathResolver,
};
use hal::{EntropySource, FlashError, FlashStorage, OpenFlags, Whence};
use services_logger::{LogEntry, LogLevel, LogSink, NullLog};
use services_storage::{DirScan, ObjectGuard};

const LOG_SOURCE: &str = "fs";

/// Logs a driver failure and folds it into an I/O error
pub(crate) fn io_failure(
    log: &dyn LogSink,
    op: &'static str,
    path: &str,
    err: FlashError,
) -> OperationError {
    log.log(
        LogEntry::new(LogLevel::Warn, format!("{} failed", op))
            .with_source(LOG_SOURCE)
            .with_field("path", path)
            .with_field("error", &err),
    );
    OperationError::Io(format!("{} {}: {}", op, path, err))
}

fn seek<S: FlashStorage + ?Sized>(
    file: &mut ObjectGuard<'_, S>,
    offset: i32,
    seek_mode: i32,
) -> Result<u32, FlashError> {
    match Whence::from_raw(seek_mode) {
        Some(whence) => file.seek(offset, whence),
        None => Err(FlashError::InvalidSeek),
    }
}

/// The Flash Filesystem Service
///
/// Owns the storage driver and the session's current-directory cursor.
/// Every operation takes `&mut self`, so calls never interleave.
pub struct FlashFsService<S: FlashStorage> {
    pub(crate) storage: S,
    cwd: CurrentDirectory,
    pub(crate) config: FsConfig,
    pub(crate) log: Box<dyn LogSink>,
    pub(crate) entropy: Option<Box<dyn EntropySource>>,
}

impl<S: FlashStorage> FlashFsService<S> {
    /// Mounts the service on a driver; the cursor starts at `/`
    ///
    /// The cursor is bounded by the driver's name length, or by the
    /// configured one when that is smaller.
    pub fn mount(storage: S, config: FsConfig) -> Self {
        let cwd = CurrentDirectory::new(config.max_name_len.min(storage.max_name_len()));
        Self {
            storage,
            cwd,
            config,
            log: Box::new(NullLog),
            entropy: None,
        }
    }

    /// Routes log entries to `log`
    pub fn with_logger(mut self, log: impl LogSink + 'static) -> Self {
        self.log = Box::new(log);
        self
    }

    /// Supplies random words for `urandom`
    pub fn with_entropy(mut self, entropy: impl EntropySource + 'static) -> Self {
        self.entropy = Some(Box::new(entropy));
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    pub fn cwd(&self) -> &CurrentDirectory {
        &self.cwd
    }

    /// Absolute form of `path` against the cursor
    pub fn resolve(&self, path: &str) -> Result<String, OperationError> {
        Ok(PathResolver::resolve(&self.cwd, path)?)
    }

    /// Prefix-match listing shared by `listdir` and `ls`
    fn list(
        &mut self,
        target: Option<&str>,
        mode: ListingMode,
    ) -> Result<Vec<String>, OperationError> {
        let target = match target {
            None | Some(".") => self.cwd.get().to_string(),
            Some(path) => self.resolve(path)?,
        };
        let reset_to = self.cwd.get().to_string();

        let log = &*self.log;
        let scan = DirScan::open(&mut self.storage, &target, reset_to.as_str())
            .map_err(|err| io_failure(log, "opendir", &target, err))?;
        let listing: Vec<String> = entries_under(scan.map(DirectoryEntry::from), &target)
            .map(|entry| mode.render(&entry))
            .collect();

        log.log(
            LogEntry::new(LogLevel::Debug, "directory iterator reset")
                .with_source(LOG_SOURCE)
                .with_field("listed", &target)
                .with_field("entries", listing.len())
                .with_field("reset_to", reset_to),
        );
        Ok(listing)
    }
}

impl<S: FlashStorage> FileSystemOperations for FlashFsService<S> {
    fn listdir(&mut self, path: Option<&str>) -> Result<Vec<String>, OperationError> {
        self.list(path, ListingMode::Names)
    }

    fn ls(&mut self, path: Option<&str>) -> Result<Vec<String>, OperationError> {
        self.list(path, ListingMode::Descriptor)
    }

    fn mkdir(&mut self, _path: &str) -> Result<(), OperationError> {
        Ok(())
    }

    fn rmdir(&mut self, _path: &str) -> Result<(), OperationError> {
        Ok(())
    }

    fn chdir(&mut self, path: &str) {
        self.cwd.change(path);
    }

    fn getcwd(&self) -> String {
        self.cwd.get().to_string()
    }

    fn write(
        &mut self,
        path: &str,
        offset: i32,
        seek_mode: i32,
        data: &[u8],
    ) -> Result<(), OperationError> {
        let path = self.resolve(path)?;
        let log = &*self.log;

        let mut file = ObjectGuard::open(
            &mut self.storage,
            &path,
            OpenFlags::CREATE | OpenFlags::TRUNCATE | OpenFlags::READ_WRITE,
        )
        .map_err(|err| io_failure(log, "open", &path, err))?;

        seek(&mut file, offset, seek_mode).map_err(|err| io_failure(log, "lseek", &path, err))?;

        let written = file
            .write(data)
            .map_err(|err| io_failure(log, "write", &path, err))?;
        if written == 0 || written < data.len() {
            return Err(io_failure(log, "write", &path, FlashError::IoError));
        }

        file.flush()
            .map_err(|err| io_failure(log, "flush", &path, err))?;
        file.close()
            .map_err(|err| io_failure(log, "close", &path, err))
    }

    fn read(
        &mut self,
        path: &str,
        offset: i32,
        seek_mode: i32,
        buffer: &mut [u8],
    ) -> Result<usize, OperationError> {
        let path = self.resolve(path)?;
        let log = &*self.log;

        // Same access request as the write path
        let mut file = ObjectGuard::open(&mut self.storage, &path, OpenFlags::READ_WRITE)
            .map_err(|err| io_failure(log, "open", &path, err))?;

        seek(&mut file, offset, seek_mode).map_err(|err| io_failure(log, "lseek", &path, err))?;

        let count = file
            .read(buffer)
            .map_err(|err| io_failure(log, "read", &path, err))?;
        file.close()
            .map_err(|err| io_failure(log, "close", &path, err))?;
        Ok(count)
    }

    fn remove(&mut self, path: &str) -> Result<(), OperationError> {
        let path = self.resolve(path)?;
        if self.config.is_reserved(&path) {
            return Err(OperationError::InvalidArgument(format!(
                "refusing to remove {}",
                path
            )));
        }
        self.storage
            .remove(&path)
            .map_err(|err| io_failure(&*self.log, "remove", &path, err))
    }

    fn rename(&mut self, old_path: &str, new_path: &str) -> Result<(), OperationError> {
        let old_path = self.resolve(old_path)?;
        let new_path = self.resolve(new_path)?;
        self.storage
            .rename(&old_path, &new_path)
            .map_err(|err| io_failure(&*self.log, "rename", &old_path, err))
    }

    fn stat(&mut self, path: &str) -> Result<StatResult, OperationError> {
        let path = self.resolve(path)?;
        // The volume has no root object to ask about
        if is_root(&path) {
            return Ok(StatResult::root());
        }
        self.storage
            .stat(&path)
            .map(StatResult::from)
            .map_err(|err| io_failure(&*self.log, "stat", &path, err))
    }

    fn statvfs(&mut self, path: &str) -> Result<StatVfsResult, OperationError> {
        let info = self
            .storage
            .info()
            .map_err(|err| io_failure(&*self.log, "info", path, err))?;
        Ok(StatVfsResult {
            total_bytes: info.total_bytes,
            used_bytes: info.used_bytes,
        })
    }

    fn formatfs(&mut self) -> Result<(), OperationError> {
        // The outcome is reported through the log only
        let entry = match self.storage.format() {
            Ok(()) => LogEntry::new(LogLevel::Info, "volume format")
                .with_field("mount", "successful"),
            Err(err) => LogEntry::new(LogLevel::Info, "volume format")
                .with_field("mount", "failed")
                .with_field("error", err),
        };
        self.log.log(entry.with_source(LOG_SOURCE));
        Ok(())
    }
}
