//! # Failing Flash
//!
//! A FlashStorage wrapper that can simulate driver failures for testing the
//! adapter's error paths without real flash wearing out under you.

use hal::{
    FileHandle, FlashDirEntry, FlashError, FlashInfo, FlashStorage, ObjectStat, OpenFlags, Whence,
};

/// Driver operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashOp {
    Open,
    Read,
    Write,
    Seek,
    Flush,
    Close,
    Stat,
    Rename,
    Remove,
    Info,
    OpenDir,
    Format,
}

/// Policy for when failures should occur
#[derive(Debug, Clone)]
pub enum FailurePolicy {
    /// Never fail (passthrough)
    Never,
    /// Fail every call of the listed operations
    OnOps(Vec<FlashOp>),
    /// Fail writes after N successful writes
    AfterWrites(usize),
    /// Fail any name-addressed operation on the listed names
    OnNames(Vec<String>),
    /// Report a short write (one byte less than requested)
    ShortWrites,
}

/// Wrapper around a FlashStorage that can simulate failures
pub struct FailingFlash<S: FlashStorage> {
    inner: S,
    policy: FailurePolicy,
    write_count: usize,
    failures: usize,
}

impl<S: FlashStorage> FailingFlash<S> {
    /// Create a new failing driver with the given policy
    pub fn new(inner: S, policy: FailurePolicy) -> Self {
        Self {
            inner,
            policy,
            write_count: 0,
            failures: 0,
        }
    }

    fn should_fail(&mut self, op: FlashOp, name: Option<&str>) -> bool {
        let fail = match &self.policy {
            FailurePolicy::Never | FailurePolicy::ShortWrites => false,
            FailurePolicy::OnOps(ops) => ops.contains(&op),
            FailurePolicy::AfterWrites(n) => op == FlashOp::Write && self.write_count >= *n,
            FailurePolicy::OnNames(names) => {
                name.is_some_and(|name| names.iter().any(|n| n == name))
            }
        };
        if fail {
            self.failures += 1;
        }
        fail
    }

    /// Get the underlying driver (for inspection)
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Get mutable access to the underlying driver
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.write_count
    }

    /// Number of injected failures so far
    pub fn failure_count(&self) -> usize {
        self.failures
    }

    /// Reset the failure policy
    pub fn set_policy(&mut self, policy: FailurePolicy) {
        self.policy = policy;
        self.write_count = 0;
        self.failures = 0;
    }
}

impl<S: FlashStorage> FlashStorage for FailingFlash<S> {
    fn max_name_len(&self) -> usize {
        self.inner.max_name_len()
    }

    fn open(&mut self, name: &str, flags: OpenFlags) -> Result<FileHandle, FlashError> {
        if self.should_fail(FlashOp::Open, Some(name)) {
            return Err(FlashError::IoError);
        }
        self.inner.open(name, flags)
    }

    fn read(&mut self, handle: FileHandle, buffer: &mut [u8]) -> Result<usize, FlashError> {
        if self.should_fail(FlashOp::Read, None) {
            return Err(FlashError::IoError);
        }
        self.inner.read(handle, buffer)
    }

    fn write(&mut self, handle: FileHandle, data: &[u8]) -> Result<usize, FlashError> {
        if self.should_fail(FlashOp::Write, None) {
            return Err(FlashError::IoError);
        }
        let written = if matches!(self.policy, FailurePolicy::ShortWrites) && !data.is_empty() {
            self.inner.write(handle, &data[..data.len() - 1])?
        } else {
            self.inner.write(handle, data)?
        };
        self.write_count += 1;
        Ok(written)
    }

    fn lseek(
        &mut self,
        handle: FileHandle,
        offset: i32,
        whence: Whence,
    ) -> Result<u32, FlashError> {
        if self.should_fail(FlashOp::Seek, None) {
            return Err(FlashError::IoError);
        }
        self.inner.lseek(handle, offset, whence)
    }

    fn flush(&mut self, handle: FileHandle) -> Result<(), FlashError> {
        if self.should_fail(FlashOp::Flush, None) {
            return Err(FlashError::IoError);
        }
        self.inner.flush(handle)
    }

    fn close(&mut self, handle: FileHandle) -> Result<(), FlashError> {
        // The handle is always released so leak checks stay meaningful
        let result = self.inner.close(handle);
        if self.should_fail(FlashOp::Close, None) {
            return Err(FlashError::IoError);
        }
        result
    }

    fn stat(&mut self, name: &str) -> Result<ObjectStat, FlashError> {
        if self.should_fail(FlashOp::Stat, Some(name)) {
            return Err(FlashError::IoError);
        }
        self.inner.stat(name)
    }

    fn rename(&mut self, old: &str, new: &str) -> Result<(), FlashError> {
        if self.should_fail(FlashOp::Rename, Some(old)) {
            return Err(FlashError::IoError);
        }
        self.inner.rename(old, new)
    }

    fn remove(&mut self, name: &str) -> Result<(), FlashError> {
        if self.should_fail(FlashOp::Remove, Some(name)) {
            return Err(FlashError::IoError);
        }
        self.inner.remove(name)
    }

    fn info(&mut self) -> Result<FlashInfo, FlashError> {
        if self.should_fail(FlashOp::Info, None) {
            return Err(FlashError::IoError);
        }
        self.inner.info()
    }

    fn opendir(&mut self, name: &str) -> Result<(), FlashError> {
        if self.should_fail(FlashOp::OpenDir, None) {
            return Err(FlashError::DirUnavailable);
        }
        self.inner.opendir(name)
    }

    fn readdir(&mut self) -> Option<FlashDirEntry> {
        self.inner.readdir()
    }

    fn closedir(&mut self) {
        self.inner.closedir()
    }

    fn format(&mut self) -> Result<(), FlashError> {
        if self.should_fail(FlashOp::Format, None) {
            return Err(FlashError::IoError);
        }
        self.inner.format()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal::{ObjectType, RamFlash};

    fn create() -> OpenFlags {
        OpenFlags::CREATE | OpenFlags::READ_WRITE
    }

    #[test]
    fn test_failing_flash_never() {
        let mut failing = FailingFlash::new(RamFlash::new(1024), FailurePolicy::Never);
        let fh = failing.open("/a", create()).unwrap();
        assert_eq!(failing.write(fh, b"abc").unwrap(), 3);
        failing.close(fh).unwrap();
        assert_eq!(failing.failure_count(), 0);
    }

    #[test]
    fn test_failing_flash_after_writes() {
        let mut failing = FailingFlash::new(RamFlash::new(1024), FailurePolicy::AfterWrites(2));
        let fh = failing.open("/a", create()).unwrap();
        assert!(failing.write(fh, b"1").is_ok());
        assert!(failing.write(fh, b"2").is_ok());
        assert_eq!(failing.write(fh, b"3"), Err(FlashError::IoError));
        assert_eq!(failing.write_count(), 2);
        failing.close(fh).unwrap();
    }

    #[test]
    fn test_failing_flash_on_ops() {
        let mut failing = FailingFlash::new(
            RamFlash::new(1024),
            FailurePolicy::OnOps(vec![FlashOp::Seek, FlashOp::Info]),
        );
        let fh = failing.open("/a", create()).unwrap();
        assert_eq!(failing.lseek(fh, 0, Whence::Set), Err(FlashError::IoError));
        assert_eq!(failing.info(), Err(FlashError::IoError));
        assert!(failing.flush(fh).is_ok());
        failing.close(fh).unwrap();
        assert_eq!(failing.failure_count(), 2);
    }

    #[test]
    fn test_failing_flash_on_names() {
        let mut inner = RamFlash::new(1024);
        inner.insert_object("/bad", ObjectType::File, b"").unwrap();
        inner.insert_object("/good", ObjectType::File, b"").unwrap();
        let mut failing =
            FailingFlash::new(inner, FailurePolicy::OnNames(vec!["/bad".to_string()]));

        assert_eq!(failing.stat("/bad"), Err(FlashError::IoError));
        assert!(failing.stat("/good").is_ok());
        assert_eq!(failing.remove("/bad"), Err(FlashError::IoError));
    }

    #[test]
    fn test_failing_flash_close_still_releases() {
        let mut failing = FailingFlash::new(
            RamFlash::new(1024),
            FailurePolicy::OnOps(vec![FlashOp::Close]),
        );
        let fh = failing.open("/a", create()).unwrap();
        assert_eq!(failing.close(fh), Err(FlashError::IoError));
        assert_eq!(failing.inner().open_handle_count(), 0);
    }

    #[test]
    fn test_failing_flash_short_writes() {
        let mut failing = FailingFlash::new(RamFlash::new(1024), FailurePolicy::ShortWrites);
        let fh = failing.open("/a", create()).unwrap();
        assert_eq!(failing.write(fh, b"abcd").unwrap(), 3);
        failing.close(fh).unwrap();
    }

    #[test]
    fn test_failing_flash_set_policy() {
        let mut failing = FailingFlash::new(RamFlash::new(1024), FailurePolicy::Never);
        assert!(failing.opendir("/").is_ok());

        failing.set_policy(FailurePolicy::OnOps(vec![FlashOp::OpenDir]));
        assert_eq!(failing.opendir("/"), Err(FlashError::DirUnavailable));
    }
}
