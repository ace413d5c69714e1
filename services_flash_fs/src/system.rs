//! System calls the host exposes alongside the filesystem
//!
//! `uname` and `urandom` come from configuration and the entropy source;
//! `import_stat` answers the host's module importer.

use crate::config::UnameInfo;
use crate::operations::ImportStat;
use crate::service::FlashFsService;
use hal::{FlashStorage, OpenFlags};
use services_logger::{LogEntry, LogLevel};
use services_storage::ObjectGuard;

impl<S: FlashStorage> FlashFsService<S> {
    /// System identification
    pub fn uname(&self) -> &UnameInfo {
        &self.config.uname
    }

    /// `n` bytes from the entropy source
    ///
    /// Each 32-bit word supplies four bytes, least significant first.
    /// Without an entropy source the bytes are zero.
    pub fn urandom(&mut self, n: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; n];
        if let Some(entropy) = self.entropy.as_mut() {
            for chunk in bytes.chunks_mut(4) {
                let word = entropy.next_u32().to_le_bytes();
                chunk.copy_from_slice(&word[..chunk.len()]);
            }
        }
        bytes
    }

    /// Whether the importer can load `path`
    ///
    /// Relative paths are taken from the volume root, not the cursor. The
    /// object is opened read-only and closed again; any failure means it
    /// does not exist.
    pub fn import_stat(&mut self, path: &str) -> ImportStat {
        let name = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        let found = ObjectGuard::open(&mut self.storage, &name, OpenFlags::READ)
            .and_then(|file| file.close())
            .is_ok();

        self.log.log(
            LogEntry::new(LogLevel::Debug, "import lookup")
                .with_source("fs")
                .with_field("path", &name)
                .with_field("found", found),
        );

        if found {
            ImportStat::File
        } else {
            ImportStat::NoExist
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FsConfig;
    use crate::operations::{FileSystemOperations, SEEK_SET};
    use hal::{EntropySource, RamFlash};

    struct Counter(u32);

    impl EntropySource for Counter {
        fn next_u32(&mut self) -> u32 {
            self.0 += 1;
            0x0403_0201u32.wrapping_mul(self.0)
        }
    }

    fn service() -> FlashFsService<RamFlash> {
        FlashFsService::mount(RamFlash::new(4096), FsConfig::default())
    }

    #[test]
    fn test_urandom_without_entropy_is_zero() {
        let mut fs = service();
        assert_eq!(fs.urandom(6), vec![0; 6]);
    }

    #[test]
    fn test_urandom_word_order() {
        let mut fs = service().with_entropy(Counter(0));
        // Words are 0x04030201 then 0x08060402
        assert_eq!(fs.urandom(6), vec![1, 2, 3, 4, 2, 4]);
        assert!(fs.urandom(0).is_empty());
    }

    #[test]
    fn test_uname_from_config() {
        let mut config = FsConfig::default();
        config.uname.machine = "k210".to_string();
        let fs = FlashFsService::mount(RamFlash::new(1024), config);
        assert_eq!(fs.uname().machine, "k210");
        assert_eq!(fs.uname().sysname, "flashfs");
    }

    #[test]
    fn test_import_stat() {
        let mut fs = service();
        fs.write("/mod.py", 0, SEEK_SET, b"x = 1").unwrap();

        assert_eq!(fs.import_stat("/mod.py"), ImportStat::File);
        assert_eq!(fs.import_stat("mod.py"), ImportStat::File);
        assert_eq!(fs.import_stat("other.py"), ImportStat::NoExist);
        assert_eq!(fs.storage().open_handle_count(), 0);
    }

    #[test]
    fn test_import_stat_ignores_cursor() {
        let mut fs = service();
        fs.write("/lib/m.py", 0, SEEK_SET, b"1").unwrap();
        fs.chdir("/lib");
        assert_eq!(fs.import_stat("m.py"), ImportStat::NoExist);
        assert_eq!(fs.import_stat("lib/m.py"), ImportStat::File);
    }
}
