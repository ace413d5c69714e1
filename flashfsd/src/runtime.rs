//! # Host Runtime
//!
//! Mounts a flash volume and feeds it commands, from a script or a stream.

use crate::commands::{HostCommand, HostCommandParser};
use hal::{RamFlash, SoftwareEntropy};
use services_flash_fs::{
    ConfigError, FileSystemOperations, FlashFsService, FsConfig, ImportStat, OperationError,
};
use services_logger::{LogEntry, LogLevel, LogSink, StderrLog};
use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;
use thiserror::Error;

/// Host runtime error types
#[derive(Debug, Error)]
pub enum HostRuntimeError {
    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Script error: {0}")]
    ScriptError(String),
}

/// Host runtime configuration
#[derive(Debug, Clone)]
pub struct HostRuntimeConfig {
    /// Capacity of the in-memory volume
    pub volume_bytes: u32,
    /// Optional command script; without one the host reads a stream
    pub script: Option<String>,
    /// Seed for `urandom`
    pub entropy_seed: u32,
    /// Least severe log level written to stderr
    pub log_level: LogLevel,
    /// Filesystem service configuration
    pub fs: FsConfig,
}

impl Default for HostRuntimeConfig {
    fn default() -> Self {
        Self {
            volume_bytes: 256 * 1024,
            script: None,
            entropy_seed: 1,
            log_level: LogLevel::Warn,
            fs: FsConfig::default(),
        }
    }
}

/// Reads and validates a JSON service configuration
pub fn load_fs_config(path: &Path) -> Result<FsConfig, HostRuntimeError> {
    let text = fs::read_to_string(path)?;
    Ok(FsConfig::from_json(&text)?)
}

/// Renders an error the way the scripting runtime raises it
pub fn render_os_error(err: &OperationError) -> String {
    let detail = match err {
        OperationError::Io(msg) | OperationError::InvalidArgument(msg) => msg,
    };
    format!("OSError: [Errno {}] {}", err.errno(), detail)
}

fn render_tuple(fields: &[u64]) -> String {
    let joined: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
    format!("({})", joined.join(", "))
}

/// Host runtime
pub struct HostRuntime {
    config: HostRuntimeConfig,
    fs: FlashFsService<RamFlash>,
    /// Output lines not yet taken by the caller
    output: Vec<String>,
    commands_run: usize,
    stopped: bool,
}

impl HostRuntime {
    /// Creates a runtime that logs to stderr
    pub fn new(config: HostRuntimeConfig) -> Result<Self, HostRuntimeError> {
        let log = StderrLog::new(config.log_level);
        Self::with_log(config, log)
    }

    /// Creates a runtime with a caller-supplied log sink
    pub fn with_log(
        config: HostRuntimeConfig,
        log: impl LogSink + 'static,
    ) -> Result<Self, HostRuntimeError> {
        config.fs.validate()?;

        log.log(
            LogEntry::new(LogLevel::Info, "mounting volume")
                .with_source("flashfsd")
                .with_field("bytes", config.volume_bytes)
                .with_field("max_name_len", config.fs.max_name_len),
        );

        let flash = RamFlash::with_name_len(config.volume_bytes, config.fs.max_name_len);
        let fs = FlashFsService::mount(flash, config.fs.clone())
            .with_logger(log)
            .with_entropy(SoftwareEntropy::new(config.entropy_seed));

        Ok(Self {
            config,
            fs,
            output: Vec::new(),
            commands_run: 0,
            stopped: false,
        })
    }

    /// Runs the configured script to completion or `quit`
    pub fn run(&mut self) -> Result<(), HostRuntimeError> {
        let script = match &self.config.script {
            Some(script) => script.clone(),
            None => {
                return Err(HostRuntimeError::ScriptError(
                    "No script configured".to_string(),
                ))
            }
        };

        for (number, line) in script.lines().enumerate() {
            if self.stopped {
                break;
            }
            match HostCommandParser::parse_line(line) {
                Ok(Some(command)) => self.execute(command),
                Ok(None) => {}
                Err(e) => {
                    return Err(HostRuntimeError::ScriptError(format!(
                        "line {}: {}",
                        number + 1,
                        e
                    )))
                }
            }
        }

        Ok(())
    }

    /// Reads commands from `input` and writes results to `out` until EOF
    /// or `quit`
    ///
    /// Parse errors are reported and the session continues.
    pub fn run_stream<R: BufRead, W: Write>(
        &mut self,
        input: R,
        mut out: W,
    ) -> Result<(), HostRuntimeError> {
        for line in input.lines() {
            let line = line?;
            match HostCommandParser::parse_line(&line) {
                Ok(Some(command)) => self.execute(command),
                Ok(None) => {}
                Err(e) => self.output.push(format!("Error: {}", e)),
            }
            for text in self.take_output() {
                writeln!(out, "{}", text)?;
            }
            out.flush()?;
            if self.stopped {
                break;
            }
        }
        Ok(())
    }

    /// Executes one command, queuing its output
    pub fn execute(&mut self, command: HostCommand) {
        self.commands_run += 1;
        if let Err(e) = self.dispatch(command) {
            self.output.push(render_os_error(&e));
        }
    }

    fn dispatch(&mut self, command: HostCommand) -> Result<(), OperationError> {
        match command {
            HostCommand::Ls { path } => {
                let lines = self.fs.ls(path.as_deref())?;
                self.output.extend(lines);
            }
            HostCommand::ListDir { path } => {
                let names = self.fs.listdir(path.as_deref())?;
                self.output.extend(names);
            }
            HostCommand::Mkdir { path } => self.fs.mkdir(&path)?,
            HostCommand::Rmdir { path } => self.fs.rmdir(&path)?,
            HostCommand::Cd { path } => self.fs.chdir(&path),
            HostCommand::Pwd => self.output.push(self.fs.getcwd()),
            HostCommand::Write {
                path,
                offset,
                seek_mode,
                text,
            } => self.fs.write(&path, offset, seek_mode, text.as_bytes())?,
            HostCommand::Read {
                path,
                offset,
                seek_mode,
                len,
            } => {
                // No object can hold more than the volume
                let len = len.min(self.config.volume_bytes as usize);
                let mut buffer = vec![0u8; len];
                let count = self.fs.read(&path, offset, seek_mode, &mut buffer)?;
                self.output
                    .push(String::from_utf8_lossy(&buffer[..count]).into_owned());
            }
            HostCommand::Remove { path } => self.fs.remove(&path)?,
            HostCommand::Rename { from, to } => self.fs.rename(&from, &to)?,
            HostCommand::Stat { path } => {
                let stat = self.fs.stat(&path)?;
                self.output.push(render_tuple(&stat.to_tuple()));
            }
            HostCommand::StatVfs { path } => {
                let vfs = self.fs.statvfs(path.as_deref().unwrap_or("/"))?;
                self.output.push(render_tuple(&vfs.to_tuple()));
            }
            HostCommand::Format => self.fs.formatfs()?,
            HostCommand::Uname => {
                let info = self.fs.uname();
                self.output.push(format!(
                    "(sysname='{}', nodename='{}', release='{}', version='{}', machine='{}')",
                    info.sysname, info.nodename, info.release, info.version, info.machine
                ));
            }
            HostCommand::Urandom { count } => {
                let hex: String = self
                    .fs
                    .urandom(count)
                    .iter()
                    .map(|b| format!("{:02x}", b))
                    .collect();
                self.output.push(hex);
            }
            HostCommand::Import { path } => {
                let answer = match self.fs.import_stat(&path) {
                    ImportStat::File => "file",
                    ImportStat::NoExist => "noexist",
                };
                self.output.push(answer.to_string());
            }
            HostCommand::Quit => self.stopped = true,
        }
        Ok(())
    }

    /// Drains queued output lines
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    /// Gets the number of commands executed
    pub fn command_count(&self) -> usize {
        self.commands_run
    }

    /// Returns true once `quit` has been executed
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Gets the mounted service
    pub fn service(&self) -> &FlashFsService<RamFlash> {
        &self.fs
    }

    /// Gets the mounted service mutably
    pub fn service_mut(&mut self) -> &mut FlashFsService<RamFlash> {
        &mut self.fs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use services_logger::MemoryLog;

    fn runtime_with_script(script: &str) -> HostRuntime {
        let config = HostRuntimeConfig {
            script: Some(script.to_string()),
            ..HostRuntimeConfig::default()
        };
        HostRuntime::with_log(config, MemoryLog::new()).unwrap()
    }

    #[test]
    fn test_render_os_error() {
        let err = OperationError::Io("open /x: Object not found".to_string());
        assert_eq!(
            render_os_error(&err),
            "OSError: [Errno 5] open /x: Object not found"
        );
        let err = OperationError::InvalidArgument("refusing to remove /".to_string());
        assert!(render_os_error(&err).starts_with("OSError: [Errno 22]"));
    }

    #[test]
    fn test_render_tuple() {
        assert_eq!(render_tuple(&[1, 2, 3]), "(1, 2, 3)");
    }

    #[test]
    fn test_run_requires_script() {
        let mut runtime =
            HostRuntime::with_log(HostRuntimeConfig::default(), MemoryLog::new()).unwrap();
        assert!(matches!(
            runtime.run(),
            Err(HostRuntimeError::ScriptError(_))
        ));
    }

    #[test]
    fn test_script_stops_at_quit() {
        let mut runtime = runtime_with_script("pwd\nquit\npwd\n");
        runtime.run().unwrap();
        assert!(runtime.is_stopped());
        assert_eq!(runtime.command_count(), 2);
        assert_eq!(runtime.take_output(), vec!["/"]);
    }

    #[test]
    fn test_script_parse_error_names_line() {
        let mut runtime = runtime_with_script("pwd\n\nbogus\n");
        match runtime.run() {
            Err(HostRuntimeError::ScriptError(msg)) => assert!(msg.starts_with("line 3:")),
            other => panic!("Expected script error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_invalid_fs_config_rejected() {
        let mut config = HostRuntimeConfig::default();
        config.fs.max_name_len = 0;
        assert!(matches!(
            HostRuntime::with_log(config, MemoryLog::new()),
            Err(HostRuntimeError::ConfigError(_))
        ));
    }

    #[test]
    fn test_read_length_capped_by_volume() {
        let script = format!("write /big 0 0 contents\nread /big 0 0 {}\n", usize::MAX);
        let config = HostRuntimeConfig {
            script: Some(script),
            volume_bytes: 1024,
            ..HostRuntimeConfig::default()
        };
        let mut runtime = HostRuntime::with_log(config, MemoryLog::new()).unwrap();
        runtime.run().unwrap();
        assert_eq!(runtime.take_output(), vec!["contents"]);
    }

    #[test]
    fn test_mount_is_logged() {
        let log = MemoryLog::new();
        HostRuntime::with_log(HostRuntimeConfig::default(), log.clone()).unwrap();
        let entries = log.entries();
        assert_eq!(entries[0].message, "mounting volume");
        assert_eq!(entries[0].field("bytes"), Some("262144"));
    }
}
