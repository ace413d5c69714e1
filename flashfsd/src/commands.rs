//! # Host Commands
//!
//! One command per line, mirroring the filesystem calls a script runtime
//! makes through its `os` module.
//!
//! ## Command Set
//!
//! - `ls [path]` / `listdir [path]` - List descriptors or names
//! - `mkdir <path>` / `rmdir <path>` - Accepted, no effect on a flat volume
//! - `cd <path>` / `pwd` - Move or show the cursor
//! - `write <path> <offset> <mode> <text...>` - Create/truncate and write text
//! - `read <path> <offset> <mode> <len>` - Read up to `len` bytes
//! - `rm <path>` / `mv <old> <new>` - Remove or rename
//! - `stat <path>` / `statvfs [path]` - Metadata
//! - `format` - Erase the volume
//! - `uname` / `urandom <n>` / `import <path>` - Host support calls
//! - `quit` - Stop the session

use thiserror::Error;

/// Host command error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostCommandError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Missing argument: {0}")]
    MissingArgument(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

/// Host commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    Ls { path: Option<String> },
    ListDir { path: Option<String> },
    Mkdir { path: String },
    Rmdir { path: String },
    Cd { path: String },
    Pwd,
    Write {
        path: String,
        offset: i32,
        seek_mode: i32,
        text: String,
    },
    Read {
        path: String,
        offset: i32,
        seek_mode: i32,
        len: usize,
    },
    Remove { path: String },
    Rename { from: String, to: String },
    Stat { path: String },
    StatVfs { path: Option<String> },
    Format,
    Uname,
    Urandom { count: usize },
    Import { path: String },
    Quit,
}

/// Host command parser
pub struct HostCommandParser;

impl HostCommandParser {
    /// Parses a command line
    ///
    /// Returns `Ok(None)` for blank lines and `#` comments.
    pub fn parse_line(input: &str) -> Result<Option<HostCommand>, HostCommandError> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }
        Self::parse(trimmed).map(Some)
    }

    /// Parses a command string
    pub fn parse(input: &str) -> Result<HostCommand, HostCommandError> {
        let input = input.trim();

        if input.is_empty() {
            return Err(HostCommandError::InvalidCommand(
                "Empty command".to_string(),
            ));
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();
        let args = &parts[1..];

        match cmd.as_str() {
            "ls" => Ok(HostCommand::Ls {
                path: Self::optional(args),
            }),
            "listdir" => Ok(HostCommand::ListDir {
                path: Self::optional(args),
            }),
            "mkdir" => Ok(HostCommand::Mkdir {
                path: Self::required(args, 0, "path")?,
            }),
            "rmdir" => Ok(HostCommand::Rmdir {
                path: Self::required(args, 0, "path")?,
            }),
            "cd" | "chdir" => Ok(HostCommand::Cd {
                path: Self::required(args, 0, "path")?,
            }),
            "pwd" | "getcwd" => Ok(HostCommand::Pwd),
            "write" => Self::parse_write(input, args),
            "read" => Ok(HostCommand::Read {
                path: Self::required(args, 0, "path")?,
                offset: Self::number(args, 1, "offset")?,
                seek_mode: Self::number(args, 2, "mode")?,
                len: Self::number(args, 3, "len")?,
            }),
            "rm" | "remove" => Ok(HostCommand::Remove {
                path: Self::required(args, 0, "path")?,
            }),
            "mv" | "rename" => Ok(HostCommand::Rename {
                from: Self::required(args, 0, "old path")?,
                to: Self::required(args, 1, "new path")?,
            }),
            "stat" => Ok(HostCommand::Stat {
                path: Self::required(args, 0, "path")?,
            }),
            "statvfs" => Ok(HostCommand::StatVfs {
                path: Self::optional(args),
            }),
            "format" | "formatfs" => Ok(HostCommand::Format),
            "uname" => Ok(HostCommand::Uname),
            "urandom" => Ok(HostCommand::Urandom {
                count: Self::number(args, 0, "count")?,
            }),
            "import" => Ok(HostCommand::Import {
                path: Self::required(args, 0, "path")?,
            }),
            "quit" | "exit" => Ok(HostCommand::Quit),
            _ => Err(HostCommandError::UnknownCommand(cmd)),
        }
    }

    /// Parses `write`, keeping the text's inner spacing
    fn parse_write(input: &str, args: &[&str]) -> Result<HostCommand, HostCommandError> {
        let path = Self::required(args, 0, "path")?;
        let offset = Self::number(args, 1, "offset")?;
        let seek_mode = Self::number(args, 2, "mode")?;
        if args.len() < 4 {
            return Err(HostCommandError::MissingArgument("text".to_string()));
        }

        // Skip the command word and three arguments, keep the rest verbatim
        let mut rest = input;
        for _ in 0..4 {
            rest = rest.trim_start();
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            rest = &rest[end..];
        }
        let text = rest.trim_start().to_string();

        Ok(HostCommand::Write {
            path,
            offset,
            seek_mode,
            text,
        })
    }

    fn optional(args: &[&str]) -> Option<String> {
        args.first().map(|s| s.to_string())
    }

    fn required(args: &[&str], index: usize, name: &str) -> Result<String, HostCommandError> {
        args.get(index)
            .map(|s| s.to_string())
            .ok_or_else(|| HostCommandError::MissingArgument(name.to_string()))
    }

    fn number<T: std::str::FromStr>(
        args: &[&str],
        index: usize,
        name: &str,
    ) -> Result<T, HostCommandError> {
        let raw = args
            .get(index)
            .ok_or_else(|| HostCommandError::MissingArgument(name.to_string()))?;
        raw.parse()
            .map_err(|_| HostCommandError::InvalidNumber(format!("{} = {}", name, raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ls() {
        assert_eq!(
            HostCommandParser::parse("ls").unwrap(),
            HostCommand::Ls { path: None }
        );
        assert_eq!(
            HostCommandParser::parse("ls /lib/").unwrap(),
            HostCommand::Ls {
                path: Some("/lib/".to_string())
            }
        );
    }

    #[test]
    fn test_parse_write_keeps_spacing() {
        let cmd = HostCommandParser::parse("write /boot.py 0 0 print('a  b')").unwrap();
        assert_eq!(
            cmd,
            HostCommand::Write {
                path: "/boot.py".to_string(),
                offset: 0,
                seek_mode: 0,
                text: "print('a  b')".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_write_negative_offset() {
        if let HostCommand::Write { offset, .. } =
            HostCommandParser::parse("write f -4 2 tail").unwrap()
        {
            assert_eq!(offset, -4);
        } else {
            panic!("Expected Write command");
        }
    }

    #[test]
    fn test_parse_write_missing_text() {
        let result = HostCommandParser::parse("write f 0 0");
        assert_eq!(
            result,
            Err(HostCommandError::MissingArgument("text".to_string()))
        );
    }

    #[test]
    fn test_parse_read() {
        assert_eq!(
            HostCommandParser::parse("read main.py 2 1 16").unwrap(),
            HostCommand::Read {
                path: "main.py".to_string(),
                offset: 2,
                seek_mode: 1,
                len: 16,
            }
        );
    }

    #[test]
    fn test_parse_invalid_number() {
        let result = HostCommandParser::parse("read f x 0 1");
        assert!(matches!(result, Err(HostCommandError::InvalidNumber(_))));
        let result = HostCommandParser::parse("urandom -1");
        assert!(matches!(result, Err(HostCommandError::InvalidNumber(_))));
    }

    #[test]
    fn test_parse_rename() {
        assert_eq!(
            HostCommandParser::parse("mv a b").unwrap(),
            HostCommand::Rename {
                from: "a".to_string(),
                to: "b".to_string()
            }
        );
        assert!(matches!(
            HostCommandParser::parse("mv a"),
            Err(HostCommandError::MissingArgument(_))
        ));
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(HostCommandParser::parse("getcwd").unwrap(), HostCommand::Pwd);
        assert_eq!(
            HostCommandParser::parse("formatfs").unwrap(),
            HostCommand::Format
        );
        assert_eq!(HostCommandParser::parse("exit").unwrap(), HostCommand::Quit);
    }

    #[test]
    fn test_parse_empty_command() {
        let result = HostCommandParser::parse("");
        assert!(matches!(result, Err(HostCommandError::InvalidCommand(_))));
    }

    #[test]
    fn test_parse_unknown_command() {
        let result = HostCommandParser::parse("chmod 777 f");
        assert!(matches!(result, Err(HostCommandError::UnknownCommand(_))));
    }

    #[test]
    fn test_parse_line_skips_comments() {
        assert_eq!(HostCommandParser::parse_line("   ").unwrap(), None);
        assert_eq!(HostCommandParser::parse_line("# setup").unwrap(), None);
        assert_eq!(
            HostCommandParser::parse_line("  pwd  ").unwrap(),
            Some(HostCommand::Pwd)
        );
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(HostCommandParser::parse("PWD").unwrap(), HostCommand::Pwd);
        assert_eq!(HostCommandParser::parse("Uname").unwrap(), HostCommand::Uname);
    }
}
