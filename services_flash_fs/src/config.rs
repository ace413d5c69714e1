//! Service configuration
//!
//! Loaded from JSON by the host. Every field has a default, so an empty
//! object `{}` is a valid configuration.

use hal::OBJ_NAME_LEN;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// System identification reported by `uname`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnameInfo {
    pub sysname: String,
    pub nodename: String,
    pub release: String,
    pub version: String,
    pub machine: String,
}

impl Default for UnameInfo {
    fn default() -> Self {
        Self {
            sysname: "flashfs".to_string(),
            nodename: "flashfs".to_string(),
            release: env!("CARGO_PKG_VERSION").to_string(),
            version: format!("{} flat flash volume", env!("CARGO_PKG_VERSION")),
            machine: "generic board with flat flash".to_string(),
        }
    }
}

/// Flash filesystem service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    /// Bound on the current-directory cursor, same as the volume's name length
    pub max_name_len: usize,
    /// Absolute paths that `remove` refuses in addition to `/`
    pub reserved_paths: Vec<String>,
    pub uname: UnameInfo,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            max_name_len: OBJ_NAME_LEN,
            reserved_paths: vec!["/t".to_string()],
            uname: UnameInfo::default(),
        }
    }
}

impl FsConfig {
    /// Parses and validates a JSON configuration
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: FsConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_name_len < 2 {
            return Err(ConfigError::Invalid(format!(
                "max_name_len must be at least 2, got {}",
                self.max_name_len
            )));
        }
        if let Some(bad) = self.reserved_paths.iter().find(|p| !p.starts_with('/')) {
            return Err(ConfigError::Invalid(format!(
                "reserved path must be absolute: {:?}",
                bad
            )));
        }
        Ok(())
    }

    /// Returns true if `path` may never be removed
    pub fn is_reserved(&self, path: &str) -> bool {
        fs_view::is_root(path) || self.reserved_paths.iter().any(|p| p == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FsConfig::default();
        assert_eq!(config.max_name_len, 32);
        assert!(config.is_reserved("/"));
        assert!(config.is_reserved("/t"));
        assert!(!config.is_reserved("/t/x"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = FsConfig::from_json("{}").unwrap();
        assert_eq!(config, FsConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let config =
            FsConfig::from_json(r#"{"max_name_len": 64, "uname": {"machine": "k210"}}"#).unwrap();
        assert_eq!(config.max_name_len, 64);
        assert_eq!(config.reserved_paths, vec!["/t".to_string()]);
        assert_eq!(config.uname.machine, "k210");
        assert_eq!(config.uname.sysname, "flashfs");
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = FsConfig::default();
        config.reserved_paths.push("/boot.py".to_string());
        let text = config.to_json().unwrap();
        assert_eq!(FsConfig::from_json(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            FsConfig::from_json(r#"{"max_name_len": 1}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            FsConfig::from_json(r#"{"reserved_paths": ["t"]}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            FsConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
