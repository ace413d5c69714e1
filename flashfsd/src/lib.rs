//! # Flash Filesystem Host
//!
//! This crate hosts the flash filesystem service on an in-memory volume so
//! it can be driven from a terminal or a command script.
//!
//! ## Philosophy
//!
//! - **Host owns I/O**: The service never prints, the host renders results
//! - **Errors look like the runtime's**: Failures print as `OSError: [Errno N]`
//! - **Scripts are deterministic**: Same script, same seed, same output
//!
//! ## Non-Responsibilities
//!
//! The host does NOT:
//! - Persist the volume between runs
//! - Offer a shell with pipes or variables
//! - Interpret file contents

pub mod commands;
pub mod runtime;

pub use commands::{HostCommand, HostCommandError, HostCommandParser};
pub use runtime::{
    load_fs_config, render_os_error, HostRuntime, HostRuntimeConfig, HostRuntimeError,
};
