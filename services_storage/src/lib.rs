//! # Storage Service
//!
//! This crate sits directly on top of the flash driver.
//!
//! ## Philosophy
//!
//! **Driver resources never outlive the call that acquired them.**
//!
//! The driver hands out raw handles and owns a single global directory
//! iterator. Neither is safe to pass around, so this crate provides:
//! - Scoped guards that release handles on every exit path
//! - A directory scan that resets the shared iterator when it ends
//! - A fault-injecting driver wrapper for exercising error paths

pub mod failing_flash;
pub mod scoped;

pub use failing_flash::{FailingFlash, FailurePolicy, FlashOp};
pub use scoped::{DirScan, ObjectGuard};
