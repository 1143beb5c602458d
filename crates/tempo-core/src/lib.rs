//! Core types and traits for the Tempo telemetry pipeline.
//!
//! This crate provides the foundational types used throughout the pipeline:
//! - Timer identifiers and their reserved sentinel
//! - Plausibility bounds shared by the log writer and decoder
//! - Common error types

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::TimerId;

/// Pipeline-wide constants
pub mod constants {
    /// Longest timer name the log format will carry, in bytes.
    ///
    /// A registration record claiming more than this is treated as corrupt.
    pub const MAX_NAME_LEN: usize = 1024;
    /// Highest timer id considered plausible in a log stream.
    pub const MAX_TIMER_ID: u32 = 4096;
    /// Registered-name count a registry should hold without reallocating.
    pub const REGISTRY_PREALLOC: usize = 64;
}
