//! # Engine Error Types
//!
//! The explosion pipeline itself is total: once invoked it always runs to
//! completion and partial destruction is a valid outcome, not a failure. The
//! only fallible surface is loading configuration.

use thiserror::Error;

/// Errors that can occur while preparing the engine.
#[derive(Error, Debug)]
pub enum BlastError {
    /// Reading a configuration file failed.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for [`crate::EngineConfig`].
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A configuration value cannot be used even after clamping.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for engine setup operations.
pub type BlastResult<T> = Result<T, BlastError>;
