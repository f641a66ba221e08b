//! Error types for portsweep.
//!
//! Uses `thiserror` for ergonomic error definitions.

use crate::types::PortError;
use std::path::PathBuf;
use thiserror::Error;

/// Outcome of a single failed connection attempt.
///
/// These never leave a worker: the prober folds them into a
/// [`PortStatus`](crate::scanner::PortStatus).
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Connection timed out")]
    Timeout,

    #[error("Connection refused")]
    ConnectionRefused,

    #[error("Host unreachable")]
    HostUnreachable,

    #[error("Network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("Connection to port {port} failed: {reason}")]
    ConnectionFailed { port: u16, reason: String },
}

/// Fatal errors detected while building a scan configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port: {0}")]
    InvalidPort(#[from] PortError),

    #[error("Thread count must be at least 1")]
    InvalidThreadCount,

    #[error("Timeout must be a positive number of seconds, got {0}")]
    InvalidTimeout(f64),

    #[error("Failed to resolve host '{host}': {reason}")]
    HostResolution { host: String, reason: String },

    #[error("Could not determine configuration directory")]
    DirectoryNotFound,

    #[error("Failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("Invalid settings file: {0}")]
    InvalidFormat(String),
}

/// Errors raised by the result sink.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Result sink closed before all results were delivered")]
    Closed,
}

/// Errors that abort a whole scan.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("Worker failed: {0}")]
    Worker(String),
}

/// Result type alias for connection attempts.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;
