//! # portsweep - A Multi-Worker TCP Port Scanner
//!
//! portsweep probes an inclusive range of TCP ports on one host and reports
//! the ones that accept a connection, on the console and optionally in an
//! append-only text file.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use portsweep::scanner::{run_scan, ScanConfig};
//! use portsweep::types::PortRange;
//! use std::num::NonZeroUsize;
//!
//! #[tokio::main]
//! async fn main() {
//!     let range = PortRange::from_bounds(1, 1024).unwrap();
//!     let config = ScanConfig::new("localhost", "127.0.0.1".parse().unwrap(), range)
//!         .with_threads(NonZeroUsize::new(8).unwrap());
//!
//!     let summary = run_scan(&config, std::io::stdout()).await.unwrap();
//!     println!("{} open ports", summary.open_ports.len());
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - `Port` and `PortRange` newtypes
//! - [`scanner`] - range partitioning, workers and the scan orchestrator
//! - [`sink`] - the single task that owns console and file output
//! - [`config`] - settings file loading
//! - [`cli`] - argument parsing and validation
//! - [`error`] - error types
//! - [`output`] - styled stderr diagnostics

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod sink;
pub mod types;

// Re-export commonly used types
pub use error::{ConfigError, ProbeError, ScanError, SinkError};
pub use scanner::{run_scan, PortStatus, Prober, ScanConfig, ScanResult, ScanSummary};
pub use types::{Port, PortRange};
