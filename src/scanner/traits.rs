//! Prober trait abstraction.
//!
//! Workers talk to the network only through [`Prober`], which lets the
//! partitioning and aggregation logic be exercised with scripted outcomes.

use crate::types::Port;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

/// Classification of a single connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortStatus {
    /// Handshake completed.
    Open,
    /// Connection actively rejected, or failed for another network reason.
    Refused,
    /// No answer before the per-attempt timeout.
    Timeout,
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Refused => write!(f, "REFUSED"),
            Self::Timeout => write!(f, "TIMEOUT"),
        }
    }
}

/// Result of probing a single port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// The port number that was probed.
    pub port: Port,
    /// Status determined by the probe.
    pub status: PortStatus,
}

impl ScanResult {
    pub fn new(port: Port, status: PortStatus) -> Self {
        Self { port, status }
    }

    /// Check if the port is open.
    pub fn is_open(&self) -> bool {
        self.status == PortStatus::Open
    }
}

/// Something that can classify a port on a fixed target.
///
/// Implementations must never fail: every network error is folded into a
/// [`PortStatus`] so one bad port cannot stop a worker.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe a single port.
    async fn probe(&self, port: Port) -> PortStatus;

    /// Get the target IP address.
    fn target(&self) -> IpAddr;

    /// Get the configured per-attempt timeout.
    fn timeout(&self) -> Duration;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_status_display() {
        assert_eq!(PortStatus::Open.to_string(), "OPEN");
        assert_eq!(PortStatus::Refused.to_string(), "REFUSED");
        assert_eq!(PortStatus::Timeout.to_string(), "TIMEOUT");
    }

    #[test]
    fn test_scan_result() {
        let port = Port::new(80).unwrap();
        assert!(ScanResult::new(port, PortStatus::Open).is_open());
        assert!(!ScanResult::new(port, PortStatus::Refused).is_open());
    }
}
