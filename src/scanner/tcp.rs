//! TCP Connect prober implementation.
//!
//! Performs standard TCP connect attempts using the operating system's
//! socket API. The handshake is completed and the stream dropped at once;
//! no payload is ever sent.

use crate::error::{ProbeError, ProbeResult};
use crate::scanner::traits::{PortStatus, Prober};
use crate::types::Port;
use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// TCP connect prober.
///
/// Does not require elevated privileges.
#[derive(Debug, Clone)]
pub struct TcpConnectProber {
    target: IpAddr,
    timeout: Duration,
}

impl TcpConnectProber {
    /// Create a new TCP connect prober.
    ///
    /// # Arguments
    /// * `target` - Target IP address to probe
    /// * `timeout` - Connection timeout per port
    pub fn new(target: IpAddr, timeout: Duration) -> Self {
        Self { target, timeout }
    }

    /// Attempt to connect to the target address.
    async fn attempt_connect(&self, addr: SocketAddr) -> ProbeResult<TcpStream> {
        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(classify_io_error(&e, addr.port())),
            Err(_) => Err(ProbeError::Timeout),
        }
    }
}

fn classify_io_error(e: &io::Error, port: u16) -> ProbeError {
    if e.kind() == io::ErrorKind::ConnectionRefused {
        return ProbeError::ConnectionRefused;
    }

    let message = e.to_string().to_lowercase();
    if message.contains("unreachable") {
        if message.contains("host") {
            ProbeError::HostUnreachable
        } else {
            ProbeError::NetworkUnreachable(e.to_string())
        }
    } else {
        ProbeError::ConnectionFailed {
            port,
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl Prober for TcpConnectProber {
    fn target(&self) -> IpAddr {
        self.target
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn probe(&self, port: Port) -> PortStatus {
        let addr = SocketAddr::new(self.target, port.as_u16());

        match self.attempt_connect(addr).await {
            Ok(stream) => {
                drop(stream);
                PortStatus::Open
            }
            Err(ProbeError::Timeout) => PortStatus::Timeout,
            Err(ProbeError::ConnectionRefused) => PortStatus::Refused,
            Err(e) => {
                tracing::debug!(port = port.as_u16(), error = %e, "connect failed");
                PortStatus::Refused
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    fn localhost_prober(timeout: Duration) -> TcpConnectProber {
        TcpConnectProber::new(IpAddr::V4(Ipv4Addr::LOCALHOST), timeout)
    }

    #[test]
    fn test_prober_creation() {
        let prober = localhost_prober(Duration::from_secs(1));
        assert_eq!(prober.target(), IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(prober.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_classify_refused() {
        let e = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert!(matches!(
            classify_io_error(&e, 22),
            ProbeError::ConnectionRefused
        ));
    }

    #[test]
    fn test_classify_other_error() {
        let e = io::Error::new(io::ErrorKind::Other, "connection reset");
        assert!(matches!(
            classify_io_error(&e, 22),
            ProbeError::ConnectionFailed { port: 22, .. }
        ));
    }

    #[tokio::test]
    async fn test_probe_listening_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();

        let prober = localhost_prober(Duration::from_secs(1));
        assert_eq!(prober.probe(port).await, PortStatus::Open);
    }

    #[tokio::test]
    async fn test_probe_closed_port() {
        // Bind then release to get a port nothing is listening on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();
        drop(listener);

        let prober = localhost_prober(Duration::from_millis(500));
        assert!(matches!(
            prober.probe(port).await,
            PortStatus::Refused | PortStatus::Timeout
        ));
    }

    #[tokio::test]
    async fn test_repeated_probes_are_stable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();

        let prober = localhost_prober(Duration::from_secs(1));
        for _ in 0..5 {
            assert_eq!(prober.probe(port).await, PortStatus::Open);
        }
    }
}
