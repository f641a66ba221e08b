//! Scanner module - partitions a port range and runs the workers.
//!
//! The orchestrator opens the result sink, splits the range with
//! [`partition`], spawns one tokio task per sub-range and joins every one of
//! them before closing the sink.

pub mod partition;
pub mod tcp;
pub mod traits;
pub mod worker;

use crate::error::ScanError;
use crate::sink::{ResultSink, SinkHandle};
use crate::types::{Port, PortRange};
use futures::future::join_all;
use serde::Serialize;
use std::io::Write;
use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub use partition::{effective_workers, partition};
pub use tcp::TcpConnectProber;
pub use traits::{PortStatus, Prober, ScanResult};
pub use worker::{scan_range, WorkerReport};

/// Configuration for a scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Host as given by the user.
    pub host: String,
    /// Resolved address of `host`.
    pub addr: IpAddr,
    /// Ports to probe.
    pub range: PortRange,
    /// Per-attempt connection timeout.
    pub timeout: Duration,
    /// Worker count; `None` scans inline with a single worker.
    pub threads: Option<NonZeroUsize>,
    /// File that open ports are appended to.
    pub output: Option<PathBuf>,
}

impl ScanConfig {
    /// Default per-attempt timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

    /// Create a new scan configuration.
    pub fn new(host: impl Into<String>, addr: IpAddr, range: PortRange) -> Self {
        Self {
            host: host.into(),
            addr,
            range,
            timeout: Self::DEFAULT_TIMEOUT,
            threads: None,
            output: None,
        }
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the number of workers.
    pub fn with_threads(mut self, threads: NonZeroUsize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Append open ports to `path`.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Line written to the console and the output file before scanning.
    pub fn header(&self) -> String {
        format!(
            "Port-scan on {} in port range {}-{}",
            self.host,
            self.range.start(),
            self.range.end()
        )
    }
}

/// Complete scan results.
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub host: String,
    pub range: PortRange,
    /// Number of workers that ran.
    pub workers: usize,
    /// Open ports, ascending.
    pub open_ports: Vec<Port>,
    pub refused: usize,
    pub timed_out: usize,
    pub reports: Vec<WorkerReport>,
    pub duration: Duration,
}

impl ScanSummary {
    /// Number of ports probed across all workers.
    pub fn ports_scanned(&self) -> usize {
        self.reports.iter().map(WorkerReport::total).sum()
    }
}

/// Execute a complete TCP connect scan, writing console output to `console`.
pub async fn run_scan<W>(config: &ScanConfig, console: W) -> Result<ScanSummary, ScanError>
where
    W: Write + Send + 'static,
{
    let prober = Arc::new(TcpConnectProber::new(config.addr, config.timeout));
    run_scan_with(config, prober, console).await
}

/// Execute a scan with an arbitrary prober.
pub async fn run_scan_with<W>(
    config: &ScanConfig,
    prober: Arc<dyn Prober>,
    console: W,
) -> Result<ScanSummary, ScanError>
where
    W: Write + Send + 'static,
{
    let started = Instant::now();
    let header = config.header();

    let (sink, handle) = ResultSink::spawn(console, config.output.as_deref(), &header).await?;
    handle.notice(header).await?;

    let outcome = match config.threads {
        None => scan_range(0, prober.as_ref(), config.range, &handle)
            .await
            .map(|report| vec![report])
            .map_err(ScanError::from),
        Some(requested) => run_workers(config.range, requested, prober, &handle).await,
    };

    // The sink only finishes once every handle, including ours, is gone.
    drop(handle);
    let collected = sink.finish().await?;
    let reports = outcome?;

    let summary = ScanSummary {
        host: config.host.clone(),
        range: config.range,
        workers: reports.len(),
        open_ports: collected.open,
        refused: collected.refused,
        timed_out: collected.timed_out,
        reports,
        duration: started.elapsed(),
    };

    tracing::info!(
        host = %summary.host,
        range = %summary.range,
        workers = summary.workers,
        open = summary.open_ports.len(),
        elapsed_ms = summary.duration.as_millis() as u64,
        "scan complete"
    );
    Ok(summary)
}

async fn run_workers(
    range: PortRange,
    requested: NonZeroUsize,
    prober: Arc<dyn Prober>,
    sink: &SinkHandle,
) -> Result<Vec<WorkerReport>, ScanError> {
    let ranges = partition(range, requested);
    sink.notice(format!("{} threads requested", ranges.len()))
        .await?;

    let mut tasks = Vec::with_capacity(ranges.len());
    for (i, sub_range) in ranges.into_iter().enumerate() {
        sink.notice(format!("Thread {}:{}-{}", i, sub_range.start(), sub_range.end()))
            .await?;

        let prober = Arc::clone(&prober);
        let sink = sink.clone();
        tasks.push(tokio::spawn(async move {
            scan_range(i, prober.as_ref(), sub_range, &sink).await
        }));
    }

    // Wait for every worker, even if one of them fails early.
    let mut reports = Vec::with_capacity(tasks.len());
    let mut first_error = None;
    for joined in join_all(tasks).await {
        match joined {
            Ok(Ok(report)) => reports.push(report),
            Ok(Err(e)) => {
                first_error.get_or_insert(ScanError::from(e));
            }
            Err(e) => {
                first_error.get_or_insert(ScanError::Worker(e.to_string()));
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(reports),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::net::Ipv4Addr;
    use std::sync::Mutex;

    /// Marks a fixed set of ports open and refuses the rest.
    struct FixedProber {
        open: Vec<u16>,
    }

    #[async_trait]
    impl Prober for FixedProber {
        async fn probe(&self, port: Port) -> PortStatus {
            if self.open.contains(&port.as_u16()) {
                PortStatus::Open
            } else {
                PortStatus::Refused
            }
        }

        fn target(&self) -> IpAddr {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }

        fn timeout(&self) -> Duration {
            Duration::ZERO
        }
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.0.lock().unwrap().clone())
                .unwrap()
                .lines()
                .map(str::to_owned)
                .collect()
        }
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn config(start: u32, end: u32) -> ScanConfig {
        ScanConfig::new(
            "example.test",
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            PortRange::from_bounds(start, end).unwrap(),
        )
    }

    #[test]
    fn test_header() {
        assert_eq!(
            config(1, 10).header(),
            "Port-scan on example.test in port range 1-10"
        );
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(config(1, 10).timeout, Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_inline_scan_without_threads() {
        let console = Capture::default();
        let prober = Arc::new(FixedProber { open: vec![7] });

        let summary = run_scan_with(&config(1, 10), prober, console.clone())
            .await
            .unwrap();

        assert_eq!(summary.workers, 1);
        assert_eq!(summary.open_ports, vec![Port::new(7).unwrap()]);
        assert_eq!(summary.refused, 9);
        assert_eq!(summary.ports_scanned(), 10);

        let lines = console.lines();
        assert_eq!(lines[0], "Port-scan on example.test in port range 1-10");
        assert_eq!(lines.iter().filter(|l| l.ends_with(" OPEN")).count(), 1);
        assert!(lines.contains(&"7 OPEN".to_string()));
        assert!(!lines.iter().any(|l| l.starts_with("Thread ")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_threaded_scan_announces_workers() {
        let console = Capture::default();
        let prober = Arc::new(FixedProber {
            open: vec![5, 30, 99],
        });
        let cfg = config(1, 100).with_threads(NonZeroUsize::new(4).unwrap());

        let summary = run_scan_with(&cfg, prober, console.clone()).await.unwrap();

        assert_eq!(summary.workers, 4);
        assert_eq!(summary.ports_scanned(), 100);
        assert_eq!(
            summary.open_ports,
            [5, 30, 99].map(|p| Port::new(p).unwrap()).to_vec()
        );

        let lines = console.lines();
        assert_eq!(lines[1], "4 threads requested");
        for expected in ["Thread 0:1-25", "Thread 1:26-50", "Thread 2:51-75", "Thread 3:76-100"] {
            assert!(lines.contains(&expected.to_string()), "missing {expected}");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_thread_count_clamped_to_ports() {
        let prober = Arc::new(FixedProber { open: vec![] });
        let cfg = config(1, 3).with_threads(NonZeroUsize::new(10).unwrap());

        let summary = run_scan_with(&cfg, prober, std::io::sink()).await.unwrap();

        assert_eq!(summary.workers, 3);
        assert!(summary.reports.iter().all(|r| r.range.len() == 1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_output_file_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("open.txt");
        let prober = Arc::new(FixedProber { open: vec![2, 9] });
        let cfg = config(1, 10)
            .with_threads(NonZeroUsize::new(3).unwrap())
            .with_output(&path);

        run_scan_with(&cfg, prober, std::io::sink()).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.remove(0), "Port-scan on example.test in port range 1-10");
        lines.sort_unstable();
        assert_eq!(lines, vec!["2 OPEN", "9 OPEN"]);
    }
}
