//! Scan worker: probes one sub-range, port by port.

use crate::error::SinkResult;
use crate::scanner::traits::{PortStatus, Prober, ScanResult};
use crate::sink::SinkHandle;
use crate::types::PortRange;
use serde::Serialize;

/// Per-worker tallies, owned by the worker that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    pub worker: usize,
    pub range: PortRange,
    pub open: usize,
    pub refused: usize,
    pub timed_out: usize,
}

impl WorkerReport {
    fn new(worker: usize, range: PortRange) -> Self {
        Self {
            worker,
            range,
            open: 0,
            refused: 0,
            timed_out: 0,
        }
    }

    fn record(&mut self, status: PortStatus) {
        match status {
            PortStatus::Open => self.open += 1,
            PortStatus::Refused => self.refused += 1,
            PortStatus::Timeout => self.timed_out += 1,
        }
    }

    /// Number of ports probed.
    pub fn total(&self) -> usize {
        self.open + self.refused + self.timed_out
    }
}

/// Probe every port of `range` in ascending order.
///
/// Each result goes to the sink as soon as it is known. Probe outcomes never
/// stop the loop; the only error is a sink that has gone away.
pub async fn scan_range<P>(
    worker: usize,
    prober: &P,
    range: PortRange,
    sink: &SinkHandle,
) -> SinkResult<WorkerReport>
where
    P: Prober + ?Sized,
{
    tracing::debug!(worker, %range, "worker started");
    let mut report = WorkerReport::new(worker, range);

    for port in range.iter() {
        let status = prober.probe(port).await;
        report.record(status);
        sink.report(ScanResult::new(port, status)).await?;
    }

    tracing::debug!(
        worker,
        %range,
        open = report.open,
        refused = report.refused,
        timed_out = report.timed_out,
        "worker finished"
    );
    Ok(report)
}
