//! Splitting a port range across a fixed number of workers.
//!
//! Every worker receives a contiguous slice of roughly `len / n` ports; the
//! last worker also absorbs the remainder so the slices always add back up
//! to the original range.

use crate::types::PortRange;
use std::num::NonZeroUsize;

/// Number of workers actually used for `range`.
///
/// Never more than one worker per port.
pub fn effective_workers(range: PortRange, requested: NonZeroUsize) -> usize {
    requested.get().min(range.len())
}

/// Partition `range` into contiguous, disjoint, ascending sub-ranges.
///
/// The result has exactly [`effective_workers`] entries and their union is
/// `range` itself.
pub fn partition(range: PortRange, workers: NonZeroUsize) -> Vec<PortRange> {
    let n = effective_workers(range, workers) as u32;
    let start = u32::from(range.start().as_u16());
    let total = range.len() as u32;
    let base = total / n;
    let remainder = total % n;

    (0..n)
        .map(|i| {
            let sub_start = start + i * base;
            let mut sub_end = sub_start + base - 1;
            if i == n - 1 {
                sub_end += remainder;
            }
            // Bounds never leave `range`, so this cannot fail.
            PortRange::from_bounds(sub_start, sub_end).unwrap_or(range)
        })
        .collect()
}
