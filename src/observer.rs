//! Allocation Observer

use std::fmt;

/// Stage of the threshold search a probe belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// Growing the upper bound until enough units are available.
    Bootstrap,

    /// Narrowing the bracket down to the least sufficient value.
    Bisect,
}

impl fmt::Display for SearchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchPhase::Bootstrap => f.pad("bootstrap"),
            SearchPhase::Bisect => f.pad("bisect"),
        }
    }
}

/// Observer trait for capturing how an allocation is reached.
///
/// Callbacks fire at the key points of a solve: each evaluation of the counting
/// function, the final threshold, and each lane trimmed to hit the target exactly.
/// Observers only record; they cannot influence the result.
///
/// When no observer is needed, [`NoopObserver`] is used and the calls compile away.
pub trait AllocationObserver {
    /// Called after each evaluation of the counting function.
    ///
    /// # Parameters
    ///
    /// - `phase`: Which stage of the search issued the probe
    /// - `value`: The candidate marginal cost
    /// - `count`: Units across all lanes costing at most `value`
    fn on_probe(&mut self, _phase: SearchPhase, _value: i64, _count: i128) {}

    /// Called once the least sufficient marginal cost is known.
    fn on_threshold(&mut self, _threshold: i64) {}

    /// Called when units priced exactly at the threshold are removed from a lane.
    ///
    /// # Parameters
    ///
    /// - `lane`: Index of the lane
    /// - `removed`: Number of units removed from it
    fn on_trim(&mut self, _lane: usize, _removed: i64) {}
}

/// Observer that ignores every callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl AllocationObserver for NoopObserver {}
