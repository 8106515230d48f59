//! Threshold Solver

use tracing::debug;

use crate::{
    allocation::Allocation,
    lanes::LaneSet,
    observer::{AllocationObserver, NoopObserver},
    solvers::{Solver, SolverError, SolverResult},
    tally::Tally,
    threshold::find_threshold,
};

/// Solver that bisects for the threshold marginal cost, then trims tied units
#[derive(Debug)]
pub struct ThresholdSolver;

impl ThresholdSolver {
    /// Solve while reporting search probes, the threshold and trims to `observer`.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the target is rejected or an internal invariant fails.
    pub fn solve_with_observer<O: AllocationObserver>(
        lanes: &LaneSet,
        target: i64,
        observer: &mut O,
    ) -> Result<SolverResult, SolverError> {
        let threshold = find_threshold(lanes, target, observer)?;

        let allocation = Allocation::from_threshold(lanes, threshold.value(), target, observer)?;

        let total = Tally::from_allocation(lanes, &allocation)?;

        debug!(
            lanes = lanes.len(),
            target,
            threshold = threshold.value(),
            probes = threshold.probes(),
            %total,
            "allocation solved"
        );

        Ok(SolverResult { allocation, total })
    }
}

impl Solver for ThresholdSolver {
    fn solve(lanes: &LaneSet, target: i64) -> Result<SolverResult, SolverError> {
        Self::solve_with_observer(lanes, target, &mut NoopObserver)
    }
}
