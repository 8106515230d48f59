//! Solvers for Allocations

use clap::ValueEnum;
use thiserror::Error;

use crate::{
    allocation::{Allocation, AllocationError},
    lanes::{LaneError, LaneSet},
    tally::{Tally, TallyError},
    threshold::ThresholdError,
};

pub mod bisection;
pub mod greedy;

/// Solver Errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolverError {
    /// Wrapped lane validation error
    #[error(transparent)]
    Lane(#[from] LaneError),

    /// Wrapped threshold search error
    #[error(transparent)]
    Threshold(#[from] ThresholdError),

    /// Wrapped allocation error
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// Wrapped tally error
    #[error(transparent)]
    Tally(#[from] TallyError),

    /// The target is too large for a solver that draws units one at a time.
    #[error("target of {target} units exceeds the solver limit of {limit}")]
    TargetTooLarge {
        /// Requested number of units
        target: i64,

        /// Largest target the solver accepts
        limit: i64,
    },

    /// Internal solver invariant was violated (this is a bug).
    #[error("solver invariant violated: {message}")]
    InvariantViolation {
        /// What invariant was violated
        message: &'static str,
    },
}

/// Result of allocating a target across a lane set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverResult {
    /// Per-lane draws adding up to the target
    pub allocation: Allocation,

    /// Exact total cost of the allocation
    pub total: Tally,
}

/// Trait for allocating a number of units across lanes at minimum cost
pub trait Solver {
    /// Allocate `target` units across `lanes`.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the input is rejected or the solver encounters an error.
    fn solve(lanes: &LaneSet, target: i64) -> Result<SolverResult, SolverError>;

    /// Allocate one unit per unit of capacity across `lanes`.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the solver encounters an error.
    fn solve_total(lanes: &LaneSet) -> Result<SolverResult, SolverError> {
        Self::solve(lanes, lanes.total_capacity())
    }
}

/// Selectable solver implementations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SolverKind {
    /// Threshold search with surplus trim
    #[default]
    Threshold,

    /// Draw units one at a time, cheapest first
    Greedy,
}

impl SolverKind {
    /// Allocate `target` units across `lanes` with the selected solver.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the selected solver fails.
    pub fn solve(self, lanes: &LaneSet, target: i64) -> Result<SolverResult, SolverError> {
        match self {
            SolverKind::Threshold => bisection::ThresholdSolver::solve(lanes, target),
            SolverKind::Greedy => greedy::GreedySolver::solve(lanes, target),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn solver_kinds_agree_on_total() -> TestResult {
        let lanes = LaneSet::new([3, 5], 1)?;

        let threshold = SolverKind::Threshold.solve(&lanes, 4)?;
        let greedy = SolverKind::Greedy.solve(&lanes, 4)?;

        assert_eq!(threshold.total, greedy.total);
        assert_eq!(
            threshold.allocation.threshold(),
            greedy.allocation.threshold()
        );

        Ok(())
    }

    #[test]
    fn solve_total_defaults_target_to_capacity() -> TestResult {
        let lanes = LaneSet::new([3, 5], 1)?;

        let result = bisection::ThresholdSolver::solve_total(&lanes)?;

        assert_eq!(result.allocation.target(), 8);
        assert_eq!(result.allocation.total_draws(), 8);

        Ok(())
    }

    #[test]
    fn default_kind_is_threshold() {
        assert_eq!(SolverKind::default(), SolverKind::Threshold);
    }
}
