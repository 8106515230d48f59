//! Allotment prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    allocation::{Allocation, AllocationError, LaneDraw},
    cases::{Case, CaseError, parse_cases, write_answers},
    fixtures::{FixtureError, FixtureSet, NamedCase},
    lanes::{Lane, LaneError, LaneSet},
    observer::{AllocationObserver, NoopObserver, SearchPhase},
    report::{LaneRow, Report, ReportError},
    solvers::{
        Solver, SolverError, SolverKind, SolverResult, bisection::ThresholdSolver,
        greedy::GreedySolver,
    },
    tally::{Tally, TallyError},
    threshold::{Threshold, ThresholdError, find_threshold},
};
