//! Search Trace Example
//!
//! This example solves the `staggered` case from the basic fixture set while
//! recording every probe of the threshold search, then prints the probes followed
//! by the per-lane report.
//!
//! Run with: `cargo run --example search_trace`

use std::{io, time::Instant};

use anyhow::Result;

use allotment::{
    fixtures::FixtureSet,
    observer::{AllocationObserver, SearchPhase},
    report::Report,
    solvers::bisection::ThresholdSolver,
};

/// Collects probes and trims in the order they happen.
#[derive(Debug, Default)]
struct Trace {
    probes: Vec<(SearchPhase, i64, i128)>,
    trims: Vec<(usize, i64)>,
}

impl AllocationObserver for Trace {
    fn on_probe(&mut self, phase: SearchPhase, value: i64, count: i128) {
        self.probes.push((phase, value, count));
    }

    fn on_trim(&mut self, lane: usize, removed: i64) {
        self.trims.push((lane, removed));
    }
}

/// Search Trace Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let fixture = FixtureSet::from_set("basic")?;
    let named = fixture.case("staggered")?;

    let mut trace = Trace::default();

    let start = Instant::now();

    let result =
        ThresholdSolver::solve_with_observer(named.case.lanes(), named.case.target(), &mut trace)?;

    let elapsed = start.elapsed().as_secs_f32();

    for (phase, value, count) in &trace.probes {
        println!("{phase:>9} value={value:>4} count={count}");
    }

    for (lane, removed) in &trace.trims {
        println!("trimmed {removed} from lane {lane}");
    }

    println!();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    Report::from_result(named.case.lanes(), &result)?.write_to(&mut handle)?;

    println!("\nSolution: {elapsed}s");

    Ok(())
}
