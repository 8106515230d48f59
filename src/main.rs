//! Allotment command line
//!
//! Reads batch cases (or a fixture set), solves each one and writes the exact total
//! cost per line.

use std::{
    fs,
    io::{self, Read, Write},
    process::ExitCode,
};

use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use allotment::{
    cases::{CaseError, parse_cases, write_answers},
    fixtures::{FixtureError, FixtureSet},
    lanes::LaneSet,
    report::{Report, ReportError},
    solvers::{SolverError, SolverResult},
};

use crate::config::Config;

mod config;

/// Errors surfaced by the command line.
#[derive(Debug, Error)]
enum AppError {
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Case(#[from] CaseError),

    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) if err.use_stderr() => {
            #[expect(
                clippy::print_stderr,
                reason = "logging not initialized yet, must use eprintln for config errors"
            )]
            {
                eprintln!("Configuration error: {err}");
            }

            return ExitCode::FAILURE;
        }
        Err(err) => {
            #[expect(clippy::print_stdout, reason = "help and version output")]
            {
                print!("{err}");
            }

            return ExitCode::SUCCESS;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_level))
        .with_writer(io::stderr)
        .init();

    let outcome = match &config.fixture {
        Some(set) => run_fixture(&config, set),
        None => run_batch(&config).map(|()| true),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(run_error) => {
            error!("{run_error}");

            ExitCode::FAILURE
        }
    }
}

fn read_input(config: &Config) -> Result<String, AppError> {
    match &config.input {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut input = String::new();

            io::stdin().lock().read_to_string(&mut input)?;

            Ok(input)
        }
    }
}

fn write_report(
    out: &mut impl Write,
    lanes: &LaneSet,
    result: &SolverResult,
) -> Result<(), AppError> {
    Report::from_result(lanes, result)?.write_to(out)?;

    Ok(())
}

fn run_batch(config: &Config) -> Result<(), AppError> {
    let cases = parse_cases(&read_input(config)?)?;

    info!(cases = cases.len(), solver = ?config.solver, "solving batch");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    for case in &cases {
        let result = config.solver.solve(case.lanes(), case.target())?;

        write_answers(&mut out, [&result.total])?;

        if config.report {
            write_report(&mut out, case.lanes(), &result)?;
        }
    }

    out.flush()?;

    Ok(())
}

/// Solve every case in a fixture set. Returns `false` if any case fails to solve or
/// its total differs from the fixture's expectation.
fn run_fixture(config: &Config, set: &str) -> Result<bool, AppError> {
    let mut fixtures = FixtureSet::with_base_path(&config.fixture_dir);

    fixtures.load(set)?;

    info!(set, cases = fixtures.len(), solver = ?config.solver, "solving fixture set");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failures = 0_usize;

    for named in fixtures.cases() {
        let name = &named.name;
        let lanes = named.case.lanes();

        let result = match config.solver.solve(lanes, named.case.target()) {
            Ok(result) => result,
            Err(solve_error) => {
                failures += 1;

                error!(case = %name, %solve_error, "solve failed");

                writeln!(out, "{name}: error ({solve_error})")?;

                continue;
            }
        };

        let total = result.total;

        match named.expected {
            Some(expected) if expected != total => {
                failures += 1;

                warn!(case = %name, %expected, actual = %total, "total mismatch");

                writeln!(out, "{name}: {total} (expected {expected})")?;
            }
            _ => writeln!(out, "{name}: {total}")?,
        }

        if config.report {
            write_report(&mut out, lanes, &result)?;
        }
    }

    out.flush()?;

    Ok(failures == 0)
}
