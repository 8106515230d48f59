//! Command line configuration

use std::path::PathBuf;

use clap::Parser;

use allotment::solvers::SolverKind;

/// Allocate draws across lanes at minimum total cost
#[derive(Debug, Parser)]
#[command(name = "allotment", about = "Minimum-cost lane allocator", long_about = None)]
pub struct Config {
    /// Batch input file (reads standard input when absent)
    #[arg(short, long, env = "ALLOTMENT_INPUT", conflicts_with = "fixture")]
    pub input: Option<PathBuf>,

    /// Fixture set to solve and check against its expected totals
    #[arg(short, long, env = "ALLOTMENT_FIXTURE")]
    pub fixture: Option<String>,

    /// Directory holding fixture sets
    #[arg(long, env = "ALLOTMENT_FIXTURE_DIR", default_value = "./fixtures")]
    pub fixture_dir: PathBuf,

    /// Solver implementation
    #[arg(
        short,
        long,
        env = "ALLOTMENT_SOLVER",
        value_enum,
        default_value_t = SolverKind::Threshold
    )]
    pub solver: SolverKind,

    /// Print a per-lane breakdown after each answer
    #[arg(short, long)]
    pub report: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
