//! Cases
//!
//! Reader and writer for the batch text format: a case count, then for each case a
//! lane count `n`, the shared discount `k` and `n` lane capacities, all separated by
//! whitespace. Each case draws one unit per unit of capacity.

use std::{io, num::ParseIntError, str::SplitWhitespace};

use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    lanes::{LaneError, LaneSet},
    tally::Tally,
};

/// Errors that can occur while reading batch input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaseError {
    /// Input ended before a required value.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd {
        /// Description of the missing value
        expected: &'static str,
    },

    /// A token was not a valid integer.
    #[error("invalid integer {token:?} for {expected}: {source}")]
    InvalidInteger {
        /// The offending token
        token: String,

        /// Description of the value being read
        expected: &'static str,

        /// Underlying parse error
        source: ParseIntError,
    },

    /// The case count was negative.
    #[error("case count must not be negative, got {0}")]
    NegativeCaseCount(i64),

    /// A case declared fewer than one lane.
    #[error("case {case} declares {count} lanes; at least one is required")]
    LaneCount {
        /// Zero-based case index
        case: usize,

        /// Declared lane count
        count: i64,
    },

    /// A case's lane data was rejected.
    #[error("case {case}: {source}")]
    Lanes {
        /// Zero-based case index
        case: usize,

        /// Underlying validation error
        source: LaneError,
    },
}

/// A single allocation problem: the lanes and how many units to draw from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    lanes: LaneSet,
    target: i64,
}

impl Case {
    /// Create a case with an explicit target.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError::NegativeTarget`] if `target` is below zero.
    pub fn new(lanes: LaneSet, target: i64) -> Result<Self, LaneError> {
        lanes.check_target(target)?;

        Ok(Self { lanes, target })
    }

    /// Create a case that draws one unit per unit of capacity.
    pub fn full(lanes: LaneSet) -> Self {
        let target = lanes.total_capacity();

        Self { lanes, target }
    }

    /// The lanes to draw from.
    pub fn lanes(&self) -> &LaneSet {
        &self.lanes
    }

    /// The number of units to draw.
    pub const fn target(&self) -> i64 {
        self.target
    }
}

struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            inner: input.split_whitespace(),
        }
    }

    fn next_i64(&mut self, expected: &'static str) -> Result<i64, CaseError> {
        let token = self
            .inner
            .next()
            .ok_or(CaseError::UnexpectedEnd { expected })?;

        token.parse().map_err(|source| CaseError::InvalidInteger {
            token: token.to_string(),
            expected,
            source,
        })
    }
}

/// Parse every case from batch input.
///
/// Tokens after the last declared case are ignored.
///
/// # Errors
///
/// Returns a [`CaseError`] if the input is truncated, malformed, or describes invalid lanes.
pub fn parse_cases(input: &str) -> Result<Vec<Case>, CaseError> {
    let mut tokens = Tokens::new(input);

    let count = tokens.next_i64("case count")?;

    let count = usize::try_from(count).map_err(|_err| CaseError::NegativeCaseCount(count))?;

    (0..count)
        .map(|case| parse_case(&mut tokens, case))
        .collect()
}

fn parse_case(tokens: &mut Tokens<'_>, case: usize) -> Result<Case, CaseError> {
    let declared = tokens.next_i64("lane count")?;
    let discount = tokens.next_i64("discount")?;

    let lane_count = match usize::try_from(declared) {
        Ok(count) if count > 0 => count,
        _ => {
            return Err(CaseError::LaneCount {
                case,
                count: declared,
            });
        }
    };

    let capacities = (0..lane_count)
        .map(|_| tokens.next_i64("lane capacity"))
        .collect::<Result<SmallVec<[i64; 8]>, _>>()?;

    let lanes =
        LaneSet::new(capacities, discount).map_err(|source| CaseError::Lanes { case, source })?;

    Ok(Case::full(lanes))
}

/// Write one total per line.
///
/// # Errors
///
/// Returns an [`io::Error`] if writing fails.
pub fn write_answers<'a>(
    mut out: impl io::Write,
    totals: impl IntoIterator<Item = &'a Tally>,
) -> io::Result<()> {
    for total in totals {
        writeln!(out, "{total}")?;
    }

    Ok(())
}
