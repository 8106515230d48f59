//! Report
//!
//! Per-lane breakdown of a solved allocation, rendered as a table.

use std::io;

use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    lanes::LaneSet,
    solvers::SolverResult,
    tally::{Tally, TallyError},
};

/// Errors that can occur when building or writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Error computing a lane cost.
    #[error(transparent)]
    Tally(#[from] TallyError),

    /// The result was solved for a different lane set.
    #[error("result covers {result} lanes but the lane set has {lanes}")]
    LaneCountMismatch {
        /// Lanes in the result
        result: usize,

        /// Lanes in the lane set
        lanes: usize,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// One row of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneRow {
    /// Lane index
    pub lane: usize,

    /// Lane capacity
    pub capacity: i64,

    /// Units drawn at the discounted rate
    pub discounted: i64,

    /// Units drawn past capacity
    pub penalty: i64,

    /// Threshold units given back during the trim
    pub trimmed: i64,

    /// Total units drawn
    pub draws: i64,

    /// Cost contributed by the lane, excluding the baseline
    pub cost: Tally,
}

/// Per-lane breakdown of a solved allocation.
#[derive(Debug, Clone)]
pub struct Report {
    rows: SmallVec<[LaneRow; 8]>,
    threshold: i64,
    target: i64,
    baseline: Tally,
    total: Tally,
}

impl Report {
    /// Build a report for `result`, which must have been solved over `lanes`.
    ///
    /// # Errors
    ///
    /// Returns a [`ReportError`] if the lane counts differ or a lane cost overflows.
    pub fn from_result(lanes: &LaneSet, result: &SolverResult) -> Result<Self, ReportError> {
        let allocation = &result.allocation;

        if lanes.len() != allocation.len() {
            return Err(ReportError::LaneCountMismatch {
                result: allocation.len(),
                lanes: lanes.len(),
            });
        }

        let discount = lanes.discount();

        let rows = lanes
            .iter()
            .zip(allocation.iter())
            .enumerate()
            .map(|(lane, (entry, draw))| {
                let capacity = entry.capacity();

                Ok(LaneRow {
                    lane,
                    capacity,
                    discounted: draw.discounted(capacity),
                    penalty: draw.penalty(capacity),
                    trimmed: draw.trimmed(),
                    draws: draw.draws(),
                    cost: Tally::lane_cost(draw.draws(), capacity, discount)?,
                })
            })
            .collect::<Result<SmallVec<[LaneRow; 8]>, TallyError>>()?;

        Ok(Self {
            rows,
            threshold: allocation.threshold(),
            target: allocation.target(),
            baseline: Tally::baseline(discount, allocation.target()),
            total: result.total,
        })
    }

    /// Rows in lane order
    pub fn rows(&self) -> &[LaneRow] {
        &self.rows
    }

    /// Marginal cost of the most expensive unit drawn
    pub const fn threshold(&self) -> i64 {
        self.threshold
    }

    /// Discount offset charged once
    pub const fn baseline(&self) -> Tally {
        self.baseline
    }

    /// Total cost
    pub const fn total(&self) -> Tally {
        self.total
    }

    /// Write the table and summary to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Io`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReportError> {
        let mut builder = Builder::default();

        builder.push_record([
            "Lane",
            "Capacity",
            "Discounted",
            "Penalty",
            "Trimmed",
            "Draws",
            "Cost",
        ]);

        for row in &self.rows {
            builder.push_record([
                row.lane.to_string(),
                row.capacity.to_string(),
                row.discounted.to_string(),
                row.penalty.to_string(),
                row.trimmed.to_string(),
                row.draws.to_string(),
                row.cost.to_string(),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());
        let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(1, separator);

        table.with(theme);
        table.modify(Rows::new(1..), Alignment::right());
        table.modify(Columns::first(), Alignment::left());

        writeln!(out, "\n{table}")?;

        self.write_summary(&mut out)?;

        Ok(())
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReportError> {
        let lines = [
            (" Threshold:", self.threshold.to_string()),
            (" Target:", self.target.to_string()),
            (" Baseline:", self.baseline.to_string()),
            (" Total:", self.total.to_string()),
        ];

        let label_width = lines
            .iter()
            .map(|(label, _)| label.len())
            .max()
            .unwrap_or(0);
        let value_width = lines
            .iter()
            .map(|(_, value)| value.len())
            .max()
            .unwrap_or(0);

        for (label, value) in &lines {
            writeln!(out, "{label:<label_width$} {value:>value_width$}")?;
        }

        writeln!(out)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::solvers::{Solver, bisection::ThresholdSolver};

    #[test]
    fn rows_split_draws_by_regime() -> TestResult {
        let lanes = LaneSet::new([3, 5], 1)?;
        let result = ThresholdSolver::solve(&lanes, 8)?;

        let report = Report::from_result(&lanes, &result)?;

        assert_eq!(report.rows().len(), 2);
        assert_eq!(report.threshold(), 4);
        assert_eq!(report.baseline(), Tally::new(8));
        assert_eq!(report.total(), Tally::new(21));

        let first = report.rows().first().ok_or("missing first row")?;

        assert_eq!(first.discounted, 3);
        assert_eq!(first.penalty, 0);
        assert_eq!(first.trimmed, 1);
        assert_eq!(first.cost, Tally::new(3));

        Ok(())
    }

    #[test]
    fn lane_costs_and_baseline_add_up_to_total() -> TestResult {
        let lanes = LaneSet::new([0, 4, 1], 2)?;
        let result = ThresholdSolver::solve(&lanes, 9)?;

        let report = Report::from_result(&lanes, &result)?;

        let summed = report
            .rows()
            .iter()
            .try_fold(report.baseline(), |acc, row| acc.checked_add(row.cost))
            .ok_or("overflow")?;

        assert_eq!(summed, report.total());

        Ok(())
    }

    #[test]
    fn write_to_renders_table_and_summary() -> TestResult {
        let lanes = LaneSet::new([3, 5], 1)?;
        let result = ThresholdSolver::solve(&lanes, 8)?;
        let report = Report::from_result(&lanes, &result)?;

        let mut out = Vec::new();
        report.write_to(&mut out)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Discounted"));
        assert!(output.contains("Penalty"));
        assert!(output.contains("Threshold:"));
        assert!(output.contains("Total:"));
        assert!(output.contains("21"));

        Ok(())
    }

    #[test]
    fn mismatched_lane_set_is_rejected() -> TestResult {
        let lanes = LaneSet::new([3, 5], 1)?;
        let other = LaneSet::new([3], 1)?;
        let result = ThresholdSolver::solve(&lanes, 8)?;

        assert!(matches!(
            Report::from_result(&other, &result),
            Err(ReportError::LaneCountMismatch {
                result: 2,
                lanes: 1
            })
        ));

        Ok(())
    }
}
