//! Greedy Solver
//!
//! Draws units one at a time from whichever lane currently offers the cheapest next
//! unit. Linear in the target, so it serves as a reference for small inputs.

use std::{cmp::Reverse, collections::BinaryHeap};

use num_traits::ToPrimitive;
use smallvec::{SmallVec, smallvec};
use tracing::debug;

use crate::{
    allocation::{Allocation, LaneDraw},
    lanes::LaneSet,
    solvers::{Solver, SolverError, SolverResult},
    tally::{Tally, TallyError},
};

/// Solver that simulates each draw in increasing cost order
#[derive(Debug)]
pub struct GreedySolver;

impl GreedySolver {
    /// Largest target this solver will simulate.
    pub const MAX_UNITS: i64 = 10_000_000;
}

impl Solver for GreedySolver {
    fn solve(lanes: &LaneSet, target: i64) -> Result<SolverResult, SolverError> {
        lanes.check_target(target)?;

        if target > Self::MAX_UNITS {
            return Err(SolverError::TargetTooLarge {
                target,
                limit: Self::MAX_UNITS,
            });
        }

        let discount = lanes.discount();

        let mut draws: SmallVec<[i64; 8]> = smallvec![0; lanes.len()];

        // Ties pop the lowest lane index first.
        let mut next_units: BinaryHeap<Reverse<(i128, usize)>> = lanes
            .iter()
            .enumerate()
            .map(|(lane, entry)| Reverse((entry.marginal_cost(1, discount), lane)))
            .collect();

        let mut total = Tally::baseline(discount, target);
        let mut last_cost = i128::from(1 - discount);

        for _ in 0..target {
            let Some(Reverse((cost, lane))) = next_units.pop() else {
                return Err(SolverError::InvariantViolation {
                    message: "no lane offered a next unit",
                });
            };

            let (Some(drawn), Some(entry)) = (draws.get_mut(lane), lanes.get(lane)) else {
                return Err(SolverError::InvariantViolation {
                    message: "heap referenced a lane outside the lane set",
                });
            };

            *drawn += 1;

            total = total
                .checked_add(Tally::new(cost))
                .ok_or(TallyError::Overflow)?;

            last_cost = cost;

            next_units.push(Reverse((entry.marginal_cost(*drawn + 1, discount), lane)));
        }

        let threshold = last_cost.to_i64().ok_or(SolverError::InvariantViolation {
            message: "last drawn cost outside the i64 range",
        })?;

        debug!(lanes = lanes.len(), target, threshold, %total, "greedy allocation solved");

        let allocation = Allocation::new(
            draws
                .into_iter()
                .map(|count| LaneDraw::new(count, 0))
                .collect::<SmallVec<[LaneDraw; 8]>>(),
            threshold,
            target,
        );

        Ok(SolverResult { allocation, total })
    }
}
