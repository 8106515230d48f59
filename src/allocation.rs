//! Allocations

use num_traits::ToPrimitive;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{lanes::LaneSet, observer::AllocationObserver};

/// Errors that can occur while turning a threshold into per-lane draws.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocationError {
    /// A lane's draw count does not fit in an `i64`.
    #[error("draw count for lane {lane} is out of range")]
    DrawOutOfRange {
        /// Index of the offending lane
        lane: usize,
    },

    /// Fewer units cost at most the threshold than the target requires (this is a bug).
    #[error("threshold {threshold} only covers {available} of {target} units")]
    ShortOfTarget {
        /// Threshold the allocation was built from
        threshold: i64,

        /// Units available at the threshold
        available: i128,

        /// Requested number of units
        target: i64,
    },

    /// Surplus units remained after trimming every tied unit (this is a bug).
    #[error("{surplus} surplus units left after trimming")]
    UntrimmedSurplus {
        /// Units still above the target
        surplus: i128,
    },
}

/// Draws taken from a single lane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaneDraw {
    draws: i64,
    trimmed: i64,
}

impl LaneDraw {
    /// Create a lane draw with the given count and number of trimmed threshold units.
    pub const fn new(draws: i64, trimmed: i64) -> Self {
        Self { draws, trimmed }
    }

    /// Number of units drawn from the lane.
    pub const fn draws(&self) -> i64 {
        self.draws
    }

    /// Number of units priced exactly at the threshold that were given back.
    pub const fn trimmed(&self) -> i64 {
        self.trimmed
    }

    /// Units drawn at the discounted rate, given the lane's capacity.
    pub fn discounted(&self, capacity: i64) -> i64 {
        self.draws.min(capacity)
    }

    /// Units drawn past the lane's capacity.
    pub fn penalty(&self, capacity: i64) -> i64 {
        (self.draws - capacity).max(0)
    }
}

/// Per-lane draw counts that add up to the target exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    lanes: SmallVec<[LaneDraw; 8]>,
    threshold: i64,
    target: i64,
}

impl Allocation {
    /// Create an allocation from already balanced lane draws.
    pub fn new(lanes: impl Into<SmallVec<[LaneDraw; 8]>>, threshold: i64, target: i64) -> Self {
        Self {
            lanes: lanes.into(),
            threshold,
            target,
        }
    }

    /// Draw every unit costing at most `threshold`, then give back tied units until
    /// exactly `target` remain.
    ///
    /// Tied units are returned lane by lane in index order. Every returned unit costs
    /// exactly `threshold`, so the order has no effect on the total cost.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocationError`] if `threshold` does not cover `target`, or if the
    /// tied units are not enough to absorb the surplus. Neither happens for a threshold
    /// produced by [`find_threshold`](crate::threshold::find_threshold).
    pub fn from_threshold<O: AllocationObserver>(
        lanes: &LaneSet,
        threshold: i64,
        target: i64,
        observer: &mut O,
    ) -> Result<Self, AllocationError> {
        let discount = lanes.discount();

        let mut draws = lanes
            .iter()
            .enumerate()
            .map(|(lane, entry)| {
                entry
                    .count_at_most(threshold, discount)
                    .to_i64()
                    .map(|draws| LaneDraw::new(draws, 0))
                    .ok_or(AllocationError::DrawOutOfRange { lane })
            })
            .collect::<Result<SmallVec<[LaneDraw; 8]>, _>>()?;

        let available: i128 = draws.iter().map(|draw| i128::from(draw.draws)).sum();
        let mut surplus = available - i128::from(target);

        if surplus < 0 {
            return Err(AllocationError::ShortOfTarget {
                threshold,
                available,
                target,
            });
        }

        debug!(threshold, target, %surplus, "trimming tied units");

        for ((lane, draw), entry) in draws.iter_mut().enumerate().zip(lanes.iter()) {
            if surplus == 0 {
                break;
            }

            let tied = entry.count_exactly(threshold, discount);
            let take = tied
                .min(surplus)
                .to_i64()
                .ok_or(AllocationError::DrawOutOfRange { lane })?;

            if take == 0 {
                continue;
            }

            draw.draws -= take;
            draw.trimmed += take;
            surplus -= i128::from(take);

            observer.on_trim(lane, take);

            trace!(lane, removed = take, "trimmed lane");
        }

        if surplus != 0 {
            return Err(AllocationError::UntrimmedSurplus { surplus });
        }

        Ok(Self {
            lanes: draws,
            threshold,
            target,
        })
    }

    /// The marginal cost of the most expensive unit drawn.
    pub const fn threshold(&self) -> i64 {
        self.threshold
    }

    /// The number of units requested.
    pub const fn target(&self) -> i64 {
        self.target
    }

    /// Number of lanes.
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// Check if the allocation covers no lanes.
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Draw for the lane at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&LaneDraw> {
        self.lanes.get(index)
    }

    /// Iterate lane draws in index order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &LaneDraw> {
        self.lanes.iter()
    }

    /// Draw counts in lane order.
    pub fn draws(&self) -> SmallVec<[i64; 8]> {
        self.lanes.iter().map(LaneDraw::draws).collect()
    }

    /// Sum of draws over all lanes.
    pub fn total_draws(&self) -> i128 {
        self.lanes.iter().map(|draw| i128::from(draw.draws)).sum()
    }

    /// Sum of trimmed threshold units over all lanes.
    pub fn total_trimmed(&self) -> i128 {
        self.lanes.iter().map(|draw| i128::from(draw.trimmed)).sum()
    }
}
