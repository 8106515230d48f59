//! Lanes

use smallvec::SmallVec;
use thiserror::Error;

/// Errors raised while validating lane data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LaneError {
    /// At least one lane is required.
    #[error("no lanes provided")]
    NoLanes,

    /// A lane was given a negative capacity (lane index, capacity).
    #[error("lane {lane} has negative capacity {capacity}")]
    NegativeCapacity {
        /// Index of the offending lane
        lane: usize,

        /// The rejected capacity
        capacity: i64,
    },

    /// The shared discount must not be negative.
    #[error("discount must not be negative, got {0}")]
    NegativeDiscount(i64),

    /// The draw target must not be negative.
    #[error("target must not be negative, got {0}")]
    NegativeTarget(i64),

    /// The combined capacity of all lanes does not fit in an `i64`.
    #[error("total lane capacity exceeds the supported range")]
    CapacityOverflow,
}

/// A single lane: a supply of discounted units followed by an unbounded run of penalty units.
///
/// Unit `j` (1-indexed) costs `j - discount` while `j <= capacity` and `j` afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lane {
    capacity: i64,
}

impl Lane {
    /// Create a lane with the given capacity.
    pub const fn new(capacity: i64) -> Self {
        Self { capacity }
    }

    /// Number of units drawn at the discounted rate before penalties apply.
    pub const fn capacity(self) -> i64 {
        self.capacity
    }

    /// Marginal cost of drawing unit `unit` (1-indexed) from this lane.
    pub fn marginal_cost(self, unit: i64, discount: i64) -> i128 {
        if unit <= self.capacity {
            i128::from(unit) - i128::from(discount)
        } else {
            i128::from(unit)
        }
    }

    /// Number of discounted units costing at most `value`.
    pub fn discounted_at_most(self, value: i64, discount: i64) -> i128 {
        let reach = i128::from(value) + i128::from(discount);

        if reach >= 1 {
            reach.min(i128::from(self.capacity))
        } else {
            0
        }
    }

    /// Number of penalty units costing at most `value`.
    pub fn penalty_at_most(self, value: i64) -> i128 {
        let value = i128::from(value);
        let capacity = i128::from(self.capacity);

        if value > capacity {
            value - capacity
        } else {
            0
        }
    }

    /// Number of units in this lane costing at most `value`.
    pub fn count_at_most(self, value: i64, discount: i64) -> i128 {
        self.discounted_at_most(value, discount) + self.penalty_at_most(value)
    }

    /// Number of units in this lane costing exactly `value`.
    ///
    /// Costs are strictly increasing inside each regime, so this is at most one per regime.
    pub fn count_exactly(self, value: i64, discount: i64) -> i128 {
        let reach = i128::from(value) + i128::from(discount);
        let capacity = i128::from(self.capacity);

        let discounted = i128::from(reach >= 1 && reach <= capacity);
        let penalty = i128::from(i128::from(value) > capacity);

        discounted + penalty
    }
}

/// Validated set of lanes sharing a single discount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneSet {
    lanes: SmallVec<[Lane; 8]>,
    discount: i64,
    total_capacity: i64,
}

impl LaneSet {
    /// Build a lane set from capacities and the shared discount.
    ///
    /// # Errors
    ///
    /// - [`LaneError::NoLanes`]: `capacities` was empty.
    /// - [`LaneError::NegativeCapacity`]: a capacity was below zero.
    /// - [`LaneError::NegativeDiscount`]: `discount` was below zero.
    /// - [`LaneError::CapacityOverflow`]: the capacities sum past `i64::MAX`.
    pub fn new(
        capacities: impl IntoIterator<Item = i64>,
        discount: i64,
    ) -> Result<Self, LaneError> {
        if discount < 0 {
            return Err(LaneError::NegativeDiscount(discount));
        }

        let lanes = capacities
            .into_iter()
            .enumerate()
            .map(|(lane, capacity)| {
                if capacity < 0 {
                    Err(LaneError::NegativeCapacity { lane, capacity })
                } else {
                    Ok(Lane::new(capacity))
                }
            })
            .collect::<Result<SmallVec<[Lane; 8]>, _>>()?;

        if lanes.is_empty() {
            return Err(LaneError::NoLanes);
        }

        let total_capacity = lanes
            .iter()
            .try_fold(0_i64, |acc, lane| acc.checked_add(lane.capacity))
            .ok_or(LaneError::CapacityOverflow)?;

        Ok(Self {
            lanes,
            discount,
            total_capacity,
        })
    }

    /// Shared discount applied to every discounted unit.
    pub const fn discount(&self) -> i64 {
        self.discount
    }

    /// Sum of all lane capacities.
    pub const fn total_capacity(&self) -> i64 {
        self.total_capacity
    }

    /// Number of lanes.
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// Always `false`; a lane set holds at least one lane.
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Lane at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Lane> {
        self.lanes.get(index)
    }

    /// Iterate lanes in index order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Lane> {
        self.lanes.iter()
    }

    /// Total number of units across all lanes costing at most `value`.
    ///
    /// Non-decreasing in `value`.
    pub fn count_at_most(&self, value: i64) -> i128 {
        self.lanes.iter().fold(0_i128, |acc, lane| {
            acc.saturating_add(lane.count_at_most(value, self.discount))
        })
    }

    /// Check that `target` is a drawable amount.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError::NegativeTarget`] if `target` is below zero.
    pub fn check_target(&self, target: i64) -> Result<(), LaneError> {
        if target < 0 {
            Err(LaneError::NegativeTarget(target))
        } else {
            Ok(())
        }
    }
}

impl<'a> IntoIterator for &'a LaneSet {
    type Item = &'a Lane;
    type IntoIter = std::slice::Iter<'a, Lane>;

    fn into_iter(self) -> Self::IntoIter {
        self.lanes.iter()
    }
}
