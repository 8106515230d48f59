//! Cost Tally
//!
//! Total cost of an allocation, held as a signed 128-bit integer. Triangular sums of
//! `i64` draw counts overflow 64 bits long before they overflow 128.

use std::{fmt, num::ParseIntError, str::FromStr};

use num_traits::ToPrimitive;
use thiserror::Error;

use crate::{allocation::Allocation, lanes::LaneSet};

/// Errors that can occur while computing or parsing a tally.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TallyError {
    /// The total cost left the 128-bit range.
    #[error("total cost overflowed the 128-bit range")]
    Overflow,

    /// The allocation and the lane set disagree on the number of lanes.
    #[error("allocation covers {allocation} lanes but the lane set has {lanes}")]
    LaneCountMismatch {
        /// Lanes in the allocation
        allocation: usize,

        /// Lanes in the lane set
        lanes: usize,
    },

    /// A decimal string could not be parsed.
    #[error("invalid tally: {0}")]
    Parse(#[from] ParseIntError),
}

/// Exact total cost of an allocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tally(i128);

impl Tally {
    /// A tally of zero.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw value.
    pub const fn new(value: i128) -> Self {
        Self(value)
    }

    /// The raw value.
    pub const fn value(&self) -> i128 {
        self.0
    }

    /// Add two tallies, returning `None` on overflow.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// The discount offset charged once per solve: `discount * target`.
    pub fn baseline(discount: i64, target: i64) -> Self {
        Self(i128::from(discount) * i128::from(target))
    }

    /// Cost contributed by a lane that drew `draws` units.
    ///
    /// `draws(draws + 1) / 2`, less the discount on every unit drawn within capacity.
    ///
    /// # Errors
    ///
    /// Returns [`TallyError::Overflow`] if an intermediate leaves the 128-bit range.
    pub fn lane_cost(draws: i64, capacity: i64, discount: i64) -> Result<Self, TallyError> {
        let d = i128::from(draws);
        let discounted = i128::from(draws.min(capacity));

        let triangular = d
            .checked_mul(d + 1)
            .map(|product| product / 2)
            .ok_or(TallyError::Overflow)?;

        let rebate = i128::from(discount)
            .checked_mul(discounted)
            .ok_or(TallyError::Overflow)?;

        triangular
            .checked_sub(rebate)
            .map(Self)
            .ok_or(TallyError::Overflow)
    }

    /// Total cost of `allocation` over `lanes`.
    ///
    /// # Errors
    ///
    /// - [`TallyError::LaneCountMismatch`]: the allocation was built for other lanes.
    /// - [`TallyError::Overflow`]: the sum left the 128-bit range.
    pub fn from_allocation(lanes: &LaneSet, allocation: &Allocation) -> Result<Self, TallyError> {
        if lanes.len() != allocation.len() {
            return Err(TallyError::LaneCountMismatch {
                allocation: allocation.len(),
                lanes: lanes.len(),
            });
        }

        let discount = lanes.discount();
        let baseline = Self::baseline(discount, allocation.target());

        lanes
            .iter()
            .zip(allocation.iter())
            .try_fold(baseline, |total, (lane, draw)| {
                let cost = Self::lane_cost(draw.draws(), lane.capacity(), discount)?;

                total.checked_add(cost).ok_or(TallyError::Overflow)
            })
    }
}

impl From<i64> for Tally {
    fn from(value: i64) -> Self {
        Self(i128::from(value))
    }
}

impl ToPrimitive for Tally {
    fn to_i64(&self) -> Option<i64> {
        self.0.to_i64()
    }

    fn to_u64(&self) -> Option<u64> {
        self.0.to_u64()
    }

    fn to_i128(&self) -> Option<i128> {
        Some(self.0)
    }

    fn to_u128(&self) -> Option<u128> {
        self.0.to_u128()
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Tally {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::allocation::LaneDraw;

    #[test]
    fn single_lane_example() -> TestResult {
        let lanes = LaneSet::new([2], 0)?;
        let allocation = Allocation::new(vec![LaneDraw::new(2, 0)], 2, 2);

        assert_eq!(Tally::from_allocation(&lanes, &allocation)?, Tally::new(3));

        Ok(())
    }

    #[test]
    fn lane_cost_within_capacity_discounts_every_unit() -> TestResult {
        // units cost 0, 1, 2
        assert_eq!(Tally::lane_cost(3, 5, 1)?, Tally::new(6 - 3));

        Ok(())
    }

    #[test]
    fn lane_cost_past_capacity_discounts_capacity_only() -> TestResult {
        // units 1..=3 cost 0, 1, 2 and units 4, 5 cost 4, 5
        assert_eq!(Tally::lane_cost(5, 3, 1)?, Tally::new(15 - 3));

        Ok(())
    }

    #[test]
    fn baseline_is_discount_times_target() {
        assert_eq!(Tally::baseline(3, 7), Tally::new(21));
        assert_eq!(
            Tally::baseline(i64::MAX, i64::MAX),
            Tally::new(i128::from(i64::MAX) * i128::from(i64::MAX))
        );
    }

    #[test]
    fn lane_cost_at_i64_limit_fits() -> TestResult {
        let d = i128::from(i64::MAX);

        assert_eq!(
            Tally::lane_cost(i64::MAX, i64::MAX, 0)?,
            Tally::new(d * (d + 1) / 2)
        );

        Ok(())
    }

    #[test]
    fn summing_many_huge_lanes_reports_overflow() -> TestResult {
        let lanes = LaneSet::new([0, 0, 0, 0, 0], 0)?;
        let allocation = Allocation::new(vec![LaneDraw::new(i64::MAX, 0); 5], i64::MAX, i64::MAX);

        assert_eq!(
            Tally::from_allocation(&lanes, &allocation),
            Err(TallyError::Overflow)
        );

        Ok(())
    }

    #[test]
    fn mismatched_lane_counts_are_rejected() -> TestResult {
        let lanes = LaneSet::new([1, 1], 0)?;
        let allocation = Allocation::new(vec![LaneDraw::new(1, 0)], 1, 1);

        assert_eq!(
            Tally::from_allocation(&lanes, &allocation),
            Err(TallyError::LaneCountMismatch {
                allocation: 1,
                lanes: 2
            })
        );

        Ok(())
    }

    #[test]
    fn renders_values_beyond_i64() {
        let tally = Tally::new(50_000_000_005_000_000_000);

        assert_eq!(tally.to_string(), "50000000005000000000");
        assert_eq!(tally.to_i64(), None);
    }

    #[test]
    fn renders_negative_values() {
        assert_eq!(Tally::new(-42).to_string(), "-42");
        assert_eq!(
            Tally::new(i128::MIN).to_string(),
            "-170141183460469231731687303715884105728"
        );
        assert_eq!(Tally::ZERO.to_string(), "0");
    }

    #[test]
    fn parses_rendered_values() -> TestResult {
        let tally: Tally = " -170141183460469231731687303715884105728\n".parse()?;

        assert_eq!(tally, Tally::new(i128::MIN));
        assert!(matches!("12a".parse::<Tally>(), Err(TallyError::Parse(_))));

        Ok(())
    }
}
