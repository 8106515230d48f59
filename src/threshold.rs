//! Threshold Search
//!
//! Finds the least marginal cost `lim` at which the lanes together offer at least
//! `target` units. The counting function is non-decreasing, so the search first grows
//! an upper bound and then bisects down to the exact value.

use num_traits::ToPrimitive;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    lanes::{LaneError, LaneSet},
    observer::{AllocationObserver, SearchPhase},
};

/// Errors that can occur while searching for the threshold.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThresholdError {
    /// The lane data or target was rejected.
    #[error(transparent)]
    Lane(#[from] LaneError),

    /// The closed-form upper bound did not cover the target (this is a bug).
    #[error("no marginal cost up to {bound} covers a target of {target} units")]
    Unreachable {
        /// Requested number of units
        target: i64,

        /// Largest value probed
        bound: i64,
    },

    /// A search midpoint fell outside the `i64` range (this is a bug).
    #[error("search midpoint out of range")]
    MidpointOutOfRange,
}

/// Least marginal cost reaching the target, with search statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold {
    value: i64,
    probes: u32,
}

impl Threshold {
    /// The least marginal cost `lim` with `count_at_most(lim) >= target`.
    pub const fn value(&self) -> i64 {
        self.value
    }

    /// How many times the counting function was evaluated.
    pub const fn probes(&self) -> u32 {
        self.probes
    }
}

/// Evaluates the counting function, keeping the probe tally and notifying the observer.
struct Prober<'a, O: AllocationObserver> {
    lanes: &'a LaneSet,
    observer: &'a mut O,
    probes: u32,
}

impl<O: AllocationObserver> Prober<'_, O> {
    fn count(&mut self, phase: SearchPhase, value: i64) -> i128 {
        let count = self.lanes.count_at_most(value);

        self.probes = self.probes.saturating_add(1);
        self.observer.on_probe(phase, value, count);

        trace!(%phase, value, %count, "probe");

        count
    }
}

/// Upper bound on the threshold that needs no probing.
///
/// At `v = target` every lane offers at least `target` units: either `target`
/// discounted units, or all of its discounted units plus `target - capacity`
/// penalty units. One lane therefore already covers the target.
pub const fn closed_form_bound(target: i64) -> i64 {
    if target < 1 { 1 } else { target }
}

/// Find the least marginal cost at which `lanes` offer at least `target` units.
///
/// The bootstrap doubles from `1` as usual but never past [`closed_form_bound`],
/// which keeps the number of probes logarithmic in `target` regardless of the
/// discount.
///
/// # Errors
///
/// - [`ThresholdError::Lane`]: `target` was negative.
/// - [`ThresholdError::Unreachable`] / [`ThresholdError::MidpointOutOfRange`]:
///   internal invariants were violated.
pub fn find_threshold<O: AllocationObserver>(
    lanes: &LaneSet,
    target: i64,
    observer: &mut O,
) -> Result<Threshold, ThresholdError> {
    lanes.check_target(target)?;

    let needed = i128::from(target);
    let bound = closed_form_bound(target);

    let mut prober = Prober {
        lanes,
        observer,
        probes: 0,
    };

    let mut hi = 1_i64;

    while prober.count(SearchPhase::Bootstrap, hi) < needed {
        if hi >= bound {
            return Err(ThresholdError::Unreachable { target, bound });
        }

        hi = hi.saturating_mul(2).min(bound);
    }

    // Cheapest unit anywhere is the first discounted one.
    let mut lo = 1 - lanes.discount();

    while lo < hi {
        let mid = (i128::from(lo) + i128::from(hi))
            .div_euclid(2)
            .to_i64()
            .ok_or(ThresholdError::MidpointOutOfRange)?;

        if prober.count(SearchPhase::Bisect, mid) >= needed {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }

    let probes = prober.probes;

    prober.observer.on_threshold(lo);

    debug!(target, threshold = lo, probes, "threshold found");

    Ok(Threshold { value: lo, probes })
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::observer::NoopObserver;

    /// Doubling without a cap, as a reference for the capped bootstrap.
    fn uncapped_threshold(lanes: &LaneSet, target: i64) -> i64 {
        let needed = i128::from(target);
        let mut hi = 1_i64;

        while lanes.count_at_most(hi) < needed {
            hi *= 2;
        }

        let mut lo = 1 - lanes.discount();

        while lo < hi {
            let mid = lo + (hi - lo) / 2;

            if lanes.count_at_most(mid) >= needed {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }

        lo
    }

    #[derive(Debug, Default)]
    struct Recorder {
        probes: Vec<(SearchPhase, i64, i128)>,
        threshold: Option<i64>,
    }

    impl AllocationObserver for Recorder {
        fn on_probe(&mut self, phase: SearchPhase, value: i64, count: i128) {
            self.probes.push((phase, value, count));
        }

        fn on_threshold(&mut self, threshold: i64) {
            self.threshold = Some(threshold);
        }
    }

    #[test]
    fn single_lane_example() -> TestResult {
        let lanes = LaneSet::new([2], 0)?;

        let threshold = find_threshold(&lanes, 2, &mut NoopObserver)?;

        assert_eq!(threshold.value(), 2);
        assert_eq!(lanes.count_at_most(1), 1);
        assert_eq!(lanes.count_at_most(0), 0);

        Ok(())
    }

    #[test]
    fn threshold_is_minimal() -> TestResult {
        for discount in 0..4 {
            for capacities in [vec![3, 5], vec![0, 0, 4], vec![1], vec![7, 2, 2, 9]] {
                let lanes = LaneSet::new(capacities.clone(), discount)?;

                for target in 1..=lanes.total_capacity() * 2 {
                    let lim = find_threshold(&lanes, target, &mut NoopObserver)?.value();

                    assert!(
                        lanes.count_at_most(lim) >= i128::from(target),
                        "{capacities:?} k={discount} target={target}"
                    );
                    assert!(
                        lanes.count_at_most(lim - 1) < i128::from(target),
                        "{capacities:?} k={discount} target={target}"
                    );
                }
            }
        }

        Ok(())
    }

    #[test]
    fn capped_bootstrap_matches_uncapped_doubling() -> TestResult {
        for discount in [0, 1, 5, 1_000] {
            for capacities in [vec![3, 5], vec![10, 0, 1], vec![100]] {
                let lanes = LaneSet::new(capacities, discount)?;

                for target in 0..250 {
                    assert_eq!(
                        find_threshold(&lanes, target, &mut NoopObserver)?.value(),
                        uncapped_threshold(&lanes, target),
                        "k={discount} target={target}"
                    );
                }
            }
        }

        Ok(())
    }

    #[test]
    fn zero_target_resolves_to_cheapest_unit() -> TestResult {
        let lanes = LaneSet::new([0, 0], 3)?;

        assert_eq!(find_threshold(&lanes, 0, &mut NoopObserver)?.value(), -2);

        Ok(())
    }

    #[test]
    fn negative_target_is_rejected() -> TestResult {
        let lanes = LaneSet::new([1], 0)?;

        assert_eq!(
            find_threshold(&lanes, -3, &mut NoopObserver),
            Err(ThresholdError::Lane(LaneError::NegativeTarget(-3)))
        );

        Ok(())
    }

    #[test]
    fn probes_stay_logarithmic_for_huge_discounts() -> TestResult {
        let lanes = LaneSet::new([1_000_000_000_000, 3], i64::MAX / 2)?;
        let target = lanes.total_capacity();

        let mut recorder = Recorder::default();
        let threshold = find_threshold(&lanes, target, &mut recorder)?;

        // Both phases are bounded by roughly 64 probes each.
        assert!(
            threshold.probes() <= 130,
            "took {} probes",
            threshold.probes()
        );
        assert_eq!(recorder.probes.len(), usize::try_from(threshold.probes())?);
        assert_eq!(recorder.threshold, Some(threshold.value()));

        let bootstrap_probes = recorder
            .probes
            .iter()
            .filter(|(phase, _, _)| *phase == SearchPhase::Bootstrap)
            .count();

        assert!(
            bootstrap_probes <= 42,
            "took {bootstrap_probes} bootstrap probes"
        );

        Ok(())
    }

    #[test]
    fn bootstrap_never_exceeds_closed_form_bound() -> TestResult {
        let lanes = LaneSet::new([0, 0, 0], 0)?;
        let mut recorder = Recorder::default();

        find_threshold(&lanes, 5, &mut recorder)?;

        assert!(
            recorder
                .probes
                .iter()
                .all(|&(_, value, _)| value <= closed_form_bound(5)),
            "probed past the bound: {:?}",
            recorder.probes
        );

        Ok(())
    }
}
