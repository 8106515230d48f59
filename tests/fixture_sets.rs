//! Integration tests solving the bundled fixture sets.

use testresult::TestResult;

use allotment::{
    fixtures::FixtureSet,
    solvers::{Solver, SolverKind, bisection::ThresholdSolver},
    tally::Tally,
};

#[test]
fn basic_set_matches_expected_totals_with_every_solver() -> TestResult {
    let fixture = FixtureSet::from_set("basic")?;

    for kind in [SolverKind::Threshold, SolverKind::Greedy] {
        for named in fixture.cases() {
            let result = kind.solve(named.case.lanes(), named.case.target())?;

            assert_eq!(
                Some(result.total),
                named.expected,
                "{kind:?} disagrees on {}",
                named.name
            );
            assert_eq!(
                result.allocation.total_draws(),
                i128::from(named.case.target()),
                "{kind:?} draws for {}",
                named.name
            );
        }
    }

    Ok(())
}

#[test]
fn large_set_matches_expected_totals() -> TestResult {
    let fixture = FixtureSet::from_set("large")?;

    for named in fixture.cases() {
        let result = ThresholdSolver::solve(named.case.lanes(), named.case.target())?;

        assert_eq!(Some(result.total), named.expected, "case {}", named.name);
    }

    Ok(())
}

#[test]
fn huge_discount_draws_every_discounted_unit() -> TestResult {
    let fixture = FixtureSet::from_set("large")?;
    let named = fixture.case("huge-discount")?;

    let result = ThresholdSolver::solve(named.case.lanes(), named.case.target())?;

    assert_eq!(
        result.allocation.draws().as_slice(),
        &[1_000_000_000_000, 3]
    );
    assert_eq!(
        result.allocation.threshold(),
        1_000_000_000_000 - named.case.lanes().discount()
    );
    assert!(
        result.total > Tally::from(i64::MAX),
        "expected a total beyond i64"
    );

    Ok(())
}

#[test]
fn staggered_case_trims_the_first_tied_lane() -> TestResult {
    let fixture = FixtureSet::from_set("basic")?;
    let named = fixture.case("staggered")?;

    let result = ThresholdSolver::solve(named.case.lanes(), named.case.target())?;

    // lane 0's first penalty unit ties with lane 2's last discounted unit at cost 2
    assert_eq!(result.allocation.threshold(), 2);
    assert_eq!(result.allocation.draws().as_slice(), &[1, 2, 3]);
    assert_eq!(result.allocation.get(0).map(|draw| draw.trimmed()), Some(1));

    Ok(())
}
