//! Transition solver tests
//!
//! Covers the reference scenarios, both branches, every feasibility guard,
//! and the mass-balance property over random feasible inputs.

use proptest::prelude::*;
use workforce_transition_core_rs::core::rate::{Rate, RATE_SCALE};
use workforce_transition_core_rs::solver::{solve, solve_for, InfeasibleConfiguration};
use workforce_transition_core_rs::{EngineConfig, RawEngineConfig, TransitionBranch};

fn rate(value: f64) -> Rate {
    Rate::from_f64(value).unwrap()
}

// ============================================================================
// Reference scenarios
// ============================================================================

#[test]
fn test_scenario_growth() {
    let plan = solve(7000, rate(0.03), rate(0.25), rate(0.40), rate(0.5)).unwrap();

    assert_eq!(plan.target_ending_count, 7210);
    assert_eq!(plan.experienced_terminations, 1750);
    assert_eq!(plan.total_hires, 3267);
    assert_eq!(plan.new_hire_terminations, 1307);
    assert_eq!(plan.branch, TransitionBranch::Growth);
    assert_eq!(7000 + 3267 - 1750 - 1307, 7210);
    assert_eq!(plan.reconciliation_error, 0);
}

#[test]
fn test_scenario_reduction_in_force() {
    let plan = solve(1000, rate(-0.10), rate(0.05), rate(0.0), rate(0.5)).unwrap();

    assert_eq!(plan.target_ending_count, 900);
    assert_eq!(plan.total_hires, 0);
    assert_eq!(plan.new_hire_terminations, 0);
    assert_eq!(plan.experienced_terminations, 100);
    assert_eq!(
        plan.branch,
        TransitionBranch::ReductionInForce {
            additional_terminations: 50
        }
    );
    assert_eq!(plan.starting_count - plan.experienced_terminations, 900);
}

#[test]
fn test_scenario_retention_boundary_is_strict() {
    let result = solve(1000, rate(0.05), rate(0.1), rate(0.99), rate(0.5));
    assert_eq!(
        result,
        Err(InfeasibleConfiguration::NewHireRetentionTooLow {
            new_hire_termination_rate: rate(0.99),
            minimum: Rate::from_ppb(10_000_000),
        })
    );
}

#[test]
fn test_retention_just_above_boundary_is_feasible() {
    let plan = solve(1000, rate(0.0), rate(0.001), rate(0.989), rate(1.0)).unwrap();
    assert_eq!(plan.reconciliation_error, 0);
}

// ============================================================================
// Guards
// ============================================================================

#[test]
fn test_growth_magnitude_guard() {
    assert!(matches!(
        solve(10, rate(1.5), rate(0.0), rate(0.0), rate(5.0)),
        Err(InfeasibleConfiguration::GrowthRateOutOfRange { .. })
    ));
}

#[test]
fn test_hire_ratio_guard_at_exact_limit() {
    // target 150, survivors 100, hires 50 == 100 * 0.5 -> allowed
    let plan = solve(100, rate(0.5), rate(0.0), rate(0.0), rate(0.5)).unwrap();
    assert_eq!(plan.total_hires, 50);

    // one more hire needed -> rejected
    assert!(matches!(
        solve(100, rate(0.51), rate(0.0), rate(0.0), rate(0.5)),
        Err(InfeasibleConfiguration::HireRatioExceeded { total_hires: 51, .. })
    ));
}

#[test]
fn test_negative_new_hire_terminations_guard() {
    // retention 1.5: hires ceil(10 / 1.5) = 7, residual 7 - 0 - 10 = -3
    assert_eq!(
        solve(100, rate(0.1), rate(0.0), rate(-0.5), rate(0.5)),
        Err(InfeasibleConfiguration::NewHireTerminationsOutOfRange {
            new_hire_terminations: -3,
            total_hires: 7,
        })
    );
}

#[test]
fn test_solve_for_uses_config_rates() {
    let config = EngineConfig::new(RawEngineConfig {
        target_growth_rate: 0.03,
        experienced_termination_rate: 0.25,
        new_hire_termination_rate: 0.40,
        ..Default::default()
    })
    .unwrap();
    let plan = solve_for(&config, 7000).unwrap();
    assert_eq!(plan.total_hires, 3267);
}

#[test]
fn test_small_population_rounding() {
    // 3 * 1.1 = 3.3 -> 3; floor(3 * 0.2) = 0 -> RIF with zero additional
    let plan = solve(3, rate(0.1), rate(0.2), rate(0.3), rate(0.5)).unwrap();
    assert_eq!(plan.target_ending_count, 3);
    assert_eq!(plan.experienced_terminations, 0);
    assert_eq!(plan.total_hires, 0);
    assert!(plan.branch.is_reduction_in_force());
}

// ============================================================================
// Properties
// ============================================================================

const GENEROUS_HIRE_RATIO: Rate = Rate::from_ppb(1_000 * RATE_SCALE);

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 512,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_feasible_inputs_reconcile_exactly(
        start in 0u64..200_000,
        growth in -RATE_SCALE..=RATE_SCALE,
        exp in 0i64..RATE_SCALE,
        nh in 0i64..(RATE_SCALE - 10_000_000),
    ) {
        let plan = solve(
            start,
            Rate::from_ppb(growth),
            Rate::from_ppb(exp),
            Rate::from_ppb(nh),
            GENEROUS_HIRE_RATIO,
        ).unwrap();

        prop_assert_eq!(plan.reconciliation_error, 0);
        prop_assert_eq!(plan.implied_ending_count(), plan.target_ending_count as i128);
        prop_assert!(plan.new_hire_terminations <= plan.total_hires);
        prop_assert!(plan.experienced_terminations <= plan.starting_count);
    }

    #[test]
    fn prop_rif_branch_has_no_hires(
        start in 1u64..100_000,
        growth in -RATE_SCALE..0,
        exp in 0i64..RATE_SCALE,
    ) {
        let plan = solve(
            start,
            Rate::from_ppb(growth),
            Rate::from_ppb(exp),
            Rate::ZERO,
            GENEROUS_HIRE_RATIO,
        ).unwrap();

        if plan.branch.is_reduction_in_force() {
            prop_assert_eq!(plan.total_hires, 0);
            prop_assert_eq!(plan.new_hire_terminations, 0);
            prop_assert_eq!(plan.starting_count - plan.experienced_terminations, plan.target_ending_count);
        }
    }

    #[test]
    fn prop_solver_is_deterministic(
        start in 0u64..50_000,
        growth in -RATE_SCALE..=RATE_SCALE,
        exp in 0i64..RATE_SCALE,
        nh in 0i64..(RATE_SCALE - 10_000_000),
    ) {
        let a = solve(start, Rate::from_ppb(growth), Rate::from_ppb(exp), Rate::from_ppb(nh), GENEROUS_HIRE_RATIO);
        let b = solve(start, Rate::from_ppb(growth), Rate::from_ppb(exp), Rate::from_ppb(nh), GENEROUS_HIRE_RATIO);
        prop_assert_eq!(a, b);
    }
}
