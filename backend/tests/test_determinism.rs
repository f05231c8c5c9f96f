//! Determinism tests
//!
//! CRITICAL: Same snapshot + same config = same outcome, byte for byte.

use proptest::prelude::*;
use workforce_transition_core_rs::config::{EngineConfig, RawEngineConfig};
use workforce_transition_core_rs::{plan_period, Member, PopulationSnapshot};

fn snapshot(n: usize, categories: usize) -> PopulationSnapshot {
    PopulationSnapshot::new(
        (0..n)
            .map(|i| {
                Member::new(
                    format!("EMP_{:06}", i),
                    format!("L{}", i % categories + 1),
                    3_000_000 + (i as i64 * 7_919) % 4_000_000,
                )
            })
            .collect(),
    )
    .unwrap()
}

fn config(salt: &str) -> EngineConfig {
    EngineConfig::new(RawEngineConfig {
        target_growth_rate: 0.04,
        experienced_termination_rate: 0.15,
        new_hire_termination_rate: 0.30,
        salt: salt.to_string(),
        period: 2025,
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn test_repeated_runs_have_identical_fingerprints() {
    let population = snapshot(2_000, 5);
    let first = plan_period(&population, &config("")).unwrap();
    let fingerprint = first.fingerprint().unwrap();
    assert_eq!(fingerprint.len(), 64);

    for _ in 0..5 {
        let again = plan_period(&population, &config("")).unwrap();
        assert_eq!(again, first);
        assert_eq!(again.fingerprint().unwrap(), fingerprint);
    }
}

#[test]
fn test_serialized_outcome_is_byte_identical() {
    let population = snapshot(500, 3);
    let a = serde_json::to_string(&plan_period(&population, &config("x")).unwrap()).unwrap();
    let b = serde_json::to_string(&plan_period(&population, &config("x")).unwrap()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_snapshot_order_does_not_change_selection() {
    let population = snapshot(1_000, 4);
    let mut reversed = population.clone().into_members();
    reversed.reverse();
    let reversed = PopulationSnapshot::new(reversed).unwrap();

    let a = plan_period(&population, &config("")).unwrap();
    let b = plan_period(&reversed, &config("")).unwrap();

    let mut a_ids: Vec<&str> = a.cohorts.experienced_terminated.iter().map(|m| m.id.as_str()).collect();
    let mut b_ids: Vec<&str> = b.cohorts.experienced_terminated.iter().map(|m| m.id.as_str()).collect();
    a_ids.sort_unstable();
    b_ids.sort_unstable();
    assert_eq!(a_ids, b_ids);
}

#[test]
fn test_scenario_salt_changes_cohorts_not_counts() {
    let population = snapshot(2_000, 5);
    let a = plan_period(&population, &config("scenario-a")).unwrap();
    let b = plan_period(&population, &config("scenario-b")).unwrap();

    assert_eq!(a.plan, b.plan);
    assert_eq!(a.quotas, b.quotas);
    assert_ne!(a.cohorts.experienced_terminated, b.cohorts.experienced_terminated);
    assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_outcome_is_pure(
        n in 1usize..400,
        categories in 1usize..6,
        growth in -0.5f64..0.5,
        exp in 0.0f64..0.5,
        nh in 0.0f64..0.6,
    ) {
        let population = snapshot(n, categories);
        let config = EngineConfig::new(RawEngineConfig {
            target_growth_rate: growth,
            experienced_termination_rate: exp,
            new_hire_termination_rate: nh,
            max_hire_ratio: 10.0,
            ..Default::default()
        }).unwrap();

        let first = plan_period(&population, &config);
        let second = plan_period(&population, &config);
        prop_assert_eq!(&first, &second);

        if let Ok(outcome) = first {
            prop_assert!(outcome.validation.is_exact_match());
            prop_assert_eq!(outcome.cohorts.ending_count() as u64, outcome.plan.target_ending_count);
        }
    }
}
