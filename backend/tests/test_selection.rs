//! Deterministic selection tests
//!
//! CRITICAL: Same salt, same pool -> same selection. Always exactly N.

use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};
use workforce_transition_core_rs::selection::{select, stable_hash, SelectionError};
use workforce_transition_core_rs::Member;

fn pool(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("EMP_{:06}", i)).collect()
}

#[test]
fn test_selects_members_by_reference() {
    let members: Vec<Member> = (0..20)
        .map(|i| Member::new(format!("E{}", i), "L1", 1_000))
        .collect();
    let refs: Vec<&Member> = members.iter().collect();

    let selection = select(refs, 7, "experienced_termination").unwrap();

    assert_eq!(selection.selected.len(), 7);
    assert_eq!(selection.remaining.len(), 13);
}

#[test]
fn test_selected_are_lowest_composite_keys() {
    let candidates = pool(100);
    let salt = "experienced_termination";
    let selection = select(candidates.clone(), 10, salt).unwrap();

    let mut keyed: Vec<(u64, &String)> = candidates.iter().map(|id| (stable_hash(id, salt), id)).collect();
    keyed.sort();
    let expected: Vec<String> = keyed.iter().take(10).map(|(_, id)| (*id).clone()).collect();

    assert_eq!(selection.selected, expected);
}

#[test]
fn test_remaining_keeps_pool_order() {
    let candidates = pool(30);
    let selection = select(candidates.clone(), 10, "s").unwrap();
    let selected: HashSet<&String> = selection.selected.iter().collect();
    let expected: Vec<String> = candidates.into_iter().filter(|c| !selected.contains(c)).collect();
    assert_eq!(selection.remaining, expected);
}

#[test]
fn test_different_salts_give_different_selections() {
    let a = select(pool(500), 50, "experienced_termination").unwrap();
    let b = select(pool(500), 50, "new_hire_termination").unwrap();
    assert_ne!(a.selected, b.selected);
}

#[test]
fn test_empty_pool() {
    let selection = select(Vec::<String>::new(), 0, "s").unwrap();
    assert!(selection.selected.is_empty());
    assert!(matches!(
        select(Vec::<String>::new(), 1, "s"),
        Err(SelectionError::InsufficientCandidates { requested: 1, available: 0 })
    ));
}

/// Overlap between two independent N-of-M draws is hypergeometric with
/// mean N^2 / M. Averaged over many salt pairs it must sit close to that.
#[test]
fn test_no_systematic_overlap_bias_across_salts() {
    const M: usize = 1_000;
    const N: usize = 100;
    const PAIRS: usize = 200;

    let candidates = pool(M);
    let mut total_overlap = 0usize;
    for i in 0..PAIRS {
        let a: HashSet<String> = select(candidates.clone(), N, &format!("experienced_termination:{}", i))
            .unwrap()
            .selected
            .into_iter()
            .collect();
        let b = select(candidates.clone(), N, &format!("new_hire_termination:{}", i)).unwrap();
        total_overlap += b.selected.iter().filter(|id| a.contains(*id)).count();
    }

    let mean = total_overlap as f64 / PAIRS as f64;
    let expected = (N * N) as f64 / M as f64;
    // sd of one overlap ~2.85; sd of the mean over 200 pairs ~0.2
    assert!((mean - expected).abs() < 1.0, "mean overlap {} vs expected {}", mean, expected);
}

/// Each member should be picked at roughly the selection rate across salts.
#[test]
fn test_no_member_systematically_favored() {
    const M: usize = 200;
    const N: usize = 20;
    const SALTS: usize = 500;

    let candidates = pool(M);
    let mut hits = vec![0usize; M];
    for s in 0..SALTS {
        let selection = select(candidates.clone(), N, &format!("salt_{}", s)).unwrap();
        for id in selection.selected {
            let index: usize = id["EMP_".len()..].parse().unwrap();
            hits[index] += 1;
        }
    }

    // Expected 50 hits each (binomial sd ~6.7); nobody should be near 0 or 100
    let min = *hits.iter().min().unwrap();
    let max = *hits.iter().max().unwrap();
    assert!(min >= 20, "least selected member picked {} times", min);
    assert!(max <= 85, "most selected member picked {} times", max);
}

proptest! {
    #[test]
    fn prop_exact_cardinality_and_partition(size in 0usize..300, fraction in 0.0f64..=1.0, salt in "[a-z_]{0,16}") {
        let count = ((size as f64) * fraction).floor() as usize;
        let candidates = pool(size);

        let selection = select(candidates.clone(), count, &salt).unwrap();

        prop_assert_eq!(selection.selected.len(), count);
        prop_assert_eq!(selection.remaining.len(), size - count);

        let selected: BTreeSet<&String> = selection.selected.iter().collect();
        prop_assert_eq!(selected.len(), count);

        let union: BTreeSet<&String> = selection.selected.iter().chain(selection.remaining.iter()).collect();
        let original: BTreeSet<&String> = candidates.iter().collect();
        prop_assert_eq!(union, original);
    }

    #[test]
    fn prop_same_salt_same_selection(size in 1usize..200, salt in "[a-z0-9]{1,12}") {
        let count = size / 3;
        let first = select(pool(size), count, &salt).unwrap();
        let second = select(pool(size), count, &salt).unwrap();
        prop_assert_eq!(first, second);
    }
}
