//! Deterministic cohort selection
//!
//! Picks exactly N members from a pool by ranking each candidate on
//! `(stable_hash(id, salt), id)` and taking the first N.
//!
//! # Key Principles
//!
//! 1. **Exact cardinality**: always N, never N±1
//! 2. **Total order**: the id tiebreaker makes the ranking unambiguous
//! 3. **Decorrelation**: a different salt gives an unrelated ranking
//! 4. **Purity**: no shared RNG state; result depends only on inputs

mod hash;

pub use hash::stable_hash;

use crate::models::member::Member;
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during selection
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Cannot select {requested} from a pool of {available}")]
    InsufficientCandidates { requested: usize, available: usize },

    #[error("Candidate id {0} appears more than once in the pool")]
    DuplicateCandidate(String),
}

/// Anything with a stable identifier can be selected
pub trait Identified {
    fn member_id(&self) -> &str;
}

impl Identified for Member {
    fn member_id(&self) -> &str {
        &self.id
    }
}

impl<T: Identified + ?Sized> Identified for &T {
    fn member_id(&self) -> &str {
        (**self).member_id()
    }
}

impl Identified for String {
    fn member_id(&self) -> &str {
        self
    }
}

/// Outcome of a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<T> {
    /// Chosen candidates, in ranking order
    pub selected: Vec<T>,

    /// Everything else, in the original pool order
    pub remaining: Vec<T>,
}

/// Select exactly `count` candidates
///
/// # Example
///
/// ```rust
/// use workforce_transition_core_rs::selection::select;
///
/// let pool: Vec<String> = (0..10).map(|i| format!("EMP_{i}")).collect();
/// let first = select(pool.clone(), 4, "experienced_termination").unwrap();
/// let again = select(pool, 4, "experienced_termination").unwrap();
///
/// assert_eq!(first.selected.len(), 4);
/// assert_eq!(first.remaining.len(), 6);
/// assert_eq!(first, again);
/// ```
pub fn select<T: Identified>(candidates: Vec<T>, count: usize, salt: &str) -> Result<Selection<T>, SelectionError> {
    if count > candidates.len() {
        return Err(SelectionError::InsufficientCandidates {
            requested: count,
            available: candidates.len(),
        });
    }

    let mut seen = HashSet::with_capacity(candidates.len());
    for candidate in &candidates {
        if !seen.insert(candidate.member_id()) {
            return Err(SelectionError::DuplicateCandidate(
                candidate.member_id().to_string(),
            ));
        }
    }

    let mut ranking: Vec<(u64, usize)> = candidates
        .iter()
        .enumerate()
        .map(|(index, c)| (stable_hash(c.member_id(), salt), index))
        .collect();
    ranking.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| candidates[a.1].member_id().cmp(candidates[b.1].member_id()))
    });

    let mut chosen_rank = vec![None; candidates.len()];
    for (rank, &(_, index)) in ranking.iter().take(count).enumerate() {
        chosen_rank[index] = Some(rank);
    }

    let mut selected: Vec<(usize, T)> = Vec::with_capacity(count);
    let mut remaining = Vec::with_capacity(candidates.len() - count);
    for (candidate, rank) in candidates.into_iter().zip(chosen_rank) {
        match rank {
            Some(rank) => selected.push((rank, candidate)),
            None => remaining.push(candidate),
        }
    }
    selected.sort_by_key(|(rank, _)| *rank);

    Ok(Selection {
        selected: selected.into_iter().map(|(_, c)| c).collect(),
        remaining,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("EMP_{:05}", i)).collect()
    }

    #[test]
    fn test_select_zero() {
        let result = select(pool(5), 0, "s").unwrap();
        assert!(result.selected.is_empty());
        assert_eq!(result.remaining, pool(5));
    }

    #[test]
    fn test_select_all() {
        let result = select(pool(5), 5, "s").unwrap();
        assert_eq!(result.selected.len(), 5);
        assert!(result.remaining.is_empty());
    }

    #[test]
    fn test_over_selection_rejected() {
        assert_eq!(
            select(pool(3), 4, "s"),
            Err(SelectionError::InsufficientCandidates {
                requested: 4,
                available: 3
            })
        );
    }

    #[test]
    fn test_duplicate_candidates_rejected() {
        let candidates = vec!["A".to_string(), "B".to_string(), "A".to_string()];
        assert_eq!(
            select(candidates, 1, "s"),
            Err(SelectionError::DuplicateCandidate("A".to_string()))
        );
    }

    #[test]
    fn test_selection_independent_of_pool_order() {
        let forward = pool(50);
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = select(forward, 12, "salt").unwrap();
        let b = select(reversed, 12, "salt").unwrap();
        assert_eq!(a.selected, b.selected);
    }

    #[test]
    fn test_selection_is_prefix_stable() {
        // Growing N only ever adds members; it never swaps earlier picks.
        let small = select(pool(40), 5, "salt").unwrap();
        let large = select(pool(40), 15, "salt").unwrap();
        assert_eq!(&large.selected[..5], &small.selected[..]);
    }
}
