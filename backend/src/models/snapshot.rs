//! Population snapshot
//!
//! The validated ending population of the prior period, injected by the
//! caller. The engine never looks anything up on its own.
//!
//! # Critical Invariants
//!
//! 1. **Id uniqueness**: every member id appears exactly once
//! 2. **Well-formed records**: ids and categories are non-empty, compensation
//!    is non-negative
//! 3. **Immutability**: a snapshot is never modified after construction

use crate::config::{CompensationBand, InputError};
use crate::models::member::Member;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Immutable, validated collection of members
///
/// # Example
///
/// ```rust
/// use workforce_transition_core_rs::{Member, PopulationSnapshot};
///
/// let snapshot = PopulationSnapshot::new(vec![
///     Member::new("E1", "L1", 5_000_000),
///     Member::new("E2", "L2", 7_000_000),
///     Member::new("E3", "L1", 5_500_000),
/// ])
/// .unwrap();
///
/// assert_eq!(snapshot.len(), 3);
/// assert_eq!(snapshot.category_counts()["L1"], 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Member>", into = "Vec<Member>")]
pub struct PopulationSnapshot {
    members: Vec<Member>,
}

impl PopulationSnapshot {
    /// Validate and wrap a member list, preserving its order.
    pub fn new(members: Vec<Member>) -> Result<Self, InputError> {
        validate_members(&members)?;
        Ok(Self { members })
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Headcount per category, in category order
    pub fn category_counts(&self) -> BTreeMap<String, u64> {
        let mut counts = BTreeMap::new();
        for member in &self.members {
            *counts.entry(member.category.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Members grouped by category; snapshot order is kept within a group
    pub fn by_category(&self) -> BTreeMap<&str, Vec<&Member>> {
        let mut groups: BTreeMap<&str, Vec<&Member>> = BTreeMap::new();
        for member in &self.members {
            groups.entry(member.category.as_str()).or_default().push(member);
        }
        groups
    }

    /// Observed compensation range of a category, if it has members
    pub fn observed_band(&self, category: &str) -> Option<CompensationBand> {
        let mut compensations = self
            .members
            .iter()
            .filter(|m| m.category == category)
            .map(|m| m.compensation);
        let first = compensations.next()?;
        let (min, max) = compensations.fold((first, first), |(lo, hi), c| (lo.min(c), hi.max(c)));
        Some(CompensationBand::new(min, max))
    }

    pub fn into_members(self) -> Vec<Member> {
        self.members
    }
}

impl TryFrom<Vec<Member>> for PopulationSnapshot {
    type Error = InputError;

    fn try_from(members: Vec<Member>) -> Result<Self, Self::Error> {
        PopulationSnapshot::new(members)
    }
}

impl From<PopulationSnapshot> for Vec<Member> {
    fn from(snapshot: PopulationSnapshot) -> Self {
        snapshot.members
    }
}

fn validate_members(members: &[Member]) -> Result<(), InputError> {
    let mut seen = HashSet::with_capacity(members.len());
    for (position, member) in members.iter().enumerate() {
        if member.id.is_empty() {
            return Err(InputError::EmptyMemberId(position));
        }
        if member.category.is_empty() {
            return Err(InputError::EmptyCategory(member.id.clone()));
        }
        if member.compensation < 0 {
            return Err(InputError::NegativeCompensation {
                id: member.id.clone(),
                compensation: member.compensation,
            });
        }
        if !seen.insert(member.id.as_str()) {
            return Err(InputError::DuplicateMemberId(member.id.clone()));
        }
    }
    Ok(())
}
