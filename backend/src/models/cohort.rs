//! Cohorts: the four disjoint outcome groups of a period
//!
//! # Critical Invariants
//!
//! 1. Cohorts are pairwise disjoint by member id
//! 2. `continuing_active + experienced_terminated` is the starting population
//! 3. `new_hire_active + new_hire_terminated` is the synthesized hire pool
//! 4. `continuing_active + new_hire_active` is the ending population

use crate::config::InputError;
use crate::models::member::Member;
use crate::models::snapshot::PopulationSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transition category of a cohort
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CohortKind {
    ContinuingActive,
    ExperiencedTerminated,
    NewHireActive,
    NewHireTerminated,
}

impl CohortKind {
    pub const ALL: [CohortKind; 4] = [
        CohortKind::ContinuingActive,
        CohortKind::ExperiencedTerminated,
        CohortKind::NewHireActive,
        CohortKind::NewHireTerminated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CohortKind::ContinuingActive => "continuing_active",
            CohortKind::ExperiencedTerminated => "experienced_terminated",
            CohortKind::NewHireActive => "new_hire_active",
            CohortKind::NewHireTerminated => "new_hire_terminated",
        }
    }

    /// Whether members of this cohort are part of the ending population
    pub fn is_active(&self) -> bool {
        matches!(self, CohortKind::ContinuingActive | CohortKind::NewHireActive)
    }
}

impl fmt::Display for CohortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four cohorts of one period
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortSet {
    pub continuing_active: Vec<Member>,
    pub experienced_terminated: Vec<Member>,
    pub new_hire_active: Vec<Member>,
    pub new_hire_terminated: Vec<Member>,
}

impl CohortSet {
    pub fn cohort(&self, kind: CohortKind) -> &[Member] {
        match kind {
            CohortKind::ContinuingActive => &self.continuing_active,
            CohortKind::ExperiencedTerminated => &self.experienced_terminated,
            CohortKind::NewHireActive => &self.new_hire_active,
            CohortKind::NewHireTerminated => &self.new_hire_terminated,
        }
    }

    /// Iterate cohorts in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (CohortKind, &[Member])> + '_ {
        CohortKind::ALL.into_iter().map(move |kind| (kind, self.cohort(kind)))
    }

    pub fn size(&self, kind: CohortKind) -> usize {
        self.cohort(kind).len()
    }

    /// Members still active at period end
    pub fn ending_count(&self) -> usize {
        self.continuing_active.len() + self.new_hire_active.len()
    }

    /// Every member touched during the period, active or not
    pub fn total_count(&self) -> usize {
        self.iter().map(|(_, members)| members.len()).sum()
    }

    /// Reassemble the active cohorts as the next period's starting snapshot.
    pub fn ending_population(&self) -> Result<PopulationSnapshot, InputError> {
        let members = self
            .continuing_active
            .iter()
            .chain(self.new_hire_active.iter())
            .cloned()
            .collect();
        PopulationSnapshot::new(members)
    }
}
