//! Cohort assembly
//!
//! Turns a solved [`TransitionPlan`] into concrete member cohorts.
//!
//! # Flow
//!
//! ```text
//! 1. Apportion experienced terminations by observed category headcount
//! 2. Apportion hires by the configured category strategy
//! 3. Apportion new-hire terminations by hires per category
//! 4. Per category, select experienced terminees   (salt "experienced_termination")
//! 5. continuing_active = starting population - experienced_terminated
//! 6. Synthesize hires per category
//! 7. Per category, select new-hire terminees      (salt "new_hire_termination")
//! 8. new_hire_active = new hires - new_hire_terminated
//! ```
//!
//! Steps 1-3 produce the [`QuotaSet`] checked by the apportionment gate;
//! steps 4-8 produce the [`CohortSet`] checked by the final-size gate.

pub mod synthesis;

pub use synthesis::HireSynthesizer;

use crate::apportion::{apportion, QuotaAllocation, QuotaKind, Weights};
use crate::config::{CategoryWeightStrategy, EngineConfig};
use crate::models::cohort::CohortSet;
use crate::models::member::Member;
use crate::models::plan::TransitionPlan;
use crate::models::snapshot::PopulationSnapshot;
use crate::orchestrator::EngineError;
use crate::selection::{select, Identified, Selection, SelectionError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Salt purpose for choosing experienced terminees.
pub const EXPERIENCED_TERMINATION_SALT: &str = "experienced_termination";

/// Salt purpose for choosing new-hire terminees.
pub const NEW_HIRE_TERMINATION_SALT: &str = "new_hire_termination";

/// Per-category split of all three global quotas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaSet {
    pub hires: QuotaAllocation<String>,
    pub experienced_terminations: QuotaAllocation<String>,
    pub new_hire_terminations: QuotaAllocation<String>,
}

impl QuotaSet {
    pub fn get(&self, kind: QuotaKind) -> &QuotaAllocation<String> {
        match kind {
            QuotaKind::Hires => &self.hires,
            QuotaKind::ExperiencedTerminations => &self.experienced_terminations,
            QuotaKind::NewHireTerminations => &self.new_hire_terminations,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuotaKind, &QuotaAllocation<String>)> + '_ {
        [
            QuotaKind::Hires,
            QuotaKind::ExperiencedTerminations,
            QuotaKind::NewHireTerminations,
        ]
        .into_iter()
        .map(move |kind| (kind, self.get(kind)))
    }
}

/// Builds quotas and cohorts for one period
#[derive(Debug, Clone)]
pub struct CohortAssembler<'a> {
    config: &'a EngineConfig,
    synthesizer: HireSynthesizer,
}

impl<'a> CohortAssembler<'a> {
    pub fn new(config: &'a EngineConfig, snapshot: &PopulationSnapshot) -> Self {
        Self {
            config,
            synthesizer: HireSynthesizer::new(config, snapshot),
        }
    }

    /// Category weights used to distribute hires
    pub fn hire_weights(&self, snapshot: &PopulationSnapshot) -> Result<Weights<String>, EngineError> {
        match self.config.category_weight_strategy() {
            CategoryWeightStrategy::ObservedPriorPeriod => {
                Ok(Weights::from_counts(snapshot.category_counts()))
            }
            CategoryWeightStrategy::FixedTable(table) => Ok(Weights::from_reals(
                table.iter().map(|(k, &w)| (k.clone(), w)),
            )?),
        }
    }

    /// Check every category that can receive hires before solving.
    pub fn check_hire_categories(&self, hire_weights: &Weights<String>) -> Result<(), EngineError> {
        let hireable = hire_weights
            .keys()
            .filter(|k| hire_weights.get(*k).unwrap_or(0) > 0)
            .map(String::as_str);
        self.synthesizer.ensure_categories(hireable)?;
        Ok(())
    }

    /// Split every global quota of the plan across categories
    pub fn apportion_quotas(
        &self,
        snapshot: &PopulationSnapshot,
        plan: &TransitionPlan,
        hire_weights: &Weights<String>,
    ) -> Result<QuotaSet, EngineError> {
        let observed = Weights::from_counts(snapshot.category_counts());
        let experienced_terminations = apportion(plan.experienced_terminations, &observed)?;

        let hires = apportion(plan.total_hires, hire_weights)?;

        let hired = Weights::from_counts(hires.iter().map(|(k, count)| (k.clone(), count)));
        let new_hire_terminations = apportion(plan.new_hire_terminations, &hired)?;

        Ok(QuotaSet {
            hires,
            experienced_terminations,
            new_hire_terminations,
        })
    }

    /// Materialize the four cohorts
    pub fn assemble(&self, snapshot: &PopulationSnapshot, quotas: &QuotaSet) -> Result<CohortSet, EngineError> {
        // Experienced terminations, per category
        let pools: Vec<(u64, Vec<&Member>)> = snapshot
            .by_category()
            .into_iter()
            .map(|(category, members)| {
                (
                    quotas.experienced_terminations.get(&category.to_string()),
                    members,
                )
            })
            .collect();
        let experienced_salt = self.config.salt_for(EXPERIENCED_TERMINATION_SALT);
        let experienced = select_per_category(pools, &experienced_salt)?;

        let experienced_terminated: Vec<Member> = experienced
            .iter()
            .flat_map(|s| s.selected.iter().map(|m| (*m).clone()))
            .collect();
        let terminated_ids: HashSet<&str> = experienced_terminated.iter().map(|m| m.id.as_str()).collect();
        let continuing_active: Vec<Member> = snapshot
            .members()
            .iter()
            .filter(|m| !terminated_ids.contains(m.id.as_str()))
            .cloned()
            .collect();

        // New hires and their terminations, per category
        let new_hires = self.synthesizer.synthesize(&quotas.hires)?;
        let pools: Vec<(u64, Vec<Member>)> = new_hires
            .into_iter()
            .map(|(category, members)| (quotas.new_hire_terminations.get(&category), members))
            .collect();
        let new_hire_salt = self.config.salt_for(NEW_HIRE_TERMINATION_SALT);
        let new_hire = select_per_category(pools, &new_hire_salt)?;

        let mut new_hire_terminated = Vec::new();
        let mut new_hire_active = Vec::new();
        for selection in new_hire {
            new_hire_terminated.extend(selection.selected);
            new_hire_active.extend(selection.remaining);
        }

        Ok(CohortSet {
            continuing_active,
            experienced_terminated,
            new_hire_active,
            new_hire_terminated,
        })
    }
}

/// Run one selection per category pool, preserving pool order
#[cfg(not(feature = "parallel"))]
fn select_per_category<T: Identified>(
    pools: Vec<(u64, Vec<T>)>,
    salt: &str,
) -> Result<Vec<Selection<T>>, SelectionError> {
    pools
        .into_iter()
        .map(|(count, pool)| select(pool, count as usize, salt))
        .collect()
}

/// Run one selection per category pool, preserving pool order
#[cfg(feature = "parallel")]
fn select_per_category<T: Identified + Send>(
    pools: Vec<(u64, Vec<T>)>,
    salt: &str,
) -> Result<Vec<Selection<T>>, SelectionError> {
    use rayon::prelude::*;

    pools
        .into_par_iter()
        .map(|(count, pool)| select(pool, count as usize, salt))
        .collect()
}

/// Headcount per category of a member list
pub fn count_by_category(members: &[Member]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for member in members {
        *counts.entry(member.category.clone()).or_insert(0) += 1;
    }
    counts
}
