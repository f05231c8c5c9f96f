//! Reconciliation gates
//!
//! Three hard stops that re-verify what the algorithm guarantees by
//! construction. A failing gate means an implementation defect, never a
//! bad input, and is reported with an expected-vs-actual breakdown.
//!
//! # Gates
//!
//! - **A, mass balance**: `hires - exp_terms - nh_terms == target - start`
//! - **B, apportionment exactness**: each quota's category counts sum to
//!   its global total
//! - **C, final size**: cohort sizes match the plan, per category and in
//!   total; cohorts are disjoint; the active population equals the target

use crate::apportion::QuotaKind;
use crate::assembly::{count_by_category, QuotaSet};
use crate::models::cohort::{CohortKind, CohortSet};
use crate::models::plan::TransitionPlan;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Reconciliation gate identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    MassBalance,
    ApportionmentExactness,
    FinalSize,
}

impl Gate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gate::MassBalance => "mass_balance",
            Gate::ApportionmentExactness => "apportionment_exactness",
            Gate::FinalSize => "final_size",
        }
    }

    /// Status reported when this gate fails
    pub fn failure_status(&self) -> ValidationStatus {
        match self {
            Gate::MassBalance => ValidationStatus::MassBalanceMismatch,
            Gate::ApportionmentExactness => ValidationStatus::ApportionmentMismatch,
            Gate::FinalSize => ValidationStatus::CohortSizeMismatch,
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall validation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    ExactMatch,
    MassBalanceMismatch,
    ApportionmentMismatch,
    CohortSizeMismatch,
}

/// One expected-vs-actual comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    pub item: String,
    pub expected: i128,
    pub actual: i128,
}

impl Check {
    pub fn new(item: impl Into<String>, expected: i128, actual: i128) -> Self {
        Self {
            item: item.into(),
            expected,
            actual,
        }
    }

    pub fn passed(&self) -> bool {
        self.expected == self.actual
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: expected {}, actual {}", self.item, self.expected, self.actual)
    }
}

/// Result of running one gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateReport {
    pub gate: Gate,
    pub checks: Vec<Check>,
}

impl GateReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(Check::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| !c.passed())
    }
}

/// A gate failed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{gate} gate failed: {summary}")]
pub struct ReconciliationError {
    pub gate: Gate,
    pub summary: String,
    pub report: GateReport,
}

impl ReconciliationError {
    fn from_report(report: GateReport) -> Self {
        let summary = report
            .failures()
            .map(Check::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            gate: report.gate,
            summary,
            report,
        }
    }

    pub fn status(&self) -> ValidationStatus {
        self.gate.failure_status()
    }
}

/// Outcome of all gates for a successful invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub status: ValidationStatus,
    pub gates: Vec<GateReport>,
}

impl ValidationResult {
    pub fn is_exact_match(&self) -> bool {
        self.status == ValidationStatus::ExactMatch
    }

    pub fn gate(&self, gate: Gate) -> Option<&GateReport> {
        self.gates.iter().find(|r| r.gate == gate)
    }
}

// ============================================================================
// Gate checks
// ============================================================================

/// Gate A checks
pub fn mass_balance_checks(plan: &TransitionPlan) -> GateReport {
    let net_flow = plan.total_hires as i128
        - plan.experienced_terminations as i128
        - plan.new_hire_terminations as i128;
    GateReport {
        gate: Gate::MassBalance,
        checks: vec![
            Check::new("net_flow", plan.net_change(), net_flow),
            Check::new("reconciliation_error", 0, plan.reconciliation_error as i128),
        ],
    }
}

/// Gate B checks
pub fn apportionment_checks(plan: &TransitionPlan, quotas: &QuotaSet) -> GateReport {
    let checks = quotas
        .iter()
        .flat_map(|(kind, allocation)| {
            let planned = match kind {
                QuotaKind::Hires => plan.total_hires,
                QuotaKind::ExperiencedTerminations => plan.experienced_terminations,
                QuotaKind::NewHireTerminations => plan.new_hire_terminations,
            };
            [
                Check::new(format!("{}.total", kind), planned as i128, allocation.total() as i128),
                Check::new(format!("{}.sum", kind), planned as i128, allocation.allocated() as i128),
            ]
        })
        .collect();
    GateReport {
        gate: Gate::ApportionmentExactness,
        checks,
    }
}

/// Gate C checks
pub fn final_size_checks(plan: &TransitionPlan, quotas: &QuotaSet, cohorts: &CohortSet) -> GateReport {
    let mut checks = vec![
        Check::new(
            CohortKind::ContinuingActive.as_str(),
            plan.continuing_count() as i128,
            cohorts.continuing_active.len() as i128,
        ),
        Check::new(
            CohortKind::ExperiencedTerminated.as_str(),
            plan.experienced_terminations as i128,
            cohorts.experienced_terminated.len() as i128,
        ),
        Check::new(
            CohortKind::NewHireActive.as_str(),
            plan.new_hire_active_count() as i128,
            cohorts.new_hire_active.len() as i128,
        ),
        Check::new(
            CohortKind::NewHireTerminated.as_str(),
            plan.new_hire_terminations as i128,
            cohorts.new_hire_terminated.len() as i128,
        ),
        Check::new(
            "ending_population",
            plan.target_ending_count as i128,
            cohorts.ending_count() as i128,
        ),
    ];

    let mut ids = HashSet::with_capacity(cohorts.total_count());
    let duplicates = cohorts
        .iter()
        .flat_map(|(_, members)| members.iter())
        .filter(|m| !ids.insert(m.id.as_str()))
        .count();
    checks.push(Check::new("overlapping_members", 0, duplicates as i128));

    let per_category = [
        (
            CohortKind::ExperiencedTerminated,
            &quotas.experienced_terminations,
            count_by_category(&cohorts.experienced_terminated),
        ),
        (
            CohortKind::NewHireTerminated,
            &quotas.new_hire_terminations,
            count_by_category(&cohorts.new_hire_terminated),
        ),
    ];
    for (kind, allocation, actual) in per_category {
        for (category, expected) in allocation.iter() {
            checks.push(Check::new(
                format!("{}[{}]", kind, category),
                expected as i128,
                actual.get(category).copied().unwrap_or(0) as i128,
            ));
        }
    }

    GateReport {
        gate: Gate::FinalSize,
        checks,
    }
}

/// Accumulates gate reports across pipeline stages
#[derive(Debug, Clone, Default)]
pub struct ReconciliationValidator {
    reports: Vec<GateReport>,
}

impl ReconciliationValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a gate report, failing on any mismatch.
    fn enforce(&mut self, report: GateReport) -> Result<(), ReconciliationError> {
        if !report.passed() {
            return Err(ReconciliationError::from_report(report));
        }
        self.reports.push(report);
        Ok(())
    }

    pub fn check_mass_balance(&mut self, plan: &TransitionPlan) -> Result<(), ReconciliationError> {
        self.enforce(mass_balance_checks(plan))
    }

    pub fn check_apportionment(&mut self, plan: &TransitionPlan, quotas: &QuotaSet) -> Result<(), ReconciliationError> {
        self.enforce(apportionment_checks(plan, quotas))
    }

    pub fn check_final_size(
        &mut self,
        plan: &TransitionPlan,
        quotas: &QuotaSet,
        cohorts: &CohortSet,
    ) -> Result<(), ReconciliationError> {
        self.enforce(final_size_checks(plan, quotas, cohorts))
    }

    pub fn finish(self) -> ValidationResult {
        ValidationResult {
            status: ValidationStatus::ExactMatch,
            gates: self.reports,
        }
    }
}
