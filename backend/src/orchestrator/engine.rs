//! Transition Engine
//!
//! Runs one period through every component:
//!
//! ```text
//! 1. Resolve hire weights, check category attributes   (input validation)
//! 2. Solve the transition plan                          -> PLAN_COMPUTED
//! 3. Gate A: mass balance
//! 4. Apportion hires and both termination quotas        -> QUOTAS_APPORTIONED
//! 5. Gate B: apportionment exactness
//! 6. Select terminees, synthesize hires                 -> COHORTS_ASSEMBLED
//! 7. Gate C: final cohort sizes
//! 8. Done                                               -> VALIDATED
//! ```
//!
//! Any error moves the pipeline to FAILED and is returned as is; nothing
//! partial is ever handed back.
//!
//! # Example
//!
//! ```rust
//! use workforce_transition_core_rs::config::{EngineConfig, RawEngineConfig};
//! use workforce_transition_core_rs::{Member, PopulationSnapshot, TransitionEngine};
//!
//! let members = (0..100)
//!     .map(|i| Member::new(format!("EMP_{:04}", i), if i % 4 == 0 { "L2" } else { "L1" }, 6_000_000))
//!     .collect();
//! let snapshot = PopulationSnapshot::new(members).unwrap();
//!
//! let config = EngineConfig::new(RawEngineConfig {
//!     target_growth_rate: 0.05,
//!     experienced_termination_rate: 0.12,
//!     new_hire_termination_rate: 0.25,
//!     period: 2025,
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! let outcome = TransitionEngine::new(config).plan_period(&snapshot).unwrap();
//! assert_eq!(outcome.plan.target_ending_count, 105);
//! assert_eq!(outcome.cohorts.ending_count(), 105);
//! assert!(outcome.validation.is_exact_match());
//! ```

use crate::apportion::ApportionError;
use crate::assembly::{CohortAssembler, QuotaSet};
use crate::config::{EngineConfig, InputError};
use crate::models::cohort::CohortSet;
use crate::models::event::{EventLog, PipelineEvent};
use crate::models::plan::{TransitionBranch, TransitionPlan};
use crate::models::snapshot::PopulationSnapshot;
use crate::orchestrator::fingerprint::compute_fingerprint;
use crate::orchestrator::pipeline::{Pipeline, PipelineStage};
use crate::reconciliation::{Gate, ReconciliationError, ReconciliationValidator, ValidationResult};
use crate::selection::SelectionError;
use crate::solver::{solve_for, InfeasibleConfiguration};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Top-level engine error
///
/// Every variant is fatal for the period: the caller should treat it as
/// "no plan produced" and halt dependent work.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Infeasible configuration: {0}")]
    Infeasible(#[from] InfeasibleConfiguration),

    #[error("Apportionment error: {0}")]
    Apportion(#[from] ApportionError),

    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    #[error("Reconciliation error: {0}")]
    Reconciliation(#[from] ReconciliationError),

    #[error("Illegal pipeline transition from {from} to {to}")]
    IllegalTransition {
        from: PipelineStage,
        to: PipelineStage,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A failed period with its audit trail
///
/// The last event is always [`PipelineEvent::Failed`].
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{error}")]
pub struct PeriodFailure {
    #[source]
    pub error: EngineError,
    pub events: EventLog,
}

// ============================================================================
// Outcome
// ============================================================================

/// Everything produced for one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodOutcome {
    pub plan: TransitionPlan,
    pub quotas: QuotaSet,
    pub cohorts: CohortSet,
    pub validation: ValidationResult,
    pub events: EventLog,
}

impl PeriodOutcome {
    /// SHA-256 over the canonical JSON form of the outcome
    pub fn fingerprint(&self) -> Result<String, EngineError> {
        compute_fingerprint(self)
    }

    /// Active members, ready to be the next period's input
    pub fn ending_population(&self) -> Result<PopulationSnapshot, EngineError> {
        Ok(self.cohorts.ending_population()?)
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Stateless single-period planner
///
/// Holds only its configuration; every call to [`plan_period`] is a pure
/// function of the snapshot passed in.
///
/// [`plan_period`]: TransitionEngine::plan_period
#[derive(Debug, Clone)]
pub struct TransitionEngine {
    config: EngineConfig,
}

impl TransitionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Solve the plan only, without building cohorts
    pub fn solve(&self, snapshot: &PopulationSnapshot) -> Result<TransitionPlan, EngineError> {
        Ok(solve_for(&self.config, snapshot.len() as u64)?)
    }

    /// Plan one period end to end
    pub fn plan_period(&self, snapshot: &PopulationSnapshot) -> Result<PeriodOutcome, EngineError> {
        self.plan_period_audited(snapshot).map_err(|failure| failure.error)
    }

    /// Like [`plan_period`], but a failure keeps the events logged up to
    /// and including the failure.
    ///
    /// [`plan_period`]: TransitionEngine::plan_period
    pub fn plan_period_audited(&self, snapshot: &PopulationSnapshot) -> Result<PeriodOutcome, PeriodFailure> {
        let mut pipeline = Pipeline::start();
        let mut validator = ReconciliationValidator::new();

        match self.run(snapshot, &mut pipeline, &mut validator) {
            Ok((plan, quotas, cohorts)) => {
                tracing::info!(
                    starting = plan.starting_count,
                    target = plan.target_ending_count,
                    hires = plan.total_hires,
                    experienced_terminations = plan.experienced_terminations,
                    new_hire_terminations = plan.new_hire_terminations,
                    period = self.config.period(),
                    "period planned"
                );
                Ok(PeriodOutcome {
                    plan,
                    quotas,
                    cohorts,
                    validation: validator.finish(),
                    events: pipeline.into_log(),
                })
            }
            Err(error) => {
                let error = pipeline.fail(error);
                Err(PeriodFailure {
                    error,
                    events: pipeline.into_log(),
                })
            }
        }
    }

    pub(crate) fn run(
        &self,
        snapshot: &PopulationSnapshot,
        pipeline: &mut Pipeline,
        validator: &mut ReconciliationValidator,
    ) -> Result<(TransitionPlan, QuotaSet, CohortSet), EngineError> {
        let assembler = CohortAssembler::new(&self.config, snapshot);
        let hire_weights = assembler.hire_weights(snapshot)?;
        assembler.check_hire_categories(&hire_weights)?;

        // Plan
        let plan = self.solve(snapshot)?;
        if let TransitionBranch::ReductionInForce {
            additional_terminations,
        } = plan.branch
        {
            tracing::warn!(
                starting = plan.starting_count,
                target = plan.target_ending_count,
                additional_terminations,
                "survivors meet or exceed target; taking reduction-in-force branch"
            );
        }
        pipeline.record(PipelineEvent::BranchSelected { branch: plan.branch });
        pipeline.advance(PipelineStage::PlanComputed)?;
        record_gate(pipeline, Gate::MassBalance, validator.check_mass_balance(&plan))?;

        // Quotas
        let quotas = assembler.apportion_quotas(snapshot, &plan, &hire_weights)?;
        for (kind, allocation) in quotas.iter() {
            tracing::debug!(quota = %kind, total = allocation.total(), categories = allocation.len(), "quota apportioned");
            pipeline.record(PipelineEvent::QuotaApportioned {
                quota: kind,
                total: allocation.total(),
                categories: allocation.len(),
            });
        }
        pipeline.advance(PipelineStage::QuotasApportioned)?;
        record_gate(
            pipeline,
            Gate::ApportionmentExactness,
            validator.check_apportionment(&plan, &quotas),
        )?;

        // Cohorts
        let cohorts = assembler.assemble(snapshot, &quotas)?;
        pipeline.advance(PipelineStage::CohortsAssembled)?;
        record_gate(
            pipeline,
            Gate::FinalSize,
            validator.check_final_size(&plan, &quotas, &cohorts),
        )?;

        pipeline.advance(PipelineStage::Validated)?;
        Ok((plan, quotas, cohorts))
    }
}

/// Plan one period with a throwaway engine
pub fn plan_period(snapshot: &PopulationSnapshot, config: &EngineConfig) -> Result<PeriodOutcome, EngineError> {
    TransitionEngine::new(config.clone()).plan_period(snapshot)
}

fn record_gate(
    pipeline: &mut Pipeline,
    gate: Gate,
    result: Result<(), ReconciliationError>,
) -> Result<(), ReconciliationError> {
    pipeline.record(PipelineEvent::GateEvaluated {
        gate,
        passed: result.is_ok(),
    });
    result
}

