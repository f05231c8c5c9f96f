//! Workforce Transition Core - Rust Engine
//!
//! Computes, for one period of a population undergoing turnover and growth,
//! the exact hires and terminations needed to reach a target size, splits
//! them across categories, and materializes the member cohorts.
//!
//! # Architecture
//!
//! - **core**: Fixed-point rates and integer rounding
//! - **config**: Validated engine configuration
//! - **models**: Domain types (Member, PopulationSnapshot, TransitionPlan, cohorts)
//! - **solver**: Single-rounding transition solver
//! - **apportion**: Largest-remainder quota apportionment
//! - **selection**: Deterministic hash-based selection
//! - **assembly**: Cohort assembly and new-hire synthesis
//! - **reconciliation**: Hard-stop validation gates
//! - **orchestrator**: Pipeline state machine and engine driver
//!
//! # Critical Invariants
//!
//! 1. `start + hires - exp_terms - nh_terms == target`, exactly
//! 2. Every apportionment sums to its global total
//! 3. Every selection of N returns exactly N distinct members
//! 4. Same snapshot + config produces byte-identical output

// Module declarations
pub mod apportion;
pub mod assembly;
pub mod config;
pub mod core;
pub mod models;
pub mod orchestrator;
pub mod reconciliation;
pub mod selection;
pub mod solver;

// Re-exports for convenience
pub use apportion::{apportion, ApportionError, QuotaAllocation, QuotaKind, Weights};
pub use assembly::{CohortAssembler, QuotaSet};
pub use config::{CategoryWeightStrategy, CompensationBand, EngineConfig, InputError, RawEngineConfig};
pub use crate::core::rate::Rate;
pub use models::{
    cohort::{CohortKind, CohortSet},
    event::{EventLog, PipelineEvent},
    member::Member,
    plan::{TransitionBranch, TransitionPlan},
    snapshot::PopulationSnapshot,
};
pub use orchestrator::{plan_period, EngineError, PeriodFailure, PeriodOutcome, PipelineStage, TransitionEngine};
pub use reconciliation::{Gate, ReconciliationError, ValidationResult, ValidationStatus};
pub use selection::{select, stable_hash, Selection, SelectionError};
pub use solver::{solve, InfeasibleConfiguration};
