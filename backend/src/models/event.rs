//! Pipeline audit trail
//!
//! Records each stage transition, the solver branch, every apportionment,
//! and every gate outcome of one engine invocation. The log is returned
//! with the outcome so a caller can persist it next to the cohorts.
//!
//! # Example
//!
//! ```rust
//! use workforce_transition_core_rs::models::event::{EventLog, PipelineEvent};
//! use workforce_transition_core_rs::orchestrator::PipelineStage;
//!
//! let mut log = EventLog::new();
//! log.log(PipelineEvent::StageEntered {
//!     stage: PipelineStage::PlanComputed,
//! });
//! assert_eq!(log.events_of_type("StageEntered").len(), 1);
//! ```

use crate::apportion::QuotaKind;
use crate::models::plan::TransitionBranch;
use crate::orchestrator::PipelineStage;
use crate::reconciliation::Gate;
use serde::{Deserialize, Serialize};

/// Something that happened while planning a period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// Pipeline moved to a new stage
    StageEntered { stage: PipelineStage },

    /// Solver chose its branch
    BranchSelected { branch: TransitionBranch },

    /// A global quota was split across categories
    QuotaApportioned {
        quota: QuotaKind,
        total: u64,
        categories: usize,
    },

    /// A reconciliation gate ran
    GateEvaluated { gate: Gate, passed: bool },

    /// Pipeline stopped
    Failed { stage: PipelineStage, reason: String },
}

impl PipelineEvent {
    /// Get a short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            PipelineEvent::StageEntered { .. } => "StageEntered",
            PipelineEvent::BranchSelected { .. } => "BranchSelected",
            PipelineEvent::QuotaApportioned { .. } => "QuotaApportioned",
            PipelineEvent::GateEvaluated { .. } => "GateEvaluated",
            PipelineEvent::Failed { .. } => "Failed",
        }
    }
}

/// Ordered log of pipeline events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<PipelineEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: PipelineEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[PipelineEvent] {
        &self.events
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&PipelineEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Stages visited, in order
    pub fn stages(&self) -> Vec<PipelineStage> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PipelineEvent::StageEntered { stage } => Some(*stage),
                _ => None,
            })
            .collect()
    }
}
