//! Pipeline state machine
//!
//! ```text
//! ConfigValidated -> PlanComputed -> QuotasApportioned -> CohortsAssembled -> Validated
//!        \________________\_________________\___________________\___________-> Failed
//! ```
//!
//! `Validated` and `Failed` are terminal. There is no partial success: an
//! invocation either reaches `Validated` or produces nothing.

use crate::models::event::{EventLog, PipelineEvent};
use crate::orchestrator::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named pipeline states
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStage {
    ConfigValidated,
    PlanComputed,
    QuotasApportioned,
    CohortsAssembled,
    Validated,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::ConfigValidated => "CONFIG_VALIDATED",
            PipelineStage::PlanComputed => "PLAN_COMPUTED",
            PipelineStage::QuotasApportioned => "QUOTAS_APPORTIONED",
            PipelineStage::CohortsAssembled => "COHORTS_ASSEMBLED",
            PipelineStage::Validated => "VALIDATED",
            PipelineStage::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Validated | PipelineStage::Failed)
    }

    /// The only forward successor of a non-terminal stage
    pub fn successor(&self) -> Option<PipelineStage> {
        match self {
            PipelineStage::ConfigValidated => Some(PipelineStage::PlanComputed),
            PipelineStage::PlanComputed => Some(PipelineStage::QuotasApportioned),
            PipelineStage::QuotasApportioned => Some(PipelineStage::CohortsAssembled),
            PipelineStage::CohortsAssembled => Some(PipelineStage::Validated),
            PipelineStage::Validated | PipelineStage::Failed => None,
        }
    }

    pub fn can_transition_to(&self, next: PipelineStage) -> bool {
        if self.is_terminal() {
            return false;
        }
        next == PipelineStage::Failed || self.successor() == Some(next)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the current stage of one invocation and logs every move
#[derive(Debug, Clone)]
pub struct Pipeline {
    stage: PipelineStage,
    log: EventLog,
}

impl Pipeline {
    /// Start a pipeline whose configuration has already been validated
    pub fn start() -> Self {
        let mut log = EventLog::new();
        log.log(PipelineEvent::StageEntered {
            stage: PipelineStage::ConfigValidated,
        });
        Self {
            stage: PipelineStage::ConfigValidated,
            log,
        }
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn record(&mut self, event: PipelineEvent) {
        self.log.log(event);
    }

    /// Move to `next`, rejecting anything but the forward successor
    pub fn advance(&mut self, next: PipelineStage) -> Result<(), EngineError> {
        if next == PipelineStage::Failed || !self.stage.can_transition_to(next) {
            return Err(EngineError::IllegalTransition {
                from: self.stage,
                to: next,
            });
        }
        tracing::debug!(from = %self.stage, to = %next, "pipeline stage transition");
        self.stage = next;
        self.log.log(PipelineEvent::StageEntered { stage: next });
        Ok(())
    }

    /// Enter the terminal failure state, returning the error unchanged.
    pub fn fail(&mut self, error: EngineError) -> EngineError {
        let stage = self.stage;
        if self.stage.can_transition_to(PipelineStage::Failed) {
            self.stage = PipelineStage::Failed;
        }
        tracing::error!(stage = %stage, error = %error, "pipeline failed");
        self.log.log(PipelineEvent::Failed {
            stage,
            reason: error.to_string(),
        });
        error
    }

    pub fn into_log(self) -> EventLog {
        self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_path_reaches_validated() {
        let mut pipeline = Pipeline::start();
        let mut stage = pipeline.stage();
        while let Some(next) = stage.successor() {
            pipeline.advance(next).unwrap();
            stage = next;
        }
        assert_eq!(pipeline.stage(), PipelineStage::Validated);
        assert_eq!(pipeline.log().stages().len(), 5);
    }

    #[test]
    fn test_skipping_a_stage_is_illegal() {
        let mut pipeline = Pipeline::start();
        let err = pipeline.advance(PipelineStage::CohortsAssembled).unwrap_err();
        assert_eq!(
            err,
            EngineError::IllegalTransition {
                from: PipelineStage::ConfigValidated,
                to: PipelineStage::CohortsAssembled,
            }
        );
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut pipeline = Pipeline::start();
        pipeline.fail(EngineError::Serialization("boom".to_string()));
        assert_eq!(pipeline.stage(), PipelineStage::Failed);
        assert!(pipeline.advance(PipelineStage::PlanComputed).is_err());
        assert_eq!(pipeline.log().events_of_type("Failed").len(), 1);
    }
}
