//! Orchestrator - runs one planning period end to end
//!
//! See `engine.rs` for the driver and `pipeline.rs` for the state machine.

pub mod engine;
pub mod fingerprint;
pub mod pipeline;

pub use engine::{plan_period, EngineError, PeriodFailure, PeriodOutcome, TransitionEngine};
pub use fingerprint::compute_fingerprint;
pub use pipeline::{Pipeline, PipelineStage};
