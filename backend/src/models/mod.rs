//! Domain models for the transition engine

pub mod cohort;
pub mod event;
pub mod member;
pub mod plan;
pub mod snapshot;

// Re-exports
pub use cohort::{CohortKind, CohortSet};
pub use event::{EventLog, PipelineEvent};
pub use member::Member;
pub use plan::{TransitionBranch, TransitionPlan};
pub use snapshot::PopulationSnapshot;
