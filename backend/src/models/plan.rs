//! Transition plan produced by the solver

use serde::{Deserialize, Serialize};

/// Which algebraic branch produced the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TransitionBranch {
    /// Survivors fall short of the target; hires close the gap
    Growth,

    /// Survivors already exceed the target; extra terminations, no hires
    ReductionInForce {
        /// Terminations added on top of the rate-driven ones
        additional_terminations: u64,
    },
}

impl TransitionBranch {
    pub fn is_reduction_in_force(&self) -> bool {
        matches!(self, TransitionBranch::ReductionInForce { .. })
    }
}

/// Integer-exact transition counts for one period
///
/// # Critical Invariants
///
/// `starting_count + total_hires - experienced_terminations - new_hire_terminations
/// == target_ending_count`, i.e. `reconciliation_error == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionPlan {
    pub starting_count: u64,
    pub target_ending_count: u64,
    pub total_hires: u64,
    pub experienced_terminations: u64,
    pub new_hire_terminations: u64,
    pub reconciliation_error: i64,
    pub branch: TransitionBranch,
}

impl TransitionPlan {
    /// Ending population implied by the plan's flows.
    pub fn implied_ending_count(&self) -> i128 {
        self.starting_count as i128 + self.total_hires as i128
            - self.experienced_terminations as i128
            - self.new_hire_terminations as i128
    }

    /// Target change in headcount (may be negative).
    pub fn net_change(&self) -> i128 {
        self.target_ending_count as i128 - self.starting_count as i128
    }

    pub fn continuing_count(&self) -> u64 {
        self.starting_count - self.experienced_terminations
    }

    pub fn new_hire_active_count(&self) -> u64 {
        self.total_hires - self.new_hire_terminations
    }

    pub fn is_exact(&self) -> bool {
        self.reconciliation_error == 0
    }
}
