//! Transition solver
//!
//! Derives integer-exact hire and termination counts from continuous rates.
//!
//! # Algorithm
//!
//! ```text
//! target     = round_half_even(start * (1 + growth))     rounded once
//! exp_terms  = floor(start * exp_term_rate)               rounded once, down
//! survivors  = start - exp_terms
//! net        = target - survivors
//!
//! net > 0  (growth):
//!   hires    = ceil(net / (1 - nh_term_rate))             rounded once, up
//!   nh_terms = hires - exp_terms - (target - start)       residual, never rounded
//!
//! net <= 0 (reduction in force):
//!   hires = 0, nh_terms = 0, exp_terms += -net
//! ```
//!
//! The residual absorbs all rounding error by construction, so
//! `start + hires - exp_terms - nh_terms == target` always holds.
//!
//! # Feasibility Guards
//!
//! Checked before any cohort work; a violation is fatal and never clamped:
//! - `|growth| <= 1`
//! - `1 - nh_term_rate > 0.01`
//! - `hires <= start * max_hire_ratio`
//! - `0 <= nh_terms <= hires`

use crate::config::EngineConfig;
use crate::core::rate::Rate;
use crate::models::plan::{TransitionBranch, TransitionPlan};
use thiserror::Error;

/// Smallest admissible new-hire retention, exclusive (0.01).
pub const MIN_NEW_HIRE_RETENTION: Rate = Rate::from_ppb(10_000_000);

/// Largest admissible growth magnitude, inclusive (1.0).
pub const MAX_GROWTH_MAGNITUDE: Rate = Rate::ONE;

/// A feasibility guard failed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InfeasibleConfiguration {
    #[error("Growth rate {growth_rate} exceeds magnitude bound {bound}")]
    GrowthRateOutOfRange { growth_rate: Rate, bound: Rate },

    #[error("New-hire retention 1 - {new_hire_termination_rate} must exceed {minimum}")]
    NewHireRetentionTooLow {
        new_hire_termination_rate: Rate,
        minimum: Rate,
    },

    #[error("Required hires {total_hires} exceed {max_hire_ratio} of starting population {starting_count}")]
    HireRatioExceeded {
        total_hires: u64,
        starting_count: u64,
        max_hire_ratio: Rate,
    },

    #[error("New-hire terminations {new_hire_terminations} outside [0, {total_hires}]")]
    NewHireTerminationsOutOfRange {
        new_hire_terminations: i128,
        total_hires: i128,
    },

    #[error("Computed {quantity} = {value} does not fit a headcount")]
    CountOverflow { quantity: &'static str, value: i128 },
}

/// Solve using the rates of a validated configuration.
pub fn solve_for(config: &EngineConfig, starting_count: u64) -> Result<TransitionPlan, InfeasibleConfiguration> {
    solve(
        starting_count,
        config.growth_rate(),
        config.experienced_termination_rate(),
        config.new_hire_termination_rate(),
        config.max_hire_ratio(),
    )
}

/// Compute the transition plan for one period
///
/// # Example
///
/// ```rust
/// use workforce_transition_core_rs::core::rate::Rate;
/// use workforce_transition_core_rs::solver::solve;
///
/// let rate = |v: f64| Rate::from_f64(v).unwrap();
/// let plan = solve(7000, rate(0.03), rate(0.25), rate(0.40), rate(0.5)).unwrap();
///
/// assert_eq!(plan.target_ending_count, 7210);
/// assert_eq!(plan.experienced_terminations, 1750);
/// assert_eq!(plan.total_hires, 3267);
/// assert_eq!(plan.new_hire_terminations, 1307);
/// assert_eq!(plan.reconciliation_error, 0);
/// ```
pub fn solve(
    starting_count: u64,
    growth_rate: Rate,
    exp_term_rate: Rate,
    nh_term_rate: Rate,
    max_hire_ratio: Rate,
) -> Result<TransitionPlan, InfeasibleConfiguration> {
    if growth_rate.abs() > MAX_GROWTH_MAGNITUDE {
        return Err(InfeasibleConfiguration::GrowthRateOutOfRange {
            growth_rate,
            bound: MAX_GROWTH_MAGNITUDE,
        });
    }

    let retention = nh_term_rate.complement();
    if retention <= MIN_NEW_HIRE_RETENTION {
        return Err(InfeasibleConfiguration::NewHireRetentionTooLow {
            new_hire_termination_rate: nh_term_rate,
            minimum: MIN_NEW_HIRE_RETENTION,
        });
    }

    let start = starting_count as i128;
    let target = growth_rate.one_plus().round_half_even_of(starting_count);
    let mut experienced_terms = exp_term_rate.floor_of(starting_count);
    let survivors = start - experienced_terms;
    let net_from_hires = target - survivors;

    let (total_hires, new_hire_terms, branch) = if net_from_hires > 0 {
        let hires = retention
            .ceil_divide(net_from_hires)
            .ok_or(InfeasibleConfiguration::NewHireRetentionTooLow {
                new_hire_termination_rate: nh_term_rate,
                minimum: MIN_NEW_HIRE_RETENTION,
            })?;
        let residual = hires - experienced_terms - (target - start);
        (hires, residual, TransitionBranch::Growth)
    } else {
        let additional = -net_from_hires;
        experienced_terms += additional;
        (
            0,
            0,
            TransitionBranch::ReductionInForce {
                additional_terminations: to_count("additional_terminations", additional)?,
            },
        )
    };

    if !max_hire_ratio.admits(total_hires, starting_count) {
        return Err(InfeasibleConfiguration::HireRatioExceeded {
            total_hires: to_count("total_hires", total_hires)?,
            starting_count,
            max_hire_ratio,
        });
    }

    if new_hire_terms < 0 || new_hire_terms > total_hires {
        return Err(InfeasibleConfiguration::NewHireTerminationsOutOfRange {
            new_hire_terminations: new_hire_terms,
            total_hires,
        });
    }

    let reconciliation_error = start + total_hires - experienced_terms - new_hire_terms - target;

    Ok(TransitionPlan {
        starting_count,
        target_ending_count: to_count("target_ending_count", target)?,
        total_hires: to_count("total_hires", total_hires)?,
        experienced_terminations: to_count("experienced_terminations", experienced_terms)?,
        new_hire_terminations: to_count("new_hire_terminations", new_hire_terms)?,
        reconciliation_error: i64::try_from(reconciliation_error).map_err(|_| {
            InfeasibleConfiguration::CountOverflow {
                quantity: "reconciliation_error",
                value: reconciliation_error,
            }
        })?,
        branch,
    })
}

fn to_count(quantity: &'static str, value: i128) -> Result<u64, InfeasibleConfiguration> {
    u64::try_from(value).map_err(|_| InfeasibleConfiguration::CountOverflow { quantity, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(value: f64) -> Rate {
        Rate::from_f64(value).unwrap()
    }

    #[test]
    fn test_zero_population() {
        let plan = solve(0, rate(0.05), rate(0.1), rate(0.2), rate(0.5)).unwrap();
        assert_eq!(plan.target_ending_count, 0);
        assert_eq!(plan.total_hires, 0);
        assert_eq!(plan.experienced_terminations, 0);
        assert_eq!(plan.reconciliation_error, 0);
    }

    #[test]
    fn test_flat_growth_with_no_turnover_is_rif_with_zero_additional() {
        let plan = solve(500, rate(0.0), rate(0.0), rate(0.0), rate(0.5)).unwrap();
        assert_eq!(
            plan.branch,
            TransitionBranch::ReductionInForce {
                additional_terminations: 0
            }
        );
        assert_eq!(plan.target_ending_count, 500);
        assert_eq!(plan.experienced_terminations, 0);
    }

    #[test]
    fn test_target_rounds_half_to_even() {
        // 5 * 1.5 = 7.5 -> 8 (even); 3 * 1.5 = 4.5 -> 4 (even)
        let plan = solve(5, rate(0.5), rate(0.0), rate(0.0), rate(1.0)).unwrap();
        assert_eq!(plan.target_ending_count, 8);
        let plan = solve(3, rate(0.5), rate(0.0), rate(0.0), rate(1.0)).unwrap();
        assert_eq!(plan.target_ending_count, 4);
    }

    #[test]
    fn test_growth_bound_is_inclusive() {
        assert!(solve(100, rate(1.0), rate(0.0), rate(0.0), rate(2.0)).is_ok());
        assert!(matches!(
            solve(100, rate(1.01), rate(0.0), rate(0.0), rate(2.0)),
            Err(InfeasibleConfiguration::GrowthRateOutOfRange { .. })
        ));
        assert!(matches!(
            solve(100, rate(-1.5), rate(0.0), rate(0.0), rate(2.0)),
            Err(InfeasibleConfiguration::GrowthRateOutOfRange { .. })
        ));
    }

    #[test]
    fn test_full_contraction() {
        let plan = solve(40, rate(-1.0), rate(0.1), rate(0.3), rate(0.5)).unwrap();
        assert_eq!(plan.target_ending_count, 0);
        assert_eq!(plan.experienced_terminations, 40);
        assert_eq!(plan.total_hires, 0);
    }

    #[test]
    fn test_hire_ratio_guard() {
        let result = solve(100, rate(0.0), rate(0.5), rate(0.5), rate(0.5));
        assert_eq!(
            result,
            Err(InfeasibleConfiguration::HireRatioExceeded {
                total_hires: 100,
                starting_count: 100,
                max_hire_ratio: rate(0.5),
            })
        );
    }
}
