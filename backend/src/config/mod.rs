//! Engine configuration and input validation
//!
//! Raw configuration values (as supplied by the caller or deserialized from
//! JSON) are validated once and normalized into an immutable
//! [`EngineConfig`]. Nothing downstream re-checks ranges; an `EngineConfig`
//! that exists is a valid one.
//!
//! # Example
//!
//! ```rust
//! use workforce_transition_core_rs::config::{EngineConfig, RawEngineConfig};
//!
//! let config = EngineConfig::new(RawEngineConfig {
//!     target_growth_rate: 0.03,
//!     experienced_termination_rate: 0.25,
//!     new_hire_termination_rate: 0.40,
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! assert_eq!(config.max_hire_ratio().ppb(), 500_000_000);
//! ```

use crate::core::rate::{Rate, RATE_SCALE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Default cap on hires as a fraction of the starting population.
pub const DEFAULT_MAX_HIRE_RATIO: f64 = 0.5;

/// Default prefix for synthesized new-hire identifiers.
pub const DEFAULT_NEW_HIRE_ID_PREFIX: &str = "NH";

/// Malformed configuration or snapshot input
///
/// Raised before any solving begins.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    #[error("Rate '{field}' is not a finite number: {value}")]
    NonFiniteRate { field: &'static str, value: f64 },

    #[error("Rate '{field}' = {value} outside allowed range {range}")]
    RateOutOfRange {
        field: &'static str,
        value: f64,
        range: &'static str,
    },

    #[error("Fixed category table is empty or has a zero weight sum")]
    EmptyWeightTable,

    #[error("Fixed category weight for '{category}' is invalid: {weight}")]
    InvalidCategoryWeight { category: String, weight: f64 },

    #[error("Compensation band for '{category}' is invalid: min {min}, max {max}")]
    InvalidCompensationBand { category: String, min: i64, max: i64 },

    #[error("New-hire id prefix must not be empty")]
    EmptyIdPrefix,

    #[error("Duplicate member id in snapshot: {0}")]
    DuplicateMemberId(String),

    #[error("Member at position {0} has an empty id")]
    EmptyMemberId(usize),

    #[error("Member {0} has an empty category")]
    EmptyCategory(String),

    #[error("Member {id} has negative compensation {compensation}")]
    NegativeCompensation { id: String, compensation: i64 },

    #[error("Category '{0}' has no compensation band and no observed members to derive one from")]
    MissingCategoryAttributes(String),

    #[error("New-hire sequence for '{0}' is exhausted")]
    NewHireSequenceExhausted(String),
}

/// How hires are distributed across categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryWeightStrategy {
    /// Mirror the starting population's category mix
    ObservedPriorPeriod,

    /// Caller-supplied weights per category
    FixedTable(BTreeMap<String, f64>),
}

impl Default for CategoryWeightStrategy {
    fn default() -> Self {
        CategoryWeightStrategy::ObservedPriorPeriod
    }
}

/// Inclusive compensation range for synthesized members of a category (cents)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensationBand {
    pub min: i64,
    pub max: i64,
}

impl CompensationBand {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Width of the band, counted in whole cents.
    pub fn width(&self) -> u64 {
        (self.max - self.min) as u64 + 1
    }
}

/// Unvalidated configuration as supplied by a caller
///
/// Deserializing an [`EngineConfig`] goes through this type and then
/// through validation, so invalid documents are rejected at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEngineConfig {
    /// Target change in population size (e.g. 0.03 = +3%)
    pub target_growth_rate: f64,

    /// Fraction of the starting population that leaves, in [0, 1)
    pub experienced_termination_rate: f64,

    /// Fraction of new hires that leave within the period, in [0, 1)
    pub new_hire_termination_rate: f64,

    /// Hires may not exceed this fraction of the starting population
    pub max_hire_ratio: f64,

    pub category_weight_strategy: CategoryWeightStrategy,

    /// Decorrelates selections across scenarios sharing a population
    pub salt: String,

    /// Period label stamped onto synthesized members
    ///
    /// New-hire sequence numbers continue after the largest existing
    /// `{prefix}_{period}_` id in the snapshot, so a chained period may
    /// reuse the same label.
    pub period: u32,

    pub new_hire_id_prefix: String,

    /// Overrides the observed compensation range for a category
    pub compensation_bands: BTreeMap<String, CompensationBand>,
}

impl Default for RawEngineConfig {
    fn default() -> Self {
        Self {
            target_growth_rate: 0.0,
            experienced_termination_rate: 0.0,
            new_hire_termination_rate: 0.0,
            max_hire_ratio: DEFAULT_MAX_HIRE_RATIO,
            category_weight_strategy: CategoryWeightStrategy::default(),
            salt: String::new(),
            period: 0,
            new_hire_id_prefix: DEFAULT_NEW_HIRE_ID_PREFIX.to_string(),
            compensation_bands: BTreeMap::new(),
        }
    }
}

/// Validated, immutable engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEngineConfig", into = "RawEngineConfig")]
pub struct EngineConfig {
    growth_rate: Rate,
    experienced_termination_rate: Rate,
    new_hire_termination_rate: Rate,
    max_hire_ratio: Rate,
    category_weight_strategy: CategoryWeightStrategy,
    salt: String,
    period: u32,
    new_hire_id_prefix: String,
    compensation_bands: BTreeMap<String, CompensationBand>,
}

impl EngineConfig {
    /// Validate raw values and build the configuration
    ///
    /// Range checks only. Feasibility of the combination (growth bound,
    /// new-hire retention floor, hire ratio) is judged by the solver, which
    /// reports it as an infeasible configuration.
    pub fn new(raw: RawEngineConfig) -> Result<Self, InputError> {
        let growth_rate = to_rate("target_growth_rate", raw.target_growth_rate)?;

        let experienced_termination_rate =
            unit_interval_rate("experienced_termination_rate", raw.experienced_termination_rate)?;
        let new_hire_termination_rate =
            unit_interval_rate("new_hire_termination_rate", raw.new_hire_termination_rate)?;

        let max_hire_ratio = to_rate("max_hire_ratio", raw.max_hire_ratio)?;
        if max_hire_ratio.is_negative() {
            return Err(InputError::RateOutOfRange {
                field: "max_hire_ratio",
                value: raw.max_hire_ratio,
                range: "[0, inf)",
            });
        }

        if let CategoryWeightStrategy::FixedTable(table) = &raw.category_weight_strategy {
            validate_weight_table(table)?;
        }

        for (category, band) in &raw.compensation_bands {
            if band.min < 0 || band.min > band.max {
                return Err(InputError::InvalidCompensationBand {
                    category: category.clone(),
                    min: band.min,
                    max: band.max,
                });
            }
        }

        if raw.new_hire_id_prefix.is_empty() {
            return Err(InputError::EmptyIdPrefix);
        }

        Ok(Self {
            growth_rate,
            experienced_termination_rate,
            new_hire_termination_rate,
            max_hire_ratio,
            category_weight_strategy: raw.category_weight_strategy,
            salt: raw.salt,
            period: raw.period,
            new_hire_id_prefix: raw.new_hire_id_prefix,
            compensation_bands: raw.compensation_bands,
        })
    }

    pub fn growth_rate(&self) -> Rate {
        self.growth_rate
    }

    pub fn experienced_termination_rate(&self) -> Rate {
        self.experienced_termination_rate
    }

    pub fn new_hire_termination_rate(&self) -> Rate {
        self.new_hire_termination_rate
    }

    pub fn max_hire_ratio(&self) -> Rate {
        self.max_hire_ratio
    }

    pub fn category_weight_strategy(&self) -> &CategoryWeightStrategy {
        &self.category_weight_strategy
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    pub fn new_hire_id_prefix(&self) -> &str {
        &self.new_hire_id_prefix
    }

    pub fn compensation_bands(&self) -> &BTreeMap<String, CompensationBand> {
        &self.compensation_bands
    }

    /// Salt for one cohort type, combined with the scenario salt.
    pub fn salt_for(&self, purpose: &str) -> String {
        if self.salt.is_empty() {
            purpose.to_string()
        } else {
            format!("{}:{}", purpose, self.salt)
        }
    }
}

impl TryFrom<RawEngineConfig> for EngineConfig {
    type Error = InputError;

    fn try_from(raw: RawEngineConfig) -> Result<Self, Self::Error> {
        EngineConfig::new(raw)
    }
}

impl From<EngineConfig> for RawEngineConfig {
    fn from(config: EngineConfig) -> Self {
        RawEngineConfig {
            target_growth_rate: config.growth_rate.as_f64(),
            experienced_termination_rate: config.experienced_termination_rate.as_f64(),
            new_hire_termination_rate: config.new_hire_termination_rate.as_f64(),
            max_hire_ratio: config.max_hire_ratio.as_f64(),
            category_weight_strategy: config.category_weight_strategy,
            salt: config.salt,
            period: config.period,
            new_hire_id_prefix: config.new_hire_id_prefix,
            compensation_bands: config.compensation_bands,
        }
    }
}

// ============================================================================
// Validation helpers
// ============================================================================

fn to_rate(field: &'static str, value: f64) -> Result<Rate, InputError> {
    Rate::from_f64(value).ok_or(InputError::NonFiniteRate { field, value })
}

/// Rate in `[0, 1)`, range-checked on the value as given.
///
/// A value just below 1 that rounds up to a whole billionth of 1 becomes
/// the largest representable rate below 1.
fn unit_interval_rate(field: &'static str, value: f64) -> Result<Rate, InputError> {
    let rate = to_rate(field, value)?;
    if value < 0.0 || value >= 1.0 {
        return Err(InputError::RateOutOfRange {
            field,
            value,
            range: "[0, 1)",
        });
    }
    Ok(rate.min(Rate::from_ppb(RATE_SCALE - 1)))
}

/// Checks the table the way hires will be apportioned: in billionths.
fn validate_weight_table(table: &BTreeMap<String, f64>) -> Result<(), InputError> {
    let mut total: u128 = 0;
    for (category, &weight) in table {
        let ppb = Rate::from_f64(weight)
            .map(Rate::ppb)
            .filter(|&ppb| ppb >= 0 && weight >= 0.0)
            .ok_or_else(|| InputError::InvalidCategoryWeight {
                category: category.clone(),
                weight,
            })?;
        total += ppb as u128;
    }
    if total == 0 {
        return Err(InputError::EmptyWeightTable);
    }
    Ok(())
}
