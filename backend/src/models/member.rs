//! Population member record
//!
//! A member is the unit the engine moves between cohorts. Only the fields
//! needed to select and to synthesize new members are carried; everything
//! else about a person belongs to the caller's storage layer.
//!
//! CRITICAL: Compensation is i64 (cents)

use serde::{Deserialize, Serialize};

/// One member of a population snapshot
///
/// # Example
/// ```
/// use workforce_transition_core_rs::Member;
///
/// let member = Member::new("EMP_000001", "L3", 8_500_000).with_hire_period(2021);
/// assert_eq!(member.category, "L3");
/// assert_eq!(member.hire_period, Some(2021));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    /// Stable identifier, unique within a snapshot
    pub id: String,

    /// Category key (e.g. job level); apportionment is done per category
    pub category: String,

    /// Annual compensation in cents
    pub compensation: i64,

    /// Period in which the member was hired, when known
    #[serde(default)]
    pub hire_period: Option<u32>,
}

impl Member {
    pub fn new(id: impl Into<String>, category: impl Into<String>, compensation: i64) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            compensation,
            hire_period: None,
        }
    }

    pub fn with_hire_period(mut self, period: u32) -> Self {
        self.hire_period = Some(period);
        self
    }
}
