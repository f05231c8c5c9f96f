//! Quota apportionment (largest-remainder method)
//!
//! Splits a global integer total across categories so that the parts sum
//! to the total exactly.
//!
//! # Algorithm
//!
//! ```text
//! exact_share(k) = total * w(k) / W          (kept as an exact fraction)
//! floor(k)       = floor(exact_share(k))
//! remainder(k)   = exact_share(k) - floor(k)
//! leftover       = total - sum(floor)
//! order categories by (remainder desc, category key asc)
//! first `leftover` categories receive floor + 1, the rest floor
//! ```
//!
//! Weights are held as integers (counts, or reals converted to fixed point
//! once), so remainders are compared as integer numerators over a common
//! denominator and no floating-point drift can occur.
//!
//! # Critical Invariants
//!
//! 1. `sum(allocation) == total`
//! 2. Every allocation is `floor(exact_share)` or `floor(exact_share) + 1`
//! 3. Same `(total, weights)` always yields the same allocation

use crate::core::rate::Rate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors that can occur during apportionment
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApportionError {
    #[error("Cannot apportion {total} units over weights summing to zero")]
    ZeroWeightSum { total: u64 },

    #[error("Weight for '{category}' must be finite, non-negative and representable: {weight}")]
    InvalidWeight { category: String, weight: f64 },
}

/// Which global quota an allocation splits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaKind {
    Hires,
    ExperiencedTerminations,
    NewHireTerminations,
}

impl QuotaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaKind::Hires => "hires",
            QuotaKind::ExperiencedTerminations => "experienced_terminations",
            QuotaKind::NewHireTerminations => "new_hire_terminations",
        }
    }
}

impl fmt::Display for QuotaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-negative integer weights per category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Weights<K: Ord> {
    units: BTreeMap<K, u64>,
}

impl<K: Ord + Clone> Weights<K> {
    /// Integer weights, typically observed headcounts.
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (K, u64)>,
    {
        let mut units = BTreeMap::new();
        for (key, count) in counts {
            let entry = units.entry(key).or_insert(0u64);
            *entry = entry.saturating_add(count);
        }
        Self { units }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<u64> {
        self.units.get(key).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.units.keys()
    }

    /// Sum of all weights
    pub fn total(&self) -> u128 {
        self.units.values().map(|&w| w as u128).sum()
    }
}

impl<K: Ord + Clone + fmt::Display> Weights<K> {
    /// Real-valued weights, converted to fixed point (billionths).
    pub fn from_reals<I>(weights: I) -> Result<Self, ApportionError>
    where
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut units = BTreeMap::new();
        for (key, weight) in weights {
            let ppb = Rate::from_f64(weight)
                .map(Rate::ppb)
                .filter(|&ppb| ppb >= 0 && weight >= 0.0)
                .ok_or_else(|| ApportionError::InvalidWeight {
                    category: key.to_string(),
                    weight,
                })?;
            let entry = units.entry(key).or_insert(0u64);
            *entry = entry.saturating_add(ppb as u64);
        }
        Ok(Self { units })
    }
}

/// Result of apportioning one total across categories
///
/// Every category present in the weights appears here, zero counts
/// included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaAllocation<K: Ord> {
    total: u64,
    counts: BTreeMap<K, u64>,
}

impl<K: Ord> QuotaAllocation<K> {
    /// The global total this allocation was computed for
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn get(&self, key: &K) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &BTreeMap<K, u64> {
        &self.counts
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.counts.iter().map(|(k, &v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of per-category counts (widened so it cannot overflow)
    pub fn allocated(&self) -> u128 {
        self.counts.values().map(|&c| c as u128).sum()
    }

    pub fn is_exact(&self) -> bool {
        self.allocated() == self.total as u128
    }
}

/// Largest-remainder apportionment
///
/// With `total == 0` every category receives zero, whatever the weights.
/// Otherwise the weights must sum to a positive value.
///
/// # Example
///
/// ```rust
/// use workforce_transition_core_rs::apportion::{apportion, Weights};
///
/// let weights = Weights::from_reals([("A", 0.33), ("B", 0.33), ("C", 0.34)]).unwrap();
/// let allocation = apportion(10, &weights).unwrap();
///
/// assert_eq!(allocation.get(&"A"), 3);
/// assert_eq!(allocation.get(&"B"), 3);
/// assert_eq!(allocation.get(&"C"), 4);
/// ```
pub fn apportion<K: Ord + Clone>(total: u64, weights: &Weights<K>) -> Result<QuotaAllocation<K>, ApportionError> {
    let weight_sum = weights.total();

    if total == 0 {
        return Ok(QuotaAllocation {
            total,
            counts: weights.units.keys().map(|k| (k.clone(), 0)).collect(),
        });
    }
    if weight_sum == 0 {
        return Err(ApportionError::ZeroWeightSum { total });
    }

    // (key, floor, remainder numerator over weight_sum)
    let mut shares: Vec<(&K, u64, u128)> = weights
        .units
        .iter()
        .map(|(key, &weight)| {
            let numerator = total as u128 * weight as u128;
            // floor <= total because weight <= weight_sum
            let floor = (numerator / weight_sum) as u64;
            (key, floor, numerator % weight_sum)
        })
        .collect();

    let floor_sum: u64 = shares.iter().map(|(_, floor, _)| floor).sum();
    let leftover = (total - floor_sum) as usize;

    // BTreeMap iteration is already key-ascending; a stable sort on the
    // remainder keeps that order among equal remainders.
    let mut order: Vec<usize> = (0..shares.len()).collect();
    order.sort_by(|&a, &b| shares[b].2.cmp(&shares[a].2));
    for &index in order.iter().take(leftover) {
        shares[index].1 += 1;
    }

    Ok(QuotaAllocation {
        total,
        counts: shares
            .into_iter()
            .map(|(key, count, _)| (key.clone(), count))
            .collect(),
    })
}

/// Apportion using a real-valued weight table.
pub fn apportion_reals<K>(total: u64, weights: &BTreeMap<K, f64>) -> Result<QuotaAllocation<K>, ApportionError>
where
    K: Ord + Clone + fmt::Display,
{
    let weights = Weights::from_reals(weights.iter().map(|(k, &w)| (k.clone(), w)))?;
    apportion(total, &weights)
}
