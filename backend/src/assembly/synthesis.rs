//! New-hire synthesis
//!
//! Creates member records for hires. Generation is deterministic: ids are
//! sequential in category order, and compensation is placed inside the
//! category's band by a stable hash of the new id.
//!
//! Id format: `{prefix}_{period}_{seq:06}`, e.g. `NH_2025_000042`. The
//! sequence starts after the largest one already present in the snapshot
//! for the same prefix and period, so synthesized ids never collide with
//! existing members.

use crate::apportion::QuotaAllocation;
use crate::config::{CompensationBand, EngineConfig, InputError};
use crate::models::member::Member;
use crate::models::snapshot::PopulationSnapshot;
use crate::selection::stable_hash;
use std::collections::BTreeMap;

/// Salt purpose for compensation placement.
pub const COMPENSATION_SALT: &str = "new_hire_compensation";

/// Generator for new-hire records of one period.
#[derive(Debug, Clone)]
pub struct HireSynthesizer {
    prefix: String,
    period: u32,
    compensation_salt: String,
    /// Highest sequence already used in the snapshot (0 if none)
    last_sequence: u64,
    /// Configured bands override observed ones
    bands: BTreeMap<String, CompensationBand>,
}

impl HireSynthesizer {
    /// Resolve bands and the sequence start from the configuration and the
    /// starting snapshot.
    pub fn new(config: &EngineConfig, snapshot: &PopulationSnapshot) -> Self {
        let mut bands: BTreeMap<String, CompensationBand> = snapshot
            .by_category()
            .into_keys()
            .filter_map(|category| Some((category.to_string(), snapshot.observed_band(category)?)))
            .collect();
        for (category, band) in config.compensation_bands() {
            bands.insert(category.clone(), *band);
        }

        let id_stem = format!("{}_{}_", config.new_hire_id_prefix(), config.period());
        let last_sequence = snapshot
            .members()
            .iter()
            .filter_map(|m| parse_sequence(&m.id, &id_stem))
            .max()
            .unwrap_or(0);

        Self {
            prefix: config.new_hire_id_prefix().to_string(),
            period: config.period(),
            compensation_salt: config.salt_for(COMPENSATION_SALT),
            last_sequence,
            bands,
        }
    }

    pub fn band(&self, category: &str) -> Result<CompensationBand, InputError> {
        self.bands
            .get(category)
            .copied()
            .ok_or_else(|| InputError::MissingCategoryAttributes(category.to_string()))
    }

    /// Fail early if any of `categories` could not be synthesized.
    pub fn ensure_categories<'a, I>(&self, categories: I) -> Result<(), InputError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for category in categories {
            self.band(category)?;
        }
        Ok(())
    }

    pub fn member_id(&self, sequence: u64) -> String {
        format!("{}_{}_{:06}", self.prefix, self.period, sequence)
    }

    /// Deterministic compensation inside the band
    pub fn compensation_for(&self, id: &str, band: CompensationBand) -> i64 {
        let offset = stable_hash(id, &self.compensation_salt) % band.width();
        band.min + offset as i64
    }

    /// Synthesize `hires.get(category)` members for every category
    ///
    /// Sequence numbers run across categories in category order.
    pub fn synthesize(&self, hires: &QuotaAllocation<String>) -> Result<BTreeMap<String, Vec<Member>>, InputError> {
        let mut sequence = self.last_sequence;
        let mut by_category = BTreeMap::new();

        for (category, count) in hires.iter() {
            if count == 0 {
                by_category.insert(category.clone(), Vec::new());
                continue;
            }
            let band = self.band(category)?;
            let mut members = Vec::with_capacity(count as usize);
            for _ in 0..count {
                sequence = sequence
                    .checked_add(1)
                    .ok_or_else(|| InputError::NewHireSequenceExhausted(self.member_id(sequence)))?;
                let id = self.member_id(sequence);
                let compensation = self.compensation_for(&id, band);
                members.push(Member::new(id, category.clone(), compensation).with_hire_period(self.period));
            }
            by_category.insert(category.clone(), members);
        }

        Ok(by_category)
    }
}

/// Sequence number of `id` if it is `{stem}` followed by decimal digits
fn parse_sequence(id: &str, stem: &str) -> Option<u64> {
    let digits = id.strip_prefix(stem)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
