//! Planning for the conversion cache resync

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::conversion::{
    compute_conversion, ConversionError, ConversionKey, ConversionOutcome, GradeOrder,
};
use super::master::MasterDataSnapshot;

/// A combination that is missing from the cache, with its computed values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedConversion {
    pub key: ConversionKey,
    pub outcome: ConversionOutcome,
}

/// Rows to insert for one resync pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPlan {
    pub to_insert: Vec<PlannedConversion>,
    /// Combinations that already had a cached row
    pub skipped: usize,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty()
    }
}

/// Plan the species × grade × variety × glaze cross product against the
/// keys already cached. Existing keys are skipped, never recomputed.
///
/// Fails on the first combination that cannot be converted so the caller can
/// abandon the whole batch.
pub fn plan_sync(
    master: &MasterDataSnapshot,
    existing: &HashSet<ConversionKey>,
    order: &GradeOrder,
) -> Result<SyncPlan, ConversionError> {
    let mut plan = SyncPlan::default();
    let mut seen = HashSet::new();

    for species in &master.species {
        for grade in &master.grades {
            for variety in &master.varieties {
                for glaze in &master.glazes {
                    let key = ConversionKey::new(
                        species.as_str(),
                        grade.as_str(),
                        variety.variety_name.as_str(),
                        glaze.as_str(),
                    );

                    if existing.contains(&key) {
                        plan.skipped += 1;
                        continue;
                    }
                    if !seen.insert(key.clone()) {
                        continue;
                    }

                    let outcome = compute_conversion(grade, glaze, Some(variety), order)?;
                    plan.to_insert.push(PlannedConversion { key, outcome });
                }
            }
        }
    }

    Ok(plan)
}

/// Cached keys that reference a species, grade, variety or glaze no longer
/// present in the master lists
pub fn find_orphans<'a, I>(master: &MasterDataSnapshot, keys: I) -> Vec<ConversionKey>
where
    I: IntoIterator<Item = &'a ConversionKey>,
{
    let mut orphans: Vec<ConversionKey> = keys
        .into_iter()
        .filter(|key| {
            !master.has_species(&key.species)
                || !master.has_grade(&key.grade_name)
                || master.variety(&key.variety_name).is_none()
                || !master.has_glaze(&key.glaze_name)
        })
        .cloned()
        .collect();
    orphans.sort();
    orphans
}
