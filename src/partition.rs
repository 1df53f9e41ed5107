//! Deterministic assignment of a field's paper ids to labeling roles.

use indexmap::IndexSet;
use tracing::{debug, warn};

use crate::config::PartitionSizes;
use crate::constants::stages::LABEL;
use crate::constants::transport::DUPLICATE_ID_MSG;
use crate::errors::PipelineError;
use crate::rng::seeded_shuffle;
use crate::types::PaperId;

/// Labeling role an id was assigned to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartitionRole {
    /// Paired with its own abstract.
    Same,
    /// Rotated against other papers of the field.
    Field,
    /// Held out for cross-field mixing.
    Mix,
    /// Not used for labeling.
    Holdout,
}

/// Four disjoint id subsets covering the population.
#[derive(Clone, Debug, Default)]
pub struct IdPartition {
    /// Ids paired with their own abstract.
    pub same: IndexSet<PaperId>,
    /// Ids rotated within the field.
    pub field: IndexSet<PaperId>,
    /// Ids held out for cross-field mixing.
    pub mix: IndexSet<PaperId>,
    /// Ids left unused.
    pub holdout: IndexSet<PaperId>,
}

impl IdPartition {
    /// Role of `id`, or `None` when the id was not part of the population.
    pub fn role_of(&self, id: &str) -> Option<PartitionRole> {
        if self.same.contains(id) {
            Some(PartitionRole::Same)
        } else if self.field.contains(id) {
            Some(PartitionRole::Field)
        } else if self.mix.contains(id) {
            Some(PartitionRole::Mix)
        } else if self.holdout.contains(id) {
            Some(PartitionRole::Holdout)
        } else {
            None
        }
    }

    /// Ids that take part in labeling (same + field + mix).
    pub fn labeled_len(&self) -> usize {
        self.same.len() + self.field.len() + self.mix.len()
    }

    /// Size of the full population the partition was built from.
    pub fn population_len(&self) -> usize {
        self.labeled_len() + self.holdout.len()
    }
}

/// Shuffle `ids` with `seed` and slice them into roles.
///
/// Last `sizes.mix` ids → mix, first `sizes.same` → same, the next
/// `sizes.field` → field, anything between field and mix → holdout.
/// Duplicate ids are collapsed first (first occurrence wins).
pub fn partition<I>(
    field: &str,
    ids: I,
    sizes: PartitionSizes,
    seed: u64,
) -> Result<IdPartition, PipelineError>
where
    I: IntoIterator<Item = PaperId>,
{
    let mut unique: IndexSet<PaperId> = IndexSet::new();
    let mut duplicates = 0_usize;
    for id in ids {
        if !unique.insert(id) {
            duplicates += 1;
        }
    }
    if duplicates > 0 {
        warn!(field = %field, duplicates, "{}", DUPLICATE_ID_MSG);
    }

    let total = unique.len();
    let required = sizes.required();
    if total < required {
        return Err(PipelineError::precondition(
            LABEL,
            field,
            format!(
                "population of {total} ids is smaller than same+field+mix = {required}"
            ),
        ));
    }

    let mut shuffled: Vec<PaperId> = unique.into_iter().collect();
    seeded_shuffle(&mut shuffled, seed);

    let field_end = sizes.same + sizes.field;
    let mix_start = total - sizes.mix;
    let mut partition = IdPartition::default();
    for (pos, id) in shuffled.into_iter().enumerate() {
        let bucket = if pos >= mix_start {
            &mut partition.mix
        } else if pos < sizes.same {
            &mut partition.same
        } else if pos < field_end {
            &mut partition.field
        } else {
            &mut partition.holdout
        };
        bucket.insert(id);
    }

    debug!(
        field = %field,
        same = partition.same.len(),
        field_ids = partition.field.len(),
        mix = partition.mix.len(),
        holdout = partition.holdout.len(),
        "partitioned paper ids"
    );
    Ok(partition)
}
