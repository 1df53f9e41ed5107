//! Cross-field mixing of held-out pools.
//!
//! Held-out records from every field are concatenated with boundary offsets.
//! A copy of the per-field abstract groups is shuffled at the group level
//! (inner order is untouched) and each text is paired with the abstract at
//! the same position of the group that landed on its field's slot.
//!
//! A slot whose group did not move pairs every text with its own abstract.
//! Those slots are reported in [`MixOutcome::fixed_slots`] and logged.

use tracing::{info, warn};

use crate::constants::stages::MIX;
use crate::data::{LabeledPair, PairLabel, PaperRecord};
use crate::errors::PipelineError;
use crate::rng::seeded_shuffle;
use crate::types::{AbstractText, BodyText, FieldName};

/// Held-out records of every field, concatenated in field order.
#[derive(Clone, Debug)]
pub struct CrossFieldPool {
    fields: Vec<FieldName>,
    records: Vec<PaperRecord>,
    /// Cumulative record counts; `boundaries[i]..boundaries[i + 1]` is field `i`.
    boundaries: Vec<usize>,
}

impl Default for CrossFieldPool {
    fn default() -> Self {
        Self::new()
    }
}

impl CrossFieldPool {
    /// Empty pool.
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            records: Vec::new(),
            boundaries: vec![0],
        }
    }

    /// Append one field's held-out records.
    pub fn push_field(&mut self, field: impl Into<FieldName>, records: Vec<PaperRecord>) {
        self.fields.push(field.into());
        self.records.extend(records);
        self.boundaries.push(self.records.len());
    }

    /// Number of fields pushed so far.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Field names in push order.
    pub fn fields(&self) -> &[FieldName] {
        &self.fields
    }

    /// Cumulative record offsets, starting at 0.
    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    /// Records across every field.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no field contributed a record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records belonging to field `idx`, or `None` past the last field.
    pub fn group(&self, idx: usize) -> Option<&[PaperRecord]> {
        let start = *self.boundaries.get(idx)?;
        let end = *self.boundaries.get(idx + 1)?;
        self.records.get(start..end)
    }

    fn groups(&self) -> impl Iterator<Item = &[PaperRecord]> {
        self.boundaries
            .windows(2)
            .map(|bounds| &self.records[bounds[0]..bounds[1]])
    }

    /// Abstracts grouped by field.
    pub fn abstract_groups(&self) -> Vec<Vec<AbstractText>> {
        self.groups()
            .map(|group| {
                group
                    .iter()
                    .map(|record| record.abstract_text.clone())
                    .collect()
            })
            .collect()
    }

    /// Texts grouped by field.
    pub fn text_groups(&self) -> Vec<Vec<BodyText>> {
        self.groups()
            .map(|group| group.iter().map(|record| record.text.clone()).collect())
            .collect()
    }
}

/// Result of a cross-field mixing pass.
#[derive(Clone, Debug)]
pub struct MixOutcome {
    /// Cross-field pairs (label 0.05), grouped by text field.
    pub pairs: Vec<LabeledPair>,
    /// `source_field_for[i]` is the field whose abstracts were paired with
    /// field `i`'s texts.
    pub source_field_for: Vec<usize>,
    /// Number of field slots whose abstract group came from another field.
    pub moved_groups: usize,
    /// Slots whose abstract group stayed in place; their pairs are
    /// same-paper matches carrying the cross-field label.
    pub fixed_slots: Vec<usize>,
}

impl MixOutcome {
    /// True when at least one group left its original slot.
    pub fn diverged(&self) -> bool {
        self.moved_groups > 0
    }
}

/// Pair every held-out text with an abstract from a shuffled field grouping.
///
/// Fails with [`PipelineError::Precondition`] when the abstract group landing
/// on a slot is shorter than that slot's texts.
pub fn mix_across_fields(pool: &CrossFieldPool, seed: u64) -> Result<MixOutcome, PipelineError> {
    if pool.field_count() == 0 {
        return Err(PipelineError::precondition(
            MIX,
            "*",
            "no held-out pools were provided",
        ));
    }

    let abstracts = pool.abstract_groups();
    let texts = pool.text_groups();

    // Shuffle a copy tagged with its origin so the original grouping stays
    // available for the divergence check.
    let mut shuffled: Vec<(usize, Vec<AbstractText>)> =
        abstracts.iter().cloned().enumerate().collect();
    seeded_shuffle(&mut shuffled, seed);

    let source_field_for: Vec<usize> = shuffled.iter().map(|(origin, _)| *origin).collect();
    let fixed_slots: Vec<usize> = source_field_for
        .iter()
        .enumerate()
        .filter(|(slot, origin)| slot == *origin)
        .map(|(slot, _)| slot)
        .collect();
    let moved_groups = source_field_for.len() - fixed_slots.len();
    for slot in &fixed_slots {
        warn!(
            field = %pool.fields()[*slot],
            pairs = texts[*slot].len(),
            "abstract group stayed in place; its pairs match each paper with itself"
        );
    }

    let mut pairs = Vec::with_capacity(pool.len());
    for (slot, field_texts) in texts.iter().enumerate() {
        let (origin, group) = &shuffled[slot];
        if group.len() < field_texts.len() {
            return Err(PipelineError::precondition(
                MIX,
                pool.fields()[slot].as_str(),
                format!(
                    "{} texts but only {} abstracts from field '{}'",
                    field_texts.len(),
                    group.len(),
                    pool.fields()[*origin]
                ),
            ));
        }
        pairs.extend(
            field_texts
                .iter()
                .zip(group)
                .map(|(text, abstract_text)| {
                    LabeledPair::new(abstract_text.as_str(), text.as_str(), PairLabel::CrossField)
                }),
        );
    }

    info!(
        pairs = pairs.len(),
        fields = pool.field_count(),
        moved_groups,
        fixed = fixed_slots.len(),
        "mixed held-out pools across fields"
    );
    Ok(MixOutcome {
        pairs,
        source_field_for,
        moved_groups,
        fixed_slots,
    })
}
