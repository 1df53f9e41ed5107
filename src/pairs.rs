//! Per-field pair building: self pairs, within-field rotation, held-out pool.

use tracing::debug;

use crate::constants::stages::LABEL;
use crate::data::{LabeledPair, PairLabel, PaperRecord};
use crate::errors::PipelineError;
use crate::partition::{IdPartition, PartitionRole};
use crate::types::{AbstractText, BodyText, FieldName};

/// One (abstract, text) entry of a field bundle. Both halves come from the
/// same source paper and travel together.
#[derive(Clone, Debug, PartialEq)]
pub struct BundleEntry {
    /// Abstract of the source paper.
    pub abstract_text: AbstractText,
    /// Text of the same paper.
    pub text: BodyText,
}

/// Field-subset papers in arrival order, used for within-field rotation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldBundle {
    field: FieldName,
    entries: Vec<BundleEntry>,
}

impl FieldBundle {
    /// Empty bundle for `field`.
    pub fn new(field: impl Into<FieldName>) -> Self {
        Self {
            field: field.into(),
            entries: Vec::new(),
        }
    }

    /// Append an entry in arrival order.
    pub fn push(&mut self, abstract_text: impl Into<AbstractText>, text: impl Into<BodyText>) {
        self.entries.push(BundleEntry {
            abstract_text: abstract_text.into(),
            text: text.into(),
        });
    }

    /// Field the bundle belongs to.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Entries in arrival order.
    pub fn entries(&self) -> &[BundleEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entry was pushed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pair every abstract with the text of the previous entry; the first
    /// abstract takes the last text. All pairs are labeled same-field.
    ///
    /// Needs at least two entries, otherwise an abstract would meet its own
    /// text.
    pub fn rotated_pairs(&self) -> Result<Vec<LabeledPair>, PipelineError> {
        let len = self.entries.len();
        if len < 2 {
            return Err(PipelineError::precondition(
                LABEL,
                self.field.as_str(),
                format!("field bundle has {len} entries; rotation needs at least 2"),
            ));
        }
        Ok(self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                let previous = &self.entries[(idx + len - 1) % len];
                LabeledPair::new(
                    entry.abstract_text.as_str(),
                    previous.text.as_str(),
                    PairLabel::SameField,
                )
            })
            .collect())
    }
}

/// Everything one field contributes to the dataset.
#[derive(Clone, Debug, Default)]
pub struct FieldPairs {
    /// Self pairs (label 0.95) in arrival order.
    pub same_pairs: Vec<LabeledPair>,
    /// Field-subset papers awaiting rotation.
    pub field_bundle: FieldBundle,
    /// Raw mix-subset records for cross-field mixing.
    pub held_out: Vec<PaperRecord>,
    /// Records outside every labeled subset.
    pub dropped: usize,
}

impl FieldPairs {
    /// Labeled output for the field file: self pairs first, then rotated pairs.
    pub fn labeled_pairs(&self) -> Result<Vec<LabeledPair>, PipelineError> {
        let rotated = self.field_bundle.rotated_pairs()?;
        let mut pairs = Vec::with_capacity(self.same_pairs.len() + rotated.len());
        pairs.extend(self.same_pairs.iter().cloned());
        pairs.extend(rotated);
        Ok(pairs)
    }
}

/// Classify `records` against `partition` in a single pass.
///
/// Record errors from the stream abort the pass.
pub fn build_pairs<I>(
    field: &str,
    records: I,
    partition: &IdPartition,
) -> Result<FieldPairs, PipelineError>
where
    I: IntoIterator<Item = Result<PaperRecord, PipelineError>>,
{
    let mut out = FieldPairs {
        field_bundle: FieldBundle::new(field),
        ..FieldPairs::default()
    };
    for record in records {
        let record = record?;
        match partition.role_of(&record.id) {
            Some(PartitionRole::Same) => out.same_pairs.push(LabeledPair::new(
                record.abstract_text,
                record.text,
                PairLabel::SamePaper,
            )),
            Some(PartitionRole::Field) => out.field_bundle.push(record.abstract_text, record.text),
            Some(PartitionRole::Mix) => out.held_out.push(record),
            Some(PartitionRole::Holdout) | None => out.dropped += 1,
        }
    }
    debug!(
        field = %field,
        same = out.same_pairs.len(),
        bundle = out.field_bundle.len(),
        held_out = out.held_out.len(),
        dropped = out.dropped,
        "classified field records"
    );
    Ok(out)
}
