//! Per-field corpus interfaces.
//!
//! Ownership model:
//! - `CorpusSource` is the stage-facing interface; each call to `records`
//!   starts a fresh pass over the same field corpus.
//! - Schema misfits are filtered inside the source, so every pass sees the
//!   same set of records and ids.

use std::sync::Arc;

use crate::data::PaperRecord;
use crate::errors::PipelineError;
use crate::types::{FieldName, PaperId};

/// Source implementation modules.
pub mod sources;

pub use sources::jsonl_source::JsonlCorpus;

/// Boxed record stream produced by one pass over a corpus.
pub type RecordStream<'a> = Box<dyn Iterator<Item = Result<PaperRecord, PipelineError>> + 'a>;

/// A field's paper corpus that can be read more than once.
///
/// For a fixed corpus state, both `paper_ids` and `records` must be
/// deterministic and agree on which records exist.
pub trait CorpusSource {
    /// Subject field this corpus belongs to.
    fn field(&self) -> &str;

    /// Start a pass over every well-formed record in storage order.
    fn records(&self) -> Result<RecordStream<'_>, PipelineError>;

    /// Ids of every well-formed record in storage order.
    fn paper_ids(&self) -> Result<Vec<PaperId>, PipelineError> {
        self.records()?
            .map(|record| record.map(|record| record.id))
            .collect()
    }
}

/// In-memory corpus backed by prebuilt records.
#[derive(Clone, Debug)]
pub struct InMemoryCorpus {
    field: FieldName,
    records: Arc<Vec<PaperRecord>>,
}

impl InMemoryCorpus {
    /// Create an in-memory corpus from prebuilt records.
    pub fn new(field: impl Into<FieldName>, records: Vec<PaperRecord>) -> Self {
        Self {
            field: field.into(),
            records: Arc::new(records),
        }
    }
}

impl CorpusSource for InMemoryCorpus {
    fn field(&self) -> &str {
        &self.field
    }

    fn records(&self) -> Result<RecordStream<'_>, PipelineError> {
        Ok(Box::new(
            self.records
                .iter()
                .cloned()
                .map(Ok::<PaperRecord, PipelineError>),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_corpus_replays_records() {
        let corpus = InMemoryCorpus::new(
            "art",
            vec![
                PaperRecord::new("p1", "a1", "t1"),
                PaperRecord::new("p2", "a2", "t2"),
            ],
        );
        assert_eq!(corpus.field(), "art");
        assert_eq!(corpus.paper_ids().unwrap(), vec!["p1", "p2"]);
        let first: Vec<_> = corpus.records().unwrap().collect::<Result<_, _>>().unwrap();
        let second: Vec<_> = corpus.records().unwrap().collect::<Result<_, _>>().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
