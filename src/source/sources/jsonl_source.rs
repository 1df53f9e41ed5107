use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::FieldConfig;
use crate::data::PaperRecord;
use crate::errors::PipelineError;
use crate::source::{CorpusSource, RecordStream};
use crate::transport::fs::JsonlReader;
use crate::types::FieldName;

/// Corpus stored as one JSON object per line (`paper_id`, `abstract`, `text`).
#[derive(Clone, Debug)]
pub struct JsonlCorpus {
    field: FieldName,
    path: PathBuf,
}

impl JsonlCorpus {
    /// Corpus for `field` stored at `path`.
    pub fn new(field: impl Into<FieldName>, path: impl Into<PathBuf>) -> Self {
        Self {
            field: field.into(),
            path: path.into(),
        }
    }

    /// Backing JSONL file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl From<&FieldConfig> for JsonlCorpus {
    fn from(config: &FieldConfig) -> Self {
        Self::new(config.name.clone(), config.input.clone())
    }
}

impl CorpusSource for JsonlCorpus {
    fn field(&self) -> &str {
        &self.field
    }

    fn records(&self) -> Result<RecordStream<'_>, PipelineError> {
        debug!(field = %self.field, path = %self.path.display(), "opening corpus pass");
        let reader = JsonlReader::<PaperRecord>::open(&self.path)?;
        Ok(Box::new(reader))
    }
}
