use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::files::{
    DEFAULT_LABELED_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_PRESELECTED_DIR, HELD_OUT_PREFIX,
    JSONL_EXTENSION, LABELED_PREFIX, MIX_REPORT_FILENAME, MIXED_FILENAME,
};
use crate::constants::partition::{
    DEFAULT_FIELD_COUNT, DEFAULT_MIX_COUNT, DEFAULT_PARTITION_SEED, DEFAULT_SAME_COUNT,
};
use crate::constants::splits::{DEFAULT_DEV_FRACTION, DEFAULT_SPLIT_SEED, DEFAULT_TEST_FRACTION};
use crate::errors::PipelineError;
use crate::types::FieldName;

/// Number of ids assigned to each labeling role per field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSizes {
    /// Ids paired with their own abstract.
    pub same: usize,
    /// Ids rotated within the field.
    pub field: usize,
    /// Ids held out for cross-field mixing.
    pub mix: usize,
}

impl Default for PartitionSizes {
    fn default() -> Self {
        Self {
            same: DEFAULT_SAME_COUNT,
            field: DEFAULT_FIELD_COUNT,
            mix: DEFAULT_MIX_COUNT,
        }
    }
}

impl PartitionSizes {
    /// Minimum population that can be partitioned.
    pub fn required(&self) -> usize {
        self.same + self.field + self.mix
    }
}

/// Fractions used by the two split stages.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitFractions {
    /// Share of the full population reserved for test.
    pub test: f64,
    /// Share of the non-test remainder reserved for dev.
    pub dev: f64,
}

impl Default for SplitFractions {
    fn default() -> Self {
        Self {
            test: DEFAULT_TEST_FRACTION,
            dev: DEFAULT_DEV_FRACTION,
        }
    }
}

impl SplitFractions {
    /// Validate that both fractions lie in `[0, 1)`.
    pub fn normalized(self) -> Result<Self, PipelineError> {
        for (name, value) in [("test", self.test), ("dev", self.dev)] {
            if !(0.0..1.0).contains(&value) {
                return Err(PipelineError::Configuration(format!(
                    "{name} fraction must be in [0, 1), got {value}"
                )));
            }
        }
        Ok(self)
    }
}

/// One subject field and its length-filtered corpus.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Field name used in logs and errors.
    pub name: FieldName,
    /// Line-delimited JSON corpus for this field.
    pub input: PathBuf,
}

impl FieldConfig {
    /// Field `name` read from `input`.
    pub fn new(name: impl Into<FieldName>, input: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
        }
    }
}

/// Top-level pipeline configuration.
///
/// Every stage receives this by reference; nothing is read from process-wide
/// state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Fields in processing order. The index of a field names its output files.
    pub fields: Vec<FieldConfig>,
    /// Directory for per-field labeled and held-out files plus the mixed file.
    pub labeled_dir: PathBuf,
    /// Directory for `train.jsonl`, `dev.jsonl`, `test.jsonl`, and the manifest.
    pub output_dir: PathBuf,
    /// Seed for id partitioning and cross-field mixing.
    pub partition_seed: u64,
    /// Role sizes per field.
    pub partition_sizes: PartitionSizes,
    /// Split fractions.
    pub split_fractions: SplitFractions,
    /// Seed for both split stages.
    pub split_seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let preselected = Path::new(DEFAULT_PRESELECTED_DIR);
        let fields = ["art", "econ", "geo", "hist", "phil"]
            .into_iter()
            .map(|name| FieldConfig::new(name, preselected.join(format!("{name}_papers.jsonl"))))
            .collect();
        Self {
            fields,
            labeled_dir: PathBuf::from(DEFAULT_LABELED_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            partition_seed: DEFAULT_PARTITION_SEED,
            partition_sizes: PartitionSizes::default(),
            split_fractions: SplitFractions::default(),
            split_seed: DEFAULT_SPLIT_SEED,
        }
    }
}

impl PipelineConfig {
    /// Load a JSON config file. Missing keys fall back to defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|err| PipelineError::file(path, err))?;
        let config: Self = serde_json::from_str(&raw).map_err(|err| {
            PipelineError::Configuration(format!("invalid config '{}': {err}", path.display()))
        })?;
        config.validated()
    }

    /// Check cross-field invariants that serde cannot express.
    pub fn validated(self) -> Result<Self, PipelineError> {
        if self.fields.is_empty() {
            return Err(PipelineError::Configuration(
                "at least one field must be configured".to_string(),
            ));
        }
        for (idx, field) in self.fields.iter().enumerate() {
            if self.fields[..idx].iter().any(|other| other.name == field.name) {
                return Err(PipelineError::Configuration(format!(
                    "field '{}' is configured more than once",
                    field.name
                )));
            }
        }
        self.split_fractions.normalized()?;
        Ok(self)
    }

    /// Index of the field called `name`.
    pub fn field_index(&self, name: &str) -> Result<usize, PipelineError> {
        self.fields
            .iter()
            .position(|field| field.name == name)
            .ok_or_else(|| PipelineError::Configuration(format!("unknown field '{name}'")))
    }

    /// `labeled_{idx}.jsonl` under the labeled directory.
    pub fn labeled_path(&self, idx: usize) -> PathBuf {
        self.labeled_dir
            .join(format!("{LABELED_PREFIX}{idx}.{JSONL_EXTENSION}"))
    }

    /// `misc_{idx}.jsonl` under the labeled directory.
    pub fn held_out_path(&self, idx: usize) -> PathBuf {
        self.labeled_dir
            .join(format!("{HELD_OUT_PREFIX}{idx}.{JSONL_EXTENSION}"))
    }

    /// Cross-field pair file.
    pub fn mixed_path(&self) -> PathBuf {
        self.labeled_dir.join(MIXED_FILENAME)
    }

    /// Report of the last mixing run, next to the cross-field pair file.
    pub fn mix_report_path(&self) -> PathBuf {
        self.labeled_dir.join(MIX_REPORT_FILENAME)
    }
}
