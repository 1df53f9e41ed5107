/// Constants for the graded label taxonomy.
pub mod labels {
    /// Label for an abstract paired with its own paper's text.
    pub const SAME_PAPER_LABEL: f32 = 0.95;
    /// Label for an abstract paired with a different paper from the same field.
    pub const SAME_FIELD_LABEL: f32 = 0.5;
    /// Label for an abstract paired with a paper from a different field.
    pub const CROSS_FIELD_LABEL: f32 = 0.05;
}

/// Constants used by id partitioning.
pub mod partition {
    /// Seed shared by every field so reruns put the same ids in the same role.
    pub const DEFAULT_PARTITION_SEED: u64 = 13;
    /// Papers paired with their own abstract.
    pub const DEFAULT_SAME_COUNT: usize = 2000;
    /// Papers rotated within their field.
    pub const DEFAULT_FIELD_COUNT: usize = 2000;
    /// Papers reserved for cross-field mixing.
    pub const DEFAULT_MIX_COUNT: usize = 1000;
}

/// Constants used by the train/dev/test splitter.
pub mod splits {
    /// Seed used for both split stages.
    pub const DEFAULT_SPLIT_SEED: u64 = 13;
    /// Fraction of the population reserved for test.
    pub const DEFAULT_TEST_FRACTION: f64 = 0.1;
    /// Fraction of the non-test remainder reserved for dev.
    pub const DEFAULT_DEV_FRACTION: f64 = 0.1;
}

/// Constants for on-disk layout of intermediate and final outputs.
pub mod files {
    /// Prefix for per-field labeled pair files (`labeled_{i}.jsonl`).
    pub const LABELED_PREFIX: &str = "labeled_";
    /// Prefix for per-field held-out pool files (`misc_{i}.jsonl`).
    pub const HELD_OUT_PREFIX: &str = "misc_";
    /// File holding cross-field pairs.
    pub const MIXED_FILENAME: &str = "labeled_mixed.jsonl";
    /// Mixing report written next to the cross-field pair file.
    pub const MIX_REPORT_FILENAME: &str = "labeled_mixed.report.json";
    /// Final training split.
    pub const TRAIN_FILENAME: &str = "train.jsonl";
    /// Final dev split.
    pub const DEV_FILENAME: &str = "dev.jsonl";
    /// Final test split.
    pub const TEST_FILENAME: &str = "test.jsonl";
    /// Run summary written next to the final splits.
    pub const MANIFEST_FILENAME: &str = "manifest.json";
    /// Extension for line-delimited JSON files.
    pub const JSONL_EXTENSION: &str = "jsonl";
    /// Suffix appended to files while they are being written.
    pub const TEMP_SUFFIX: &str = "tmp";
    /// Default directory for per-field labeled and held-out files.
    pub const DEFAULT_LABELED_DIR: &str = "data/S2ORC/labeled";
    /// Default directory for final split files.
    pub const DEFAULT_OUTPUT_DIR: &str = "data/S2ORC";
    /// Default directory holding length-filtered per-field corpora.
    pub const DEFAULT_PRESELECTED_DIR: &str = "data/S2ORC/preselected";
}

/// Stage names used in logs and error context.
pub mod stages {
    use crate::types::StageName;

    /// Per-field partitioning and pair building.
    pub const LABEL: StageName = "label";
    /// Cross-field mixing of held-out pools.
    pub const MIX: StageName = "mix";
    /// Train/dev/test split.
    pub const SPLIT: StageName = "split";
}

/// Constants used by JSONL transport.
pub mod transport {
    /// Log message used when a record lacks required fields.
    pub const SKIP_SCHEMA_MSG: &str = "skipping record with missing or mistyped fields";
    /// Log message used when a duplicate id is collapsed before partitioning.
    pub const DUPLICATE_ID_MSG: &str = "duplicate paper id collapsed";
}
