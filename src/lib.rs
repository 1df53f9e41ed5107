#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command-line front end.
pub mod app;
/// Pipeline configuration types.
pub mod config;
/// Centralized constants for labels, partition sizes, seeds, and file layout.
pub mod constants;
/// Paper record and labeled pair types.
pub mod data;
/// Aggregate split metrics.
pub mod metrics;
/// Cross-field mixing of held-out pools.
pub mod mixer;
/// Per-field pair building.
pub mod pairs;
/// Deterministic id partitioning.
pub mod partition;
/// Stage orchestration.
pub mod pipeline;
/// Seeded shuffling.
pub mod rng;
/// Corpus traits and built-in corpora.
pub mod source;
/// Train/dev/test splitting.
pub mod splits;
/// Input/output transports (filesystem JSONL).
pub mod transport;
/// Shared type aliases.
pub mod types;

mod errors;

pub use config::{FieldConfig, PartitionSizes, PipelineConfig, SplitFractions};
pub use data::{LabeledPair, PairLabel, PaperRecord};
pub use errors::PipelineError;
pub use mixer::{CrossFieldPool, MixOutcome, mix_across_fields};
pub use pairs::{BundleEntry, FieldBundle, FieldPairs, build_pairs};
pub use partition::{IdPartition, PartitionRole, partition};
pub use pipeline::{Pipeline, RunReport, Stage};
pub use source::{CorpusSource, InMemoryCorpus, JsonlCorpus};
pub use splits::{DatasetSplits, SplitLabel, split};
pub use types::{AbstractText, BodyText, FieldName, PaperId};
