//! Stage orchestration: label (per field) → mix → split.
//!
//! Each stage reads only what earlier stages published and checks that every
//! configured field produced its output before doing any work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use crate::config::{PipelineConfig, SplitFractions};
use crate::constants::files::{
    DEV_FILENAME, MANIFEST_FILENAME, TEST_FILENAME, TRAIN_FILENAME,
};
use crate::constants::stages::{LABEL, MIX, SPLIT};
use crate::data::{LabeledPair, PaperRecord};
use crate::errors::PipelineError;
use crate::metrics::{SplitSummary, format_with_commas};
use crate::mixer::{CrossFieldPool, mix_across_fields};
use crate::pairs::build_pairs;
use crate::partition::partition;
use crate::source::{CorpusSource, JsonlCorpus};
use crate::splits::{SplitLabel, split};
use crate::transport::fs::{AtomicJsonlWriter, read_jsonl, write_json_atomic, write_jsonl};
use crate::types::{FieldName, StageName};

/// Which part of the pipeline to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Label every field, mix, then split.
    All,
    /// Partition and pair-build fields.
    Label,
    /// Cross-field mixing of held-out pools.
    Mix,
    /// Train/dev/test split.
    Split,
}

/// Outcome of labeling one field.
#[derive(Clone, Debug, Serialize)]
pub struct FieldReport {
    /// Field name.
    pub field: FieldName,
    /// Position in the configured field list.
    pub index: usize,
    /// Well-formed records read from the corpus.
    pub population: usize,
    /// Self pairs written.
    pub same_pairs: usize,
    /// Rotated pairs written.
    pub rotated_pairs: usize,
    /// Records written to the held-out pool.
    pub held_out: usize,
    /// Records outside every labeled subset.
    pub dropped: usize,
    /// `labeled_{index}.jsonl`.
    pub labeled_path: PathBuf,
    /// `misc_{index}.jsonl`.
    pub held_out_path: PathBuf,
}

/// Outcome of the mixing stage; persisted next to the mixed file and copied
/// into the run manifest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MixReport {
    /// Cross-field pairs written.
    pub pairs: usize,
    /// Field slots whose abstracts came from another field.
    pub moved_groups: usize,
    /// Field slots whose abstracts stayed in place.
    pub fixed_slots: Vec<usize>,
    /// Names of the fields in `fixed_slots`.
    pub fixed_fields: Vec<FieldName>,
    /// Origin field index of the abstracts paired with each field's texts.
    pub source_field_for: Vec<usize>,
    /// Cross-field pair file.
    pub path: PathBuf,
}

/// Outcome of the split stage; also written as the run manifest.
#[derive(Clone, Debug, Serialize)]
pub struct SplitReport {
    /// When the split finished.
    pub generated_at: DateTime<Utc>,
    /// Pairs across all inputs.
    pub total: usize,
    /// Seed used for both split stages.
    pub split_seed: u64,
    /// Seed used for partitioning and mixing.
    pub partition_seed: u64,
    /// Test and dev fractions.
    pub fractions: SplitFractions,
    /// Labeled files read, in order.
    pub inputs: Vec<PathBuf>,
    /// Per-split diagnostics.
    pub splits: Vec<SplitSummary>,
    /// Report of the mixing run that produced the cross-field file, when
    /// one was recorded.
    pub mix: Option<MixReport>,
}

/// Everything a run produced, per stage.
#[derive(Clone, Debug, Default)]
pub struct RunReport {
    /// One entry per labeled field.
    pub fields: Vec<FieldReport>,
    /// Present when the mix stage ran.
    pub mix: Option<MixReport>,
    /// Present when the split stage ran.
    pub split: Option<SplitReport>,
}

/// Sequential batch pipeline over an immutable configuration.
#[derive(Clone, Debug)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Validate `config` and build a pipeline.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        Ok(Self {
            config: config.validated()?,
        })
    }

    /// Validated configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run `stage`. `field` restricts the label stage to one field.
    pub fn run(&self, stage: Stage, field: Option<&str>) -> Result<RunReport, PipelineError> {
        let mut report = RunReport::default();
        match stage {
            Stage::All => {
                report.fields = self.label_all()?;
                report.mix = Some(self.mix()?);
                report.split = Some(self.split()?);
            }
            Stage::Label => {
                report.fields = match field {
                    Some(name) => vec![self.label_field(name)?],
                    None => self.label_all()?,
                };
            }
            Stage::Mix => report.mix = Some(self.mix()?),
            Stage::Split => report.split = Some(self.split()?),
        }
        Ok(report)
    }

    /// Label every configured field from its JSONL corpus, in order.
    pub fn label_all(&self) -> Result<Vec<FieldReport>, PipelineError> {
        (0..self.config.fields.len())
            .map(|idx| {
                let corpus = JsonlCorpus::from(&self.config.fields[idx]);
                self.label_field_from(idx, &corpus)
            })
            .collect()
    }

    /// Label the field called `name` from its JSONL corpus.
    pub fn label_field(&self, name: &str) -> Result<FieldReport, PipelineError> {
        let idx = self.config.field_index(name)?;
        let corpus = JsonlCorpus::from(&self.config.fields[idx]);
        self.label_field_from(idx, &corpus)
    }

    /// Partition, pair-build, and publish field `idx` from `source`.
    ///
    /// Nothing is written unless partitioning and rotation both succeed.
    pub fn label_field_from(
        &self,
        idx: usize,
        source: &dyn CorpusSource,
    ) -> Result<FieldReport, PipelineError> {
        let started = Instant::now();
        let field = source.field();
        info!(field = %field, index = idx, "labeling field");

        let ids = source.paper_ids()?;
        let population = ids.len();
        let partition = partition(
            field,
            ids,
            self.config.partition_sizes,
            self.config.partition_seed,
        )?;
        let pairs = build_pairs(field, source.records()?, &partition)?;
        let labeled = pairs.labeled_pairs()?;

        let labeled_path = self.config.labeled_path(idx);
        let held_out_path = self.config.held_out_path(idx);
        let mut labeled_writer = AtomicJsonlWriter::create(&labeled_path)?;
        labeled_writer.write_all(&labeled)?;
        let mut held_out_writer = AtomicJsonlWriter::create(&held_out_path)?;
        held_out_writer.write_all(&pairs.held_out)?;
        labeled_writer.commit()?;
        if let Err(err) = held_out_writer.commit() {
            let _ = fs::remove_file(&labeled_path);
            return Err(err);
        }

        let report = FieldReport {
            field: field.to_string(),
            index: idx,
            population,
            same_pairs: pairs.same_pairs.len(),
            rotated_pairs: labeled.len() - pairs.same_pairs.len(),
            held_out: pairs.held_out.len(),
            dropped: pairs.dropped,
            labeled_path,
            held_out_path,
        };
        info!(
            field = %report.field,
            same = report.same_pairs,
            rotated = report.rotated_pairs,
            held_out = report.held_out,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "within-field labeled data saved"
        );
        Ok(report)
    }

    /// Mix every field's held-out pool. Requires all held-out files.
    pub fn mix(&self) -> Result<MixReport, PipelineError> {
        let started = Instant::now();
        let inputs: Vec<(FieldName, PathBuf)> = self
            .config
            .fields
            .iter()
            .enumerate()
            .map(|(idx, field)| (field.name.clone(), self.config.held_out_path(idx)))
            .collect();
        require_inputs(MIX, &inputs)?;

        let mut pool = CrossFieldPool::new();
        for (field, path) in &inputs {
            let (records, stats) = read_jsonl::<PaperRecord>(path)?;
            if stats.skipped > 0 {
                info!(field = %field, skipped = stats.skipped, "held-out records skipped");
            }
            pool.push_field(field.clone(), records);
        }
        info!(
            count = pool.len(),
            fields = pool.field_count(),
            "held-out papers extracted"
        );

        let outcome = mix_across_fields(&pool, self.config.partition_seed)?;
        let path = self.config.mixed_path();
        write_jsonl(&path, &outcome.pairs)?;
        let report = MixReport {
            pairs: outcome.pairs.len(),
            moved_groups: outcome.moved_groups,
            fixed_fields: outcome
                .fixed_slots
                .iter()
                .map(|slot| pool.fields()[*slot].clone())
                .collect(),
            fixed_slots: outcome.fixed_slots,
            source_field_for: outcome.source_field_for,
            path,
        };
        write_json_atomic(&self.config.mix_report_path(), &report)?;
        info!(
            pairs = report.pairs,
            fixed = report.fixed_slots.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "held-out papers shuffled and saved"
        );
        Ok(report)
    }

    /// Split every labeled pair into train/dev/test. Requires every per-field
    /// labeled file and the mixed file.
    pub fn split(&self) -> Result<SplitReport, PipelineError> {
        let started = Instant::now();
        let mut inputs: Vec<(FieldName, PathBuf)> = self
            .config
            .fields
            .iter()
            .enumerate()
            .map(|(idx, field)| (field.name.clone(), self.config.labeled_path(idx)))
            .collect();
        inputs.push(("*".to_string(), self.config.mixed_path()));
        require_inputs(SPLIT, &inputs)?;

        let mut population: Vec<LabeledPair> = Vec::new();
        for (_, path) in &inputs {
            let (pairs, _) = read_jsonl::<LabeledPair>(path)?;
            population.extend(pairs);
        }
        info!(total = population.len(), "labeled pairs collected");

        let total = population.len();
        let splits = split(
            population,
            self.config.split_fractions,
            self.config.split_seed,
        )?;

        let output_dir = &self.config.output_dir;
        for label in SplitLabel::ALL {
            write_jsonl(split_path(output_dir, label), splits.get(label))?;
        }
        let summaries = splits.summaries();
        for summary in &summaries {
            info!(
                split = %summary.split,
                pairs = summary.pairs,
                chars = %format_with_commas(summary.chars),
                tokens = %format_with_commas(summary.tokens),
                "split saved"
            );
        }

        let mix = read_mix_report(&self.config.mix_report_path())?;
        if let Some(mix) = &mix
            && !mix.fixed_fields.is_empty()
        {
            warn!(
                fields = ?mix.fixed_fields,
                "cross-field input contains groups that were never moved"
            );
        }

        let report = SplitReport {
            generated_at: Utc::now(),
            total,
            split_seed: self.config.split_seed,
            partition_seed: self.config.partition_seed,
            fractions: self.config.split_fractions,
            inputs: inputs.into_iter().map(|(_, path)| path).collect(),
            splits: summaries,
            mix,
        };
        write_json_atomic(&output_dir.join(MANIFEST_FILENAME), &report)?;
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "train/dev/test split complete"
        );
        Ok(report)
    }
}

/// Path of a split's JSONL file under `dir`.
pub fn split_path(dir: &Path, label: SplitLabel) -> PathBuf {
    dir.join(match label {
        SplitLabel::Train => TRAIN_FILENAME,
        SplitLabel::Dev => DEV_FILENAME,
        SplitLabel::Test => TEST_FILENAME,
    })
}

fn read_mix_report(path: &Path) -> Result<Option<MixReport>, PipelineError> {
    if !path.is_file() {
        return Ok(None);
    }
    let raw = fs::read(path).map_err(|err| PipelineError::file(path, err))?;
    Ok(Some(serde_json::from_slice(&raw)?))
}

fn require_inputs(stage: StageName, inputs: &[(FieldName, PathBuf)]) -> Result<(), PipelineError> {
    for (field, path) in inputs {
        if !path.is_file() {
            let upstream = if stage == SPLIT && field == "*" {
                MIX
            } else {
                LABEL
            };
            return Err(PipelineError::precondition(
                stage,
                field.as_str(),
                format!(
                    "missing '{}'; run the {upstream} stage first",
                    path.display()
                ),
            ));
        }
    }
    Ok(())
}
