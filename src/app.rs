use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum, error::ErrorKind};
use tracing::{error, info};

use crate::config::PipelineConfig;
use crate::metrics::format_with_commas;
use crate::pipeline::{Pipeline, RunReport, Stage};

/// Default log directive when `RUST_LOG` is unset.
const DEFAULT_LOG_DIRECTIVE: &str = "abstract_pairs=info";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StageArg {
    All,
    Label,
    Mix,
    Split,
}

impl From<StageArg> for Stage {
    fn from(value: StageArg) -> Self {
        match value {
            StageArg::All => Stage::All,
            StageArg::Label => Stage::Label,
            StageArg::Mix => Stage::Mix,
            StageArg::Split => Stage::Split,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "abstract-pairs",
    disable_help_subcommand = true,
    about = "Build labeled abstract/text pairs and train/dev/test splits",
    long_about = "Partition each field's papers, build same-paper, same-field, and cross-field pairs, then split the labeled set into train/dev/test with fixed seeds.",
    after_help = "Without --config the built-in five-field layout under data/S2ORC is used."
)]
struct PipelineCli {
    #[arg(
        long,
        value_name = "PATH",
        help = "JSON pipeline config; missing keys use defaults"
    )]
    config: Option<PathBuf>,
    #[arg(
        long,
        value_enum,
        default_value = "all",
        help = "Stage to run"
    )]
    stage: StageArg,
    #[arg(
        long,
        value_name = "NAME",
        help = "Restrict the label stage to one configured field"
    )]
    field: Option<String>,
    #[arg(long, help = "Override the partition and mixing seed")]
    partition_seed: Option<u64>,
    #[arg(long, help = "Override the train/dev/test split seed")]
    split_seed: Option<u64>,
}

/// Parse CLI arguments, run the requested stage, and log a summary.
pub fn run_pipeline_cli<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_DIRECTIVE)),
        )
        .try_init();

    let Some(cli) = parse_cli::<PipelineCli, _>(
        std::iter::once("abstract-pairs".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(seed) = cli.partition_seed {
        config.partition_seed = seed;
    }
    if let Some(seed) = cli.split_seed {
        config.split_seed = seed;
    }
    if cli.field.is_some() && !matches!(cli.stage, StageArg::Label) {
        return Err("--field only applies to --stage label".into());
    }

    let stage = Stage::from(cli.stage);
    let pipeline = Pipeline::new(config)?;
    match pipeline.run(stage, cli.field.as_deref()) {
        Ok(report) => {
            log_report(&report);
            Ok(())
        }
        Err(err) => {
            error!(stage = ?stage, error = %err, "pipeline aborted");
            Err(err.into())
        }
    }
}

fn log_report(report: &RunReport) {
    for field in &report.fields {
        info!(
            field = %field.field,
            population = field.population,
            same = field.same_pairs,
            rotated = field.rotated_pairs,
            held_out = field.held_out,
            "field labeled"
        );
    }
    if let Some(mix) = &report.mix {
        info!(
            pairs = mix.pairs,
            moved_groups = mix.moved_groups,
            fixed_fields = ?mix.fixed_fields,
            "cross-field pairs written"
        );
    }
    if let Some(split) = &report.split {
        info!(total = %format_with_commas(split.total), "dataset split");
    }
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> PipelineCli {
        parse_cli::<PipelineCli, _>(
            std::iter::once("abstract-pairs").chain(args.iter().copied()),
        )
        .unwrap()
        .unwrap()
    }

    #[test]
    fn defaults_to_full_run() {
        let cli = parse(&[]);
        assert!(matches!(cli.stage, StageArg::All));
        assert!(cli.config.is_none());
        assert!(cli.field.is_none());
    }

    #[test]
    fn parses_single_stage_and_overrides() {
        let cli = parse(&[
            "--stage",
            "label",
            "--field",
            "art",
            "--partition-seed",
            "7",
            "--config",
            "pipeline.json",
        ]);
        assert!(matches!(cli.stage, StageArg::Label));
        assert_eq!(cli.field.as_deref(), Some("art"));
        assert_eq!(cli.partition_seed, Some(7));
        assert_eq!(cli.config, Some(PathBuf::from("pipeline.json")));
        assert_eq!(Stage::from(cli.stage), Stage::Label);
    }

    #[test]
    fn rejects_unknown_stage() {
        let parsed = parse_cli::<PipelineCli, _>(["abstract-pairs", "--stage", "train"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn help_returns_none() {
        let parsed = parse_cli::<PipelineCli, _>(["abstract-pairs", "--help"]).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn field_outside_label_stage_is_rejected() {
        let args = ["--stage", "split", "--field", "art"]
            .into_iter()
            .map(String::from);
        assert!(run_pipeline_cli(args).is_err());
    }
}
