mod input;
mod logging;
mod model;
mod pipeline;
mod report;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing::{info, warn};

use crate::input::{InputError, load_table};
use crate::model::{AnnotateError, AnnotationProfile, GeneScope, RescaleMode, SampleLayout, ScoringMode};
use crate::pipeline::stage1_reference::{ReferenceParams, build_signature};
use crate::pipeline::stage2_sample::{SampleParams, build_expression};
use crate::pipeline::stage3_score::score;
use crate::pipeline::stage4_display::build_display;
use crate::pipeline::stage5_top_genes::{top_genes, top_genes_per_sample};
use crate::pipeline::stage6_report::{ReportInput, build_report_context, write_reports};
use crate::report::text::render_report_text;

#[derive(Parser, Debug)]
#[command(name = "kira-annotator", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score sample expression against reference cell type marker genes
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Reference table: one column per cell type listing its marker genes
    #[arg(long)]
    reference: PathBuf,
    #[arg(long)]
    reference_sheet: Option<String>,
    /// Keep every N-th reference column (2 for sheets with paired ordering columns)
    #[arg(long, default_value_t = 1)]
    reference_stride: usize,

    /// Sample table with expression values
    #[arg(long)]
    sample: PathBuf,
    #[arg(long)]
    sample_sheet: Option<String>,
    #[arg(long, value_enum, default_value_t = SampleLayout::GeneRows)]
    sample_layout: SampleLayout,
    /// Gene identifier column (gene-rows layout)
    #[arg(long)]
    gene_column: Option<String>,
    /// Keep every sample gene instead of restricting to reference genes
    #[arg(long)]
    all_genes: bool,

    #[arg(long, value_enum, default_value_t = ScoringMode::Sum)]
    scoring: ScoringMode,
    #[arg(long, value_enum, default_value_t = RescaleMode::Sum)]
    rescale: RescaleMode,
    #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
    top_n: i64,
    /// Report only genes contributing more than this
    #[arg(long, default_value_t = 0.0)]
    min_gene_score: f64,
    #[arg(long, default_value_t = 0.1)]
    min_match_percent: f64,
    #[arg(long, default_value_t = 5)]
    max_matches: usize,

    /// Directory for TSV/JSON/text reports
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone)]
struct RunConfig {
    reference: TableSource,
    sample: TableSource,
    reference_params: ReferenceParams,
    sample_params: SampleParams,
    restrict_to_reference: bool,
    profile: AnnotationProfile,
    out_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
struct TableSource {
    path: PathBuf,
    sheet: Option<String>,
}

impl TableSource {
    fn describe(&self) -> String {
        match &self.sheet {
            Some(sheet) => format!("{} [sheet '{}']", self.path.display(), sheet),
            None => self.path.display().to_string(),
        }
    }
}

#[derive(Debug, Error)]
enum RunError {
    #[error("failed to load {location}: {source}")]
    Load {
        location: String,
        #[source]
        source: InputError,
    },
    #[error("{location}: {source}")]
    Annotate {
        location: String,
        #[source]
        source: AnnotateError,
    },
    #[error(transparent)]
    Config(#[from] AnnotateError),
    #[error("failed to write reports to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn main() {
    logging::init_logging();
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => build_config(args).and_then(|config| run(&config)),
    };
    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn build_config(args: RunArgs) -> Result<RunConfig, RunError> {
    let top_n = usize::try_from(args.top_n)
        .ok()
        .filter(|n| *n > 0)
        .ok_or(AnnotateError::InvalidTopN(args.top_n))?;

    let mut profile = AnnotationProfile::default_v1();
    profile.scoring = args.scoring;
    profile.rescale = args.rescale;
    profile.top_n = top_n;
    profile.min_gene_score = args.min_gene_score;
    profile.min_match_percent = args.min_match_percent;
    profile.max_matches = args.max_matches;

    Ok(RunConfig {
        reference: TableSource {
            path: args.reference,
            sheet: args.reference_sheet,
        },
        sample: TableSource {
            path: args.sample,
            sheet: args.sample_sheet,
        },
        reference_params: ReferenceParams {
            column_stride: args.reference_stride.max(1),
        },
        sample_params: SampleParams {
            layout: args.sample_layout,
            gene_column: args.gene_column,
        },
        restrict_to_reference: !args.all_genes,
        profile,
        out_dir: args.out,
    })
}

fn run(config: &RunConfig) -> Result<(), RunError> {
    let reference_table = load_source(&config.reference)?;
    let signature = build_signature(&reference_table, &config.reference_params)
        .map_err(|e| annotate_error(&config.reference, e))?;
    info!(
        "reference: {} cell types, {} distinct genes",
        signature.n_cell_types(),
        signature.vocabulary().len()
    );
    for cell_type in signature.cell_types.iter().filter(|c| c.genes.is_empty()) {
        warn!("cell type '{}' has no marker genes; it scores 0", cell_type.name);
    }

    let sample_table = load_source(&config.sample)?;
    let vocabulary = signature.vocabulary();
    let expression = build_expression(
        &sample_table,
        config.restrict_to_reference.then_some(vocabulary.as_slice()),
        &config.sample_params,
    )
    .map_err(|e| annotate_error(&config.sample, e))?;
    info!(
        "sample: {} samples, {} genes ({} present in table)",
        expression.n_samples(),
        expression.n_genes(),
        expression.matched_genes
    );

    let profile = &config.profile;
    let weighting = score(&signature, &expression, profile.scoring);
    let display = build_display(&weighting, profile.rescale);
    let sample_genes = top_genes_per_sample(&signature, &expression, profile.top_n, profile.scoring)?;
    let aggregate_genes = top_genes(
        &signature,
        &expression,
        profile.top_n,
        &GeneScope::Aggregate,
        profile.scoring,
    )?;

    let input = ReportInput {
        signature: &signature,
        expression: &expression,
        weighting: &weighting,
        display: &display,
        sample_genes: &sample_genes,
        aggregate_genes: &aggregate_genes,
        profile,
        layout: config.sample_params.layout,
        reference_source: config.reference.describe(),
        sample_source: config.sample.describe(),
        tool_name: "kira-annotator".to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    print!("{}", render_report_text(&build_report_context(&input)));

    if let Some(out_dir) = &config.out_dir {
        write_reports(&input, out_dir).map_err(|source| RunError::Write {
            path: out_dir.display().to_string(),
            source,
        })?;
    }
    Ok(())
}

fn load_source(source: &TableSource) -> Result<input::Table, RunError> {
    load_table(&source.path, source.sheet.as_deref()).map_err(|e| RunError::Load {
        location: source.describe(),
        source: e,
    })
}

fn annotate_error(source: &TableSource, err: AnnotateError) -> RunError {
    RunError::Annotate {
        location: source.describe(),
        source: err,
    }
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
