use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::WriterBuilder;
use tracing::info;

use crate::model::{
    AnnotationProfile, DisplayMatrix, ExpressionMatrix, GeneSignature, SampleLayout,
    TopGeneScores, Weighting,
};
use crate::report::json::render_summary_json;
use crate::report::text::render_report_text;
use crate::report::{
    InputSummary, MatchBlock, MatchSummary, ReportContext, SampleBlock, SampleSummary,
    SummaryData, format_f64_6, to_percent,
};

#[derive(Debug, Clone)]
pub struct ReportInput<'a> {
    pub signature: &'a GeneSignature,
    pub expression: &'a ExpressionMatrix,
    pub weighting: &'a Weighting,
    pub display: &'a DisplayMatrix,
    /// One entry per sample, in matrix order.
    pub sample_genes: &'a [TopGeneScores],
    pub aggregate_genes: &'a TopGeneScores,
    pub profile: &'a AnnotationProfile,
    pub layout: SampleLayout,

    pub reference_source: String,
    pub sample_source: String,
    pub tool_name: String,
    pub tool_version: String,
}

pub fn write_reports(input: &ReportInput<'_>, out_dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(out_dir)?;

    write_weightings_tsv(input, &out_dir.join("weightings.tsv"))?;
    write_display_tsv(input, &out_dir.join("display_matrix.tsv"))?;
    write_top_genes_tsv(input, &out_dir.join("top_genes.tsv"))?;

    let summary = build_summary(input);
    let json = render_summary_json(&summary).map_err(std::io::Error::other)?;
    write_text(&out_dir.join("summary.json"), &json)?;

    let report = render_report_text(&build_report_context(input));
    write_text(&out_dir.join("report.txt"), &report)?;

    info!("reports written to {}", out_dir.display());
    Ok(())
}

fn tsv_writer(path: &Path) -> csv::Result<csv::Writer<File>> {
    WriterBuilder::new().delimiter(b'\t').from_path(path)
}

fn write_weightings_tsv(input: &ReportInput<'_>, path: &Path) -> std::io::Result<()> {
    let mut w = tsv_writer(path)?;
    w.write_record(["sample", "cell_type", "score", "display"])?;
    let shown = input.display.values.iter().flatten();
    for ((sample, cell_type, score), display) in input.weighting.rows().zip(shown) {
        w.write_record([
            sample,
            cell_type,
            format_f64_6(score).as_str(),
            format_f64_6(*display).as_str(),
        ])?;
    }
    w.flush()
}

fn write_display_tsv(input: &ReportInput<'_>, path: &Path) -> std::io::Result<()> {
    let mut w = tsv_writer(path)?;
    let mut header = vec!["sample".to_string()];
    header.extend(input.display.cell_types.iter().cloned());
    w.write_record(&header)?;
    for (s, row) in input.display.values.iter().enumerate() {
        let mut record = vec![input.display.samples[s].clone()];
        record.extend(row.iter().map(|v| format!("{:.2}", to_percent(*v))));
        w.write_record(&record)?;
    }
    w.flush()
}

fn write_top_genes_tsv(input: &ReportInput<'_>, path: &Path) -> std::io::Result<()> {
    let mut w = tsv_writer(path)?;
    w.write_record(["scope", "cell_type", "rank", "gene", "contribution"])?;
    let level = input.profile.min_gene_score;
    for scores in input.sample_genes.iter().chain(std::iter::once(input.aggregate_genes)) {
        for ranked in &scores.cell_types {
            for (rank, g) in ranked.above(level).enumerate() {
                w.write_record([
                    scores.scope.label(),
                    ranked.cell_type.as_str(),
                    (rank + 1).to_string().as_str(),
                    g.gene.as_str(),
                    format_f64_6(g.contribution).as_str(),
                ])?;
            }
        }
    }
    w.flush()
}

fn write_text(path: &Path, content: &str) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    w.write_all(content.as_bytes())?;
    w.flush()
}

fn sample_matches(input: &ReportInput<'_>, sample: usize) -> Vec<(String, f64)> {
    input
        .display
        .top_matches(
            sample,
            input.profile.min_match_fraction(),
            input.profile.max_matches,
        )
        .into_iter()
        .map(|(cell_type, v)| (cell_type.to_string(), to_percent(v)))
        .collect()
}

pub fn build_summary(input: &ReportInput<'_>) -> SummaryData {
    let samples: Vec<SampleSummary> = input
        .weighting
        .samples
        .iter()
        .enumerate()
        .map(|(s, name)| SampleSummary {
            sample: name.clone(),
            total_score: input.weighting.scores[s].iter().sum(),
            matches: sample_matches(input, s)
                .into_iter()
                .map(|(cell_type, percent)| MatchSummary { cell_type, percent })
                .collect(),
        })
        .collect();

    SummaryData {
        tool: input.tool_name.clone(),
        version: input.tool_version.clone(),
        input: InputSummary {
            reference: input.reference_source.clone(),
            sample: input.sample_source.clone(),
            sample_layout: layout_name(input.layout).to_string(),
            n_cell_types: input.signature.n_cell_types(),
            n_reference_genes: input.signature.vocabulary().len(),
            n_samples: input.expression.n_samples(),
            n_genes: input.expression.n_genes(),
            n_genes_matched: input.expression.matched_genes,
        },
        scoring: format!("{:?}", input.profile.scoring).to_ascii_lowercase(),
        rescale: format!("{:?}", input.profile.rescale).to_ascii_lowercase(),
        top_n: input.profile.top_n,
        min_gene_score: input.profile.min_gene_score,
        min_match_percent: input.profile.min_match_percent,
        max_matches: input.profile.max_matches,
        samples,
    }
}

pub fn build_report_context(input: &ReportInput<'_>) -> ReportContext {
    let level = input.profile.min_gene_score;
    let samples: Vec<SampleBlock> = input
        .weighting
        .samples
        .iter()
        .enumerate()
        .map(|(s, name)| SampleBlock {
            sample: name.clone(),
            matches: sample_matches(input, s)
                .into_iter()
                .map(|(cell_type, percent)| {
                    let genes: Vec<(String, f64)> = input
                        .sample_genes
                        .get(s)
                        .and_then(|scores| scores.get(&cell_type))
                        .map(|ranked| {
                            ranked
                                .above(level)
                                .map(|g| (g.gene.clone(), g.contribution))
                                .collect()
                        })
                        .unwrap_or_default();
                    MatchBlock {
                        cell_type,
                        percent,
                        genes,
                    }
                })
                .collect(),
        })
        .collect();

    let aggregate: Vec<(String, Vec<(String, f64)>)> = input
        .aggregate_genes
        .cell_types
        .iter()
        .map(|ranked| {
            (
                ranked.cell_type.clone(),
                ranked
                    .above(level)
                    .map(|g| (g.gene.clone(), g.contribution))
                    .collect(),
            )
        })
        .collect();

    ReportContext {
        reference: input.reference_source.clone(),
        sample: input.sample_source.clone(),
        n_cell_types: input.signature.n_cell_types(),
        n_reference_genes: input.signature.vocabulary().len(),
        n_samples: input.expression.n_samples(),
        n_genes_matched: input.expression.matched_genes,
        scoring: format!("{:?}", input.profile.scoring).to_ascii_lowercase(),
        rescale: format!("{:?}", input.profile.rescale).to_ascii_lowercase(),
        top_n: input.profile.top_n,
        min_match_percent: input.profile.min_match_percent,
        samples,
        aggregate,
    }
}

fn layout_name(layout: SampleLayout) -> &'static str {
    match layout {
        SampleLayout::GeneRows => "gene-rows",
        SampleLayout::Ranked => "ranked",
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage6_report.rs"]
mod tests;
