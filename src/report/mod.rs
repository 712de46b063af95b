use serde::Serialize;

pub mod json;
pub mod text;

#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    pub cell_type: String,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SampleSummary {
    pub sample: String,
    pub total_score: f64,
    pub matches: Vec<MatchSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputSummary {
    pub reference: String,
    pub sample: String,
    pub sample_layout: String,
    pub n_cell_types: usize,
    pub n_reference_genes: usize,
    pub n_samples: usize,
    pub n_genes: usize,
    pub n_genes_matched: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryData {
    pub tool: String,
    pub version: String,
    pub input: InputSummary,
    pub scoring: String,
    pub rescale: String,
    pub top_n: usize,
    pub min_gene_score: f64,
    pub min_match_percent: f64,
    pub max_matches: usize,
    pub samples: Vec<SampleSummary>,
}

#[derive(Debug, Clone)]
pub struct MatchBlock {
    pub cell_type: String,
    pub percent: f64,
    pub genes: Vec<(String, f64)>,
}

#[derive(Debug, Clone)]
pub struct SampleBlock {
    pub sample: String,
    pub matches: Vec<MatchBlock>,
}

#[derive(Debug, Clone)]
pub struct ReportContext {
    pub reference: String,
    pub sample: String,
    pub n_cell_types: usize,
    pub n_reference_genes: usize,
    pub n_samples: usize,
    pub n_genes_matched: usize,
    pub scoring: String,
    pub rescale: String,
    pub top_n: usize,
    pub min_match_percent: f64,
    pub samples: Vec<SampleBlock>,
    pub aggregate: Vec<(String, Vec<(String, f64)>)>,
}

pub fn format_f64_6(v: f64) -> String {
    format!("{:.6}", v)
}

pub fn format_f64_2(v: f64) -> String {
    format!("{:.2}", v)
}

/// Display fraction as a percentage rounded to two decimals.
pub fn to_percent(fraction: f64) -> f64 {
    (fraction * 10_000.0).round() / 100.0
}

pub fn format_gene_list(genes: &[(String, f64)]) -> String {
    genes
        .iter()
        .map(|(gene, score)| format!("{} ({})", gene, format_f64_2(*score)))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
