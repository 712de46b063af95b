use clap::ValueEnum;
use serde::Serialize;

/// Per-gene weighting applied before summing a cell type's signature.
/// `Sum` is the default: raw expression summed over the signature genes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    #[default]
    Sum,
    /// Sum divided by the signature length.
    Mean,
    /// Marker potential: `1 / (1 + rank) / k`, `k` = cell types listing the gene.
    Weighted,
}

/// Row rescaling used for the display matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RescaleMode {
    /// Divide by the row sum.
    #[default]
    Sum,
    /// Divide by the row max.
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleLayout {
    /// Rows are genes, numeric columns are samples.
    #[default]
    GeneRows,
    /// Columns are samples listing genes in rank order.
    Ranked,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationProfile {
    pub scoring: ScoringMode,
    pub rescale: RescaleMode,
    pub top_n: usize,
    pub min_gene_score: f64,
    pub min_match_percent: f64,
    pub max_matches: usize,
}

impl AnnotationProfile {
    pub fn default_v1() -> Self {
        Self {
            scoring: ScoringMode::Sum,
            rescale: RescaleMode::Sum,
            top_n: 10,
            min_gene_score: 0.0,
            min_match_percent: 0.1,
            max_matches: 5,
        }
    }

    pub fn min_match_fraction(&self) -> f64 {
        self.min_match_percent / 100.0
    }
}
