use crate::model::params::{RescaleMode, ScoringMode};

/// Raw (sample, cell type) scores. Dense: one value for every pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Weighting {
    pub samples: Vec<String>,
    pub cell_types: Vec<String>,
    /// `scores[sample][cell_type]`.
    pub scores: Vec<Vec<f64>>,
    pub scoring: ScoringMode,
}

impl Weighting {
    #[cfg(test)]
    pub fn get(&self, sample: &str, cell_type: &str) -> Option<f64> {
        let s = self.samples.iter().position(|x| x == sample)?;
        let t = self.cell_types.iter().position(|x| x == cell_type)?;
        Some(self.scores[s][t])
    }

    /// Long-form rows `(sample, cell_type, score)` in matrix order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.samples.iter().enumerate().flat_map(move |(s, sample)| {
            self.cell_types
                .iter()
                .enumerate()
                .map(move |(t, cell_type)| (sample.as_str(), cell_type.as_str(), self.scores[s][t]))
        })
    }
}

/// Row-rescaled weighting; values lie in [0, 1] and are never NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayMatrix {
    pub samples: Vec<String>,
    pub cell_types: Vec<String>,
    pub values: Vec<Vec<f64>>,
    pub rescale: RescaleMode,
}

impl DisplayMatrix {
    #[cfg(test)]
    pub fn get(&self, sample: &str, cell_type: &str) -> Option<f64> {
        let s = self.samples.iter().position(|x| x == sample)?;
        let t = self.cell_types.iter().position(|x| x == cell_type)?;
        Some(self.values[s][t])
    }

    /// Best matching cell types for one sample: descending by value, ties in
    /// reference order, at least `min_fraction`, at most `limit` entries.
    pub fn top_matches(&self, sample: usize, min_fraction: f64, limit: usize) -> Vec<(&str, f64)> {
        let Some(row) = self.values.get(sample) else {
            return Vec::new();
        };
        let mut order: Vec<usize> = (0..row.len()).collect();
        order.sort_by(|&a, &b| {
            row[b]
                .partial_cmp(&row[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        order
            .into_iter()
            .filter(|&t| row[t] > 0.0 && row[t] >= min_fraction)
            .take(limit)
            .map(|t| (self.cell_types[t].as_str(), row[t]))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneScope {
    Sample(String),
    Aggregate,
}

impl GeneScope {
    pub fn label(&self) -> &str {
        match self {
            GeneScope::Sample(name) => name,
            GeneScope::Aggregate => "all_samples",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneContribution {
    pub gene: String,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedGenes {
    pub cell_type: String,
    pub genes: Vec<GeneContribution>,
}

impl RankedGenes {
    pub fn above(&self, level: f64) -> impl Iterator<Item = &GeneContribution> + '_ {
        self.genes.iter().filter(move |g| g.contribution > level)
    }
}

/// Per cell type, genes sorted by contribution (ties in signature order),
/// truncated to `n`.
#[derive(Debug, Clone, PartialEq)]
pub struct TopGeneScores {
    pub scope: GeneScope,
    pub n: usize,
    pub cell_types: Vec<RankedGenes>,
}

impl TopGeneScores {
    pub fn get(&self, cell_type: &str) -> Option<&RankedGenes> {
        self.cell_types.iter().find(|r| r.cell_type == cell_type)
    }
}
