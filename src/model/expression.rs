use std::collections::BTreeMap;

/// Sample x gene expression values. Genes missing from the source table are
/// held as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionMatrix {
    pub samples: Vec<String>,
    pub genes: Vec<String>,
    /// `values[sample][gene]`, aligned with `samples` and `genes`.
    pub values: Vec<Vec<f64>>,
    /// Genes of the axis that were present in the source table.
    pub matched_genes: usize,
    gene_index: BTreeMap<String, usize>,
}

impl ExpressionMatrix {
    pub fn new(samples: Vec<String>, genes: Vec<String>, values: Vec<Vec<f64>>) -> Self {
        let gene_index = genes
            .iter()
            .enumerate()
            .map(|(idx, g)| (g.clone(), idx))
            .collect();
        let matched_genes = genes.len();
        Self {
            samples,
            genes,
            values,
            matched_genes,
            gene_index,
        }
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn n_genes(&self) -> usize {
        self.genes.len()
    }

    pub fn sample_index(&self, name: &str) -> Option<usize> {
        self.samples.iter().position(|s| s == name)
    }

    pub fn gene_position(&self, gene: &str) -> Option<usize> {
        self.gene_index.get(gene).copied()
    }

    /// Expression of `gene` in sample `sample`; absent genes read as zero.
    #[cfg(test)]
    pub fn value(&self, sample: usize, gene: &str) -> f64 {
        match (self.values.get(sample), self.gene_position(gene)) {
            (Some(row), Some(g)) => row.get(g).copied().unwrap_or(0.0),
            _ => 0.0,
        }
    }
}
