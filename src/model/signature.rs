use std::collections::BTreeMap;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct CellTypeSignature {
    pub name: String,
    pub genes: Vec<String>,
    /// Row of each gene in its reference column, blank rows counted.
    pub ranks: Vec<usize>,
}

impl CellTypeSignature {
    /// Genes ranked by list position.
    pub fn new(name: impl Into<String>, genes: Vec<String>) -> Self {
        let ranks = (0..genes.len()).collect();
        Self {
            name: name.into(),
            genes,
            ranks,
        }
    }

    pub fn push(&mut self, gene: String, rank: usize) {
        self.genes.push(gene);
        self.ranks.push(rank);
    }
}

/// Cell type -> ordered, deduplicated marker genes, in reference column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneSignature {
    pub cell_types: Vec<CellTypeSignature>,
}

impl GeneSignature {
    pub fn n_cell_types(&self) -> usize {
        self.cell_types.len()
    }

    pub fn cell_type_names(&self) -> Vec<String> {
        self.cell_types.iter().map(|c| c.name.clone()).collect()
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&CellTypeSignature> {
        self.cell_types.iter().find(|c| c.name == name)
    }

    /// Distinct genes across all cell types, first-seen order.
    pub fn vocabulary(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for cell_type in &self.cell_types {
            for gene in &cell_type.genes {
                if seen.insert(gene.as_str()) {
                    out.push(gene.clone());
                }
            }
        }
        out
    }

    /// Number of cell types listing each gene.
    pub fn gene_type_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for cell_type in &self.cell_types {
            for gene in &cell_type.genes {
                *counts.entry(gene.as_str()).or_insert(0) += 1;
            }
        }
        counts
    }
}
