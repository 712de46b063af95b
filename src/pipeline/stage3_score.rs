use crate::model::{ExpressionMatrix, GeneSignature, ScoringMode, Weighting};

/// Resolved signature member: its position on the expression gene axis (if
/// present) and the weight applied to its value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberTerm {
    pub gene_pos: Option<usize>,
    pub weight: f64,
}

/// Per cell type, one term per signature gene in signature order.
pub fn member_terms(
    signature: &GeneSignature,
    expression: &ExpressionMatrix,
    mode: ScoringMode,
) -> Vec<Vec<MemberTerm>> {
    let type_counts = signature.gene_type_counts();
    signature
        .cell_types
        .iter()
        .map(|cell_type| {
            let n = cell_type.genes.len();
            cell_type
                .genes
                .iter()
                .zip(cell_type.ranks.iter())
                .map(|(gene, &rank)| {
                    let weight = match mode {
                        ScoringMode::Sum => 1.0,
                        ScoringMode::Mean => 1.0 / n as f64,
                        ScoringMode::Weighted => {
                            let k = type_counts.get(gene.as_str()).copied().unwrap_or(1).max(1);
                            1.0 / (1.0 + rank as f64) / k as f64
                        }
                    };
                    MemberTerm {
                        gene_pos: expression.gene_position(gene),
                        weight,
                    }
                })
                .collect()
        })
        .collect()
}

pub fn term_value(term: &MemberTerm, row: &[f64]) -> f64 {
    match term.gene_pos {
        Some(g) => term.weight * row.get(g).copied().unwrap_or(0.0),
        None => 0.0,
    }
}

/// Scores every (sample, cell type) pair as the weighted sum of the sample's
/// expression over the cell type's signature genes. `ScoringMode::Sum` (the
/// default) is the plain sum of raw values. Genes absent from the sample add
/// nothing; an empty signature scores 0.
pub fn score(signature: &GeneSignature, expression: &ExpressionMatrix, mode: ScoringMode) -> Weighting {
    let terms = member_terms(signature, expression, mode);

    let mut scores = Vec::with_capacity(expression.n_samples());
    for row in &expression.values {
        let mut sample_scores = Vec::with_capacity(terms.len());
        for cell_terms in &terms {
            let mut sum = 0.0f64;
            for term in cell_terms {
                sum += term_value(term, row);
            }
            sample_scores.push(sum);
        }
        scores.push(sample_scores);
    }

    Weighting {
        samples: expression.samples.clone(),
        cell_types: signature.cell_type_names(),
        scores,
        scoring: mode,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_score.rs"]
mod tests;
