use crate::model::{
    AnnotateError, ExpressionMatrix, GeneContribution, GeneScope, GeneSignature, RankedGenes,
    ScoringMode, TopGeneScores,
};
use crate::pipeline::stage3_score::{member_terms, term_value};

/// Ranks each cell type's genes by contribution to its score, either in one
/// sample or summed over all samples, keeping the first `n`.
pub fn top_genes(
    signature: &GeneSignature,
    expression: &ExpressionMatrix,
    n: usize,
    scope: &GeneScope,
    mode: ScoringMode,
) -> Result<TopGeneScores, AnnotateError> {
    let rows: Vec<usize> = match scope {
        GeneScope::Sample(name) => vec![
            expression
                .sample_index(name)
                .ok_or_else(|| AnnotateError::UnknownSample(name.clone()))?,
        ],
        GeneScope::Aggregate => (0..expression.n_samples()).collect(),
    };
    rank_rows(signature, expression, n, scope.clone(), &rows, mode)
}

/// One per-sample ranking for every sample, in matrix order.
pub fn top_genes_per_sample(
    signature: &GeneSignature,
    expression: &ExpressionMatrix,
    n: usize,
    mode: ScoringMode,
) -> Result<Vec<TopGeneScores>, AnnotateError> {
    expression
        .samples
        .iter()
        .enumerate()
        .map(|(s, name)| {
            rank_rows(signature, expression, n, GeneScope::Sample(name.clone()), &[s], mode)
        })
        .collect()
}

fn rank_rows(
    signature: &GeneSignature,
    expression: &ExpressionMatrix,
    n: usize,
    scope: GeneScope,
    rows: &[usize],
    mode: ScoringMode,
) -> Result<TopGeneScores, AnnotateError> {
    if n == 0 {
        return Err(AnnotateError::InvalidTopN(0));
    }
    let terms = member_terms(signature, expression, mode);
    let mut cell_types = Vec::with_capacity(signature.n_cell_types());
    for (cell_type, cell_terms) in signature.cell_types.iter().zip(terms.iter()) {
        let mut genes: Vec<GeneContribution> = cell_type
            .genes
            .iter()
            .zip(cell_terms.iter())
            .map(|(gene, term)| GeneContribution {
                gene: gene.clone(),
                contribution: rows
                    .iter()
                    .map(|&s| term_value(term, &expression.values[s]))
                    .sum(),
            })
            .collect();
        // stable: equal contributions stay in signature order
        genes.sort_by(|a, b| {
            b.contribution
                .partial_cmp(&a.contribution)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        genes.truncate(n);
        cell_types.push(RankedGenes {
            cell_type: cell_type.name.clone(),
            genes,
        });
    }

    Ok(TopGeneScores {
        scope,
        n,
        cell_types,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_top_genes.rs"]
mod tests;
