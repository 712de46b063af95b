use std::collections::{BTreeMap, BTreeSet};
use std::collections::btree_map::Entry;

use crate::input::{CellValue, Column, Table};
use crate::model::symbols::{normalize_gene, normalize_label};
use crate::model::{AnnotateError, ExpressionMatrix, SampleLayout};

#[derive(Debug, Clone, Default)]
pub struct SampleParams {
    pub layout: SampleLayout,
    /// Identifier column for `GeneRows`; defaults to the first mostly-text column.
    pub gene_column: Option<String>,
}

/// Gene -> per-sample values, before vocabulary alignment.
struct RawExpression {
    samples: Vec<String>,
    genes: Vec<String>,
    values: BTreeMap<String, Vec<f64>>,
}

impl RawExpression {
    fn new(samples: Vec<String>) -> Result<Self, AnnotateError> {
        let mut seen = BTreeSet::new();
        if let Some(dup) = samples.iter().find(|s| !seen.insert(s.as_str())) {
            return Err(AnnotateError::MalformedSample(format!(
                "sample '{}' appears more than once",
                dup
            )));
        }
        Ok(Self {
            samples,
            genes: Vec::new(),
            values: BTreeMap::new(),
        })
    }

    fn slot(&mut self, gene: &str) -> &mut Vec<f64> {
        match self.values.entry(gene.to_string()) {
            Entry::Vacant(v) => {
                self.genes.push(gene.to_string());
                v.insert(vec![0.0; self.samples.len()])
            }
            Entry::Occupied(o) => o.into_mut(),
        }
    }
}

/// Builds the sample x gene matrix. With a vocabulary the gene axis is exactly
/// that vocabulary (absent genes are zero); without one it is every gene in
/// the table, in table order.
pub fn build_expression(
    table: &Table,
    vocabulary: Option<&[String]>,
    params: &SampleParams,
) -> Result<ExpressionMatrix, AnnotateError> {
    let raw = match params.layout {
        SampleLayout::GeneRows => read_gene_rows(table, params.gene_column.as_deref())?,
        SampleLayout::Ranked => read_ranked(table)?,
    };
    align(raw, vocabulary)
}

fn read_gene_rows(table: &Table, gene_column: Option<&str>) -> Result<RawExpression, AnnotateError> {
    if table.columns.is_empty() {
        return Err(AnnotateError::MalformedSample(
            "table has no columns".to_string(),
        ));
    }
    if !table.columns.iter().any(Column::has_numbers) {
        return Err(AnnotateError::MalformedSample(
            "table has no numeric columns".to_string(),
        ));
    }

    let gene_idx = match gene_column {
        Some(name) => table
            .columns
            .iter()
            .position(|c| c.name.trim().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| {
                AnnotateError::MalformedSample(format!("gene column '{}' not found", name))
            })?,
        None => table
            .columns
            .iter()
            .position(Column::is_mostly_text)
            .ok_or_else(|| {
                AnnotateError::MalformedSample("no gene identifier column".to_string())
            })?,
    };

    let sample_cols: Vec<&Column> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(idx, c)| *idx != gene_idx && c.has_numbers())
        .map(|(_, c)| c)
        .collect();
    if sample_cols.is_empty() {
        return Err(AnnotateError::MalformedSample(
            "no numeric sample columns besides the gene column".to_string(),
        ));
    }

    let gene_col = &table.columns[gene_idx];
    let mut raw = RawExpression::new(sample_cols.iter().map(|c| normalize_label(&c.name)).collect())?;

    for (row, cell) in gene_col.cells.iter().enumerate() {
        let Some(text) = cell.as_text() else {
            continue;
        };
        let gene = normalize_gene(&text);
        if gene.is_empty() {
            continue;
        }
        let slot = raw.slot(&gene);
        for (s, col) in sample_cols.iter().enumerate() {
            let v = match col.cells.get(row) {
                Some(CellValue::Number(v)) => *v,
                Some(CellValue::Blank) | None => 0.0,
                Some(CellValue::Text(t)) => {
                    return Err(AnnotateError::MalformedSample(format!(
                        "non-numeric expression value '{}' for gene {} in sample '{}'",
                        t, gene, col.name
                    )));
                }
            };
            if v < 0.0 {
                return Err(AnnotateError::MalformedSample(format!(
                    "negative expression value {} for gene {} in sample '{}'",
                    v, gene, col.name
                )));
            }
            // duplicate gene rows are summed
            slot[s] += v;
        }
    }

    if raw.genes.is_empty() {
        return Err(AnnotateError::MalformedSample(format!(
            "gene column '{}' has no identifiers",
            gene_col.name
        )));
    }
    Ok(raw)
}

/// Columns list genes best-first; the gene at row `i` gets `1 / (1 + i)`.
fn read_ranked(table: &Table) -> Result<RawExpression, AnnotateError> {
    let trimmed = table.trim_leading_index();
    let columns: Vec<&Column> = trimmed.columns.iter().filter(|c| !c.is_empty()).collect();
    if columns.is_empty() {
        return Err(AnnotateError::MalformedSample(
            "no ranked gene columns".to_string(),
        ));
    }

    let mut raw = RawExpression::new(columns.iter().map(|c| normalize_label(&c.name)).collect())?;
    for (s, column) in columns.iter().enumerate() {
        for (rank, cell) in column.cells.iter().enumerate() {
            let Some(text) = cell.as_text() else {
                continue;
            };
            let gene = normalize_gene(&text);
            if gene.is_empty() {
                continue;
            }
            let slot = raw.slot(&gene);
            if slot[s] == 0.0 {
                slot[s] = 1.0 / (1.0 + rank as f64);
            }
        }
    }
    Ok(raw)
}

fn align(raw: RawExpression, vocabulary: Option<&[String]>) -> Result<ExpressionMatrix, AnnotateError> {
    let (genes, matched) = match vocabulary {
        Some(vocab) => {
            let matched = vocab
                .iter()
                .filter(|g| raw.values.contains_key(g.as_str()))
                .count();
            if matched == 0 {
                return Err(AnnotateError::GeneVocabularyMismatch {
                    reference_genes: vocab.len(),
                    sample_genes: raw.genes.len(),
                });
            }
            (vocab.to_vec(), matched)
        }
        None => (raw.genes.clone(), raw.genes.len()),
    };

    let mut values = vec![vec![0.0; genes.len()]; raw.samples.len()];
    for (g, gene) in genes.iter().enumerate() {
        if let Some(per_sample) = raw.values.get(gene) {
            for (s, v) in per_sample.iter().enumerate() {
                values[s][g] = *v;
            }
        }
    }

    let mut matrix = ExpressionMatrix::new(raw.samples, genes, values);
    matrix.matched_genes = matched;
    Ok(matrix)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_sample.rs"]
mod tests;
