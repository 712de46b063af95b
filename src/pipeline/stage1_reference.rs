use std::collections::BTreeSet;

use crate::input::Table;
use crate::model::symbols::{normalize_gene, normalize_label};
use crate::model::{AnnotateError, CellTypeSignature, GeneSignature};

#[derive(Debug, Clone)]
pub struct ReferenceParams {
    /// Keep every `column_stride`-th column, starting from the first.
    pub column_stride: usize,
}

impl Default for ReferenceParams {
    fn default() -> Self {
        Self { column_stride: 1 }
    }
}

/// Each column is a cell type, each non-blank cell a marker gene ranked by its
/// row. Columns with the same name are merged.
pub fn build_signature(
    table: &Table,
    params: &ReferenceParams,
) -> Result<GeneSignature, AnnotateError> {
    if table.columns.is_empty() {
        return Err(AnnotateError::MalformedReference(
            "table has no columns".to_string(),
        ));
    }
    let selected = table.every_nth_column(params.column_stride);

    let mut cell_types: Vec<CellTypeSignature> = Vec::new();
    let mut seen: Vec<BTreeSet<String>> = Vec::new();

    for column in &selected.columns {
        let name = normalize_label(&column.name);
        let idx = match cell_types.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                cell_types.push(CellTypeSignature::new(name, Vec::new()));
                seen.push(BTreeSet::new());
                cell_types.len() - 1
            }
        };

        for (row, cell) in column.cells.iter().enumerate() {
            let Some(text) = cell.as_text() else {
                continue;
            };
            let gene = normalize_gene(&text);
            if gene.is_empty() {
                continue;
            }
            // first occurrence keeps its row
            if seen[idx].insert(gene.clone()) {
                cell_types[idx].push(gene, row);
            }
        }
    }

    if cell_types.iter().all(|c| c.genes.is_empty()) {
        return Err(AnnotateError::MalformedReference(
            "every cell type column is empty".to_string(),
        ));
    }

    Ok(GeneSignature { cell_types })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_reference.rs"]
mod tests;
