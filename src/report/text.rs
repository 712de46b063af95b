use crate::report::{ReportContext, format_f64_2, format_gene_list};

pub fn render_report_text(ctx: &ReportContext) -> String {
    let mut out = String::new();

    out.push_str("Cell Type Annotation Report\n");
    out.push_str("===========================\n\n");

    out.push_str(&format!(
        "Reference: {} ({} cell types, {} genes)\n",
        ctx.reference, ctx.n_cell_types, ctx.n_reference_genes
    ));
    out.push_str(&format!(
        "Sample: {} ({} samples, {} genes matched)\n",
        ctx.sample, ctx.n_samples, ctx.n_genes_matched
    ));
    out.push_str(&format!(
        "Scoring: {}; rescale: {}; top genes: {}\n\n",
        ctx.scoring, ctx.rescale, ctx.top_n
    ));

    out.push_str("1. Cell type matches\n");
    for block in &ctx.samples {
        out.push_str(&format!("\n{}\n", block.sample));
        if block.matches.is_empty() {
            out.push_str(&format!(
                "  no cell type at or above {}%\n",
                format_f64_2(ctx.min_match_percent)
            ));
            continue;
        }
        for (rank, m) in block.matches.iter().enumerate() {
            out.push_str(&format!(
                "  {}. {} ({}%)\n",
                rank + 1,
                m.cell_type,
                format_f64_2(m.percent)
            ));
            if !m.genes.is_empty() {
                out.push_str(&format!("     {}\n", format_gene_list(&m.genes)));
            }
        }
    }

    out.push_str("\n2. Top genes across all samples\n");
    for (cell_type, genes) in &ctx.aggregate {
        if genes.is_empty() {
            out.push_str(&format!("  {}: -\n", cell_type));
        } else {
            out.push_str(&format!("  {}: {}\n", cell_type, format_gene_list(genes)));
        }
    }

    out
}
