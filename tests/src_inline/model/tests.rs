use super::symbols::normalize_gene;
use super::*;

fn signature(types: &[(&str, &[&str])]) -> GeneSignature {
    GeneSignature {
        cell_types: types
            .iter()
            .map(|(name, genes)| {
                CellTypeSignature::new(*name, genes.iter().map(|g| g.to_string()).collect())
            })
            .collect(),
    }
}

#[test]
fn test_normalize_gene() {
    assert_eq!(normalize_gene("  cd3e "), "CD3E");
    assert_eq!(normalize_gene("Ms4a1"), "MS4A1");
    assert_eq!(normalize_gene("ENSG00000167286.9"), "ENSG00000167286");
    assert_eq!(normalize_gene("HLA-DRB1"), "HLA-DRB1");
    assert_eq!(normalize_gene("RP11-1.2"), "RP11-1.2");
    assert_eq!(normalize_gene("   "), "");
}

#[test]
fn test_vocabulary_first_seen_order() {
    let sig = signature(&[("T1", &["A", "B"]), ("T2", &["C", "A"])]);
    assert_eq!(sig.vocabulary(), vec!["A", "B", "C"]);
    let counts = sig.gene_type_counts();
    assert_eq!(counts.get("A"), Some(&2));
    assert_eq!(counts.get("C"), Some(&1));
    assert_eq!(sig.get("T2").map(|c| c.genes.len()), Some(2));
    assert!(sig.get("T3").is_none());
}

#[test]
fn test_expression_value_absent_is_zero() {
    let m = ExpressionMatrix::new(
        vec!["s1".to_string()],
        vec!["A".to_string(), "B".to_string()],
        vec![vec![2.0, 3.0]],
    );
    assert_eq!(m.value(0, "B"), 3.0);
    assert_eq!(m.value(0, "Z"), 0.0);
    assert_eq!(m.value(5, "A"), 0.0);
    assert_eq!(m.sample_index("s1"), Some(0));
    assert_eq!(m.matched_genes, 2);
}

#[test]
fn test_weighting_rows_dense() {
    let w = Weighting {
        samples: vec!["s1".into(), "s2".into()],
        cell_types: vec!["T1".into(), "T2".into()],
        scores: vec![vec![5.0, 0.0], vec![1.0, 2.0]],
        scoring: ScoringMode::Sum,
    };
    let rows: Vec<(&str, &str, f64)> = w.rows().collect();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[1], ("s1", "T2", 0.0));
    assert_eq!(w.get("s2", "T2"), Some(2.0));
    assert_eq!(w.get("s3", "T2"), None);
}

#[test]
fn test_top_matches_cutoff_and_ties() {
    let d = DisplayMatrix {
        samples: vec!["s1".into()],
        cell_types: vec!["A".into(), "B".into(), "C".into(), "D".into()],
        values: vec![vec![0.25, 0.5, 0.25, 0.0005]],
        rescale: RescaleMode::Sum,
    };
    let m = d.top_matches(0, 0.001, 5);
    assert_eq!(m, vec![("B", 0.5), ("A", 0.25), ("C", 0.25)]);
    assert_eq!(d.top_matches(0, 0.001, 1), vec![("B", 0.5)]);
    assert!(d.top_matches(3, 0.0, 5).is_empty());
}

#[test]
fn test_profile_defaults() {
    let p = AnnotationProfile::default_v1();
    assert_eq!(p.scoring, ScoringMode::Sum);
    assert_eq!(p.rescale, RescaleMode::Sum);
    assert_eq!(p.max_matches, 5);
    assert!((p.min_match_fraction() - 0.001).abs() < 1e-12);
}
