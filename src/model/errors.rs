use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnnotateError {
    #[error("malformed reference table: {0}")]
    MalformedReference(String),
    #[error("malformed sample table: {0}")]
    MalformedSample(String),
    #[error("invalid top-N value {0}: must be a positive integer")]
    InvalidTopN(i64),
    #[error(
        "no genes overlap between the reference ({reference_genes} genes) and the sample table ({sample_genes} genes)"
    )]
    GeneVocabularyMismatch {
        reference_genes: usize,
        sample_genes: usize,
    },
    #[error("unknown sample: {0}")]
    UnknownSample(String),
}
