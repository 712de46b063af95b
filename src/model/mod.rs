pub mod errors;
pub mod expression;
pub mod params;
pub mod signature;
pub mod symbols;
pub mod weighting;

pub use errors::AnnotateError;
pub use expression::ExpressionMatrix;
pub use params::{AnnotationProfile, RescaleMode, SampleLayout, ScoringMode};
pub use signature::{CellTypeSignature, GeneSignature};
pub use weighting::{DisplayMatrix, GeneContribution, GeneScope, RankedGenes, TopGeneScores, Weighting};

#[cfg(test)]
#[path = "../../tests/src_inline/model/tests.rs"]
mod tests;
