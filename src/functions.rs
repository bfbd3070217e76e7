mod classify_lineage;
mod extract_variants;
mod predict_lineages;
mod score_lineages;

pub use classify_lineage::{Classifier, Policy, PredictedLineage};
pub use extract_variants::{extract_variants, GenotypeRule, Mode};
pub use predict_lineages::{predict_lineages, PredictConfig};
pub use score_lineages::{score_lineages, LineageScores};
