//! Turn per-lineage scores into a predicted lineage

use std::fmt::{Display, Formatter};

use super::LineageScores;

/// Decision rule applied to a sample's scores
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Policy {
    /// Highest score wins; ties go to the lineage listed first in the catalog
    BestMatch,
    /// Every lineage above the threshold is a candidate; several means mixed
    Threshold,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredictedLineage {
    Lineage(String),
    /// Nothing matched. Rendered differently per policy.
    Unknown(Policy),
    /// Candidates, sorted lexicographically
    Mixed(Vec<String>),
}

impl Display for PredictedLineage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PredictedLineage::Lineage(id) => write!(f, "{}", id),
            PredictedLineage::Unknown(Policy::BestMatch) => write!(f, "unknown lineage"),
            PredictedLineage::Unknown(Policy::Threshold) => write!(f, "unknown_lineage"),
            PredictedLineage::Mixed(ids) => write!(f, "mixed isolate: {}", ids.join(", ")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classifier {
    pub policy: Policy,
    /// Threshold policy only: candidates must score strictly above this
    pub min_score: f64,
}

impl Classifier {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            min_score: 0.0,
        }
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    /// True when a threshold was set that this policy never looks at
    pub fn ignores_min_score(&self) -> bool {
        self.policy == Policy::BestMatch && self.min_score != 0.0
    }

    pub fn classify(&self, scores: &LineageScores) -> PredictedLineage {
        match self.policy {
            Policy::BestMatch => best_match(scores),
            Policy::Threshold => threshold(scores, self.min_score),
        }
    }
}

fn best_match(scores: &LineageScores) -> PredictedLineage {
    let mut best: Option<(&str, f64)> = None;
    for (id, score) in scores.iter() {
        // Strictly greater keeps the earliest lineage on ties
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((id, score));
        }
    }

    match best {
        Some((id, top)) if top > 0.0 => PredictedLineage::Lineage(id.to_string()),
        _ => PredictedLineage::Unknown(Policy::BestMatch),
    }
}

fn threshold(scores: &LineageScores, min_score: f64) -> PredictedLineage {
    let mut candidates: Vec<String> = scores
        .iter()
        .filter(|(_, score)| *score > min_score)
        .map(|(id, _)| id.to_string())
        .collect();

    match candidates.len() {
        0 => PredictedLineage::Unknown(Policy::Threshold),
        1 => PredictedLineage::Lineage(candidates.remove(0)),
        _ => {
            candidates.sort();
            PredictedLineage::Mixed(candidates)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(values: &[(&str, f64)]) -> LineageScores {
        values.iter().map(|(id, s)| (id.to_string(), *s)).collect()
    }

    #[test]
    fn test_best_match() {
        let s = scores(&[("lineageA", 25.0), ("lineageB", 75.0), ("lineageC", 50.0)]);
        let label = Classifier::new(Policy::BestMatch).classify(&s);
        assert_eq!(label, PredictedLineage::Lineage("lineageB".to_string()));
        assert_eq!(label.to_string(), "lineageB");
    }

    #[test]
    fn test_best_match_all_zero() {
        let s = scores(&[("lineageA", 0.0), ("lineageB", 0.0)]);
        let label = Classifier::new(Policy::BestMatch).classify(&s);
        assert_eq!(label.to_string(), "unknown lineage");
    }

    #[test]
    fn test_best_match_tie_goes_to_catalog_order() {
        let s = scores(&[("zeta", 0.0), ("l2_2_2", 100.0), ("l2_2_1", 100.0)]);
        let label = Classifier::new(Policy::BestMatch).classify(&s);
        assert_eq!(label.to_string(), "l2_2_2");
    }

    #[test]
    fn test_best_match_empty_scores() {
        let label = Classifier::new(Policy::BestMatch).classify(&scores(&[]));
        assert_eq!(label, PredictedLineage::Unknown(Policy::BestMatch));
    }

    #[test]
    fn test_threshold_mixed_sorted_by_name() {
        let s = scores(&[("lineageC", 25.0), ("lineageA", 0.0), ("lineageB", 50.0)]);
        let label = Classifier::new(Policy::Threshold).classify(&s);
        assert_eq!(label.to_string(), "mixed isolate: lineageB, lineageC");
    }

    #[test]
    fn test_threshold_single_and_unknown() {
        let classifier = Classifier::new(Policy::Threshold);

        let one = scores(&[("lineageA", 0.0), ("lineageB", 12.5)]);
        assert_eq!(classifier.classify(&one).to_string(), "lineageB");

        let none = scores(&[("lineageA", 0.0), ("lineageB", 0.0)]);
        assert_eq!(classifier.classify(&none).to_string(), "unknown_lineage");
    }

    #[test]
    fn test_threshold_min_score() {
        let s = scores(&[("lineageA", 10.0), ("lineageB", 60.0)]);
        let classifier = Classifier::new(Policy::Threshold).with_min_score(50.0);
        assert_eq!(classifier.classify(&s).to_string(), "lineageB");
    }

    #[test]
    fn test_min_score_only_matters_for_threshold() {
        let s = scores(&[("lineageA", 10.0), ("lineageB", 60.0)]);
        let best = Classifier::new(Policy::BestMatch).with_min_score(80.0);
        assert!(best.ignores_min_score());
        assert_eq!(best.classify(&s).to_string(), "lineageB");

        assert!(!Classifier::new(Policy::BestMatch).ignores_min_score());
        assert!(!Classifier::new(Policy::Threshold)
            .with_min_score(80.0)
            .ignores_min_score());
    }

    #[test]
    fn test_deterministic() {
        let s = scores(&[("x", 33.3), ("y", 33.3), ("z", 10.0)]);
        for policy in [Policy::BestMatch, Policy::Threshold] {
            let classifier = Classifier::new(policy);
            assert_eq!(classifier.classify(&s), classifier.classify(&s));
        }
    }
}
