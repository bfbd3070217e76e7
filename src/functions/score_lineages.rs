//! Match percentage of a sample against every lineage in the catalog

use std::collections::HashSet;

use crate::catalog::ReferenceCatalog;

/// Percentage per lineage, in catalog order
#[derive(Debug, Clone, PartialEq)]
pub struct LineageScores {
    scores: Vec<(String, f64)>,
}

impl LineageScores {
    pub fn get(&self, lineage: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|(id, _)| id == lineage)
            .map(|(_, score)| *score)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.scores.iter().map(|(id, score)| (id.as_str(), *score))
    }
}

impl FromIterator<(String, f64)> for LineageScores {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            scores: iter.into_iter().collect(),
        }
    }
}

/// `100 * |markers ∩ sample| / |markers|`, or 0 for an empty marker set
pub fn match_percentage(markers: &HashSet<u64>, sample: &HashSet<u64>) -> f64 {
    if markers.is_empty() {
        return 0.0;
    }
    let matching = markers.intersection(sample).count();
    matching as f64 / markers.len() as f64 * 100.0
}

pub fn score_lineages(sample: &HashSet<u64>, catalog: &ReferenceCatalog) -> LineageScores {
    catalog
        .iter()
        .map(|lineage| (lineage.id.clone(), match_percentage(&lineage.markers, sample)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(positions: &[u64]) -> HashSet<u64> {
        positions.iter().copied().collect()
    }

    fn catalog() -> ReferenceCatalog {
        ReferenceCatalog::from_reader("a\t1,2,3,4\nb\t5,6\nempty\t\n".as_bytes()).unwrap()
    }

    #[test]
    fn test_partial_match() {
        let scores = score_lineages(&set(&[1, 2, 5, 99]), &catalog());
        assert_eq!(scores.get("a"), Some(50.0));
        assert_eq!(scores.get("b"), Some(50.0));
        assert_eq!(scores.get("empty"), Some(0.0));
    }

    #[test]
    fn test_empty_marker_set_scores_zero() {
        // Even a sample covering everything scores 0 against an empty marker set
        let scores = score_lineages(&set(&[1, 2, 3, 4, 5, 6]), &catalog());
        assert_eq!(scores.get("empty"), Some(0.0));
        assert_eq!(match_percentage(&HashSet::new(), &HashSet::new()), 0.0);
    }

    #[test]
    fn test_empty_sample_keeps_every_lineage() {
        let scores = score_lineages(&HashSet::new(), &catalog());
        assert_eq!(scores.iter().count(), 3);
        assert!(scores.iter().all(|(_, score)| score == 0.0));
        let ids: Vec<&str> = scores.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["a", "b", "empty"]);
    }

    #[test]
    fn test_exact_match_is_100() {
        let catalog = ReferenceCatalog::builtin();
        let sample = catalog.get("lineage3").unwrap().markers.clone();
        let scores = score_lineages(&sample, &catalog);
        assert_eq!(scores.get("lineage3"), Some(100.0));
    }

    #[test]
    fn test_scores_within_bounds() {
        let catalog = ReferenceCatalog::builtin();
        let mut sample = HashSet::new();
        for lineage in catalog.iter() {
            sample.extend(lineage.markers.iter().copied().take(2));
        }
        sample.insert(1);
        for (_, score) in score_lineages(&sample, &catalog).iter() {
            assert!((0.0..=100.0).contains(&score));
        }
    }
}
