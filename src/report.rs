//! Classification records and the combined report

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::functions::{LineageScores, PredictedLineage};

pub const NO_RESULTS: &str = "# No results: no samples could be classified";

/// Outcome for one sample of one input file
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationRecord {
    pub sample: String,
    pub scores: LineageScores,
    pub prediction: PredictedLineage,
}

impl ClassificationRecord {
    /// Human-readable summary, lineages sorted by name
    pub fn summary(&self) -> String {
        let mut scores: Vec<(&str, f64)> = self.scores.iter().collect();
        scores.sort_by(|a, b| a.0.cmp(b.0));
        let probabilities = scores
            .iter()
            .map(|(id, score)| format!("{}: {}", id, format_score(*score)))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{} is predicted as {}\nProbabilities: {}\n",
            self.sample, self.prediction, probabilities
        )
    }

    pub fn write_summary(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.summary())
            .with_context(|| format!("Failed to write sample report {}", path.display()))
    }
}

pub fn format_score(score: f64) -> String {
    format!("{:.2}%", score)
}

/// Records from every processed file, in the order samples were seen
#[derive(Debug, Clone, Default)]
pub struct Report {
    lineages: Vec<String>,
    records: Vec<ClassificationRecord>,
}

impl Report {
    /// `lineages` fixes the score columns
    pub fn new<I, S>(lineages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lineages: lineages.into_iter().map(Into::into).collect(),
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: ClassificationRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ClassificationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Tab-delimited table, or a single notice line when there is nothing to report
    pub fn write_tsv<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        if self.records.is_empty() {
            return writeln!(out, "{}", NO_RESULTS);
        }

        write!(out, "Sample_Name")?;
        for lineage in self.lineages.iter() {
            write!(out, "\t{}", lineage)?;
        }
        writeln!(out, "\tPredicted_lineage")?;

        for record in self.records.iter() {
            write!(out, "{}", record.sample)?;
            for lineage in self.lineages.iter() {
                let score = record.scores.get(lineage).unwrap_or(0.0);
                write!(out, "\t{}", format_score(score))?;
            }
            writeln!(out, "\t{}", record.prediction)?;
        }

        Ok(())
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create report {}", path.display()))?;
        let mut out = BufWriter::new(file);
        self.write_tsv(&mut out)
            .and_then(|_| out.flush())
            .with_context(|| format!("Failed to write report {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::Policy;

    fn record(sample: &str, a: f64, b: f64, prediction: PredictedLineage) -> ClassificationRecord {
        ClassificationRecord {
            sample: sample.to_string(),
            scores: vec![("lineageB".to_string(), b), ("lineageA".to_string(), a)]
                .into_iter()
                .collect(),
            prediction,
        }
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(100.0), "100.00%");
        assert_eq!(format_score(0.0), "0.00%");
        assert_eq!(format_score(100.0 / 3.0), "33.33%");
    }

    #[test]
    fn test_write_tsv_preserves_order() {
        let mut report = Report::new(["lineageB", "lineageA"]);
        report.push(record("s2", 0.0, 50.0, PredictedLineage::Lineage("lineageB".to_string())));
        report.push(record("s1", 0.0, 0.0, PredictedLineage::Unknown(Policy::Threshold)));

        let mut out = Vec::new();
        report.write_tsv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Sample_Name\tlineageB\tlineageA\tPredicted_lineage");
        assert_eq!(lines[1], "s2\t50.00%\t0.00%\tlineageB");
        assert_eq!(lines[2], "s1\t0.00%\t0.00%\tunknown_lineage");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_report_has_notice() {
        let report = Report::new(["lineageA"]);
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("combined.txt");
        report.write_to(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), NO_RESULTS);
    }

    #[test]
    fn test_summary_sorted() {
        let r = record(
            "ERR1",
            25.0,
            50.0,
            PredictedLineage::Mixed(vec!["lineageA".to_string(), "lineageB".to_string()]),
        );
        assert_eq!(
            r.summary(),
            "ERR1 is predicted as mixed isolate: lineageA, lineageB\n\
             Probabilities: lineageA: 25.00%, lineageB: 50.00%\n"
        );
    }
}
