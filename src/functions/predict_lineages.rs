//! Batch driver: extract, score, classify and collect every input file

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::*;
use crate::catalog::ReferenceCatalog;
use crate::report::{ClassificationRecord, Report};

#[derive(Debug, Clone)]
pub struct PredictConfig {
    pub mode: Mode,
    pub classifier: Classifier,
    pub genotype_rule: GenotypeRule,
    pub output_dir: PathBuf,
    /// Also write `<sample>_lineage_result.txt` for every sample
    pub sample_reports: bool,
}

impl PredictConfig {
    pub fn new(mode: Mode, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            classifier: Classifier::new(default_policy(mode)),
            genotype_rule: GenotypeRule::default(),
            output_dir: output_dir.into(),
            sample_reports: false,
        }
    }

    pub fn combined_report_path(&self) -> PathBuf {
        let name = match self.mode {
            Mode::Single => "combined_lineage_results.txt",
            Mode::Joint => "combined_joint_lineage_results.txt",
        };
        self.output_dir.join(name)
    }

    /// `<sample>_lineage_result.txt` inside the output directory. Path
    /// separators in the sample name become `_`.
    pub fn sample_report_path(&self, sample: &str) -> PathBuf {
        let name: String = sample
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.output_dir.join(format!("{}_lineage_result.txt", name))
    }
}

pub fn default_policy(mode: Mode) -> Policy {
    match mode {
        Mode::Single => Policy::BestMatch,
        Mode::Joint => Policy::Threshold,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub files_total: usize,
    pub files_succeeded: usize,
    pub samples: usize,
}

/// Classify every sample of one file, in the order the samples were found
pub fn predict_file(
    path: &Path,
    catalog: &ReferenceCatalog,
    config: &PredictConfig,
) -> crate::error::Result<Vec<ClassificationRecord>> {
    let samples = extract_variants(path, config.mode, config.genotype_rule)?;

    Ok(samples
        .into_iter()
        .map(|variants| {
            let scores = score_lineages(&variants.positions, catalog);
            let prediction = config.classifier.classify(&scores);
            ClassificationRecord {
                sample: variants.sample,
                scores,
                prediction,
            }
        })
        .collect())
}

/// Process files one at a time. A file that fails is logged and skipped; only
/// problems with the output directory or the combined report abort the run.
pub fn predict_lineages(
    vcf_files: &[PathBuf],
    catalog: &ReferenceCatalog,
    config: &PredictConfig,
) -> Result<(Report, BatchSummary)> {
    prepare_output_dir(&config.output_dir)?;

    let mut report = Report::new(catalog.ids());
    let mut summary = BatchSummary {
        files_total: vcf_files.len(),
        ..Default::default()
    };

    for vcf_file in vcf_files {
        log::info!("Processing {} ...", vcf_file.display());

        let records = match predict_file(vcf_file, catalog, config) {
            Ok(records) => records,
            Err(e) => {
                log::warn!("Skipping {}: {}", vcf_file.display(), e);
                continue;
            }
        };

        if records.is_empty() {
            log::warn!("No samples found in {}", vcf_file.display());
            continue;
        }

        summary.files_succeeded += 1;
        for record in records {
            log::info!("{} is predicted as {}", record.sample, record.prediction);
            report.push(record);
        }
    }
    summary.samples = report.len();

    if config.sample_reports {
        write_sample_reports(&report, config);
    }

    let combined = config.combined_report_path();
    report.write_to(&combined)?;
    if report.is_empty() {
        log::warn!("No results to save; wrote empty report to {}", combined.display());
    } else {
        log::info!("Combined results saved to {}", combined.display());
    }

    log::info!(
        "{} of {} file(s) processed, {} sample(s) classified",
        summary.files_succeeded,
        summary.files_total,
        summary.samples
    );

    Ok((report, summary))
}

/// One text report per sample. A failed write only loses that sample's file.
fn write_sample_reports(report: &Report, config: &PredictConfig) {
    let mut written = HashSet::new();
    for record in report.records() {
        let path = config.sample_report_path(&record.sample);
        if !written.insert(path.clone()) {
            log::warn!(
                "Sample {} seen more than once; overwriting {}",
                record.sample,
                path.display()
            );
        }
        match record.write_summary(&path) {
            Ok(()) => log::info!("Prediction for {} saved to {}", record.sample, path.display()),
            Err(e) => log::warn!("{:#}", e),
        }
    }
}

fn prepare_output_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        if !dir.is_dir() {
            anyhow::bail!("{} is not a directory", dir.display());
        }
        return Ok(());
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))
}
