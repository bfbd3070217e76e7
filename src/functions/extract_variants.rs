//! Extract per-sample variant positions from a VCF file

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::{LineageError, Result};
use crate::parsers::VcfParser;

/// How samples are laid out in the input
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// One sample per file; every data line is a variant call
    Single,
    /// Multi-sample file; genotypes decide which samples carry a variant
    Joint,
}

/// When a GT token counts as a variant call
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GenotypeRule {
    /// Anything except exactly "0" or "."
    #[default]
    Literal,
    /// At least one called, non-reference allele ("0/1", "1|1", "./2")
    Allelic,
}

impl GenotypeRule {
    pub fn is_variant(&self, genotype: &str) -> bool {
        match self {
            GenotypeRule::Literal => genotype != "0" && genotype != ".",
            GenotypeRule::Allelic => genotype
                .split(|c| c == '/' || c == '|')
                .any(|allele| !allele.is_empty() && allele != "0" && allele != "."),
        }
    }
}

/// Positions at which one sample carries a variant
#[derive(Debug, Clone, PartialEq)]
pub struct SampleVariants {
    pub sample: String,
    pub positions: HashSet<u64>,
}

impl SampleVariants {
    pub fn new(sample: impl Into<String>) -> Self {
        Self {
            sample: sample.into(),
            positions: HashSet::new(),
        }
    }
}

pub fn extract_variants(
    path: &Path,
    mode: Mode,
    rule: GenotypeRule,
) -> Result<Vec<SampleVariants>> {
    match mode {
        Mode::Single => extract_single(path).map(|sample| vec![sample]),
        Mode::Joint => extract_joint(path, rule),
    }
}

/// Sample identifier for a single-sample file: the file name minus its extension
pub fn sample_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Every data line is a call for the one implicit sample. A single
/// unparsable position fails the whole file.
pub fn extract_single(path: &Path) -> Result<SampleVariants> {
    let mut vcf = VcfParser::from_file(path)?;
    let mut variants = SampleVariants::new(sample_name(path));

    for record in vcf.records() {
        variants.positions.insert(record?.pos);
    }

    if variants.positions.is_empty() {
        return Err(LineageError::EmptyExtraction {
            path: path.to_path_buf(),
        });
    }

    log::debug!(
        "{}: {} variant position(s)",
        variants.sample,
        variants.positions.len()
    );

    Ok(variants)
}

/// Samples come from the #CHROM line. Rows with an unparsable position are
/// skipped; the rest of the file is still read.
pub fn extract_joint(path: &Path, rule: GenotypeRule) -> Result<Vec<SampleVariants>> {
    let mut vcf = VcfParser::from_file(path)?;

    let names = match vcf.samples() {
        Some(names) => names.to_vec(),
        None => {
            if path.metadata()?.len() == 0 {
                return Ok(Vec::new());
            }
            return Err(LineageError::MissingHeader {
                path: path.to_path_buf(),
            });
        }
    };

    // Repeated sample names share one variant set
    let mut samples: Vec<SampleVariants> = Vec::new();
    let mut slots = Vec::with_capacity(names.len());
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for name in names.iter() {
        let slot = *seen.entry(name.as_str()).or_insert_with(|| {
            samples.push(SampleVariants::new(name.as_str()));
            samples.len() - 1
        });
        slots.push(slot);
    }

    let mut skipped = 0;
    for record in vcf.records() {
        let record = match record {
            Ok(record) => record,
            Err(LineageError::MalformedPosition { line, value }) => {
                log::warn!(
                    "Skipping invalid position {:?} at line {} in {}",
                    value,
                    line,
                    path.display()
                );
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        for (column, slot) in slots.iter().enumerate() {
            let Some(genotype) = record.genotype(column) else {
                continue;
            };
            if rule.is_variant(genotype) {
                samples[*slot].positions.insert(record.pos);
            }
        }
    }

    if skipped > 0 {
        log::warn!("{}: skipped {} row(s) with invalid positions", path.display(), skipped);
    }

    Ok(samples)
}
