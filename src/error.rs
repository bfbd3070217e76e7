//! Error types for lineage prediction.
//!
//! Every variant here is recoverable at file or row granularity: the batch
//! driver logs it and moves on to the next input.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LineageError {
    /// Input path does not exist
    #[error("File not found: {}", .path.display())]
    MissingInput { path: PathBuf },

    /// Nothing usable came out of a VCF file
    #[error("No valid variants found in {}", .path.display())]
    EmptyExtraction { path: PathBuf },

    /// POS column is not an integer
    #[error("Invalid position at line {line}: {value:?}")]
    MalformedPosition { line: usize, value: String },

    /// Joint VCF without a #CHROM sample header
    #[error("VCF header not found in {}", .path.display())]
    MissingHeader { path: PathBuf },

    /// Reference catalog could not be loaded
    #[error("Catalog error at line {line}: {message}")]
    Catalog { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LineageError>;

impl LineageError {
    pub fn catalog(line: usize, message: impl Into<String>) -> Self {
        Self::Catalog {
            line,
            message: message.into(),
        }
    }
}
