//! Error type shared by every loader and renderer in the crate.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error type for genoskin operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred while reading an input or writing output.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The bundled SNP mapping table is not where we were told to look.
    #[error("SNP mapping file not found. Please ensure '{}' is present.", .0.display())]
    ReferenceNotFound(PathBuf),

    /// The optional gene-to-ingredient table is missing.
    #[error("gene ingredient mapping file not found: {}", .0.display())]
    GeneIngredientsNotFound(PathBuf),

    /// The user's genotype file does not exist.
    #[error("genome file not found: {}", .0.display())]
    GenomeNotFound(PathBuf),

    /// Low-level CSV/TSV decoding failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A genotype line did not have the four expected columns.
    #[error("genome line {line}: expected 4 tab-separated columns, found {found}")]
    MalformedGenomeRow { line: u64, found: usize },

    /// The position column of a genotype line is not an unsigned integer.
    #[error("genome line {line}: position '{value}' is not a number")]
    InvalidPosition { line: u64, value: String },

    /// A CSV header lacks a column we need.
    #[error("{file}: missing required column '{column}'")]
    MissingColumn { file: String, column: &'static str },

    /// Building or writing a report frame failed.
    #[error("report error: {0}")]
    Frame(#[from] polars::prelude::PolarsError),

    /// JSON serialisation failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for genoskin operations.
pub type Result<T> = std::result::Result<T, Error>;
