#![forbid(unsafe_code)]
//! # genoskin
//!
//! Match a raw consumer genotype file (23andMe layout) against a curated
//! **SNP → risk → ingredient** table and flag the ingredients of a product
//! that the user's genotype, or their allergy list, argues against.
//!
//! ## Pipeline
//! 1. [`genome::load_genome`] reads `rsid / chromosome / position / genotype` rows.
//! 2. [`reference::load_reference`] reads the bundled mapping table
//!    (optionally enriched with a gene ingredient table).
//! 3. [`matcher::match_risk_genotypes`] inner-joins on rsid and keeps rows
//!    where the user's genotype is a listed risk genotype.
//! 4. [`flagger::flag_ingredients`] marks each user ingredient as a genetic
//!    risk, an allergen, or clear.
//!
//! Every run rebuilds all tables from disk; nothing is cached.
//!
//! ## Examples
//! ```no_run
//! let opts = genoskin::AssessOptions::default();
//! let out = genoskin::assess("genome.txt", "Water, Retinol, Vitamin C", "fragrance", &opts).unwrap();
//! for a in out.ingredients.iter().filter(|a| a.is_flagged()) {
//!     println!("{}: {}", a.ingredient, a.status());
//! }
//! ```

pub mod error;
pub mod model;
pub mod tokenize;
pub mod genome;
pub mod reference;
pub mod matcher;
pub mod flagger;
pub mod report;

use std::path::{Path, PathBuf};

use tracing::info;

pub use error::{Error, Result};
use genome::GenomeTable;
use matcher::{MatchOptions, MatchSummary};
use model::{IngredientAssessment, MatchedRow};
use reference::ReferenceTable;

/// Where the reference tables live and how genotypes are compared.
#[derive(Clone, Debug)]
pub struct AssessOptions {
    /// SNP mapping CSV. Defaults to [`reference::DEFAULT_REFERENCE_PATH`].
    pub reference_path: PathBuf,
    /// Optional gene ingredient CSV joined onto the mapping by gene.
    pub gene_ingredients_path: Option<PathBuf>,
    pub matching: MatchOptions,
}

impl Default for AssessOptions {
    fn default() -> Self {
        Self {
            reference_path: PathBuf::from(reference::DEFAULT_REFERENCE_PATH),
            gene_ingredients_path: None,
            matching: MatchOptions::default(),
        }
    }
}

/// Everything produced by one run.
#[derive(Clone, Debug)]
pub struct Assessment {
    pub matched: Vec<MatchedRow>,
    pub summary: MatchSummary,
    /// One entry per user ingredient, in input order.
    pub ingredients: Vec<IngredientAssessment>,
}

/// Load the reference table described by `opts`, applying the gene join if configured.
pub fn load_reference_tables(opts: &AssessOptions) -> Result<ReferenceTable> {
    let table = reference::load_reference(&opts.reference_path)?;
    match &opts.gene_ingredients_path {
        Some(p) => {
            let genes = reference::load_gene_ingredients(p)?;
            Ok(table.join_gene_ingredients(&genes))
        }
        None => Ok(table),
    }
}

/// Pure pipeline over already loaded tables.
pub fn assess_tables(
    genome: &GenomeTable,
    reference: &ReferenceTable,
    ingredients: &[String],
    allergies: &[String],
    matching: MatchOptions,
) -> Assessment {
    let (matched, summary) = matcher::match_risk_genotypes(genome, reference, matching);
    let ingredients = flagger::flag_ingredients(ingredients, &matched, allergies);
    Assessment { matched, summary, ingredients }
}

/// Load a genome file and reference tables, then assess the comma-separated
/// `ingredients` and `allergies` texts.
pub fn assess<P: AsRef<Path>>(
    genome_path: P,
    ingredients: &str,
    allergies: &str,
    opts: &AssessOptions,
) -> Result<Assessment> {
    let genome = genome::load_genome(genome_path)?;
    let reference = load_reference_tables(opts)?;
    let ingredient_list = tokenize::parse_ingredient_list(ingredients);
    let allergy_list = tokenize::parse_ingredient_list(allergies);
    let out = assess_tables(&genome, &reference, &ingredient_list, &allergy_list, opts.matching);
    info!(
        flagged = out.ingredients.iter().filter(|a| a.is_flagged()).count(),
        total = out.ingredients.len(),
        "assessment complete"
    );
    Ok(out)
}

/// Crate version string (from `CARGO_PKG_VERSION`).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
