//! Core row types for **genotypes**, **reference entries** and **matches**.
//!
//! This module holds the data model used across the crate. Every table in the
//! pipeline is a plain `Vec` of one of these rows; nothing is cached between
//! runs and no row refers back into another table.
//!
//! # Flow
//! [`GenotypeRow`] ⋈ [`ReferenceRow`] on `marker_id` gives a [`MatchedRow`],
//! kept only when the user's genotype is one of the reference row's risk
//! genotypes. Matched rows feed [`IngredientAssessment`]s.
use core::fmt;

use serde::Serialize;

/// One line of a raw genotype file (23andMe layout).
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GenotypeRow {
    /// Reference SNP id, e.g. `"rs4880"`. Join key.
    pub marker_id: String,
    /// Chromosome label as written (`"1"`..`"22"`, `"X"`, `"Y"`, `"MT"`).
    pub chromosome: String,
    /// 1-based position on the chromosome.
    pub position: u64,
    /// Observed allele pair, e.g. `"AG"`. No-calls (`"--"`) are kept verbatim.
    pub genotype: String,
}

/// One entry of the SNP-to-risk reference table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ReferenceRow {
    /// Reference SNP id. Join key; uniqueness is not enforced.
    pub marker_id: String,
    /// Gene symbol the marker lies in or near.
    pub gene: String,
    /// Free-text list of risk genotypes, e.g. `"CT TT"` or `"AG, GG"`.
    pub risk_genotypes: String,
    /// Human-readable description of the associated trait.
    pub risk_description: String,
    /// Comma-separated ingredient names relevant to carriers.
    pub affected_ingredients: Option<String>,
    /// Suggested replacements, shown alongside a flagged ingredient.
    pub alternative_ingredients: Option<String>,
}

/// One entry of the optional gene-to-ingredient table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GeneIngredientRow {
    pub gene: String,
    pub affected_ingredients: Option<String>,
    pub risk_description: Option<String>,
    pub alternative_ingredients: Option<String>,
}

/// A genotype row joined with the reference row it matched.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MatchedRow {
    pub genotype: GenotypeRow,
    pub reference: ReferenceRow,
}

impl MatchedRow {
    pub fn marker_id(&self) -> &str { &self.genotype.marker_id }
}

/// The risk information attached to a flagged ingredient.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RiskNote {
    /// Marker that produced this note.
    pub marker_id: String,
    pub gene: String,
    /// The user's genotype at `marker_id`.
    pub genotype: String,
    pub risk_description: String,
    pub alternative_ingredients: Option<String>,
}

impl From<&MatchedRow> for RiskNote {
    fn from(m: &MatchedRow) -> Self {
        Self {
            marker_id: m.genotype.marker_id.clone(),
            gene: m.reference.gene.clone(),
            genotype: m.genotype.genotype.clone(),
            risk_description: m.reference.risk_description.clone(),
            alternative_ingredients: m.reference.alternative_ingredients.clone(),
        }
    }
}

/// Why an ingredient was (or was not) highlighted.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagStatus {
    /// Listed as affected by at least one of the user's risk genotypes.
    GeneticRisk,
    /// Named in the user's allergy list only.
    Allergen,
    Clear,
}

impl fmt::Display for FlagStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlagStatus::GeneticRisk => "genetic_risk",
            FlagStatus::Allergen => "allergen",
            FlagStatus::Clear => "clear",
        };
        f.write_str(s)
    }
}

/// Verdict for one user-supplied ingredient.
///
/// Genetic risk and allergy are tracked independently, so an ingredient can
/// carry both. [`IngredientAssessment::status`] collapses them for display.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct IngredientAssessment {
    /// Ingredient as the user typed it (trimmed, original casing).
    pub ingredient: String,
    /// Every matched row that lists this ingredient, in match order.
    pub genetic_risks: Vec<RiskNote>,
    pub allergen: bool,
}

impl IngredientAssessment {
    /// Collapsed status; genetic risk outranks allergy.
    pub fn status(&self) -> FlagStatus {
        if !self.genetic_risks.is_empty() {
            FlagStatus::GeneticRisk
        } else if self.allergen {
            FlagStatus::Allergen
        } else {
            FlagStatus::Clear
        }
    }

    pub fn is_flagged(&self) -> bool { self.status() != FlagStatus::Clear }
}
