//! Token utilities for risk-genotype and ingredient fields.
//!
//! Reference tables are hand-curated, so the risk-genotype column shows up as
//! `"CT TT"`, `"CT, TT"` or `"CT,TT"` depending on who typed it. We treat
//! every run of word characters as one token, which makes all three
//! spellings equivalent. Ingredient lists are split on commas only, since
//! ingredient names routinely contain spaces.
//!
//! # Examples
//! ```
//! use genoskin::tokenize::{risk_genotype_tokens, split_ingredients};
//! assert_eq!(risk_genotype_tokens("AG, GG"), vec!["AG", "GG"]);
//! assert_eq!(split_ingredients("Retinol, Vitamin C"), vec!["retinol", "vitamin c"]);
//! ```
use std::sync::LazyLock;

use regex::Regex;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("static regex"));
static INGREDIENT_SEP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",\s*").expect("static regex"));

/// How two allele pairs are compared.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AlleleOrder {
    /// `"AG"` matches `"AG"` only.
    #[default]
    Exact,
    /// `"AG"` also matches `"GA"`.
    Unordered,
}

/// Extract the risk-genotype tokens from a reference cell.
pub fn risk_genotype_tokens(field: &str) -> Vec<&str> {
    WORD.find_iter(field).map(|m| m.as_str()).collect()
}

/// Normalise a genotype for comparison under `order`.
pub fn normalize_genotype(genotype: &str, order: AlleleOrder) -> String {
    match order {
        AlleleOrder::Exact => genotype.to_string(),
        AlleleOrder::Unordered => {
            let mut alleles: Vec<char> = genotype.chars().collect();
            alleles.sort_unstable();
            alleles.into_iter().collect()
        }
    }
}

/// `true` if `genotype` equals one of the tokens in `risk_field`.
///
/// Comparison is case-sensitive.
pub fn genotype_in(genotype: &str, risk_field: &str, order: AlleleOrder) -> bool {
    let g = normalize_genotype(genotype, order);
    risk_genotype_tokens(risk_field)
        .into_iter()
        .any(|t| normalize_genotype(t, order) == g)
}

/// Split a reference `Affected Ingredients` cell on `,\s*`, trimming and
/// lowercasing each piece. Empty pieces are dropped.
pub fn split_ingredients(field: &str) -> Vec<String> {
    INGREDIENT_SEP
        .split(field)
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split user-entered free text on commas, trimming but keeping case.
pub fn parse_ingredient_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
