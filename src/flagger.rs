//! Flag user ingredients against matched risk rows and an allergy list.
//!
//! Ingredient names are compared after trimming and lowercasing. When several
//! matched rows list the same ingredient, every row contributes a
//! [`RiskNote`]; identical notes are collapsed.
use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::model::{IngredientAssessment, MatchedRow, RiskNote};
use crate::tokenize::split_ingredients;

/// Union of the lowercase affected ingredients of all matched rows.
pub fn affected_ingredients(matched: &[MatchedRow]) -> BTreeSet<String> {
    matched
        .iter()
        .filter_map(|m| m.reference.affected_ingredients.as_deref())
        .flat_map(split_ingredients)
        .collect()
}

/// Map each lowercase affected ingredient to the notes of the rows listing it.
pub fn risk_notes_by_ingredient(matched: &[MatchedRow]) -> HashMap<String, Vec<RiskNote>> {
    let mut notes: HashMap<String, Vec<RiskNote>> = HashMap::new();
    for m in matched {
        let Some(field) = m.reference.affected_ingredients.as_deref() else { continue };
        let note = RiskNote::from(m);
        for ingredient in split_ingredients(field) {
            let entry = notes.entry(ingredient).or_default();
            if !entry.contains(&note) {
                entry.push(note.clone());
            }
        }
    }
    notes
}

/// Assess each user ingredient, in input order.
///
/// `ingredients` keep the user's casing for display. `allergies` are compared
/// case-insensitively.
pub fn flag_ingredients(
    ingredients: &[String],
    matched: &[MatchedRow],
    allergies: &[String],
) -> Vec<IngredientAssessment> {
    let notes = risk_notes_by_ingredient(matched);
    let allergy_set: HashSet<String> = allergies.iter().map(|a| a.trim().to_lowercase()).collect();

    let out: Vec<IngredientAssessment> = ingredients
        .iter()
        .map(|ingredient| {
            let key = ingredient.trim().to_lowercase();
            IngredientAssessment {
                ingredient: ingredient.trim().to_string(),
                genetic_risks: notes.get(&key).cloned().unwrap_or_default(),
                allergen: allergy_set.contains(&key),
            }
        })
        .collect();
    debug!(
        ingredients = out.len(),
        flagged = out.iter().filter(|a| a.is_flagged()).count(),
        "ingredients assessed"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FlagStatus, GenotypeRow, ReferenceRow};
    use pretty_assertions::assert_eq;

    fn matched(id: &str, gene: &str, desc: &str, affected: Option<&str>) -> MatchedRow {
        MatchedRow {
            genotype: GenotypeRow {
                marker_id: id.into(),
                chromosome: "6".into(),
                position: 1,
                genotype: "TT".into(),
            },
            reference: ReferenceRow {
                marker_id: id.into(),
                gene: gene.into(),
                risk_genotypes: "TT".into(),
                risk_description: desc.into(),
                affected_ingredients: affected.map(Into::into),
                alternative_ingredients: Some("Niacinamide".into()),
            },
        }
    }

    fn names(v: &[&str]) -> Vec<String> { v.iter().map(|s| s.to_string()).collect() }

    #[test]
    fn affected_set_is_lowercase_union() {
        let m = vec![
            matched("rs1", "A", "a", Some("Retinol, Vitamin C")),
            matched("rs2", "B", "b", Some("vitamin c,Glycolic Acid")),
            matched("rs3", "C", "c", None),
        ];
        let set: Vec<_> = affected_ingredients(&m).into_iter().collect();
        assert_eq!(set, vec!["glycolic acid", "retinol", "vitamin c"]);
    }

    #[test]
    fn every_listing_row_is_kept() {
        let m = vec![
            matched("rs1", "A", "first", Some("Retinol")),
            matched("rs2", "B", "second", Some("retinol")),
        ];
        let out = flag_ingredients(&names(&["RETINOL"]), &m, &[]);
        let descs: Vec<_> = out[0].genetic_risks.iter().map(|n| n.risk_description.as_str()).collect();
        assert_eq!(descs, vec!["first", "second"]);
        assert_eq!(out[0].ingredient, "RETINOL");
    }

    #[test]
    fn identical_rows_collapse_to_one_note() {
        let row = matched("rs1", "A", "same", Some("Retinol"));
        let out = flag_ingredients(&names(&["retinol"]), &[row.clone(), row], &[]);
        assert_eq!(out[0].genetic_risks.len(), 1);
    }

    #[test]
    fn allergy_and_genetic_reasons_stay_distinct() {
        let m = vec![matched("rs4880", "SOD2", "oxidative", Some("Vitamin C"))];
        let out = flag_ingredients(
            &names(&["Vitamin C", "Fragrance", "Water"]),
            &m,
            &names(&[" fragrance "]),
        );
        assert_eq!(out[0].status(), FlagStatus::GeneticRisk);
        assert_eq!(out[1].status(), FlagStatus::Allergen);
        assert!(out[1].genetic_risks.is_empty());
        assert_eq!(out[2].status(), FlagStatus::Clear);
    }

    #[test]
    fn both_reasons_can_apply() {
        let m = vec![matched("rs1", "A", "x", Some("Retinol"))];
        let out = flag_ingredients(&names(&["Retinol"]), &m, &names(&["retinol"]));
        assert!(out[0].allergen);
        assert_eq!(out[0].status(), FlagStatus::GeneticRisk);
    }
}
