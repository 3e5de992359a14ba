//! Join genotype rows against the reference table and keep risk carriers.
use tracing::{debug, info};

use crate::genome::GenomeTable;
use crate::model::MatchedRow;
use crate::reference::ReferenceTable;
use crate::tokenize::{genotype_in, AlleleOrder};

/// Knobs for [`match_risk_genotypes`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MatchOptions {
    pub allele_order: AlleleOrder,
}

/// Row counts from the two stages of a match.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MatchSummary {
    /// Rows surviving the marker-id inner join.
    pub joined: usize,
    /// Joined rows whose genotype is a risk genotype.
    pub retained: usize,
}

/// Inner join on marker id. Output follows genome order; a marker listed
/// several times in the reference yields one row per reference entry.
pub fn join_on_marker(genome: &GenomeTable, reference: &ReferenceTable) -> Vec<MatchedRow> {
    let idx = reference.by_marker();
    let mut out = Vec::new();
    for g in genome.iter() {
        if let Some(refs) = idx.get(g.marker_id.as_str()) {
            for r in refs {
                out.push(MatchedRow { genotype: g.clone(), reference: (*r).clone() });
            }
        }
    }
    out
}

/// Keep joined rows whose user genotype is one of the row's risk genotypes.
pub fn filter_risk_genotypes(joined: Vec<MatchedRow>, opts: MatchOptions) -> Vec<MatchedRow> {
    joined
        .into_iter()
        .filter(|m| genotype_in(&m.genotype.genotype, &m.reference.risk_genotypes, opts.allele_order))
        .collect()
}

/// Join then filter; returns the retained rows and the stage counts.
pub fn match_risk_genotypes(
    genome: &GenomeTable,
    reference: &ReferenceTable,
    opts: MatchOptions,
) -> (Vec<MatchedRow>, MatchSummary) {
    let joined = join_on_marker(genome, reference);
    let n_joined = joined.len();
    debug!(genome = genome.len(), reference = reference.len(), joined = n_joined, "marker join");
    let retained = filter_risk_genotypes(joined, opts);
    let summary = MatchSummary { joined: n_joined, retained: retained.len() };
    info!("Found {} matching SNPs, {} with risk genotypes", summary.joined, summary.retained);
    (retained, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GenotypeRow, ReferenceRow};
    use rstest::rstest;

    fn g(id: &str, gt: &str) -> GenotypeRow {
        GenotypeRow { marker_id: id.into(), chromosome: "1".into(), position: 1, genotype: gt.into() }
    }

    fn r(id: &str, gene: &str, risk: &str) -> ReferenceRow {
        ReferenceRow {
            marker_id: id.into(),
            gene: gene.into(),
            risk_genotypes: risk.into(),
            risk_description: format!("{gene} risk"),
            affected_ingredients: None,
            alternative_ingredients: None,
        }
    }

    #[test]
    fn no_overlap_means_no_matches() {
        let genome = GenomeTable { rows: vec![g("rs1", "AA"), g("rs2", "GG")] };
        let reference = ReferenceTable { rows: vec![r("rs9", "X", "AA GG")] };
        let (m, s) = match_risk_genotypes(&genome, &reference, MatchOptions::default());
        assert!(m.is_empty());
        assert_eq!(s, MatchSummary { joined: 0, retained: 0 });
    }

    #[rstest]
    #[case("AG GG", 1)]
    #[case("AA GG", 0)]
    #[case("AG, GG", 1)]
    fn retains_only_risk_carriers(#[case] risk: &str, #[case] expected: usize) {
        let genome = GenomeTable { rows: vec![g("rs1", "AG")] };
        let reference = ReferenceTable { rows: vec![r("rs1", "X", risk)] };
        let (m, s) = match_risk_genotypes(&genome, &reference, MatchOptions::default());
        assert_eq!(m.len(), expected);
        assert_eq!(s.joined, 1);
    }

    #[test]
    fn duplicate_reference_markers_give_one_row_each() {
        let genome = GenomeTable { rows: vec![g("rs1", "TT")] };
        let reference = ReferenceTable { rows: vec![r("rs1", "A", "TT"), r("rs1", "B", "CT TT")] };
        let (m, _) = match_risk_genotypes(&genome, &reference, MatchOptions::default());
        let genes: Vec<_> = m.iter().map(|x| x.reference.gene.as_str()).collect();
        assert_eq!(genes, vec!["A", "B"]);
    }

    #[test]
    fn allele_order_policy_is_honoured() {
        let genome = GenomeTable { rows: vec![g("rs1", "GA")] };
        let reference = ReferenceTable { rows: vec![r("rs1", "X", "AG")] };
        let exact = match_risk_genotypes(&genome, &reference, MatchOptions::default()).0;
        assert!(exact.is_empty());
        let opts = MatchOptions { allele_order: AlleleOrder::Unordered };
        let unordered = match_risk_genotypes(&genome, &reference, opts).0;
        assert_eq!(unordered.len(), 1);
    }

    #[test]
    fn output_follows_genome_order() {
        let genome = GenomeTable { rows: vec![g("rs2", "TT"), g("rs1", "AA")] };
        let reference = ReferenceTable { rows: vec![r("rs1", "A", "AA"), r("rs2", "B", "TT")] };
        let (m, _) = match_risk_genotypes(&genome, &reference, MatchOptions::default());
        let ids: Vec<_> = m.iter().map(|x| x.marker_id()).collect();
        assert_eq!(ids, vec!["rs2", "rs1"]);
    }
}
