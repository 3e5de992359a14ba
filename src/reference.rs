//! Loaders for the bundled **SNP mapping** table and the optional
//! **gene ingredient** table.
//!
//! Both files are headered CSVs curated by hand. Columns are located by
//! header name, so their order does not matter and bookkeeping columns
//! (`Verified`, `Source`, the gene table's `Genotype`) are simply never read.
//!
//! The mapping table must carry `rsid`, `Gene` and `Risk Genotypes`. The
//! description and ingredient columns may be absent when the ingredient
//! details are supplied by a gene table instead; see
//! [`ReferenceTable::join_gene_ingredients`].
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{GeneIngredientRow, ReferenceRow};

/// Default location of the SNP mapping table, relative to the working directory.
pub const DEFAULT_REFERENCE_PATH: &str = "data/mapping.csv";

const REFERENCE_REQUIRED: &[&str] = &["rsid", "Gene", "Risk Genotypes"];
const GENE_REQUIRED: &[&str] = &["Gene"];

#[derive(Debug, Deserialize)]
struct RawReferenceRow {
    #[serde(rename = "rsid")]
    marker_id: String,
    #[serde(rename = "Gene")]
    gene: String,
    #[serde(rename = "Risk Genotypes")]
    risk_genotypes: Option<String>,
    #[serde(rename = "Risk Description", default)]
    risk_description: Option<String>,
    #[serde(rename = "Affected Ingredients", default)]
    affected_ingredients: Option<String>,
    #[serde(rename = "Alternative Ingredients", default)]
    alternative_ingredients: Option<String>,
}

impl From<RawReferenceRow> for ReferenceRow {
    fn from(r: RawReferenceRow) -> Self {
        Self {
            marker_id: r.marker_id,
            gene: r.gene,
            risk_genotypes: r.risk_genotypes.unwrap_or_default(),
            risk_description: r.risk_description.unwrap_or_default(),
            affected_ingredients: r.affected_ingredients,
            alternative_ingredients: r.alternative_ingredients,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawGeneIngredientRow {
    #[serde(rename = "Gene")]
    gene: String,
    #[serde(rename = "Affected Ingredients", default)]
    affected_ingredients: Option<String>,
    #[serde(rename = "Risk Description", default)]
    risk_description: Option<String>,
    #[serde(rename = "Alternative Ingredients", default)]
    alternative_ingredients: Option<String>,
}

impl From<RawGeneIngredientRow> for GeneIngredientRow {
    fn from(r: RawGeneIngredientRow) -> Self {
        Self {
            gene: r.gene,
            affected_ingredients: r.affected_ingredients,
            risk_description: r.risk_description,
            alternative_ingredients: r.alternative_ingredients,
        }
    }
}

/// The SNP mapping table, in file order.
#[derive(Clone, Debug, Default)]
pub struct ReferenceTable {
    pub rows: Vec<ReferenceRow>,
}

/// The gene ingredient table, in file order.
#[derive(Clone, Debug, Default)]
pub struct GeneIngredientTable {
    pub rows: Vec<GeneIngredientRow>,
}

impl ReferenceTable {
    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// Index rows by marker id. Duplicate markers keep every row, in file order.
    pub fn by_marker(&self) -> HashMap<&str, Vec<&ReferenceRow>> {
        let mut idx: HashMap<&str, Vec<&ReferenceRow>> = HashMap::with_capacity(self.rows.len());
        for r in &self.rows {
            idx.entry(r.marker_id.as_str()).or_default().push(r);
        }
        idx
    }

    /// Marker ids that occur on more than one row, with their counts.
    pub fn duplicate_markers(&self) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for r in &self.rows {
            *counts.entry(r.marker_id.clone()).or_insert(0) += 1;
        }
        counts.retain(|_, n| *n > 1);
        counts
    }

    /// Inner-join the gene ingredient table onto this table by gene.
    ///
    /// Each reference row is paired with every gene row of the same gene; the
    /// gene row's non-empty fields replace the reference row's. Reference rows
    /// whose gene is not in `genes` are dropped.
    pub fn join_gene_ingredients(&self, genes: &GeneIngredientTable) -> ReferenceTable {
        let mut by_gene: HashMap<&str, Vec<&GeneIngredientRow>> = HashMap::new();
        for g in &genes.rows {
            by_gene.entry(g.gene.as_str()).or_default().push(g);
        }

        let mut rows = Vec::new();
        for r in &self.rows {
            let Some(gs) = by_gene.get(r.gene.as_str()) else { continue };
            for g in gs {
                let mut joined = r.clone();
                if let Some(a) = non_empty(&g.affected_ingredients) {
                    joined.affected_ingredients = Some(a.to_string());
                }
                if let Some(d) = non_empty(&g.risk_description) {
                    joined.risk_description = d.to_string();
                }
                if let Some(alt) = non_empty(&g.alternative_ingredients) {
                    joined.alternative_ingredients = Some(alt.to_string());
                }
                rows.push(joined);
            }
        }
        debug!(before = self.rows.len(), after = rows.len(), "gene ingredient join");
        ReferenceTable { rows }
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn check_headers<R: Read>(rdr: &mut csv::Reader<R>, file: &str, required: &[&'static str]) -> Result<()> {
    let headers = rdr.headers()?;
    for &column in required {
        if !headers.iter().any(|h| h == column) {
            return Err(Error::MissingColumn { file: file.to_string(), column });
        }
    }
    Ok(())
}

fn open(path: &Path, not_found: fn(PathBuf) -> Error) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => not_found(path.to_path_buf()),
        _ => Error::Io(e),
    })
}

/// Parse the SNP mapping table from any reader. `name` is used in errors.
pub fn read_reference<R: Read>(reader: R, name: &str) -> Result<ReferenceTable> {
    let mut rdr = csv_reader(reader);
    check_headers(&mut rdr, name, REFERENCE_REQUIRED)?;
    let mut rows = Vec::new();
    for result in rdr.deserialize::<RawReferenceRow>() {
        rows.push(ReferenceRow::from(result?));
    }
    let table = ReferenceTable { rows };
    let dups = table.duplicate_markers();
    if !dups.is_empty() {
        warn!(markers = ?dups, "reference table has duplicate marker ids; each row is matched separately");
    }
    debug!(rows = table.len(), "reference table loaded");
    Ok(table)
}

/// Load the SNP mapping table from disk.
///
/// A missing file is reported as [`Error::ReferenceNotFound`].
pub fn load_reference<P: AsRef<Path>>(path: P) -> Result<ReferenceTable> {
    let p = path.as_ref();
    let file = open(p, Error::ReferenceNotFound)?;
    read_reference(file, &p.display().to_string())
}

/// Parse the gene ingredient table from any reader.
pub fn read_gene_ingredients<R: Read>(reader: R, name: &str) -> Result<GeneIngredientTable> {
    let mut rdr = csv_reader(reader);
    check_headers(&mut rdr, name, GENE_REQUIRED)?;
    let mut rows = Vec::new();
    for result in rdr.deserialize::<RawGeneIngredientRow>() {
        rows.push(GeneIngredientRow::from(result?));
    }
    debug!(rows = rows.len(), "gene ingredient table loaded");
    Ok(GeneIngredientTable { rows })
}

pub fn load_gene_ingredients<P: AsRef<Path>>(path: P) -> Result<GeneIngredientTable> {
    let p = path.as_ref();
    let file = open(p, Error::GeneIngredientsNotFound)?;
    read_gene_ingredients(file, &p.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MAPPING: &str = "\
rsid,Gene,Risk Genotypes,Risk Description,Affected Ingredients,Alternative Ingredients,Verified,Source
rs4880,SOD2,CT TT,Reduced antioxidant defence,\"Retinol, Vitamin C\",Niacinamide,yes,PMID:1
rs1801133,MTHFR,AA,Lower folate metabolism,,Methylfolate,no,PMID:2
";

    #[test]
    fn drops_bookkeeping_columns_and_reads_optionals() {
        let t = read_reference(MAPPING.as_bytes(), "mapping.csv").unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(
            t.rows[0],
            ReferenceRow {
                marker_id: "rs4880".into(),
                gene: "SOD2".into(),
                risk_genotypes: "CT TT".into(),
                risk_description: "Reduced antioxidant defence".into(),
                affected_ingredients: Some("Retinol, Vitamin C".into()),
                alternative_ingredients: Some("Niacinamide".into()),
            }
        );
        assert_eq!(t.rows[1].affected_ingredients, None);
    }

    #[test]
    fn missing_required_column_is_named() {
        let err = read_reference("rsid,Gene\nrs1,X\n".as_bytes(), "bad.csv").unwrap_err();
        match err {
            Error::MissingColumn { file, column } => {
                assert_eq!(file, "bad.csv");
                assert_eq!(column, "Risk Genotypes");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_has_user_facing_message() {
        let err = load_reference("/no/such/mapping.csv").unwrap_err();
        assert!(matches!(err, Error::ReferenceNotFound(_)));
        assert!(err.to_string().starts_with("SNP mapping file not found"));
    }

    #[test]
    fn duplicates_are_kept_and_reported() {
        let csv = "rsid,Gene,Risk Genotypes\nrs1,A,AA\nrs1,B,GG\nrs2,C,TT\n";
        let t = read_reference(csv.as_bytes(), "dup.csv").unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.duplicate_markers().get("rs1"), Some(&2));
        assert_eq!(t.by_marker()["rs1"].len(), 2);
    }

    #[test]
    fn gene_join_overrides_and_drops_unmatched_genes() {
        let mapping = "rsid,Gene,Risk Genotypes,Risk Description\nrs1,SOD2,TT,old\nrs2,MC1R,AA,keep?\n";
        let genes = "Gene,Genotype,Affected Ingredients,Risk Description,Alternative Ingredients\n\
                     SOD2,TT,Retinol,new,Bakuchiol\nSOD2,CT,Vitamin C,,\n";
        let r = read_reference(mapping.as_bytes(), "m").unwrap();
        let g = read_gene_ingredients(genes.as_bytes(), "g").unwrap();
        let joined = r.join_gene_ingredients(&g);
        assert_eq!(joined.len(), 2);
        assert!(joined.rows.iter().all(|row| row.gene == "SOD2"));
        assert_eq!(joined.rows[0].risk_description, "new");
        assert_eq!(joined.rows[0].alternative_ingredients.as_deref(), Some("Bakuchiol"));
        assert_eq!(joined.rows[1].risk_description, "old");
        assert_eq!(joined.rows[1].affected_ingredients.as_deref(), Some("Vitamin C"));
    }
}
