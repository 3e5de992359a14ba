//! Render tables and assessments as a pretty table, CSV or JSON.
//!
//! Tabular output goes through a polars [`DataFrame`] so the pretty printer
//! and CSV writer come for free. JSON is produced from the row types directly
//! to keep nested risk notes intact.
use std::io::Write;
use std::str::FromStr;

use polars::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::model::{FlagStatus, IngredientAssessment, MatchedRow, RiskNote};
use crate::reference::ReferenceTable;

/// Output encodings understood by the CLI.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" | "tsv" | "pretty" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Make the polars pretty-printer show every row, column and full cell text.
pub fn configure_table_display() {
    std::env::set_var("POLARS_FMT_TABLE_FORMATTING", "UTF8_FULL");
    std::env::set_var("POLARS_FMT_MAX_COLS", "100000");
    std::env::set_var("POLARS_FMT_MAX_ROWS", "1000000");
    std::env::set_var("POLARS_FMT_STR_LEN", "100000");
    std::env::set_var("POLARS_TABLE_WIDTH", "65535");
}

/// One row per reference entry.
pub fn reference_frame(table: &ReferenceTable) -> Result<DataFrame> {
    let rows = &table.rows;
    let df = df!(
        "rsid"                    => rows.iter().map(|r| r.marker_id.clone()).collect::<Vec<_>>(),
        "gene"                    => rows.iter().map(|r| r.gene.clone()).collect::<Vec<_>>(),
        "risk_genotypes"          => rows.iter().map(|r| r.risk_genotypes.clone()).collect::<Vec<_>>(),
        "risk_description"        => rows.iter().map(|r| r.risk_description.clone()).collect::<Vec<_>>(),
        "affected_ingredients"    => rows.iter().map(|r| r.affected_ingredients.clone()).collect::<Vec<_>>(),
        "alternative_ingredients" => rows.iter().map(|r| r.alternative_ingredients.clone()).collect::<Vec<_>>(),
    )?;
    Ok(df)
}

/// One row per retained genotype/reference pair.
pub fn matches_frame(matched: &[MatchedRow]) -> Result<DataFrame> {
    let df = df!(
        "rsid"                 => matched.iter().map(|m| m.genotype.marker_id.clone()).collect::<Vec<_>>(),
        "chromosome"           => matched.iter().map(|m| m.genotype.chromosome.clone()).collect::<Vec<_>>(),
        "position"             => matched.iter().map(|m| m.genotype.position).collect::<Vec<u64>>(),
        "genotype"             => matched.iter().map(|m| m.genotype.genotype.clone()).collect::<Vec<_>>(),
        "gene"                 => matched.iter().map(|m| m.reference.gene.clone()).collect::<Vec<_>>(),
        "risk_genotypes"       => matched.iter().map(|m| m.reference.risk_genotypes.clone()).collect::<Vec<_>>(),
        "risk_description"     => matched.iter().map(|m| m.reference.risk_description.clone()).collect::<Vec<_>>(),
        "affected_ingredients" => matched.iter().map(|m| m.reference.affected_ingredients.clone()).collect::<Vec<_>>(),
    )?;
    Ok(df)
}

fn join_notes(notes: &[RiskNote], f: impl Fn(&RiskNote) -> Option<&str>) -> Option<String> {
    let parts: Vec<&str> = notes.iter().filter_map(f).filter(|s| !s.is_empty()).collect();
    if parts.is_empty() { None } else { Some(parts.join(" | ")) }
}

/// One row per user ingredient. Multiple risk notes are joined with `" | "`.
pub fn assessment_frame(assessments: &[IngredientAssessment]) -> Result<DataFrame> {
    let df = df!(
        "ingredient"   => assessments.iter().map(|a| a.ingredient.clone()).collect::<Vec<_>>(),
        "status"       => assessments.iter().map(|a| a.status().to_string()).collect::<Vec<_>>(),
        "allergen"     => assessments.iter().map(|a| a.allergen).collect::<Vec<bool>>(),
        "genes"        => assessments.iter().map(|a| join_notes(&a.genetic_risks, |n| Some(n.gene.as_str()))).collect::<Vec<_>>(),
        "risk"         => assessments.iter().map(|a| join_notes(&a.genetic_risks, |n| Some(n.risk_description.as_str()))).collect::<Vec<_>>(),
        "alternatives" => assessments.iter().map(|a| join_notes(&a.genetic_risks, |n| n.alternative_ingredients.as_deref())).collect::<Vec<_>>(),
    )?;
    Ok(df)
}

/// Serialisable view of an assessment that carries its collapsed status.
#[derive(Serialize)]
struct AssessmentRecord<'a> {
    ingredient: &'a str,
    status: FlagStatus,
    allergen: bool,
    genetic_risks: &'a [RiskNote],
}

/// Write assessments in `format`.
pub fn write_assessments<W: Write>(w: &mut W, assessments: &[IngredientAssessment], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let records: Vec<AssessmentRecord<'_>> = assessments
                .iter()
                .map(|a| AssessmentRecord {
                    ingredient: &a.ingredient,
                    status: a.status(),
                    allergen: a.allergen,
                    genetic_risks: &a.genetic_risks,
                })
                .collect();
            write_json(w, &records)
        }
        _ => write_frame(w, &mut assessment_frame(assessments)?, format),
    }
}

pub fn write_matches<W: Write>(w: &mut W, matched: &[MatchedRow], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(w, &matched),
        _ => write_frame(w, &mut matches_frame(matched)?, format),
    }
}

pub fn write_reference<W: Write>(w: &mut W, table: &ReferenceTable, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(w, &table.rows),
        _ => write_frame(w, &mut reference_frame(table)?, format),
    }
}

fn write_frame<W: Write>(w: &mut W, df: &mut DataFrame, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Csv => CsvWriter::new(&mut *w).include_header(true).finish(df)?,
        _ => writeln!(w, "{}", df)?,
    }
    Ok(())
}

fn write_json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *w, value)?;
    writeln!(w)?;
    Ok(())
}
