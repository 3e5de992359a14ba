//! Loader for raw consumer genotype files.
//!
//! The expected layout is the 23andMe raw-data export: `#` comment header,
//! then one tab-separated line per marker with four columns
//! `rsid  chromosome  position  genotype`.
//!
//! ### Errors
//! Lines with the wrong column count and non-numeric positions abort the
//! load with an error naming the offending line. There is no partial result.
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::GenotypeRow;

const GENOME_COLUMNS: usize = 4;

/// All rows of one genotype file, in file order.
#[derive(Clone, Debug, Default)]
pub struct GenomeTable {
    pub rows: Vec<GenotypeRow>,
}

impl GenomeTable {
    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
    pub fn iter(&self) -> std::slice::Iter<'_, GenotypeRow> { self.rows.iter() }
}

/// Parse genotype rows from any reader.
pub fn read_genome<R: Read>(reader: R) -> Result<GenomeTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .comment(Some(b'#'))
        .quoting(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in rdr.records() {
        let rec = result?;
        let line = rec.position().map(|p| p.line()).unwrap_or(0);
        if rec.len() != GENOME_COLUMNS {
            return Err(Error::MalformedGenomeRow { line, found: rec.len() });
        }
        let position = rec[2]
            .parse::<u64>()
            .map_err(|_| Error::InvalidPosition { line, value: rec[2].to_string() })?;
        rows.push(GenotypeRow {
            marker_id: rec[0].to_string(),
            chromosome: rec[1].to_string(),
            position,
            genotype: rec[3].to_string(),
        });
    }
    debug!(rows = rows.len(), "genome table loaded");
    Ok(GenomeTable { rows })
}

/// Open and parse a genotype file from disk.
pub fn load_genome<P: AsRef<Path>>(path: P) -> Result<GenomeTable> {
    let p = path.as_ref();
    let file = File::open(p).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::GenomeNotFound(p.to_path_buf()),
        _ => Error::Io(e),
    })?;
    read_genome(file)
}
