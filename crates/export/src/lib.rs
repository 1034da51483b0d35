//! # Citation export
//!
//! Lookup over the flat citation dataset: one row per citing/cited pair,
//! with the two publication numbers in the `Publication A` and
//! `Publication B` columns. Every other column is carried through verbatim.

use csv::StringRecord;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const PUBLICATION_A: &str = "Publication A";
pub const PUBLICATION_B: &str = "Publication B";

pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to read citation table {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Citation table is missing column {0:?}")]
    MissingColumn(&'static str),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The citation dataset held in memory
#[derive(Debug, Clone)]
pub struct CitationTable {
    headers: StringRecord,
    rows: Vec<StringRecord>,
    column_a: usize,
    column_b: usize,
}

impl CitationTable {
    pub fn from_path(path: &Path) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|source| ExportError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_csv(reader).map_err(|err| match err {
            ExportError::Csv(source) => ExportError::Read {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Self::from_csv(csv::ReaderBuilder::new().has_headers(true).from_reader(reader))
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let headers = reader.headers()?.clone();
        let column_a = column(&headers, PUBLICATION_A)?;
        let column_b = column(&headers, PUBLICATION_B)?;
        let rows = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
        log::debug!("Loaded citation table: {} rows", rows.len());
        Ok(Self {
            headers,
            rows,
            column_a,
            column_b,
        })
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows where either publication column equals `publication_id`, in file order
    pub fn rows_for(&self, publication_id: &str) -> Vec<&StringRecord> {
        self.rows
            .iter()
            .filter(|row| {
                row.get(self.column_a) == Some(publication_id)
                    || row.get(self.column_b) == Some(publication_id)
            })
            .collect()
    }

    /// Header plus the given rows
    pub fn write_csv<W: Write>(&self, rows: &[&StringRecord], writer: W) -> Result<()> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(&self.headers)?;
        for row in rows {
            out.write_record(*row)?;
        }
        out.flush()?;
        Ok(())
    }

    /// Writes the rows for `publication_id` into `dir`; returns the file path
    /// and the number of rows written.
    pub fn export_to_dir(&self, publication_id: &str, dir: &Path) -> Result<(PathBuf, usize)> {
        let rows = self.rows_for(publication_id);
        std::fs::create_dir_all(dir)?;
        let path = dir.join(export_file_name(publication_id));
        let file = std::fs::File::create(&path)?;
        self.write_csv(&rows, file)?;
        log::info!(
            "Exported {} citation rows for {publication_id} to {}",
            rows.len(),
            path.display()
        );
        Ok((path, rows.len()))
    }
}

fn column(headers: &StringRecord, name: &'static str) -> Result<usize> {
    headers
        .iter()
        .position(|header| header.trim() == name)
        .ok_or(ExportError::MissingColumn(name))
}

/// File name used for a publication's export
pub fn export_file_name(publication_id: &str) -> String {
    let safe: String = publication_id
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    format!("export_details_{safe}.csv")
}
