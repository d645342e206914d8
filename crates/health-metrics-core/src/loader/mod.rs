//! CSV ingestion.
//!
//! Turns a measurement file into typed [`MetricRow`]s and then into a
//! [`PatientDatabase`]. All coercion happens here; nothing downstream
//! re-validates raw text.

mod csv;

pub use self::csv::{
    DIASTOLIC_BP, HEART_RATE, HEIGHT_CM, PATIENT_ID, REQUIRED_COLUMNS, RESPIRATORY_RATE,
    SYSTOLIC_BP, TEMPERATURE, VITAL_COLUMNS, WAIST_CM, WEIGHT_KG,
};

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::db::{DbError, PatientDatabase};
use crate::models::{MetricRecord, MetricRow};
use crate::reference::ReferenceTables;
use self::csv::Header;

/// Loader errors.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input has no header row")]
    EmptyInput,

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Duplicate column in header: {0}")]
    DuplicateColumn(String),

    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    #[error("Duplicate patient ID {patient_id} at line {line}")]
    DuplicateKey { line: usize, patient_id: String },

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub type LoadResult<T> = Result<T, LoadError>;

/// Reads a patient measurement CSV.
pub struct DataLoader<R> {
    reader: R,
    source: String,
}

impl DataLoader<BufReader<File>> {
    /// Open a CSV file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> LoadResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            source: path.display().to_string(),
        })
    }
}

impl<R: BufRead> DataLoader<R> {
    /// Read CSV text from any buffered reader.
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            source: "<reader>".to_string(),
        }
    }

    /// Coerce every row without building records.
    pub fn parse_rows(self) -> LoadResult<Vec<MetricRow>> {
        Ok(self.parse_numbered()?.into_iter().map(|(_, row)| row).collect())
    }

    /// Load into a database using the standard reference tables.
    pub fn load(self) -> LoadResult<PatientDatabase> {
        self.load_with_tables(ReferenceTables::shared())
    }

    /// Load into a database, categorizing against the given tables.
    ///
    /// Any malformed row or repeated patient ID fails the whole load.
    pub fn load_with_tables(self, tables: Arc<ReferenceTables>) -> LoadResult<PatientDatabase> {
        let source = self.source.clone();
        let rows = self.parse_numbered()?;

        let records = rows
            .into_iter()
            .map(|(line, row)| {
                MetricRecord::with_tables(row, Arc::clone(&tables)).map_err(|e| {
                    LoadError::MalformedRow {
                        line,
                        reason: e.to_string(),
                    }
                })
            })
            .collect::<LoadResult<Vec<_>>>()?;

        let db = PatientDatabase::from_records(records)?;

        for record in db.records_with_warnings() {
            for warning in record.warnings() {
                warn!(patient_id = %record.patient_id(), %warning, "Data quality warning");
            }
        }
        info!(source = %source, patients = db.size(), "Loaded patient records");

        Ok(db)
    }

    fn parse_numbered(self) -> LoadResult<Vec<(usize, MetricRow)>> {
        let mut lines = self
            .reader
            .lines()
            .enumerate()
            .map(|(index, line)| line.map(|text| (index + 1, text)));

        let header = loop {
            match lines.next() {
                Some(line) => {
                    let (number, text) = line?;
                    if !text.trim().is_empty() {
                        break Header::parse(number, &text)?;
                    }
                }
                None => return Err(LoadError::EmptyInput),
            }
        };
        if !header.ignored().is_empty() {
            debug!(columns = ?header.ignored(), "Ignoring unknown columns");
        }
        if !header.has(HEART_RATE) && !header.has(RESPIRATORY_RATE) && !header.has(TEMPERATURE) {
            debug!(source = %self.source, "No vital sign columns present");
        }

        let mut seen = HashSet::new();
        let mut rows = Vec::new();
        for line in lines {
            let (number, text) = line?;
            if text.trim().is_empty() {
                continue;
            }

            let row = header.row(number, &text)?;
            let patient_id = row.patient_id.trim().to_string();
            if !seen.insert(patient_id.clone()) {
                return Err(LoadError::DuplicateKey {
                    line: number,
                    patient_id,
                });
            }

            debug!(line = number, patient_id = %patient_id, "Parsed row");
            rows.push((number, row));
        }

        Ok(rows)
    }
}

/// Load a CSV file into a database with the standard reference tables.
pub fn load_csv<P: AsRef<Path>>(path: P) -> LoadResult<PatientDatabase> {
    DataLoader::from_path(path)?.load()
}
