//! In-memory patient database.

use std::sync::Arc;

use indexmap::map::Entry;
use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

use crate::models::{MetricError, MetricRecord, MetricRow};
use crate::reference::ReferenceTables;

/// Database errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DbError {
    #[error("Patient not found: {0}")]
    NotFound(String),

    #[error("Duplicate patient ID: {0}")]
    DuplicateKey(String),

    #[error("Malformed row {index}: {source}")]
    MalformedRow {
        index: usize,
        #[source]
        source: MetricError,
    },
}

pub type DbResult<T> = Result<T, DbError>;

/// Records keyed by patient ID, in insertion order.
///
/// Built once and read-only afterwards. Reflecting corrected data means
/// building a new database.
#[derive(Debug, Clone, Default)]
pub struct PatientDatabase {
    records: IndexMap<String, MetricRecord>,
}

impl PatientDatabase {
    /// Build from typed rows using the standard reference tables.
    pub fn from_rows<I>(rows: I) -> DbResult<Self>
    where
        I: IntoIterator<Item = MetricRow>,
    {
        Self::from_rows_with_tables(rows, ReferenceTables::shared())
    }

    /// Build from typed rows, categorizing against the given tables.
    ///
    /// Fails on the first invalid row or repeated ID; nothing is kept on failure.
    pub fn from_rows_with_tables<I>(rows: I, tables: Arc<ReferenceTables>) -> DbResult<Self>
    where
        I: IntoIterator<Item = MetricRow>,
    {
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| {
                MetricRecord::with_tables(row, Arc::clone(&tables))
                    .map_err(|source| DbError::MalformedRow { index, source })
            })
            .collect::<DbResult<Vec<_>>>()?;

        Self::from_records(records)
    }

    /// Build from already validated records.
    pub fn from_records<I>(records: I) -> DbResult<Self>
    where
        I: IntoIterator<Item = MetricRecord>,
    {
        let mut map = IndexMap::new();

        for record in records {
            match map.entry(record.patient_id().to_string()) {
                Entry::Occupied(entry) => {
                    return Err(DbError::DuplicateKey(entry.key().clone()));
                }
                Entry::Vacant(entry) => {
                    debug!(patient_id = %record.patient_id(), "Added patient record");
                    entry.insert(record);
                }
            }
        }

        Ok(Self { records: map })
    }

    /// Get a patient's record.
    pub fn get_metric(&self, patient_id: &str) -> DbResult<&MetricRecord> {
        self.records
            .get(patient_id)
            .ok_or_else(|| DbError::NotFound(patient_id.to_string()))
    }

    pub fn contains(&self, patient_id: &str) -> bool {
        self.records.contains_key(patient_id)
    }

    /// Number of records.
    pub fn size(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Patient IDs in insertion order.
    pub fn all_ids(&self) -> Vec<&str> {
        self.records.keys().map(String::as_str).collect()
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &MetricRecord> {
        self.records.values()
    }

    /// Records carrying at least one data-quality warning.
    pub fn records_with_warnings(&self) -> impl Iterator<Item = &MetricRecord> {
        self.records.values().filter(|r| r.has_warnings())
    }
}

impl<'a> IntoIterator for &'a PatientDatabase {
    type Item = &'a MetricRecord;
    type IntoIter = indexmap::map::Values<'a, String, MetricRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.values()
    }
}
