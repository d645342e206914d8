//! Patient health reports.

mod render;
mod summary;

pub use summary::*;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::db::{DbError, PatientDatabase};

/// Report errors.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;

/// Output format for a rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Markdown,
    Json,
    Csv,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Text => "text",
            ReportFormat::Markdown => "markdown",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(format!("unknown report format: {}", other)),
        }
    }
}

/// Summaries for a set of patients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Generation timestamp (RFC 3339)
    pub generated_at: String,
    /// Number of patients in the report
    pub patient_count: usize,
    /// One summary per patient, in database order
    pub patients: Vec<PatientSummary>,
}

impl HealthReport {
    pub fn new(patients: Vec<PatientSummary>) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            patient_count: patients.len(),
            patients,
        }
    }

    /// Patients with at least one skipped metric.
    pub fn incomplete(&self) -> impl Iterator<Item = &PatientSummary> {
        self.patients.iter().filter(|p| !p.is_complete())
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format, one row per patient.
    pub fn to_csv(&self) -> String {
        render::csv(self)
    }

    /// Plain-text report.
    pub fn to_text(&self) -> String {
        render::text(self)
    }

    /// Markdown report with a summary table.
    pub fn to_markdown(&self) -> String {
        render::markdown(self)
    }

    pub fn render(&self, format: ReportFormat) -> ReportResult<String> {
        Ok(match format {
            ReportFormat::Text => self.to_text(),
            ReportFormat::Markdown => self.to_markdown(),
            ReportFormat::Json => self.to_json()?,
            ReportFormat::Csv => self.to_csv(),
        })
    }
}

/// Builds reports from a patient database.
pub struct ReportGenerator<'a> {
    db: &'a PatientDatabase,
}

impl<'a> ReportGenerator<'a> {
    /// Create a new report generator.
    pub fn new(db: &'a PatientDatabase) -> Self {
        Self { db }
    }

    /// Summarize a single patient.
    pub fn summarize(&self, patient_id: &str) -> ReportResult<PatientSummary> {
        let record = self.db.get_metric(patient_id)?;
        Ok(PatientSummary::from_record(record))
    }

    /// Report on every patient.
    pub fn generate_all(&self) -> HealthReport {
        let patients: Vec<PatientSummary> =
            self.db.iter().map(PatientSummary::from_record).collect();
        debug!(patients = patients.len(), "Generated report");
        HealthReport::new(patients)
    }

    /// Report on the given patients, in the order given.
    ///
    /// Fails if any ID is unknown.
    pub fn generate_for<I, S>(&self, patient_ids: I) -> ReportResult<HealthReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patients = patient_ids
            .into_iter()
            .map(|id| self.summarize(id.as_ref()))
            .collect::<ReportResult<Vec<_>>>()?;
        debug!(patients = patients.len(), "Generated report");
        Ok(HealthReport::new(patients))
    }
}
