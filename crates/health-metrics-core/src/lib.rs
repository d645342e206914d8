//! Health Metrics Core Library
//!
//! Derives body and cardiovascular metrics from patient measurements and
//! classifies them against fixed clinical reference tables.
//!
//! # Architecture
//!
//! ```text
//!   measurements.csv
//!          │
//!          ▼
//!     DataLoader ──── header mapping, typed coercion, duplicate check
//!          │
//!          ▼
//!   PatientDatabase ─── IndexMap<patient_id, MetricRecord>
//!          │                         │
//!          │                         └── Arc<ReferenceTables>
//!          │                               BMI │ BP │ WHtR │ vitals
//!          ▼
//!   ReportGenerator
//!          │
//!    ┌─────┼──────────┬──────────┐
//!    ▼     ▼          ▼          ▼
//!  Text  Markdown   JSON       CSV
//! ```
//!
//! # Core Principle
//!
//! **A metric that cannot be computed is reported as skipped.** No record is
//! ever given a placeholder category.
//!
//! # Modules
//!
//! - [`reference`]: Reference range tables and category types
//! - [`models`]: Typed measurement rows and derived-metric records
//! - [`db`]: In-memory, insertion-ordered patient database
//! - [`loader`]: CSV ingestion
//! - [`report`]: Per-patient summaries and report rendering

pub mod db;
pub mod loader;
pub mod models;
pub mod reference;
pub mod report;

// Re-export commonly used types
pub use db::{DbError, PatientDatabase};
pub use loader::{load_csv, DataLoader, LoadError};
pub use models::{DataQualityWarning, MetricError, MetricRecord, MetricRow};
pub use reference::{
    BloodPressureCategory, BmiCategory, Domain, ReferenceError, ReferenceTables, VitalSign,
    VitalSignLevel, WaistToHeightCategory,
};
pub use report::{HealthReport, PatientSummary, ReportError, ReportFormat, ReportGenerator};
