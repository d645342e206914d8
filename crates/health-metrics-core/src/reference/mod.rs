//! Clinical reference tables.
//!
//! Every domain is an ordered list of bands covering `[0, +inf)`. A band's lower
//! edge is inclusive unless the previous band ended with an inclusive edge; the
//! final band is open-ended.

mod category;
mod standard;
mod table;

pub use category::*;
pub use table::*;

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reference table errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReferenceError {
    #[error("{domain} value {value} is out of domain")]
    OutOfDomain { domain: Domain, value: f64 },

    #[error("Invalid {domain} table: {reason}")]
    InvalidTable { domain: Domain, reason: String },
}

pub type ReferenceResult<T> = Result<T, ReferenceError>;

/// Metric domain covered by a reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Bmi,
    SystolicBp,
    DiastolicBp,
    WaistToHeight,
    HeartRate,
    RespiratoryRate,
    Temperature,
}

impl Domain {
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Bmi => "bmi",
            Domain::SystolicBp => "systolic_bp",
            Domain::DiastolicBp => "diastolic_bp",
            Domain::WaistToHeight => "waist_to_height",
            Domain::HeartRate => "heart_rate",
            Domain::RespiratoryRate => "respiratory_rate",
            Domain::Temperature => "temperature",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<VitalSign> for Domain {
    fn from(sign: VitalSign) -> Self {
        match sign {
            VitalSign::HeartRate => Domain::HeartRate,
            VitalSign::RespiratoryRate => Domain::RespiratoryRate,
            VitalSign::Temperature => Domain::Temperature,
        }
    }
}

/// A band flattened to `(lower, upper, label)` for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandSummary {
    pub lower: f64,
    pub lower_inclusive: bool,
    /// `None` for the open-ended band
    pub upper: Option<f64>,
    pub upper_inclusive: bool,
    pub label: &'static str,
}

static SHARED: Lazy<Arc<ReferenceTables>> = Lazy::new(|| Arc::new(ReferenceTables::standard()));

/// The full set of reference tables used to categorize a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceTables {
    bmi: RangeTable<BmiCategory>,
    systolic: RangeTable<BloodPressureCategory>,
    diastolic: RangeTable<BloodPressureCategory>,
    waist_to_height: RangeTable<WaistToHeightCategory>,
    heart_rate: RangeTable<VitalSignLevel>,
    respiratory_rate: RangeTable<VitalSignLevel>,
    temperature: RangeTable<VitalSignLevel>,
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self::standard()
    }
}

impl ReferenceTables {
    /// Assemble tables from custom ranges. Each table must cover the slot's domain.
    pub fn new(
        bmi: RangeTable<BmiCategory>,
        systolic: RangeTable<BloodPressureCategory>,
        diastolic: RangeTable<BloodPressureCategory>,
        waist_to_height: RangeTable<WaistToHeightCategory>,
        heart_rate: RangeTable<VitalSignLevel>,
        respiratory_rate: RangeTable<VitalSignLevel>,
        temperature: RangeTable<VitalSignLevel>,
    ) -> ReferenceResult<Self> {
        let slots = [
            (bmi.domain(), Domain::Bmi),
            (systolic.domain(), Domain::SystolicBp),
            (diastolic.domain(), Domain::DiastolicBp),
            (waist_to_height.domain(), Domain::WaistToHeight),
            (heart_rate.domain(), Domain::HeartRate),
            (respiratory_rate.domain(), Domain::RespiratoryRate),
            (temperature.domain(), Domain::Temperature),
        ];
        for (found, expected) in slots {
            if found != expected {
                return Err(ReferenceError::InvalidTable {
                    domain: expected,
                    reason: format!("got a {} table", found),
                });
            }
        }

        Ok(Self {
            bmi,
            systolic,
            diastolic,
            waist_to_height,
            heart_rate,
            respiratory_rate,
            temperature,
        })
    }

    /// Adult reference ranges (WHO BMI, ACC/AHA blood pressure, resting vitals).
    pub fn standard() -> Self {
        standard::tables()
    }

    /// Process-wide standard tables, built on first use.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED)
    }

    /// Label for a value in any domain.
    pub fn categorize(&self, domain: Domain, value: f64) -> ReferenceResult<&'static str> {
        Ok(match domain {
            Domain::Bmi => self.bmi.categorize(value)?.label(),
            Domain::SystolicBp => self.systolic.categorize(value)?.label(),
            Domain::DiastolicBp => self.diastolic.categorize(value)?.label(),
            Domain::WaistToHeight => self.waist_to_height.categorize(value)?.label(),
            Domain::HeartRate => self.heart_rate.categorize(value)?.label(),
            Domain::RespiratoryRate => self.respiratory_rate.categorize(value)?.label(),
            Domain::Temperature => self.temperature.categorize(value)?.label(),
        })
    }

    pub fn bmi_category(&self, bmi: f64) -> ReferenceResult<BmiCategory> {
        self.bmi.categorize(bmi)
    }

    /// Combined blood pressure category: the more severe of the systolic and
    /// diastolic bands.
    pub fn blood_pressure_category(
        &self,
        systolic: f64,
        diastolic: f64,
    ) -> ReferenceResult<BloodPressureCategory> {
        let by_systolic = self.systolic.categorize(systolic)?;
        let by_diastolic = self.diastolic.categorize(diastolic)?;
        Ok(by_systolic.max(by_diastolic))
    }

    pub fn waist_to_height_category(&self, ratio: f64) -> ReferenceResult<WaistToHeightCategory> {
        self.waist_to_height.categorize(ratio)
    }

    pub fn vital_sign_level(&self, sign: VitalSign, value: f64) -> ReferenceResult<VitalSignLevel> {
        match sign {
            VitalSign::HeartRate => self.heart_rate.categorize(value),
            VitalSign::RespiratoryRate => self.respiratory_rate.categorize(value),
            VitalSign::Temperature => self.temperature.categorize(value),
        }
    }

    /// Bands of one domain as `(lower, upper, label)` summaries.
    pub fn bands(&self, domain: Domain) -> Vec<BandSummary> {
        match domain {
            Domain::Bmi => summarize(&self.bmi, BmiCategory::label),
            Domain::SystolicBp => summarize(&self.systolic, BloodPressureCategory::label),
            Domain::DiastolicBp => summarize(&self.diastolic, BloodPressureCategory::label),
            Domain::WaistToHeight => {
                summarize(&self.waist_to_height, WaistToHeightCategory::label)
            }
            Domain::HeartRate => summarize(&self.heart_rate, VitalSignLevel::label),
            Domain::RespiratoryRate => summarize(&self.respiratory_rate, VitalSignLevel::label),
            Domain::Temperature => summarize(&self.temperature, VitalSignLevel::label),
        }
    }
}

fn summarize<C: Copy>(table: &RangeTable<C>, label: fn(C) -> &'static str) -> Vec<BandSummary> {
    table
        .bands()
        .iter()
        .map(|band| BandSummary {
            lower: band.lower,
            lower_inclusive: band.lower_inclusive,
            upper: band.upper.edge(),
            upper_inclusive: matches!(band.upper, UpperBound::Through(_)),
            label: label(band.category),
        })
        .collect()
}
