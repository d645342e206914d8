//! Patient measurement records.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reference::{
    BloodPressureCategory, BmiCategory, ReferenceError, ReferenceTables, VitalSign,
    VitalSignLevel, WaistToHeightCategory,
};

/// Record errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    #[error("Patient {patient_id}: {field} missing")]
    MissingField {
        patient_id: String,
        field: &'static str,
    },

    #[error("Patient {patient_id}: {field} value {value} is out of domain")]
    OutOfDomain {
        patient_id: String,
        field: &'static str,
        value: f64,
    },

    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

pub type MetricResult<T> = Result<T, MetricError>;

/// One typed input row, already coerced by the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub patient_id: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub waist_cm: Option<f64>,
    pub systolic_bp: Option<u16>,
    pub diastolic_bp: Option<u16>,
    pub heart_rate: Option<f64>,
    pub respiratory_rate: Option<f64>,
    pub temperature: Option<f64>,
}

impl MetricRow {
    /// Create a row with the mandatory fields only.
    pub fn new(patient_id: impl Into<String>, height_cm: f64, weight_kg: f64) -> Self {
        Self {
            patient_id: patient_id.into(),
            height_cm,
            weight_kg,
            waist_cm: None,
            systolic_bp: None,
            diastolic_bp: None,
            heart_rate: None,
            respiratory_rate: None,
            temperature: None,
        }
    }

    pub fn with_waist(mut self, waist_cm: f64) -> Self {
        self.waist_cm = Some(waist_cm);
        self
    }

    pub fn with_blood_pressure(mut self, systolic: u16, diastolic: u16) -> Self {
        self.systolic_bp = Some(systolic);
        self.diastolic_bp = Some(diastolic);
        self
    }

    pub fn with_vital(mut self, sign: VitalSign, value: f64) -> Self {
        *self.vital_mut(sign) = Some(value);
        self
    }

    pub fn vital(&self, sign: VitalSign) -> Option<f64> {
        match sign {
            VitalSign::HeartRate => self.heart_rate,
            VitalSign::RespiratoryRate => self.respiratory_rate,
            VitalSign::Temperature => self.temperature,
        }
    }

    fn vital_mut(&mut self, sign: VitalSign) -> &mut Option<f64> {
        match sign {
            VitalSign::HeartRate => &mut self.heart_rate,
            VitalSign::RespiratoryRate => &mut self.respiratory_rate,
            VitalSign::Temperature => &mut self.temperature,
        }
    }
}

/// Non-fatal data-quality finding attached to a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityWarning {
    /// Systolic must exceed diastolic in a physiologic reading
    SystolicNotAboveDiastolic { systolic: u16, diastolic: u16 },
    /// Height outside 50-250 cm
    ImplausibleHeight { height_cm: f64 },
    /// Weight outside 2-300 kg
    ImplausibleWeight { weight_kg: f64 },
    /// Systolic outside 40-300 or diastolic outside 20-200 mmHg
    ImplausibleBloodPressure { systolic: u16, diastolic: u16 },
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataQualityWarning::SystolicNotAboveDiastolic {
                systolic,
                diastolic,
            } => write!(
                f,
                "systolic {} is not above diastolic {}",
                systolic, diastolic
            ),
            DataQualityWarning::ImplausibleHeight { height_cm } => {
                write!(f, "height {} cm is implausible", height_cm)
            }
            DataQualityWarning::ImplausibleWeight { weight_kg } => {
                write!(f, "weight {} kg is implausible", weight_kg)
            }
            DataQualityWarning::ImplausibleBloodPressure {
                systolic,
                diastolic,
            } => write!(
                f,
                "blood pressure {}/{} mmHg is implausible",
                systolic, diastolic
            ),
        }
    }
}

/// One patient's measurement snapshot.
///
/// Raw fields are fixed at construction. Every derived value is recomputed
/// from them on each call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    patient_id: String,
    height_cm: f64,
    weight_kg: f64,
    waist_cm: Option<f64>,
    systolic_bp: Option<u16>,
    diastolic_bp: Option<u16>,
    heart_rate: Option<f64>,
    respiratory_rate: Option<f64>,
    temperature: Option<f64>,
    warnings: Vec<DataQualityWarning>,
    #[serde(skip)]
    tables: Arc<ReferenceTables>,
}

impl TryFrom<MetricRow> for MetricRecord {
    type Error = MetricError;

    fn try_from(row: MetricRow) -> MetricResult<Self> {
        Self::from_row(row)
    }
}

impl MetricRecord {
    /// Validate a row against the standard reference tables.
    pub fn from_row(row: MetricRow) -> MetricResult<Self> {
        Self::with_tables(row, ReferenceTables::shared())
    }

    /// Validate a row, categorizing against the given tables.
    pub fn with_tables(row: MetricRow, tables: Arc<ReferenceTables>) -> MetricResult<Self> {
        let patient_id = row.patient_id.trim().to_string();
        if patient_id.is_empty() {
            return Err(MetricError::MissingField {
                patient_id,
                field: "patient_id",
            });
        }

        let out_of_domain = |field: &'static str, value: f64| MetricError::OutOfDomain {
            patient_id: patient_id.clone(),
            field,
            value,
        };
        let check = |field: &'static str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(out_of_domain(field, value))
            }
        };

        check("height_cm", row.height_cm)?;
        check("weight_kg", row.weight_kg)?;
        if let Some(waist) = row.waist_cm {
            check("waist_cm", waist)?;
        }
        if row.systolic_bp == Some(0) {
            return Err(out_of_domain("systolic_bp", 0.0));
        }
        if row.diastolic_bp == Some(0) {
            return Err(out_of_domain("diastolic_bp", 0.0));
        }
        for sign in VitalSign::ALL {
            if let Some(value) = row.vital(sign) {
                check(sign.name(), value)?;
            }
        }

        let warnings = plausibility_warnings(&row);

        Ok(Self {
            patient_id,
            height_cm: row.height_cm,
            weight_kg: row.weight_kg,
            waist_cm: row.waist_cm,
            systolic_bp: row.systolic_bp,
            diastolic_bp: row.diastolic_bp,
            heart_rate: row.heart_rate,
            respiratory_rate: row.respiratory_rate,
            temperature: row.temperature,
            warnings,
            tables,
        })
    }

    /// Raw fields as a row, for building a corrected replacement record.
    pub fn to_row(&self) -> MetricRow {
        MetricRow {
            patient_id: self.patient_id.clone(),
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            waist_cm: self.waist_cm,
            systolic_bp: self.systolic_bp,
            diastolic_bp: self.diastolic_bp,
            heart_rate: self.heart_rate,
            respiratory_rate: self.respiratory_rate,
            temperature: self.temperature,
        }
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    pub fn height_cm(&self) -> f64 {
        self.height_cm
    }

    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    pub fn waist_cm(&self) -> Option<f64> {
        self.waist_cm
    }

    pub fn systolic_bp(&self) -> Option<u16> {
        self.systolic_bp
    }

    pub fn diastolic_bp(&self) -> Option<u16> {
        self.diastolic_bp
    }

    pub fn vital(&self, sign: VitalSign) -> Option<f64> {
        match sign {
            VitalSign::HeartRate => self.heart_rate,
            VitalSign::RespiratoryRate => self.respiratory_rate,
            VitalSign::Temperature => self.temperature,
        }
    }

    /// Data-quality warnings found at construction.
    pub fn warnings(&self) -> &[DataQualityWarning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Tables this record categorizes against.
    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    /// Body Mass Index, `kg / m^2`, rounded to one decimal.
    pub fn bmi(&self) -> MetricResult<f64> {
        let height_cm = self.positive("height_cm", self.height_cm)?;
        let weight_kg = self.positive("weight_kg", self.weight_kg)?;
        self.finite("bmi", round_to(weight_kg / (height_cm / 100.0).powi(2), 1))
    }

    pub fn bmi_category(&self) -> MetricResult<BmiCategory> {
        Ok(self.tables.bmi_category(self.bmi()?)?)
    }

    /// Combined category: the more severe of the systolic and diastolic bands.
    pub fn blood_pressure_category(&self) -> MetricResult<BloodPressureCategory> {
        let systolic = self.required("systolic_bp", self.systolic_bp)?;
        let diastolic = self.required("diastolic_bp", self.diastolic_bp)?;
        Ok(self
            .tables
            .blood_pressure_category(f64::from(systolic), f64::from(diastolic))?)
    }

    pub fn is_hypertensive_crisis(&self) -> MetricResult<bool> {
        Ok(self.blood_pressure_category()? == BloodPressureCategory::HypertensiveCrisis)
    }

    /// Waist circumference over height, rounded to two decimals.
    pub fn waist_to_height_ratio(&self) -> MetricResult<f64> {
        let waist_cm = self.required("waist_cm", self.waist_cm)?;
        let height_cm = self.positive("height_cm", self.height_cm)?;
        self.finite("waist_to_height", round_to(waist_cm / height_cm, 2))
    }

    pub fn waist_to_height_category(&self) -> MetricResult<WaistToHeightCategory> {
        Ok(self
            .tables
            .waist_to_height_category(self.waist_to_height_ratio()?)?)
    }

    /// Level of every vital sign present on the record. Unmeasured vitals are
    /// left out.
    pub fn vital_signs_assessment(&self) -> MetricResult<BTreeMap<VitalSign, VitalSignLevel>> {
        let mut assessment = BTreeMap::new();
        for sign in VitalSign::ALL {
            if let Some(value) = self.vital(sign) {
                assessment.insert(sign, self.tables.vital_sign_level(sign, value)?);
            }
        }
        Ok(assessment)
    }

    fn required<T>(&self, field: &'static str, value: Option<T>) -> MetricResult<T> {
        value.ok_or_else(|| MetricError::MissingField {
            patient_id: self.patient_id.clone(),
            field,
        })
    }

    /// Derived values overflow to infinity on extreme but valid inputs.
    fn finite(&self, field: &'static str, value: f64) -> MetricResult<f64> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(MetricError::OutOfDomain {
                patient_id: self.patient_id.clone(),
                field,
                value,
            })
        }
    }

    fn positive(&self, field: &'static str, value: f64) -> MetricResult<f64> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(MetricError::OutOfDomain {
                patient_id: self.patient_id.clone(),
                field,
                value,
            })
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn plausibility_warnings(row: &MetricRow) -> Vec<DataQualityWarning> {
    let mut warnings = Vec::new();

    if !(50.0..=250.0).contains(&row.height_cm) {
        warnings.push(DataQualityWarning::ImplausibleHeight {
            height_cm: row.height_cm,
        });
    }
    if !(2.0..=300.0).contains(&row.weight_kg) {
        warnings.push(DataQualityWarning::ImplausibleWeight {
            weight_kg: row.weight_kg,
        });
    }

    if let (Some(systolic), Some(diastolic)) = (row.systolic_bp, row.diastolic_bp) {
        if systolic <= diastolic {
            warnings.push(DataQualityWarning::SystolicNotAboveDiastolic {
                systolic,
                diastolic,
            });
        }
        if !(40..=300).contains(&systolic) || !(20..=200).contains(&diastolic) {
            warnings.push(DataQualityWarning::ImplausibleBloodPressure {
                systolic,
                diastolic,
            });
        }
    }

    warnings
}
