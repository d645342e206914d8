//! Per-patient summaries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{MetricError, MetricRecord, MetricResult};
use crate::reference::{
    BloodPressureCategory, BmiCategory, ReferenceError, VitalSign, VitalSignLevel,
    WaistToHeightCategory,
};

/// Derived metrics for one patient.
///
/// A metric that cannot be computed is left empty and explained in `skipped`;
/// it never gets a guessed category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub patient_id: String,
    pub bmi: Option<f64>,
    pub bmi_category: Option<BmiCategory>,
    pub systolic_bp: Option<u16>,
    pub diastolic_bp: Option<u16>,
    pub blood_pressure_category: Option<BloodPressureCategory>,
    pub waist_to_height_ratio: Option<f64>,
    pub waist_to_height_category: Option<WaistToHeightCategory>,
    /// Only vitals present on the record
    pub vital_signs: BTreeMap<VitalSign, VitalSignLevel>,
    /// Data-quality warnings, rendered
    pub warnings: Vec<String>,
    /// One message per metric that could not be computed
    pub skipped: Vec<String>,
}

impl PatientSummary {
    pub fn from_record(record: &MetricRecord) -> Self {
        let id = record.patient_id();
        let mut skipped = Vec::new();

        let bmi = settle(id, "BMI", record.bmi(), &mut skipped);
        // A category is only attempted once its value is known, so one missing
        // input is reported once.
        let bmi_category = match bmi {
            Some(_) => settle(id, "BMI category", record.bmi_category(), &mut skipped),
            None => None,
        };
        let blood_pressure_category = settle(
            id,
            "blood pressure category",
            record.blood_pressure_category(),
            &mut skipped,
        );
        let waist_to_height_ratio = settle(id, "ratio", record.waist_to_height_ratio(), &mut skipped);
        let waist_to_height_category = match waist_to_height_ratio {
            Some(_) => settle(
                id,
                "ratio category",
                record.waist_to_height_category(),
                &mut skipped,
            ),
            None => None,
        };
        let vital_signs = settle(id, "vital signs", record.vital_signs_assessment(), &mut skipped)
            .unwrap_or_default();

        Self {
            patient_id: id.to_string(),
            bmi,
            bmi_category,
            systolic_bp: record.systolic_bp(),
            diastolic_bp: record.diastolic_bp(),
            blood_pressure_category,
            waist_to_height_ratio,
            waist_to_height_category,
            vital_signs,
            warnings: record.warnings().iter().map(ToString::to_string).collect(),
            skipped,
        }
    }

    /// Whether every metric was computed.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

fn settle<T>(
    patient_id: &str,
    metric: &str,
    result: MetricResult<T>,
    skipped: &mut Vec<String>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            skipped.push(skip_message(patient_id, metric, &e));
            None
        }
    }
}

/// Message for a metric that could not be computed, e.g.
/// `Patient 1001: waist measurement missing, ratio skipped`.
pub fn skip_message(patient_id: &str, metric: &str, error: &MetricError) -> String {
    let reason = match error {
        MetricError::MissingField { field, .. } => {
            format!("{} missing, {} skipped", describe_field(field), metric)
        }
        MetricError::OutOfDomain { field, value, .. } => format!(
            "{} value {} out of range, {} skipped",
            describe_field(field),
            value,
            metric
        ),
        MetricError::Reference(ReferenceError::OutOfDomain { domain, value }) => format!(
            "{} value {} out of range, {} skipped",
            describe_field(domain.as_str()),
            value,
            metric
        ),
        MetricError::Reference(e) => format!("{} skipped: {}", metric, e),
    };
    format!("Patient {}: {}", patient_id, reason)
}

fn describe_field(field: &str) -> &str {
    match field {
        "bmi" => "BMI",
        "height_cm" => "height",
        "weight_kg" => "weight",
        "waist_cm" => "waist measurement",
        "systolic_bp" => "systolic blood pressure",
        "diastolic_bp" => "diastolic blood pressure",
        "heart_rate" => "heart rate",
        "respiratory_rate" => "respiratory rate",
        "waist_to_height" => "waist-to-height ratio",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetricRow;

    fn record(row: MetricRow) -> MetricRecord {
        MetricRecord::from_row(row).unwrap()
    }

    #[test]
    fn test_complete_summary() {
        let r = record(
            MetricRow::new("1001", 170.0, 65.0)
                .with_waist(75.0)
                .with_blood_pressure(118, 76)
                .with_vital(VitalSign::HeartRate, 72.0),
        );
        let summary = PatientSummary::from_record(&r);

        assert_eq!(summary.bmi, Some(22.5));
        assert_eq!(summary.bmi_category, Some(BmiCategory::NormalWeight));
        assert_eq!(summary.blood_pressure_category, Some(BloodPressureCategory::Normal));
        assert_eq!(summary.waist_to_height_ratio, Some(0.44));
        assert_eq!(summary.waist_to_height_category, Some(WaistToHeightCategory::LowRisk));
        assert_eq!(summary.vital_signs[&VitalSign::HeartRate], VitalSignLevel::Normal);
        assert!(summary.is_complete());
    }

    #[test]
    fn test_missing_waist_is_skipped_not_guessed() {
        let r = record(MetricRow::new("1001", 170.0, 65.0).with_blood_pressure(118, 76));
        let summary = PatientSummary::from_record(&r);

        assert_eq!(summary.waist_to_height_ratio, None);
        assert_eq!(summary.waist_to_height_category, None);
        assert_eq!(
            summary.skipped,
            vec!["Patient 1001: waist measurement missing, ratio skipped"]
        );
        // Other metrics unaffected
        assert_eq!(summary.bmi_category, Some(BmiCategory::NormalWeight));
    }

    #[test]
    fn test_missing_blood_pressure_is_skipped() {
        let r = record(MetricRow::new("1002", 170.0, 65.0).with_waist(75.0));
        let summary = PatientSummary::from_record(&r);

        assert_eq!(summary.blood_pressure_category, None);
        assert_eq!(
            summary.skipped,
            vec!["Patient 1002: systolic blood pressure missing, blood pressure category skipped"]
        );
    }

    #[test]
    fn test_warnings_rendered() {
        let r = record(MetricRow::new("1003", 170.0, 65.0).with_blood_pressure(70, 90));
        let summary = PatientSummary::from_record(&r);

        assert_eq!(summary.warnings, vec!["systolic 70 is not above diastolic 90"]);
    }

    #[test]
    fn test_overflowing_bmi_is_skipped() {
        let r = record(MetricRow::new("1004", 1e-160, 70.0));
        let summary = PatientSummary::from_record(&r);

        assert_eq!(summary.bmi, None);
        assert_eq!(summary.bmi_category, None);
        assert_eq!(summary.skipped.len(), 3);
        assert_eq!(
            summary.skipped[0],
            "Patient 1004: BMI value inf out of range, BMI skipped"
        );
    }

    #[test]
    fn test_skip_message_out_of_domain() {
        let error = MetricError::Reference(ReferenceError::OutOfDomain {
            domain: crate::reference::Domain::Temperature,
            value: -1.0,
        });
        assert_eq!(
            skip_message("7", "vital signs", &error),
            "Patient 7: temperature value -1 out of range, vital signs skipped"
        );
    }
}
