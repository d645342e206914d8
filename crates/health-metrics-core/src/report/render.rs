//! Text, Markdown and CSV rendering.

use crate::reference::VitalSign;

use super::{HealthReport, PatientSummary};

const CSV_HEADER: &str = "patient_id,bmi,bmi_category,systolic_bp,diastolic_bp,blood_pressure_category,waist_to_height_ratio,waist_to_height_category,heart_rate,respiratory_rate,temperature,warnings,skipped\n";

pub(super) fn text(report: &HealthReport) -> String {
    let mut out = String::new();

    out.push_str("Health Metrics Report\n");
    out.push_str(&format!("Generated: {}\n", report.generated_at));
    out.push_str(&format!("Patients: {}\n", report.patient_count));

    for patient in &report.patients {
        out.push('\n');
        out.push_str(&format!("Patient {}\n", patient.patient_id));
        out.push_str(&format!("  BMI: {}\n", bmi(patient)));
        out.push_str(&format!("  Blood pressure: {}\n", blood_pressure(patient)));
        out.push_str(&format!(
            "  Waist-to-height ratio: {}\n",
            waist_to_height(patient)
        ));
        if !patient.vital_signs.is_empty() {
            out.push_str(&format!("  Vital signs: {}\n", vital_signs(patient)));
        }
        for warning in &patient.warnings {
            out.push_str(&format!("  Warning: {}\n", warning));
        }
        for message in &patient.skipped {
            out.push_str(&format!("  Note: {}\n", message));
        }
    }

    out
}

pub(super) fn markdown(report: &HealthReport) -> String {
    let mut out = String::new();

    out.push_str("# Health Metrics Report\n\n");
    out.push_str(&format!("- Generated: {}\n", report.generated_at));
    out.push_str(&format!("- Patients: {}\n\n", report.patient_count));

    out.push_str("| Patient | BMI | Blood pressure | Waist-to-height | Vital signs |\n");
    out.push_str("|---|---|---|---|---|\n");
    for patient in &report.patients {
        let vitals = if patient.vital_signs.is_empty() {
            "-".to_string()
        } else {
            vital_signs(patient)
        };
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            escape_markdown(&patient.patient_id),
            bmi(patient),
            blood_pressure(patient),
            waist_to_height(patient),
            vitals,
        ));
    }

    let flagged: Vec<&PatientSummary> = report
        .patients
        .iter()
        .filter(|p| !p.warnings.is_empty() || !p.skipped.is_empty())
        .collect();
    if !flagged.is_empty() {
        out.push_str("\n## Notes\n\n");
        for patient in flagged {
            for warning in &patient.warnings {
                out.push_str(&format!(
                    "- Patient {}: warning: {}\n",
                    escape_markdown(&patient.patient_id),
                    warning
                ));
            }
            for message in &patient.skipped {
                out.push_str(&format!("- {}\n", escape_markdown(message)));
            }
        }
    }

    out
}

pub(super) fn csv(report: &HealthReport) -> String {
    let mut csv = String::new();

    csv.push_str(CSV_HEADER);

    for patient in &report.patients {
        let vital = |sign: VitalSign| {
            patient
                .vital_signs
                .get(&sign)
                .map(|level| level.label())
                .unwrap_or("")
        };
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
            escape_csv(&patient.patient_id),
            optional(patient.bmi.map(|v| format!("{:.1}", v))),
            optional(patient.bmi_category.map(|c| c.label().to_string())),
            optional(patient.systolic_bp.map(|v| v.to_string())),
            optional(patient.diastolic_bp.map(|v| v.to_string())),
            optional(patient.blood_pressure_category.map(|c| c.label().to_string())),
            optional(patient.waist_to_height_ratio.map(|v| format!("{:.2}", v))),
            optional(patient.waist_to_height_category.map(|c| c.label().to_string())),
            vital(VitalSign::HeartRate),
            vital(VitalSign::RespiratoryRate),
            vital(VitalSign::Temperature),
            escape_csv(&patient.warnings.join("; ")),
            escape_csv(&patient.skipped.join("; ")),
        ));
    }

    csv
}

fn bmi(patient: &PatientSummary) -> String {
    match (patient.bmi, patient.bmi_category) {
        (Some(value), Some(category)) => format!("{:.1} ({})", value, category),
        (Some(value), None) => format!("{:.1}", value),
        _ => "n/a".to_string(),
    }
}

fn blood_pressure(patient: &PatientSummary) -> String {
    let reading = match (patient.systolic_bp, patient.diastolic_bp) {
        (Some(systolic), Some(diastolic)) => format!("{}/{} mmHg", systolic, diastolic),
        _ => return "n/a".to_string(),
    };
    match patient.blood_pressure_category {
        Some(category) => format!("{} ({})", reading, category),
        None => reading,
    }
}

fn waist_to_height(patient: &PatientSummary) -> String {
    match (patient.waist_to_height_ratio, patient.waist_to_height_category) {
        (Some(value), Some(category)) => format!("{:.2} ({})", value, category),
        (Some(value), None) => format!("{:.2}", value),
        _ => "n/a".to_string(),
    }
}

fn vital_signs(patient: &PatientSummary) -> String {
    patient
        .vital_signs
        .iter()
        .map(|(sign, level)| format!("{} {}", sign, level))
        .collect::<Vec<_>>()
        .join(", ")
}

fn optional(value: Option<String>) -> String {
    value.unwrap_or_default()
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|")
}
