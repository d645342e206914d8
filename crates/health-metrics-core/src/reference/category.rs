//! Category labels assigned by the reference tables.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Body Mass Index category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    NormalWeight,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn label(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::NormalWeight => "Normal weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

/// Blood pressure category, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BloodPressureCategory {
    /// Systolic < 120 and diastolic < 80
    Normal,
    /// Systolic 120-129 and diastolic < 80
    Elevated,
    /// Systolic 130-139 or diastolic 80-89
    HypertensionStage1,
    /// Systolic >= 140 or diastolic >= 90
    HypertensionStage2,
    /// Systolic > 180 or diastolic > 120
    HypertensiveCrisis,
}

impl BloodPressureCategory {
    pub fn label(self) -> &'static str {
        match self {
            BloodPressureCategory::Normal => "Normal",
            BloodPressureCategory::Elevated => "Elevated",
            BloodPressureCategory::HypertensionStage1 => "Hypertension Stage 1",
            BloodPressureCategory::HypertensionStage2 => "Hypertension Stage 2",
            BloodPressureCategory::HypertensiveCrisis => "Hypertensive Crisis",
        }
    }
}

/// Waist-to-height ratio risk category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaistToHeightCategory {
    LowRisk,
    IncreasedRisk,
    HighRisk,
}

impl WaistToHeightCategory {
    pub fn label(self) -> &'static str {
        match self {
            WaistToHeightCategory::LowRisk => "Low Risk",
            WaistToHeightCategory::IncreasedRisk => "Increased Risk",
            WaistToHeightCategory::HighRisk => "High Risk",
        }
    }
}

/// Vital sign measured at rest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum VitalSign {
    /// Beats per minute
    HeartRate,
    /// Breaths per minute
    RespiratoryRate,
    /// Degrees Celsius
    Temperature,
}

impl VitalSign {
    pub const ALL: [VitalSign; 3] = [
        VitalSign::HeartRate,
        VitalSign::RespiratoryRate,
        VitalSign::Temperature,
    ];

    /// Field name used in rows and reports.
    pub fn name(self) -> &'static str {
        match self {
            VitalSign::HeartRate => "heart_rate",
            VitalSign::RespiratoryRate => "respiratory_rate",
            VitalSign::Temperature => "temperature",
        }
    }
}

/// Assessment of a single vital sign against adult resting ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalSignLevel {
    Low,
    Normal,
    High,
}

impl VitalSignLevel {
    pub fn label(self) -> &'static str {
        match self {
            VitalSignLevel::Low => "Low",
            VitalSignLevel::Normal => "Normal",
            VitalSignLevel::High => "High",
        }
    }
}

macro_rules! display_label {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }
        )*
    };
}

display_label!(
    BmiCategory,
    BloodPressureCategory,
    WaistToHeightCategory,
    VitalSignLevel
);

impl fmt::Display for VitalSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bp_severity_order() {
        assert!(BloodPressureCategory::Normal < BloodPressureCategory::Elevated);
        assert!(BloodPressureCategory::Elevated < BloodPressureCategory::HypertensionStage1);
        assert!(
            BloodPressureCategory::HypertensionStage2 < BloodPressureCategory::HypertensiveCrisis
        );
    }

    #[test]
    fn test_display_uses_label() {
        assert_eq!(BmiCategory::NormalWeight.to_string(), "Normal weight");
        assert_eq!(
            BloodPressureCategory::HypertensionStage1.to_string(),
            "Hypertension Stage 1"
        );
        assert_eq!(WaistToHeightCategory::IncreasedRisk.to_string(), "Increased Risk");
        assert_eq!(VitalSign::RespiratoryRate.to_string(), "respiratory_rate");
    }
}
