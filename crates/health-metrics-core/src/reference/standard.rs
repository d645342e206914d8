//! Published adult reference ranges.

use super::table::{RangeTable, UpperBound::*};
use super::BloodPressureCategory::{self, *};
use super::{BmiCategory, Domain, ReferenceTables, VitalSignLevel, WaistToHeightCategory};

pub(super) fn bmi() -> RangeTable<BmiCategory> {
    RangeTable::new_unchecked(
        Domain::Bmi,
        [
            (Below(18.5), BmiCategory::Underweight),
            (Below(25.0), BmiCategory::NormalWeight),
            (Below(30.0), BmiCategory::Overweight),
            (Open, BmiCategory::Obese),
        ],
    )
}

// Crisis is "> 180" on whole-mmHg readings, so stage 2 runs through 180.
pub(super) fn systolic() -> RangeTable<BloodPressureCategory> {
    RangeTable::new_unchecked(
        Domain::SystolicBp,
        [
            (Below(120.0), Normal),
            (Below(130.0), Elevated),
            (Below(140.0), HypertensionStage1),
            (Through(180.0), HypertensionStage2),
            (Open, HypertensiveCrisis),
        ],
    )
}

// Diastolic has no elevated band.
pub(super) fn diastolic() -> RangeTable<BloodPressureCategory> {
    RangeTable::new_unchecked(
        Domain::DiastolicBp,
        [
            (Below(80.0), Normal),
            (Below(90.0), HypertensionStage1),
            (Through(120.0), HypertensionStage2),
            (Open, HypertensiveCrisis),
        ],
    )
}

pub(super) fn waist_to_height() -> RangeTable<WaistToHeightCategory> {
    RangeTable::new_unchecked(
        Domain::WaistToHeight,
        [
            (Below(0.4), WaistToHeightCategory::LowRisk),
            (Below(0.5), WaistToHeightCategory::LowRisk),
            (Below(0.6), WaistToHeightCategory::IncreasedRisk),
            (Open, WaistToHeightCategory::HighRisk),
        ],
    )
}

pub(super) fn heart_rate() -> RangeTable<VitalSignLevel> {
    RangeTable::new_unchecked(
        Domain::HeartRate,
        [
            (Below(60.0), VitalSignLevel::Low),
            (Through(100.0), VitalSignLevel::Normal),
            (Open, VitalSignLevel::High),
        ],
    )
}

pub(super) fn respiratory_rate() -> RangeTable<VitalSignLevel> {
    RangeTable::new_unchecked(
        Domain::RespiratoryRate,
        [
            (Below(12.0), VitalSignLevel::Low),
            (Through(20.0), VitalSignLevel::Normal),
            (Open, VitalSignLevel::High),
        ],
    )
}

pub(super) fn temperature() -> RangeTable<VitalSignLevel> {
    RangeTable::new_unchecked(
        Domain::Temperature,
        [
            (Below(36.1), VitalSignLevel::Low),
            (Through(37.2), VitalSignLevel::Normal),
            (Open, VitalSignLevel::High),
        ],
    )
}

pub(super) fn tables() -> ReferenceTables {
    ReferenceTables {
        bmi: bmi(),
        systolic: systolic(),
        diastolic: diastolic(),
        waist_to_height: waist_to_height(),
        heart_rate: heart_rate(),
        respiratory_rate: respiratory_rate(),
        temperature: temperature(),
    }
}
