//! CSV header mapping, field splitting and typed coercion.

use std::collections::HashMap;

use crate::models::MetricRow;
use crate::reference::VitalSign;

use super::{LoadError, LoadResult};

pub const PATIENT_ID: &str = "PatientID";
pub const HEIGHT_CM: &str = "Height_cm";
pub const WEIGHT_KG: &str = "Weight_kg";
pub const WAIST_CM: &str = "Waist_cm";
pub const SYSTOLIC_BP: &str = "Systolic_BP";
pub const DIASTOLIC_BP: &str = "Diastolic_BP";
pub const HEART_RATE: &str = "HeartRate";
pub const RESPIRATORY_RATE: &str = "RespiratoryRate";
pub const TEMPERATURE: &str = "Temperature";

/// Columns every input file must declare, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    PATIENT_ID,
    HEIGHT_CM,
    WEIGHT_KG,
    WAIST_CM,
    SYSTOLIC_BP,
    DIASTOLIC_BP,
];

/// Optional vital sign columns.
pub const VITAL_COLUMNS: [(&str, VitalSign); 3] = [
    (HEART_RATE, VitalSign::HeartRate),
    (RESPIRATORY_RATE, VitalSign::RespiratoryRate),
    (TEMPERATURE, VitalSign::Temperature),
];

/// Column positions resolved from the header row.
#[derive(Debug, Clone)]
pub(crate) struct Header {
    width: usize,
    positions: HashMap<String, usize>,
    ignored: Vec<String>,
}

impl Header {
    pub(crate) fn parse(line_number: usize, line: &str) -> LoadResult<Self> {
        let line = line.strip_prefix('\u{feff}').unwrap_or(line);
        let names = split_record(line).map_err(|reason| LoadError::MalformedRow {
            line: line_number,
            reason,
        })?;

        let mut positions = HashMap::new();
        let mut ignored = Vec::new();
        for (index, name) in names.iter().enumerate() {
            let name = name.trim();
            let known = REQUIRED_COLUMNS.contains(&name)
                || VITAL_COLUMNS.iter().any(|(column, _)| *column == name);
            if !known {
                ignored.push(name.to_string());
                continue;
            }
            if positions.insert(name.to_string(), index).is_some() {
                return Err(LoadError::DuplicateColumn(name.to_string()));
            }
        }

        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|column| !positions.contains_key(**column))
        {
            return Err(LoadError::MissingColumn(missing.to_string()));
        }

        Ok(Self {
            width: names.len(),
            positions,
            ignored,
        })
    }

    /// Header names that are not part of the schema.
    pub(crate) fn ignored(&self) -> &[String] {
        &self.ignored
    }

    pub(crate) fn has(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }

    /// Coerce one data line into a typed row.
    pub(crate) fn row(&self, line_number: usize, line: &str) -> LoadResult<MetricRow> {
        let malformed = |reason: String| LoadError::MalformedRow {
            line: line_number,
            reason,
        };

        let fields = split_record(line).map_err(malformed)?;
        if fields.len() != self.width {
            return Err(malformed(format!(
                "expected {} fields, found {}",
                self.width,
                fields.len()
            )));
        }

        let fields = Fields {
            header: self,
            fields: &fields,
        };

        let patient_id = fields
            .text(PATIENT_ID)
            .ok_or_else(|| malformed(format!("{} is required", PATIENT_ID)))?;
        let height_cm = fields
            .real(HEIGHT_CM)
            .map_err(malformed)?
            .ok_or_else(|| malformed(format!("{} is required", HEIGHT_CM)))?;
        let weight_kg = fields
            .real(WEIGHT_KG)
            .map_err(malformed)?
            .ok_or_else(|| malformed(format!("{} is required", WEIGHT_KG)))?;

        let mut row = MetricRow::new(patient_id, height_cm, weight_kg);
        row.waist_cm = fields.real(WAIST_CM).map_err(malformed)?;
        row.systolic_bp = fields.mmhg(SYSTOLIC_BP).map_err(malformed)?;
        row.diastolic_bp = fields.mmhg(DIASTOLIC_BP).map_err(malformed)?;
        for (column, sign) in VITAL_COLUMNS {
            if let Some(value) = fields.real(column).map_err(malformed)? {
                row = row.with_vital(sign, value);
            }
        }

        Ok(row)
    }
}

struct Fields<'a> {
    header: &'a Header,
    fields: &'a [String],
}

impl<'a> Fields<'a> {
    /// Trimmed field, `None` when the column is absent or the field blank.
    fn text(&self, column: &str) -> Option<&'a str> {
        let index = *self.header.positions.get(column)?;
        let value = self.fields[index].trim();
        (!value.is_empty()).then_some(value)
    }

    fn real(&self, column: &str) -> Result<Option<f64>, String> {
        let Some(text) = self.text(column) else {
            return Ok(None);
        };
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Some(value)),
            _ => Err(format!("{}: '{}' is not a finite number", column, text)),
        }
    }

    /// Whole-mmHg pressure. Accepts `120` and `120.0`.
    fn mmhg(&self, column: &str) -> Result<Option<u16>, String> {
        let Some(value) = self.real(column)? else {
            return Ok(None);
        };
        if value.fract() != 0.0 || value < 0.0 || value > f64::from(u16::MAX) {
            return Err(format!("{}: '{}' is not a whole mmHg value", column, value));
        }
        Ok(Some(value as u16))
    }
}

/// Split one CSV record. Quoted fields may contain commas and `""` escapes.
pub(crate) fn split_record(line: &str) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".into());
    }
    fields.push(field);

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "PatientID,Height_cm,Weight_kg,Waist_cm,Systolic_BP,Diastolic_BP";

    #[test]
    fn test_split_simple() {
        assert_eq!(split_record("a,b,,c").unwrap(), vec!["a", "b", "", "c"]);
    }

    #[test]
    fn test_split_quoted() {
        assert_eq!(
            split_record(r#""Smith, J",170,"say ""hi""""#).unwrap(),
            vec!["Smith, J", "170", r#"say "hi""#]
        );
    }

    #[test]
    fn test_split_unterminated_quote() {
        assert!(split_record(r#""open,170"#).is_err());
    }

    #[test]
    fn test_header_any_order() {
        let header =
            Header::parse(1, "Diastolic_BP,Systolic_BP,Waist_cm,Weight_kg,Height_cm,PatientID").unwrap();
        let row = header.row(2, "80,120,85,70,170,1001").unwrap();

        assert_eq!(row.patient_id, "1001");
        assert_eq!(row.height_cm, 170.0);
        assert_eq!(row.systolic_bp, Some(120));
        assert_eq!(row.diastolic_bp, Some(80));
    }

    #[test]
    fn test_header_missing_column() {
        let result = Header::parse(1, "PatientID,Height_cm,Weight_kg,Waist_cm,Systolic_BP");
        assert!(matches!(result, Err(LoadError::MissingColumn(c)) if c == DIASTOLIC_BP));
    }

    #[test]
    fn test_header_duplicate_column() {
        let result = Header::parse(1, &format!("{},Height_cm", HEADER));
        assert!(matches!(result, Err(LoadError::DuplicateColumn(c)) if c == HEIGHT_CM));
    }

    #[test]
    fn test_header_ignores_unknown_and_strips_bom() {
        let header = Header::parse(1, &format!("\u{feff}{},Notes", HEADER)).unwrap();
        assert_eq!(header.ignored(), &["Notes".to_string()]);
        assert!(header.has(PATIENT_ID));
        assert!(!header.has(HEART_RATE));
    }

    #[test]
    fn test_row_blank_optional_fields() {
        let header = Header::parse(1, HEADER).unwrap();
        let row = header.row(2, "1001, 170 ,65,,,").unwrap();

        assert_eq!(row.height_cm, 170.0);
        assert_eq!(row.waist_cm, None);
        assert_eq!(row.systolic_bp, None);
        assert_eq!(row.diastolic_bp, None);
    }

    #[test]
    fn test_row_with_vitals() {
        let header = Header::parse(1, &format!("{},HeartRate,RespiratoryRate,Temperature", HEADER)).unwrap();
        let row = header.row(2, "1001,170,65,80,120,80,72,,36.6").unwrap();

        assert_eq!(row.heart_rate, Some(72.0));
        assert_eq!(row.respiratory_rate, None);
        assert_eq!(row.temperature, Some(36.6));
    }

    #[test]
    fn test_row_non_numeric() {
        let header = Header::parse(1, HEADER).unwrap();
        let result = header.row(7, "1001,tall,65,80,120,80");
        assert!(matches!(
            result,
            Err(LoadError::MalformedRow { line: 7, ref reason }) if reason.contains(HEIGHT_CM)
        ));
    }

    #[test]
    fn test_row_rejects_nan() {
        let header = Header::parse(1, HEADER).unwrap();
        assert!(header.row(2, "1001,NaN,65,80,120,80").is_err());
    }

    #[test]
    fn test_row_missing_required_value() {
        let header = Header::parse(1, HEADER).unwrap();
        assert!(matches!(
            header.row(3, "1001,,65,80,120,80"),
            Err(LoadError::MalformedRow { line: 3, .. })
        ));
        assert!(matches!(
            header.row(3, ",170,65,80,120,80"),
            Err(LoadError::MalformedRow { line: 3, .. })
        ));
    }

    #[test]
    fn test_row_fractional_pressure() {
        let header = Header::parse(1, HEADER).unwrap();
        assert_eq!(header.row(2, "1001,170,65,80,120.0,80").unwrap().systolic_bp, Some(120));
        assert!(header.row(2, "1001,170,65,80,120.5,80").is_err());
    }

    #[test]
    fn test_row_wrong_field_count() {
        let header = Header::parse(1, HEADER).unwrap();
        assert!(matches!(
            header.row(4, "1001,170,65"),
            Err(LoadError::MalformedRow { line: 4, .. })
        ));
    }
}
