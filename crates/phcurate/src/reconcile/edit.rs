//! Editable fields, one closed set per granularity.

use serde::{Deserialize, Serialize};

use crate::dataset::Classification;
use crate::error::{Granularity, ValidationError};

/// An edit to a single measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum MeasurementEdit {
    /// Rename the measurement; may split or merge groups.
    Label(String),
    /// Include or exclude the reading from its sample's statistics.
    Good(bool),
}

impl MeasurementEdit {
    /// Field names accepted by [`MeasurementEdit::parse`].
    pub const FIELDS: &'static [&'static str] = &["label", "good"];

    /// Build an edit from a field name and a textual value.
    pub fn parse(field: &str, value: &str) -> Result<Self, ValidationError> {
        match normalize(field).as_str() {
            "label" | "sample_name" => Ok(MeasurementEdit::Label(value.trim().to_string())),
            "good" | "ph_good" => Ok(MeasurementEdit::Good(parse_bool("good", value)?)),
            _ => Err(ValidationError::UnknownField {
                granularity: Granularity::Measurement,
                field: field.to_string(),
            }),
        }
    }

    /// Canonical field name.
    pub fn field(&self) -> &'static str {
        match self {
            MeasurementEdit::Label(_) => "label",
            MeasurementEdit::Good(_) => "good",
        }
    }

    /// Whether applying this edit needs a full regroup.
    pub fn triggers_regroup(&self) -> bool {
        matches!(self, MeasurementEdit::Label(_))
    }
}

/// An edit applied to every measurement of one sample group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum SampleEdit {
    /// Practical salinity; pH is recomputed.
    Salinity(f64),
    /// Analysis temperature in °C; pH is recomputed.
    Temperature(f64),
    /// Reference or ordinary sample.
    Classification(Classification),
    /// Whether an extra indicator shot was added.
    ExtraIndicator(bool),
    /// Rename the group; may merge it with a neighbour.
    Label(String),
}

impl SampleEdit {
    /// Field names accepted by [`SampleEdit::parse`].
    pub const FIELDS: &'static [&'static str] = &[
        "salinity",
        "temperature",
        "classification",
        "extra_indicator",
        "label",
    ];

    /// Build an edit from a field name and a textual value.
    pub fn parse(field: &str, value: &str) -> Result<Self, ValidationError> {
        let edit = match normalize(field).as_str() {
            "salinity" => SampleEdit::Salinity(parse_number("salinity", value)?),
            "temperature" => SampleEdit::Temperature(parse_number("temperature", value)?),
            "classification" | "type" => {
                SampleEdit::Classification(parse_classification(value)?)
            }
            "is_tris" | "is_reference" => SampleEdit::Classification(
                if parse_bool("classification", value)? {
                    Classification::Reference
                } else {
                    Classification::Ordinary
                },
            ),
            "extra_indicator" | "extra_mcp" => {
                SampleEdit::ExtraIndicator(parse_bool("extra_indicator", value)?)
            }
            "label" | "sample_name" => SampleEdit::Label(value.trim().to_string()),
            _ => {
                return Err(ValidationError::UnknownField {
                    granularity: Granularity::Sample,
                    field: field.to_string(),
                });
            }
        };
        edit.validate()?;
        Ok(edit)
    }

    /// Check values that a typed constructor could still get wrong.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            SampleEdit::Salinity(v) | SampleEdit::Temperature(v) if !v.is_finite() => {
                Err(ValidationError::InvalidValue {
                    field: self.field().to_string(),
                    value: v.to_string(),
                    expected: "a finite number",
                })
            }
            _ => Ok(()),
        }
    }

    /// Canonical field name.
    pub fn field(&self) -> &'static str {
        match self {
            SampleEdit::Salinity(_) => "salinity",
            SampleEdit::Temperature(_) => "temperature",
            SampleEdit::Classification(_) => "classification",
            SampleEdit::ExtraIndicator(_) => "extra_indicator",
            SampleEdit::Label(_) => "label",
        }
    }

    /// Whether applying this edit needs a full regroup.
    pub fn triggers_regroup(&self) -> bool {
        matches!(self, SampleEdit::Label(_))
    }

    /// Whether member pH values depend on this field.
    pub fn affects_ph(&self) -> bool {
        matches!(self, SampleEdit::Salinity(_) | SampleEdit::Temperature(_))
    }
}

fn normalize(field: &str) -> String {
    field.trim().to_lowercase().replace('-', "_")
}

fn parse_number(field: &str, value: &str) -> Result<f64, ValidationError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            expected: "a finite number",
        })
}

fn parse_bool(field: &str, value: &str) -> Result<bool, ValidationError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "t" | "y" => Ok(true),
        "false" | "no" | "0" | "f" | "n" => Ok(false),
        _ => Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            expected: "a boolean (true/false)",
        }),
    }
}

fn parse_classification(value: &str) -> Result<Classification, ValidationError> {
    match value.trim().to_lowercase().as_str() {
        "reference" | "ref" | "tris" => Ok(Classification::Reference),
        "ordinary" | "sample" | "" => Ok(Classification::Ordinary),
        _ => Err(ValidationError::InvalidValue {
            field: "classification".to_string(),
            value: value.to_string(),
            expected: "reference or ordinary",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_measurement_edits() {
        assert_eq!(
            MeasurementEdit::parse("good", "no").unwrap(),
            MeasurementEdit::Good(false)
        );
        assert_eq!(
            MeasurementEdit::parse("Sample-Name", " CTD2 ").unwrap(),
            MeasurementEdit::Label("CTD2".to_string())
        );
    }

    #[test]
    fn test_sample_field_rejected_per_measurement() {
        let err = MeasurementEdit::parse("salinity", "35").unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownField {
                granularity: Granularity::Measurement,
                field: "salinity".to_string(),
            }
        );
    }

    #[test]
    fn test_measurement_field_rejected_per_sample() {
        let err = SampleEdit::parse("good", "true").unwrap_err();
        assert!(matches!(err, ValidationError::UnknownField { .. }));
    }

    #[test]
    fn test_parse_sample_edits() {
        assert_eq!(
            SampleEdit::parse("salinity", "35.2").unwrap(),
            SampleEdit::Salinity(35.2)
        );
        assert_eq!(
            SampleEdit::parse("is_tris", "true").unwrap(),
            SampleEdit::Classification(Classification::Reference)
        );
        assert_eq!(
            SampleEdit::parse("classification", "ordinary").unwrap(),
            SampleEdit::Classification(Classification::Ordinary)
        );
        assert_eq!(
            SampleEdit::parse("extra_mcp", "1").unwrap(),
            SampleEdit::ExtraIndicator(true)
        );
    }

    #[test]
    fn test_non_numeric_rejected() {
        let err = SampleEdit::parse("temperature", "warm").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { .. }));
        assert!(SampleEdit::parse("temperature", "NaN").is_err());
        assert!(SampleEdit::Salinity(f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_regroup_triggers() {
        assert!(MeasurementEdit::Label("x".into()).triggers_regroup());
        assert!(!MeasurementEdit::Good(true).triggers_regroup());
        assert!(SampleEdit::Label("x".into()).triggers_regroup());
        assert!(SampleEdit::Temperature(20.0).affects_ph());
        assert!(!SampleEdit::ExtraIndicator(true).affects_ph());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(SampleEdit::Temperature(21.5)).unwrap();
        assert_eq!(json, serde_json::json!({"field": "temperature", "value": 21.5}));
    }
}
