//! Measurement rows.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::input::{Absorbance, RawRecord};

/// Kind of sample a measurement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// A reference buffer with a known expected pH.
    Reference,
    /// An ordinary sample.
    #[default]
    Ordinary,
}

impl Classification {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Reference => "reference",
            Classification::Ordinary => "ordinary",
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Classification::Reference)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One instrument reading.
///
/// `order`, `absorbance` and `instrument_ph` never change after ingestion.
/// `ph` and `group_id` are derived and only written by the reconciler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Position in the instrument file, starting at 1.
    pub order: u32,
    /// Sample label; consecutive equal labels form a group.
    pub label: String,
    /// Practical salinity.
    pub salinity: f64,
    /// Analysis temperature in °C.
    pub temperature: f64,
    /// Measured absorbances.
    pub absorbance: Absorbance,
    /// pH reported by the instrument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument_ph: Option<f64>,
    /// pH computed from absorbances and covariates; `None` when not finite.
    pub ph: Option<f64>,
    /// Whether this reading counts toward its sample's pH statistics.
    pub good: bool,
    /// Run index of the sample group.
    pub group_id: u32,
    /// Sample kind.
    pub classification: Classification,
    /// Whether an extra indicator shot was added.
    pub extra_indicator: bool,
}

impl Measurement {
    /// Create an ungrouped measurement from a raw record.
    pub fn from_record(order: u32, record: RawRecord) -> Self {
        Self {
            order,
            label: record.label,
            salinity: record.salinity,
            temperature: record.temperature,
            absorbance: record.absorbance,
            instrument_ph: record.instrument_ph,
            ph: None,
            good: true,
            group_id: 0,
            classification: Classification::Ordinary,
            extra_indicator: false,
        }
    }

    /// pH if this reading is flagged good and has a defined value.
    pub fn good_ph(&self) -> Option<f64> {
        if self.good { self.ph } else { None }
    }
}
