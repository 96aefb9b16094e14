//! Engine configuration.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::chemistry::DyeCorrection;
use crate::dataset::Classification;
use crate::error::{Result, ValidationError};
use crate::rangefinder::RangefinderConfig;

/// Labels of tris buffer reference runs.
pub const DEFAULT_REFERENCE_PATTERN: &str = r"(?i)^(tris|nt)";

/// Labels of runs that received an extra indicator shot.
pub const DEFAULT_INDICATOR_PATTERN: &str = r"-\+20$";

static DEFAULT_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(DEFAULT_REFERENCE_PATTERN).expect("default reference pattern is valid")
});

static DEFAULT_INDICATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(DEFAULT_INDICATOR_PATTERN).expect("default indicator pattern is valid")
});

/// Label patterns used to classify measurements at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Labels matching this are reference samples.
    pub reference_pattern: String,
    /// Labels matching this carry the extra-indicator flag.
    pub indicator_pattern: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            reference_pattern: DEFAULT_REFERENCE_PATTERN.to_string(),
            indicator_pattern: DEFAULT_INDICATOR_PATTERN.to_string(),
        }
    }
}

impl ClassifierConfig {
    /// Compile the patterns.
    pub fn compile(&self) -> Result<LabelClassifier> {
        let reference = if self.reference_pattern == DEFAULT_REFERENCE_PATTERN {
            DEFAULT_REFERENCE.clone()
        } else {
            Regex::new(&self.reference_pattern)?
        };
        let indicator = if self.indicator_pattern == DEFAULT_INDICATOR_PATTERN {
            DEFAULT_INDICATOR.clone()
        } else {
            Regex::new(&self.indicator_pattern)?
        };
        Ok(LabelClassifier {
            reference,
            indicator,
        })
    }
}

/// Compiled label classifier.
#[derive(Debug, Clone)]
pub struct LabelClassifier {
    reference: Regex,
    indicator: Regex,
}

impl LabelClassifier {
    pub fn classification(&self, label: &str) -> Classification {
        if self.reference.is_match(label) {
            Classification::Reference
        } else {
            Classification::Ordinary
        }
    }

    pub fn extra_indicator(&self, label: &str) -> bool {
        self.indicator.is_match(label)
    }
}

/// Configuration for building and recomputing a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Dye correction scalars passed to the chemistry collaborator.
    pub dye: DyeCorrection,
    /// Replace each sample's salinity and temperature by the sample median at ingestion.
    pub uniform_covariates: bool,
    /// Seed `good` flags with the rangefinder at ingestion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoflag: Option<RangefinderConfig>,
    /// Label classification patterns.
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dye: DyeCorrection::default(),
            uniform_covariates: true,
            autoflag: None,
            classifier: ClassifierConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dye correction.
    pub fn with_dye(mut self, intercept: f64, slope: f64) -> Self {
        self.dye = DyeCorrection::new(intercept, slope);
        self
    }

    /// Keep per-reading salinity and temperature as read.
    pub fn with_uniform_covariates(mut self, uniform: bool) -> Self {
        self.uniform_covariates = uniform;
        self
    }

    /// Seed quality flags with the rangefinder.
    pub fn with_autoflag(mut self, config: RangefinderConfig) -> Self {
        self.autoflag = Some(config);
        self
    }

    /// Use custom label patterns.
    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !self.dye.intercept.is_finite() || !self.dye.slope.is_finite() {
            return Err(ValidationError::InvalidConfig(format!(
                "dye correction must be finite, got intercept {} and slope {}",
                self.dye.intercept, self.dye.slope
            ))
            .into());
        }
        if let Some(autoflag) = &self.autoflag {
            autoflag.validate()?;
        }
        self.classifier.compile()?;
        Ok(())
    }
}
