//! Chemistry collaborator: pH from indicator absorbances and the expected pH
//! of reference buffers.
//!
//! The engine never does chemistry itself. It hands covariates and
//! absorbances to a [`Chemistry`] implementation and stores what comes back.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::input::Absorbance;

/// Linear correction applied to the absorbance ratio for indicator impurities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DyeCorrection {
    /// Intercept of the ratio correction.
    pub intercept: f64,
    /// Slope of the ratio correction.
    pub slope: f64,
}

impl DyeCorrection {
    pub fn new(intercept: f64, slope: f64) -> Self {
        Self { intercept, slope }
    }

    /// Apply the correction to an absorbance ratio.
    pub fn apply(&self, ratio: f64) -> f64 {
        ratio - (self.intercept + self.slope * ratio)
    }
}

/// Pure numeric functions the engine consumes.
pub trait Chemistry: Debug + Send + Sync {
    /// pH of one reading. `temperature` is in °C.
    fn ph_from_absorbance(
        &self,
        absorbance: &Absorbance,
        temperature: f64,
        salinity: f64,
        dye: DyeCorrection,
    ) -> f64;

    /// Expected pH of a reference buffer at the given conditions.
    fn expected_reference_ph(&self, temperature: f64, salinity: f64) -> f64;
}

/// m-cresol purple indicator with tris-in-seawater reference buffers.
#[derive(Debug, Clone, Copy, Default)]
pub struct MCresolPurple;

// Molar absorptivity ratios of m-cresol purple.
const E1: f64 = 0.00691;
const E2: f64 = 2.2220;
const E3: f64 = 0.1331;

const KELVIN: f64 = 273.15;

impl Chemistry for MCresolPurple {
    fn ph_from_absorbance(
        &self,
        absorbance: &Absorbance,
        temperature: f64,
        salinity: f64,
        dye: DyeCorrection,
    ) -> f64 {
        let t = temperature + KELVIN;
        let base = absorbance.a578 - absorbance.a730;
        let acid = absorbance.a434 - absorbance.a730;
        let ratio = dye.apply(base / acid);
        let pk2 = 1245.69 / t + 3.8275 + 0.00211 * (35.0 - salinity);
        pk2 + ((ratio - E1) / (E2 - ratio * E3)).log10()
    }

    fn expected_reference_ph(&self, temperature: f64, salinity: f64) -> f64 {
        let t = temperature + KELVIN;
        let s = salinity;
        (11911.08 - 18.2499 * s - 0.039336 * s * s) / t
            + (-366.27059 + 0.53993607 * s + 0.00016329 * s * s)
            + (64.52243 - 0.084041 * s) * t.ln()
            - 0.11149858 * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tris_reference_at_standard_conditions() {
        let ph = MCresolPurple.expected_reference_ph(25.0, 35.0);
        assert!((ph - 8.093).abs() < 0.005, "got {ph}");
    }

    #[test]
    fn test_ph_increases_with_ratio() {
        let low = Absorbance::new(0.40, 0.50, 0.0);
        let high = Absorbance::new(0.80, 0.50, 0.0);
        let chem = MCresolPurple;
        let dye = DyeCorrection::default();
        assert!(
            chem.ph_from_absorbance(&high, 25.0, 35.0, dye)
                > chem.ph_from_absorbance(&low, 25.0, 35.0, dye)
        );
    }

    #[test]
    fn test_baseline_is_subtracted() {
        let chem = MCresolPurple;
        let dye = DyeCorrection::default();
        let clean = chem.ph_from_absorbance(&Absorbance::new(0.5, 0.5, 0.0), 25.0, 35.0, dye);
        let shifted = chem.ph_from_absorbance(&Absorbance::new(0.6, 0.6, 0.1), 25.0, 35.0, dye);
        assert!((clean - shifted).abs() < 1e-12);
    }

    #[test]
    fn test_dye_correction_of_ratio() {
        let dye = DyeCorrection::new(0.01, 0.1);
        assert!((dye.apply(1.0) - 0.89).abs() < 1e-12);
        assert_eq!(DyeCorrection::default().apply(1.25), 1.25);
    }

    #[test]
    fn test_unphysical_ratio_is_not_finite() {
        let ph = MCresolPurple.ph_from_absorbance(
            &Absorbance::new(0.0, 0.5, 0.0),
            25.0,
            35.0,
            DyeCorrection::default(),
        );
        assert!(!ph.is_finite());
    }
}
