// THEORY:
// The `concentration` module inverts the empirical growth model that links a
// reagent concentration to how much the reactive spot grows relative to the
// unreacted film:
//
//     AreaIncrease(%) = a(C) * T^2 + b(C) * T + c(C)
//
// where C is the concentration in percent, T the film thickness in mm, and
// a, b, c are each affine in ln(C). Because the whole right-hand side is
// affine in ln(C), inversion is closed-form:
//
//     ln(C) = (AreaIncrease - (a0 T^2 + b0 T + c0)) / (a1 T^2 + b1 T + c1)
//
// with x1 the ln-coefficient and x0 the constant of each term.
//
// The coefficient table is calibrated for one reagent (CuSO4) at a nominal
// 1.0 mm film and is treated as external configuration data, not hardcoded
// behavior: the defaults ship in code, but a table can be loaded from JSON.
// Results computed at a thickness outside 0.5..=2.0 mm are flagged
// low-confidence.

use crate::core_modules::geometry;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

/// Film thickness in mm. Constant for this model generation, not
/// user-configurable.
pub const FILM_THICKNESS_MM: f64 = 1.0;

/// Thickness band the coefficient table was calibrated around. Results
/// outside it are marked low-confidence.
pub const THICKNESS_CONFIDENCE_MM: RangeInclusive<f64> = 0.5..=2.0;

/// Concentrations above this are considered detected, in percent.
pub const DETECTION_FLOOR_PERCENT: f64 = 0.001;

/// Denominator magnitudes below this are treated as degenerate.
const DENOMINATOR_EPSILON: f64 = 1e-10;

/// Concentration results render below this as plain "0".
const DISPLAY_FLOOR_PERCENT: f64 = 0.0001;

/// One model term, affine in ln(C): term(C) = ln_coeff * ln(C) + constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineInLnC {
    pub ln_coeff: f64,
    pub constant: f64,
}

/// The a/b/c coefficient table of the growth model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelCoefficients {
    pub a: AffineInLnC,
    pub b: AffineInLnC,
    pub c: AffineInLnC,
}

impl Default for ModelCoefficients {
    fn default() -> Self {
        Self::cuso4()
    }
}

impl ModelCoefficients {
    /// The CuSO4 calibration:
    /// a(C) = 35190 ln(C) - 96479, b(C) = 2037.8 ln(C) + 5645.6,
    /// c(C) = -31.43 ln(C) - 86.72.
    pub fn cuso4() -> Self {
        Self {
            a: AffineInLnC {
                ln_coeff: 35190.0,
                constant: -96479.0,
            },
            b: AffineInLnC {
                ln_coeff: 2037.8,
                constant: 5645.6,
            },
            c: AffineInLnC {
                ln_coeff: -31.43,
                constant: -86.72,
            },
        }
    }

    /// Loads a coefficient table from a JSON file, for reagents calibrated
    /// after this build shipped.
    pub fn from_json_file(
        path: &Path,
    ) -> std::result::Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Forward model: the area increase a given concentration produces.
    pub fn area_increase_percent(&self, concentration_percent: f64, thickness_mm: f64) -> f64 {
        let ln_c = concentration_percent.ln();
        let t = thickness_mm;
        (self.a.ln_coeff * ln_c + self.a.constant) * t * t
            + (self.b.ln_coeff * ln_c + self.b.constant) * t
            + (self.c.ln_coeff * ln_c + self.c.constant)
    }
}

/// Inverts the growth model in closed form.
///
/// Clamps per the model contract: a degenerate denominator, a non-finite or
/// non-positive result all yield 0; anything above 100 yields 100.
pub fn solve_concentration(
    area_increase_percent: f64,
    thickness_mm: f64,
    coefficients: &ModelCoefficients,
) -> f64 {
    let t = thickness_mm;
    let constant_sum =
        coefficients.a.constant * t * t + coefficients.b.constant * t + coefficients.c.constant;
    let denominator =
        coefficients.a.ln_coeff * t * t + coefficients.b.ln_coeff * t + coefficients.c.ln_coeff;

    if denominator.abs() < DENOMINATOR_EPSILON {
        return 0.0;
    }

    let ln_c = (area_increase_percent - constant_sum) / denominator;
    let concentration = ln_c.exp();

    if !concentration.is_finite() || concentration <= 0.0 {
        0.0
    } else if concentration > 100.0 {
        100.0
    } else {
        concentration
    }
}

/// Immutable snapshot of one completed measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// Reaction area, mm^2.
    pub red_area_mm2: f64,
    /// Area of the unreacted film, mm^2.
    pub film_area_mm2: f64,
    /// Reaction area as a percentage of the film area.
    pub area_increase_percent: f64,
    /// Estimated reagent concentration, percent, in [0, 100].
    pub concentration_percent: f64,
    /// Whether the estimate clears the detection floor.
    pub is_detected: bool,
    /// Set when the film thickness sat outside the calibrated band.
    pub low_confidence: bool,
    /// Status line for the consuming screen.
    pub message: String,
}

impl AnalysisResult {
    pub fn formatted_area(&self) -> String {
        format!("{:.2}", self.red_area_mm2)
    }

    pub fn formatted_area_increase(&self) -> String {
        format!("{:.2}", self.area_increase_percent)
    }

    /// Concentration at 4-decimal precision, shown as "0" below 0.0001.
    pub fn formatted_concentration(&self) -> String {
        if self.concentration_percent < DISPLAY_FLOOR_PERCENT {
            "0".to_string()
        } else {
            format!("{:.4}", self.concentration_percent)
        }
    }
}

/// Runs the full measurement for a reaction area against a film.
pub fn analyze(
    red_area_mm2: f64,
    film_diameter_mm: f64,
    thickness_mm: f64,
    coefficients: &ModelCoefficients,
) -> AnalysisResult {
    let film_area_mm2 = geometry::film_area_mm2(film_diameter_mm);
    let area_increase_percent = geometry::area_increase_percent(red_area_mm2, film_area_mm2);
    let concentration_percent =
        solve_concentration(area_increase_percent, thickness_mm, coefficients);
    let is_detected = concentration_percent > DETECTION_FLOOR_PERCENT;
    let low_confidence = !THICKNESS_CONFIDENCE_MM.contains(&thickness_mm);

    log::debug!(
        "area {red_area_mm2:.2} mm^2 over film {film_area_mm2:.2} mm^2 \
         (+{area_increase_percent:.2}%) -> {concentration_percent:.4}%"
    );

    let message = if is_detected {
        format!("Reagent detected: {:.4}%", concentration_percent)
    } else {
        "Not detected".to_string()
    };

    AnalysisResult {
        red_area_mm2,
        film_area_mm2,
        area_increase_percent,
        concentration_percent,
        is_detected,
        low_confidence,
        message,
    }
}
