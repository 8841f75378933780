// THEORY:
// The `calibration` module converts a user-adjusted reference shape into the
// mm-per-pixel scale that grounds every physical measurement. The reference
// is an object of known real size visible in the same frame: either a circle
// (petri dish, round ruler) or a two-point segment. The circle/segment split
// is a sum type consumed by one scale computation, not a class hierarchy.
//
// A reference collapsed to zero pixel extent resolves its raw ratio to 0.0
// rather than panicking; the typed `CalibrationScale` refuses to exist for
// non-positive or non-finite ratios, so area math can never silently run
// with a zero scale and report a zero area.

use crate::error::{DetectionError, Result};
use serde::{Deserialize, Serialize};

/// Real diameter of the petri dish preset, in millimeters.
pub const PETRI_DISH_DIAMETER_MM: f64 = 150.0;

/// Real diameter of the round ruler preset, in millimeters.
pub const RULER_DIAMETER_MM: f64 = 50.0;

/// A known-size calibration object as placed by the user, in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ReferenceShape {
    Circle {
        center: (f64, f64),
        radius_px: f64,
        real_diameter_mm: f64,
    },
    Segment {
        start: (f64, f64),
        end: (f64, f64),
        real_length_mm: f64,
    },
}

impl ReferenceShape {
    /// Circle preset for a standard 150 mm petri dish.
    pub fn petri_dish(center: (f64, f64), radius_px: f64) -> Self {
        ReferenceShape::Circle {
            center,
            radius_px,
            real_diameter_mm: PETRI_DISH_DIAMETER_MM,
        }
    }

    /// Circle preset for a 50 mm round ruler.
    pub fn ruler(center: (f64, f64), radius_px: f64) -> Self {
        ReferenceShape::Circle {
            center,
            radius_px,
            real_diameter_mm: RULER_DIAMETER_MM,
        }
    }

    /// Raw millimeters-per-pixel ratio. Zero pixel extent yields 0.0; callers
    /// wanting a guaranteed-usable scale go through `CalibrationScale`.
    pub fn mm_per_px(&self) -> f64 {
        match *self {
            ReferenceShape::Circle {
                radius_px,
                real_diameter_mm,
                ..
            } => {
                if radius_px <= 0.0 {
                    0.0
                } else {
                    real_diameter_mm / (2.0 * radius_px)
                }
            }
            ReferenceShape::Segment {
                start,
                end,
                real_length_mm,
            } => {
                let length_px = (end.0 - start.0).hypot(end.1 - start.1);
                if length_px <= 0.0 {
                    0.0
                } else {
                    real_length_mm / length_px
                }
            }
        }
    }
}

/// A validated, strictly positive and finite mm-per-pixel scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationScale(f64);

impl CalibrationScale {
    pub fn try_new(mm_per_px: f64) -> Result<Self> {
        if !mm_per_px.is_finite() || mm_per_px <= 0.0 {
            return Err(DetectionError::DegenerateScale(mm_per_px));
        }
        Ok(Self(mm_per_px))
    }

    pub fn from_shape(shape: &ReferenceShape) -> Result<Self> {
        Self::try_new(shape.mm_per_px())
    }

    pub fn mm_per_px(&self) -> f64 {
        self.0
    }
}
