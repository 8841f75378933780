// Planar geometry for the measurement stage: shoelace polygon area in pixel
// space, conversion to physical area through the calibration scale, and the
// two film-relative quantities the concentration model consumes.

use crate::core_modules::calibration::CalibrationScale;
use crate::core_modules::polygon::BoundaryPolygon;

/// Default diameter of the unreacted test film, in millimeters.
pub const DEFAULT_FILM_DIAMETER_MM: f64 = 25.0;

/// Polygon area in square pixels via the shoelace formula.
/// Fewer than 3 vertices cannot enclose area and yield 0.
pub fn shoelace_area_px(points: &[(f64, f64)]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0f64;
    for i in 0..points.len() {
        let (x0, y0) = points[i];
        let (x1, y1) = points[(i + 1) % points.len()];
        twice_area += x0 * y1 - x1 * y0;
    }
    twice_area.abs() / 2.0
}

/// Physical polygon area. The scale is a linear ratio, so it applies squared.
pub fn polygon_area_mm2(polygon: &BoundaryPolygon, scale: CalibrationScale) -> f64 {
    shoelace_area_px(&polygon.positions()) * scale.mm_per_px() * scale.mm_per_px()
}

/// Area of the circular unreacted film.
pub fn film_area_mm2(diameter_mm: f64) -> f64 {
    let radius = diameter_mm / 2.0;
    std::f64::consts::PI * radius * radius
}

/// Reaction area as a percentage of the film area; 0 when the film area is 0.
pub fn area_increase_percent(reaction_area_mm2: f64, film_area_mm2: f64) -> f64 {
    if film_area_mm2 > 0.0 {
        100.0 * reaction_area_mm2 / film_area_mm2
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::calibration::CalibrationScale;
    use crate::core_modules::polygon::BoundaryPolygon;

    const SQUARE: [(f64, f64); 4] = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];

    #[test]
    fn unit_square_area() {
        assert_eq!(shoelace_area_px(&SQUARE), 100.0);
    }

    #[test]
    fn area_is_invariant_under_cyclic_rotation() {
        let mut rotated = SQUARE.to_vec();
        rotated.rotate_left(2);
        assert_eq!(shoelace_area_px(&rotated), 100.0);
    }

    #[test]
    fn area_is_invariant_under_winding_reversal() {
        let mut reversed = SQUARE.to_vec();
        reversed.reverse();
        assert_eq!(shoelace_area_px(&reversed), 100.0);
    }

    #[test]
    fn degenerate_polygons_have_zero_area() {
        assert_eq!(shoelace_area_px(&[]), 0.0);
        assert_eq!(shoelace_area_px(&[(0.0, 0.0), (5.0, 5.0)]), 0.0);
    }

    #[test]
    fn scale_applies_squared() {
        let polygon = BoundaryPolygon::from_points(SQUARE.to_vec());
        let scale = CalibrationScale::try_new(2.0).unwrap();
        assert_eq!(polygon_area_mm2(&polygon, scale), 400.0);
    }

    #[test]
    fn film_area_of_the_default_film() {
        let expected = std::f64::consts::PI * 12.5 * 12.5;
        assert!((film_area_mm2(DEFAULT_FILM_DIAMETER_MM) - expected).abs() < 1e-9);
    }

    #[test]
    fn area_increase_guards_a_zero_film() {
        assert_eq!(area_increase_percent(100.0, 0.0), 0.0);
        assert!((area_increase_percent(50.0, 200.0) - 25.0).abs() < 1e-12);
    }
}
