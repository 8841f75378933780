// End-to-end runs over a synthetic photograph: a white 100x100 frame holding
// a solid red disk, measured against a petri-dish calibration.

use filmspot_vision::core_modules::calibration::ReferenceShape;
use filmspot_vision::core_modules::geometry::{self, DEFAULT_FILM_DIAMETER_MM};
use filmspot_vision::core_modules::png_decoder::png_decoder;
use filmspot_vision::{DetectionConfig, DetectionPipeline};
use image::ImageEncoder;

const DISK_CENTER: (i32, i32) = (50, 50);
const DISK_RADIUS: i32 = 20;

fn synthetic_photo_rgba() -> Vec<u8> {
    let mut rgba = Vec::with_capacity(100 * 100 * 4);
    for y in 0..100i32 {
        for x in 0..100i32 {
            let dx = x - DISK_CENTER.0;
            let dy = y - DISK_CENTER.1;
            if dx * dx + dy * dy <= DISK_RADIUS * DISK_RADIUS {
                rgba.extend_from_slice(&[200, 30, 30, 255]);
            } else {
                rgba.extend_from_slice(&[255, 255, 255, 255]);
            }
        }
    }
    rgba
}

fn synthetic_photo_png() -> Vec<u8> {
    let mut bytes = Vec::new();
    image::codecs::png::PngEncoder::new(&mut bytes)
        .write_image(&synthetic_photo_rgba(), 100, 100, image::ExtendedColorType::Rgba8)
        .unwrap();
    bytes
}

#[test]
fn the_decoder_agrees_with_an_independent_encoder() {
    let raster = png_decoder::decode(&synthetic_photo_png()).unwrap();
    assert_eq!(raster.width(), 100);
    assert_eq!(raster.height(), 100);
    assert_eq!(raster.data(), synthetic_photo_rgba().as_slice());
}

#[test]
fn a_red_disk_is_traced_close_to_its_true_outline() {
    let pipeline = DetectionPipeline::new(DetectionConfig::default());
    let polygon = pipeline.detect(&synthetic_photo_png()).unwrap();

    assert_eq!(polygon.len(), 16);
    for vertex in polygon.vertices() {
        let distance = ((vertex.x - DISK_CENTER.0 as f64).powi(2)
            + (vertex.y - DISK_CENTER.1 as f64).powi(2))
        .sqrt();
        assert!(
            (15.0..=22.0).contains(&distance),
            "vertex ({:.1}, {:.1}) sits {distance:.1}px from the disk center",
            vertex.x,
            vertex.y
        );
    }

    // A 16-gon inscribed in the disk captures a bit over 97% of the circle.
    let traced_px2 = geometry::shoelace_area_px(&polygon.positions());
    let circle_px2 = std::f64::consts::PI * (DISK_RADIUS as f64).powi(2);
    assert!(
        traced_px2 > 0.80 * circle_px2 && traced_px2 < 1.05 * circle_px2,
        "traced {traced_px2:.0} px^2 against a true {circle_px2:.0} px^2"
    );
}

#[test]
fn a_full_measurement_lands_in_the_expected_band() {
    let pipeline = DetectionPipeline::new(DetectionConfig::default());
    let polygon = pipeline.detect(&synthetic_photo_png()).unwrap();

    // 40 px of petri dish means 150 mm / 80 px = 1.875 mm per pixel.
    let reference = ReferenceShape::petri_dish((50.0, 50.0), 40.0);
    let result = pipeline
        .analyze(&polygon, &reference, DEFAULT_FILM_DIAMETER_MM)
        .unwrap();

    assert!(result.is_detected);
    assert!(!result.low_confidence);
    assert!(
        result.red_area_mm2 > 3500.0 && result.red_area_mm2 < 4600.0,
        "area {:.0} mm^2",
        result.red_area_mm2
    );
    assert!(
        result.concentration_percent > 10.0 && result.concentration_percent < 14.0,
        "concentration {:.2}%",
        result.concentration_percent
    );
}

#[test]
fn operator_corrections_flow_into_the_measurement() {
    let pipeline = DetectionPipeline::new(DetectionConfig::default());
    let mut polygon = pipeline.detect(&synthetic_photo_png()).unwrap();
    let reference = ReferenceShape::petri_dish((50.0, 50.0), 40.0);

    let before = pipeline
        .analyze(&polygon, &reference, DEFAULT_FILM_DIAMETER_MM)
        .unwrap();

    // Drag every vertex outward by 25% around the disk center.
    let ids: Vec<_> = polygon.vertices().iter().map(|v| (v.id, v.x, v.y)).collect();
    for (id, x, y) in ids {
        let moved_x = 50.0 + (x - 50.0) * 1.25;
        let moved_y = 50.0 + (y - 50.0) * 1.25;
        assert!(polygon.move_vertex(id, moved_x, moved_y));
    }

    let after = pipeline
        .analyze(&polygon, &reference, DEFAULT_FILM_DIAMETER_MM)
        .unwrap();
    assert!(after.red_area_mm2 > before.red_area_mm2 * 1.5);
    assert!(after.concentration_percent > before.concentration_percent);
}
