// A minimal example runner for the `filmspot_vision` library. It traces one
// photograph against a petri-dish calibration and prints the measurement. In
// a real deployment the library is driven by a capture UI, which supplies the
// reference shape interactively.

use filmspot_vision::core_modules::calibration::ReferenceShape;
use filmspot_vision::core_modules::geometry::DEFAULT_FILM_DIAMETER_MM;
use filmspot_vision::{DetectionConfig, DetectionPipeline};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let (Some(photo_path), Some(radius_arg)) = (args.next(), args.next()) else {
        eprintln!("Usage: filmspot_vision <photo.png> <petri-dish-radius-px>");
        return ExitCode::FAILURE;
    };
    let Ok(radius_px) = radius_arg.parse::<f64>() else {
        eprintln!("Reference radius must be a number, got {radius_arg:?}");
        return ExitCode::FAILURE;
    };

    let png_bytes = match std::fs::read(&photo_path) {
        Ok(bytes) => bytes,
        Err(error) => {
            eprintln!("Could not read {photo_path}: {error}");
            return ExitCode::FAILURE;
        }
    };

    let pipeline = DetectionPipeline::new(DetectionConfig::default());
    let polygon = match pipeline.detect(&png_bytes) {
        Ok(polygon) => polygon,
        Err(error) => {
            eprintln!("{}", error.user_message());
            return ExitCode::FAILURE;
        }
    };
    println!("Traced the reaction with {} boundary vertices.", polygon.len());

    let reference = ReferenceShape::petri_dish((0.0, 0.0), radius_px);
    match pipeline.analyze(&polygon, &reference, DEFAULT_FILM_DIAMETER_MM) {
        Ok(result) => {
            println!("Reaction area:  {} mm^2", result.formatted_area());
            println!("Area increase:  {}%", result.formatted_area_increase());
            println!("Concentration:  {}%", result.formatted_concentration());
            println!("{}", result.message);
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{}", error.user_message());
            ExitCode::FAILURE
        }
    }
}
