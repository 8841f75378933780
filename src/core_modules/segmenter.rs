// THEORY:
// The `segmenter` module is the first classification layer: it turns the
// decoded raster into a boolean "candidate red" mask. It is deliberately a
// policy module; all the measurement math lives in `Pixel`.
//
// Key architectural principles:
// 1.  **Hue-first classification**: Reactive red sits near the 0/360 wrap of
//     the hue circle, so a pixel qualifies when its hue falls in the low or
//     high red band AND it carries enough saturation and brightness to not be
//     a pale or shadowed background pixel. A channel-dominance check (R well
//     above G and B) rejects warm grays that sneak through the HSV gates.
// 2.  **Adaptive relaxation**: Faint reactions can fail the strict gates
//     everywhere. When fewer than a configurable fraction of all pixels
//     (default 0.5%) pass the strict pass, the WHOLE grid is re-evaluated
//     under relaxed thresholds. The second pass only ever adds pixels.
// 3.  **Determinism**: Same raster and thresholds, same mask. No side effects
//     beyond a debug log line when the relaxed pass triggers.

use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::raster::{Mask, Raster};
use serde::{Deserialize, Serialize};

/// One set of HSV gates plus the red-dominance factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HsvThresholds {
    /// Hue qualifies when below this (degrees)...
    pub hue_low_max: f32,
    /// ...or above this (degrees), covering the red wrap-around.
    pub hue_high_min: f32,
    /// Minimum HSV saturation.
    pub min_saturation: f32,
    /// Minimum HSV value.
    pub min_value: f32,
    /// R must exceed G and B by this factor (1.0 is a plain greater-than).
    pub dominance_factor: f32,
}

/// Strict and relaxed gates plus the trigger for falling back to relaxed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmenterConfig {
    pub strict: HsvThresholds,
    pub relaxed: HsvThresholds,
    /// Relax when strict flags fewer than this fraction of all pixels.
    pub relaxation_trigger: f64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            strict: HsvThresholds {
                hue_low_max: 20.0,
                hue_high_min: 335.0,
                min_saturation: 0.2,
                min_value: 0.15,
                dominance_factor: 1.2,
            },
            relaxed: HsvThresholds {
                hue_low_max: 30.0,
                hue_high_min: 320.0,
                min_saturation: 0.15,
                min_value: 0.1,
                dominance_factor: 1.0,
            },
            relaxation_trigger: 0.005,
        }
    }
}

fn is_candidate_red(pixel: &Pixel, thresholds: &HsvThresholds) -> bool {
    let hue = pixel.hue();
    let is_red_hue = hue < thresholds.hue_low_max || hue > thresholds.hue_high_min;
    is_red_hue
        && pixel.saturation_hsv() > thresholds.min_saturation
        && pixel.value_hsv() > thresholds.min_value
        && pixel.red_dominates(thresholds.dominance_factor)
}

/// Flags every candidate-red pixel of the raster into a fresh mask.
pub fn candidate_red_mask(raster: &Raster, config: &SegmenterConfig) -> Mask {
    let (width, height) = (raster.width(), raster.height());
    let mut mask = Mask::new(width, height);
    let mut flagged = 0usize;

    for y in 0..height {
        for x in 0..width {
            if is_candidate_red(&raster.pixel(x, y), &config.strict) {
                mask.set(x, y, true);
                flagged += 1;
            }
        }
    }

    let total = (width as usize) * (height as usize);
    if (flagged as f64) < (total as f64) * config.relaxation_trigger {
        log::debug!(
            "strict pass flagged {flagged} of {total} pixels; re-evaluating with relaxed thresholds"
        );
        for y in 0..height {
            for x in 0..width {
                if mask.get(x, y) {
                    continue;
                }
                if is_candidate_red(&raster.pixel(x, y), &config.relaxed) {
                    mask.set(x, y, true);
                }
            }
        }
    }

    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::raster::Raster;

    fn uniform_raster(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&rgba);
        }
        data
    }

    #[test]
    fn strict_pass_flags_a_clear_reaction_red() {
        let mut data = uniform_raster(10, 10, [255, 255, 255, 255]);
        // One 2x2 patch of strong red at (4,4).
        for (x, y) in [(4u32, 4u32), (5, 4), (4, 5), (5, 5)] {
            let i = ((y * 10 + x) * 4) as usize;
            data[i..i + 4].copy_from_slice(&[200, 30, 30, 255]);
        }
        let raster = Raster::from_rgba8(10, 10, data);
        let mask = candidate_red_mask(&raster, &SegmenterConfig::default());
        assert!(mask.get(4, 4) && mask.get(5, 5));
        assert_eq!(mask.count_true(), 4);
    }

    #[test]
    fn white_background_never_qualifies() {
        let raster = Raster::from_rgba8(8, 8, uniform_raster(8, 8, [255, 255, 255, 255]));
        let mask = candidate_red_mask(&raster, &SegmenterConfig::default());
        assert_eq!(mask.count_true(), 0);
    }

    #[test]
    fn faint_reaction_triggers_the_relaxed_pass() {
        // (160,130,130): saturation 30/160 = 0.1875 fails the strict 0.2 gate
        // but passes the relaxed 0.15 gate with plain R > G,B dominance.
        let mut data = uniform_raster(10, 10, [255, 255, 255, 255]);
        for y in 0..10u32 {
            for x in 0..5u32 {
                let i = ((y * 10 + x) * 4) as usize;
                data[i..i + 4].copy_from_slice(&[160, 130, 130, 255]);
            }
        }
        let raster = Raster::from_rgba8(10, 10, data);
        let mask = candidate_red_mask(&raster, &SegmenterConfig::default());
        assert_eq!(mask.count_true(), 50);
    }

    #[test]
    fn relaxation_does_not_run_when_strict_finds_enough() {
        // A strong red region beside a faint one: strict flags enough pixels
        // that the faint half must stay unflagged.
        let mut data = uniform_raster(10, 10, [255, 255, 255, 255]);
        for y in 0..10u32 {
            for x in 0..5u32 {
                let i = ((y * 10 + x) * 4) as usize;
                data[i..i + 4].copy_from_slice(&[200, 30, 30, 255]);
            }
            let i = ((y * 10 + 7) * 4) as usize;
            data[i..i + 4].copy_from_slice(&[160, 130, 130, 255]);
        }
        let raster = Raster::from_rgba8(10, 10, data);
        let mask = candidate_red_mask(&raster, &SegmenterConfig::default());
        assert_eq!(mask.count_true(), 50);
        assert!(!mask.get(7, 0));
    }
}
