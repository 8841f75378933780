// THEORY:
// The `edge_refine` module trims the candidate mask back to where the color
// boundary is actually sharp. HSV segmentation tends to bleed a halo of
// gradually-fading pixels past the true reaction edge; a real reaction
// boundary shows up as a strong red-channel gradient. So: compute Sobel
// magnitude over the red channel, then keep an edge-adjacent mask pixel only
// when it sits on a strong gradient. Interior pixels are never touched.

use crate::core_modules::raster::{Mask, Raster};

/// Default minimum Sobel magnitude for keeping an edge-adjacent pixel.
pub const DEFAULT_GRADIENT_THRESHOLD: f64 = 30.0;

/// Sobel gradient magnitude of the red channel, row-major. Pixels on the
/// image border get magnitude 0.
pub fn sobel_red_magnitude(raster: &Raster) -> Vec<f64> {
    let (width, height) = (raster.width() as usize, raster.height() as usize);
    let mut magnitude = vec![0.0f64; width * height];
    if width < 3 || height < 3 {
        return magnitude;
    }

    let red = |x: usize, y: usize| raster.red(x as u32, y as u32) as f64;

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let gx = -red(x - 1, y - 1) + red(x + 1, y - 1) - 2.0 * red(x - 1, y)
                + 2.0 * red(x + 1, y)
                - red(x - 1, y + 1)
                + red(x + 1, y + 1);
            let gy = -red(x - 1, y - 1) - 2.0 * red(x, y - 1) - red(x + 1, y - 1)
                + red(x - 1, y + 1)
                + 2.0 * red(x, y + 1)
                + red(x + 1, y + 1);
            magnitude[y * width + x] = (gx * gx + gy * gy).sqrt();
        }
    }
    magnitude
}

/// Keeps a mask-true pixel that touches mask-false territory only when the
/// red-channel gradient under it reaches `threshold`. A pixel is
/// edge-adjacent when any in-bounds 8-neighbor is mask-false; the image
/// border alone does not make a pixel edge-adjacent.
pub fn refine_boundary(raster: &Raster, mask: &Mask, threshold: f64) -> Mask {
    let (width, height) = (mask.width(), mask.height());
    let magnitude = sobel_red_magnitude(raster);
    let mut refined = Mask::new(width, height);

    for y in 0..height {
        for x in 0..width {
            if !mask.get(x, y) {
                continue;
            }

            let mut near_edge = false;
            'scan: for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                    if mask.in_bounds(nx, ny) && !mask.get(nx as u32, ny as u32) {
                        near_edge = true;
                        break 'scan;
                    }
                }
            }

            let keep = !near_edge
                || magnitude[(y as usize) * (width as usize) + (x as usize)] >= threshold;
            refined.set(x, y, keep);
        }
    }
    refined
}
