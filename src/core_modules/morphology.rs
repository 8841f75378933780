// Morphological open over a boolean mask: erode with a full 3x3 kernel
// (out-of-bounds counts false), then dilate the result with the same kernel.
// Removes speckle noise without shrinking the main region.

use crate::core_modules::raster::Mask;

/// A pixel survives erosion only if itself and all 8 neighbors are true.
pub fn erode(mask: &Mask) -> Mask {
    let (width, height) = (mask.width(), mask.height());
    let mut out = Mask::new(width, height);

    for y in 0..height {
        for x in 0..width {
            if !mask.get(x, y) {
                continue;
            }
            let mut all_true = true;
            'scan: for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    if !mask.truthy(x as i64 + dx, y as i64 + dy) {
                        all_true = false;
                        break 'scan;
                    }
                }
            }
            out.set(x, y, all_true);
        }
    }
    out
}

/// A pixel becomes true if itself or any of its 8 neighbors is true.
pub fn dilate(mask: &Mask) -> Mask {
    let (width, height) = (mask.width(), mask.height());
    let mut out = Mask::new(width, height);

    for y in 0..height {
        for x in 0..width {
            if mask.get(x, y) {
                out.set(x, y, true);
                continue;
            }
            'scan: for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    if mask.truthy(x as i64 + dx, y as i64 + dy) {
                        out.set(x, y, true);
                        break 'scan;
                    }
                }
            }
        }
    }
    out
}

/// Erode then dilate.
pub fn open(mask: &Mask) -> Mask {
    dilate(&erode(mask))
}
