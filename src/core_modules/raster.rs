// THEORY:
// The `raster` module holds the two grid containers every stage of the
// pipeline passes around: the `Raster` (an immutable RGBA8 image, produced
// exactly once by the decoder) and the `Mask` (a mutable boolean grid derived
// from it, recomputed on every run). Both are flat row-major buffers indexed
// by (x, y), which keeps the per-pixel algorithms in the other modules free
// functions over plain data.
//
// Key architectural principles:
// 1.  **Immutability of the source**: A `Raster` is never mutated after
//     decoding. Stages read from it and write into fresh `Mask`s.
// 2.  **Dimension invariant**: A mask always has the same dimensions as the
//     raster it was derived from; constructors enforce buffer length.
// 3.  **Bounds-tolerant reads**: Neighbor scans constantly step off the grid,
//     so `Mask::truthy` takes signed coordinates and reports out-of-bounds as
//     false instead of forcing every caller to range-check.

use crate::core_modules::pixel::pixel::Pixel;

/// An immutable RGBA8 pixel grid, the canonical output of the decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Raster {
    /// Wraps a row-major RGBA8 buffer. The buffer length must be
    /// `width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * 4,
            "RGBA8 buffer length does not match raster dimensions"
        );
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The raw RGBA8 buffer, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        let i = self.byte_index(x, y);
        Pixel::from(&self.data[i..i + 4])
    }

    /// The red channel at (x, y). The gradient stage only reads red, so this
    /// skips building a full `Pixel`.
    pub fn red(&self, x: u32, y: u32) -> u8 {
        self.data[self.byte_index(x, y)]
    }

    fn byte_index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }
}

/// A boolean grid with the same dimensions as its source raster.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl Mask {
    /// An all-false mask of the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.cells[self.cell_index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        let i = self.cell_index(x, y);
        self.cells[i] = value;
    }

    /// Signed-coordinate read: anything off the grid is false.
    pub fn truthy(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.get(x as u32, y as u32)
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    pub fn count_true(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    fn cell_index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        (y as usize) * (self.width as usize) + (x as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raster_reads_pixels_and_red_channel() {
        let data = vec![
            10, 20, 30, 255, // (0,0)
            40, 50, 60, 255, // (1,0)
            70, 80, 90, 255, // (0,1)
            100, 110, 120, 255, // (1,1)
        ];
        let raster = Raster::from_rgba8(2, 2, data);
        assert_eq!(raster.red(1, 0), 40);
        let p = raster.pixel(0, 1);
        assert_eq!((p.red, p.green, p.blue, p.alpha), (70, 80, 90, 255));
    }

    #[test]
    #[should_panic]
    fn raster_rejects_mismatched_buffer() {
        Raster::from_rgba8(2, 2, vec![0u8; 15]);
    }

    #[test]
    fn mask_truthy_is_false_off_grid() {
        let mut mask = Mask::new(3, 3);
        mask.set(2, 2, true);
        assert!(mask.truthy(2, 2));
        assert!(!mask.truthy(-1, 0));
        assert!(!mask.truthy(0, 3));
        assert_eq!(mask.count_true(), 1);
    }
}
