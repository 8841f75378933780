// Debug snapshot writer. When a pipeline is configured with a dump
// directory, every stage writes what it saw so threshold tuning can happen
// against real captures instead of guesswork.

pub mod image_helper {
    use crate::core_modules::raster::{Mask, Raster};
    use image::ImageEncoder;
    use std::path::Path;

    pub fn save_raster(path: &Path, raster: &Raster) -> Result<(), image::error::ImageError> {
        save_rgba(path, raster.width(), raster.height(), raster.data())
    }

    /// Renders a mask as a white-on-black PNG.
    pub fn save_mask(path: &Path, mask: &Mask) -> Result<(), image::error::ImageError> {
        let mut buffer = Vec::with_capacity((mask.width() * mask.height() * 4) as usize);
        for y in 0..mask.height() {
            for x in 0..mask.width() {
                let level = if mask.get(x, y) { 255u8 } else { 0u8 };
                buffer.extend_from_slice(&[level, level, level, 255]);
            }
        }
        save_rgba(path, mask.width(), mask.height(), &buffer)
    }

    fn save_rgba(
        path: &Path,
        width: u32,
        height: u32,
        buffer: &[u8],
    ) -> Result<(), image::error::ImageError> {
        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(output);
        encoder.write_image(buffer, width, height, image::ExtendedColorType::Rgba8)?;
        Ok(())
    }
}
