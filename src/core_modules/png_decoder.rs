// THEORY:
// The `png_decoder` module turns a captured PNG byte buffer into the canonical
// `Raster` every later stage consumes. The capture collaborator pre-shrinks
// frames to roughly 60-100 px per side, so this decoder is tuned for tiny
// images and a narrow feature set rather than generality.
//
// Key architectural principles:
// 1.  **Container walk**: After validating the 8-byte signature, it walks the
//     length-prefixed chunk stream, pulling dimensions and color type from
//     IHDR, concatenating every IDAT payload in order, and stopping at IEND.
//     CRC fields are skipped, not verified; a corrupt payload still fails in
//     the inflate or reconstruction step.
// 2.  **Narrow support, loud failures**: Only 8-bit color types 0 (gray),
//     2 (truecolor), 4 (gray+alpha) and 6 (truecolor+alpha) are accepted.
//     Indexed-color and interlaced images are a `Format` error. A wrong
//     raster is worse than no raster, so nothing degrades silently here.
// 3.  **Standard reconstruction**: The concatenated IDAT stream inflates via
//     miniz_oxide (the same backend the `image` crate uses), then each
//     scanline is reconstructed against its left/above/upper-left neighbors
//     per the standard filter set {None, Sub, Up, Average, Paeth}, with
//     out-of-bounds precursors treated as zero.
// 4.  **Canonical expansion**: Whatever the source color type, the output is
//     RGBA8: grayscale broadcasts to all channels, alpha is forced to 255
//     where the format has none.

pub mod png_decoder {
    use crate::core_modules::raster::Raster;
    use crate::error::{DetectionError, Result};

    const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

    /// The capture collaborator pre-shrinks frames to ~100 px per side, so
    /// anything bigger is a malformed container. The ceiling also keeps the
    /// scanline length arithmetic below comfortably inside usize.
    const MAX_DIMENSION: u32 = 1024;

    struct Header {
        width: u32,
        height: u32,
        bit_depth: u8,
        color_type: u8,
        interlace: u8,
    }

    /// Decodes a PNG byte buffer into an RGBA8 `Raster`.
    ///
    /// Pure function: bytes in, raster or error out, no side effects.
    pub fn decode(bytes: &[u8]) -> Result<Raster> {
        if bytes.len() < PNG_SIGNATURE.len() || bytes[..8] != PNG_SIGNATURE {
            return Err(DetectionError::Format("missing PNG signature".into()));
        }

        let mut header: Option<Header> = None;
        let mut idat: Vec<u8> = Vec::new();
        let mut offset = PNG_SIGNATURE.len();

        while offset + 8 <= bytes.len() {
            let length = read_u32_be(bytes, offset) as usize;
            let kind = &bytes[offset + 4..offset + 8];
            let data_start = offset + 8;
            let data_end = match data_start.checked_add(length) {
                Some(end) if end + 4 <= bytes.len() => end,
                _ => {
                    return Err(DetectionError::Format(
                        "chunk declares more data than the buffer holds".into(),
                    ));
                }
            };

            match kind {
                b"IHDR" => {
                    if length < 13 {
                        return Err(DetectionError::Format("IHDR chunk too short".into()));
                    }
                    header = Some(Header {
                        width: read_u32_be(bytes, data_start),
                        height: read_u32_be(bytes, data_start + 4),
                        bit_depth: bytes[data_start + 8],
                        color_type: bytes[data_start + 9],
                        interlace: bytes[data_start + 12],
                    });
                }
                b"IDAT" => idat.extend_from_slice(&bytes[data_start..data_end]),
                b"IEND" => break,
                _ => {}
            }

            // Step over data and the 4-byte CRC.
            offset = data_end + 4;
        }

        let header = header.ok_or_else(|| DetectionError::Format("IHDR chunk missing".into()))?;
        if header.width == 0 || header.height == 0 {
            return Err(DetectionError::Format("zero image dimension".into()));
        }
        if header.width > MAX_DIMENSION || header.height > MAX_DIMENSION {
            return Err(DetectionError::Format(format!(
                "image dimensions {}x{} exceed the supported maximum of {MAX_DIMENSION} px",
                header.width, header.height
            )));
        }
        if header.bit_depth != 8 {
            return Err(DetectionError::Format(format!(
                "unsupported bit depth {}",
                header.bit_depth
            )));
        }
        if header.interlace != 0 {
            return Err(DetectionError::Format(
                "interlaced (Adam7) images are not supported".into(),
            ));
        }
        let bytes_per_pixel: usize = match header.color_type {
            0 => 1,
            2 => 3,
            4 => 2,
            6 => 4,
            other => {
                return Err(DetectionError::Format(format!(
                    "unsupported color type {other}"
                )));
            }
        };

        let inflated = miniz_oxide::inflate::decompress_to_vec_zlib(&idat)
            .map_err(|e| DetectionError::Decode(format!("inflate failed: {e:?}")))?;

        let width = header.width as usize;
        let height = header.height as usize;
        let stride = width * bytes_per_pixel;
        if inflated.len() < height * (stride + 1) {
            return Err(DetectionError::Decode(
                "pixel stream shorter than the declared dimensions".into(),
            ));
        }

        let reconstructed = unfilter_scanlines(&inflated, height, bytes_per_pixel, stride)?;
        let rgba = expand_to_rgba(&reconstructed, width, height, header.color_type, bytes_per_pixel);
        Ok(Raster::from_rgba8(header.width, header.height, rgba))
    }

    /// Resolves the per-scanline filters against already-reconstructed bytes.
    /// Precursors outside the image (first row, first pixel of a row) are 0.
    fn unfilter_scanlines(
        inflated: &[u8],
        height: usize,
        bytes_per_pixel: usize,
        stride: usize,
    ) -> Result<Vec<u8>> {
        let mut out = vec![0u8; height * stride];

        for y in 0..height {
            let filter_type = inflated[y * (stride + 1)];
            let scan_offset = y * (stride + 1) + 1;
            let out_offset = y * stride;

            for x in 0..stride {
                let current = inflated[scan_offset + x];
                let left = if x >= bytes_per_pixel {
                    out[out_offset + x - bytes_per_pixel]
                } else {
                    0
                };
                let above = if y > 0 { out[out_offset + x - stride] } else { 0 };
                let upper_left = if x >= bytes_per_pixel && y > 0 {
                    out[out_offset + x - stride - bytes_per_pixel]
                } else {
                    0
                };

                let value = match filter_type {
                    0 => current,
                    1 => current.wrapping_add(left),
                    2 => current.wrapping_add(above),
                    3 => current.wrapping_add(((left as u16 + above as u16) / 2) as u8),
                    4 => current.wrapping_add(paeth_predictor(left, above, upper_left)),
                    other => {
                        return Err(DetectionError::Decode(format!(
                            "unknown scanline filter {other}"
                        )));
                    }
                };
                out[out_offset + x] = value;
            }
        }
        Ok(out)
    }

    fn paeth_predictor(left: u8, above: u8, upper_left: u8) -> u8 {
        let a = left as i16;
        let b = above as i16;
        let c = upper_left as i16;
        let p = a + b - c;
        let pa = (p - a).abs();
        let pb = (p - b).abs();
        let pc = (p - c).abs();
        if pa <= pb && pa <= pc {
            left
        } else if pb <= pc {
            above
        } else {
            upper_left
        }
    }

    fn expand_to_rgba(
        reconstructed: &[u8],
        width: usize,
        height: usize,
        color_type: u8,
        bytes_per_pixel: usize,
    ) -> Vec<u8> {
        let stride = width * bytes_per_pixel;
        let mut rgba = vec![0u8; width * height * 4];

        for y in 0..height {
            for x in 0..width {
                let si = y * stride + x * bytes_per_pixel;
                let di = (y * width + x) * 4;
                match color_type {
                    6 => rgba[di..di + 4].copy_from_slice(&reconstructed[si..si + 4]),
                    2 => {
                        rgba[di..di + 3].copy_from_slice(&reconstructed[si..si + 3]);
                        rgba[di + 3] = 255;
                    }
                    4 => {
                        let gray = reconstructed[si];
                        rgba[di] = gray;
                        rgba[di + 1] = gray;
                        rgba[di + 2] = gray;
                        rgba[di + 3] = reconstructed[si + 1];
                    }
                    _ => {
                        let gray = reconstructed[si];
                        rgba[di] = gray;
                        rgba[di + 1] = gray;
                        rgba[di + 2] = gray;
                        rgba[di + 3] = 255;
                    }
                }
            }
        }
        rgba
    }

    fn read_u32_be(data: &[u8], offset: usize) -> u32 {
        u32::from_be_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ])
    }
}
