// THEORY:
// The `Pixel` module is the most fundamental unit of the vision system. It is a
// "dumb" data container for a single RGBA pixel plus the small set of
// single-pixel heuristics the segmentation layer needs. Anything that requires
// a neighbor (gradients, morphology, clustering) belongs in the 2D grid
// modules, never here.
//
// Key architectural principles:
// 1.  **Single-pixel scope**: Every heuristic is computable from this pixel
//     alone. The HSV trio (hue, saturation, value) uses the standard
//     max/min/delta formulation over normalized sRGB channels.
// 2.  **Precomputation**: The normalized channels are cached in the
//     constructor. Segmentation evaluates up to three heuristics plus a
//     dominance check per pixel, so the divisions are paid once.
// 3.  **Dumb container**: No thresholds live here. Classification policy is
//     the segmenter's job; the pixel only reports measurements.

pub mod pixel {
    pub type Channel = u8;
    pub type NormalizedChannel = f32;
    pub type Hue = f32;
    pub type SaturationHSV = f32;
    pub type ValueHSV = f32;

    const CHANNELS: usize = 4;

    /// A "dumb" data container representing a single RGBA pixel.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
        /// The alpha (transparency) channel value (0-255).
        pub alpha: Channel,
        /// The red channel value (0.0-1.0), cached for heuristic math.
        pub red_normalized: NormalizedChannel,
        /// The green channel value (0.0-1.0), cached for heuristic math.
        pub green_normalized: NormalizedChannel,
        /// The blue channel value (0.0-1.0), cached for heuristic math.
        pub blue_normalized: NormalizedChannel,
    }

    impl Pixel {
        pub fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Pixel {
                red,
                green,
                blue,
                alpha,
                red_normalized: red as NormalizedChannel / 255.0f32,
                green_normalized: green as NormalizedChannel / 255.0f32,
                blue_normalized: blue as NormalizedChannel / 255.0f32,
            }
        }

        /// Hue angle in degrees [0, 360).
        ///
        /// Standard sector formulation: the dominant channel picks the sector,
        /// the difference of the other two picks the position inside it.
        /// Achromatic pixels (chroma ~ 0) report 0.0.
        pub fn hue(&self) -> Hue {
            let maximum_channel = self
                .red_normalized
                .max(self.green_normalized.max(self.blue_normalized));
            let minimum_channel = self
                .red_normalized
                .min(self.green_normalized.min(self.blue_normalized));
            let chroma = maximum_channel - minimum_channel;

            if chroma <= 1e-6 {
                return 0.0;
            }

            let (base_difference, sector_offset) = if maximum_channel == self.red_normalized {
                (self.green_normalized - self.blue_normalized, 0.0)
            } else if maximum_channel == self.green_normalized {
                (self.blue_normalized - self.red_normalized, 2.0)
            } else {
                (self.red_normalized - self.green_normalized, 4.0)
            };

            let mut hue_degrees = (base_difference / chroma + sector_offset) * 60.0;
            if hue_degrees < 0.0 {
                hue_degrees += 360.0;
            }
            hue_degrees
        }

        /// HSV Value (V): brightness defined as max(R, G, B), in 0.0-1.0.
        pub fn value_hsv(&self) -> ValueHSV {
            self.red_normalized
                .max(self.green_normalized.max(self.blue_normalized))
        }

        /// Saturation (HSV): S = chroma / value. Zero for blacks and grays.
        pub fn saturation_hsv(&self) -> SaturationHSV {
            let maximum_channel = self.value_hsv();
            if maximum_channel <= 1e-6 {
                return 0.0;
            }
            let minimum_channel = self
                .red_normalized
                .min(self.green_normalized.min(self.blue_normalized));
            (maximum_channel - minimum_channel) / maximum_channel
        }

        /// Whether the red channel exceeds both green and blue by `factor`.
        /// A factor of 1.0 is a plain R > G and R > B check.
        pub fn red_dominates(&self, factor: f32) -> bool {
            let red = self.red as f32;
            red > self.green as f32 * factor && red > self.blue as f32 * factor
        }
    }

    impl From<&[Channel]> for Pixel {
        fn from(bytes: &[Channel]) -> Self {
            if bytes.len() != CHANNELS {
                panic!("Cannot convert {} bytes into pixel.", bytes.len());
            }
            Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3])
        }
    }
}
