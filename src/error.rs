// THEORY:
// The `error` module defines the single failure taxonomy for the entire engine.
// Every stage failure maps onto one of four recoverable conditions: the caller
// can always keep its capture/analysis flow alive and fall back to manual
// marking. Nothing in this crate panics on bad input; decode-stage problems in
// particular must surface as explicit errors, because every stage after the
// decoder assumes it is working over a valid raster.

use thiserror::Error;

/// Result type alias for filmspot_vision operations.
pub type Result<T> = std::result::Result<T, DetectionError>;

/// Recoverable failure conditions of the measurement pipeline.
#[derive(Error, Debug)]
pub enum DetectionError {
    /// Malformed or unsupported PNG container (bad signature, missing IHDR,
    /// indexed color, interlacing, truncated chunks).
    #[error("unsupported or malformed PNG container: {0}")]
    Format(String),

    /// The compressed pixel stream inside an otherwise valid container could
    /// not be reconstructed.
    #[error("corrupt PNG pixel stream: {0}")]
    Decode(String),

    /// The largest candidate-red cluster is too small to be a reliable
    /// reaction region.
    #[error("largest red cluster has {found} px (minimum {minimum})")]
    InsufficientRegion { found: usize, minimum: usize },

    /// The calibration reference shape collapsed to zero pixel extent, so no
    /// usable mm-per-pixel scale exists.
    #[error("reference shape yields a degenerate scale ({0} mm/px)")]
    DegenerateScale(f64),
}

impl DetectionError {
    /// Short text suitable for the consuming screen. An empty or zero result
    /// means "could not auto-detect; mark manually", never a crash.
    pub fn user_message(&self) -> &'static str {
        match self {
            DetectionError::Format(_) | DetectionError::Decode(_) => {
                "Could not read the captured image. Please retake the photo."
            }
            DetectionError::InsufficientRegion { .. } => {
                "Could not auto-detect a reaction region. Please mark it manually."
            }
            DetectionError::DegenerateScale(_) => {
                "The reference object has no size. Please adjust it and try again."
            }
        }
    }
}
