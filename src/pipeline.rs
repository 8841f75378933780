// THEORY:
// The `pipeline` module is the top-level API for the detection engine. It
// encapsulates the full stack, from raw PNG bytes to a calibrated
// concentration measurement, behind two calls: `detect`, which finds the
// reaction region and returns its editable boundary polygon, and `analyze`,
// which prices a (possibly hand-corrected) polygon against a reference object
// and the growth model.
//
// The split is deliberate. Detection is automatic and fallible; analysis runs
// on whatever polygon the operator settled on, so corrections made between
// the two calls flow into the measurement without re-running detection.

use crate::core_modules::calibration::{CalibrationScale, ReferenceShape};
use crate::core_modules::cluster;
use crate::core_modules::concentration::{self, ModelCoefficients};
use crate::core_modules::edge_refine;
use crate::core_modules::geometry;
use crate::core_modules::morphology;
use crate::core_modules::png_decoder::png_decoder;
use crate::core_modules::polygon;
use crate::core_modules::segmenter::{self, SegmenterConfig};
use crate::core_modules::utils::image_helper::image_helper;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// Re-export key data structures for the public API.
pub use crate::core_modules::concentration::AnalysisResult;
pub use crate::core_modules::polygon::{BoundaryPolygon, Vertex, VertexId};
pub use crate::error::{DetectionError, Result};

/// Configuration for the DetectionPipeline, allowing for tunable behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Number of vertices in the extracted boundary polygon.
    pub vertex_count: usize,
    /// Clusters smaller than this are noise, not reactions.
    pub min_cluster_pixels: usize,
    /// Sobel magnitude below which a boundary pixel is a soft halo.
    pub gradient_threshold: f64,
    pub segmenter: SegmenterConfig,
    /// Film thickness in mm, fed to the growth model during analysis.
    pub film_thickness_mm: f64,
    /// When set, every stage writes its intermediate mask here as a PNG.
    pub debug_dump_dir: Option<PathBuf>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            vertex_count: polygon::DEFAULT_VERTEX_COUNT,
            min_cluster_pixels: cluster::DEFAULT_MIN_CLUSTER_PIXELS,
            gradient_threshold: edge_refine::DEFAULT_GRADIENT_THRESHOLD,
            segmenter: SegmenterConfig::default(),
            film_thickness_mm: concentration::FILM_THICKNESS_MM,
            debug_dump_dir: None,
        }
    }
}

impl DetectionConfig {
    /// Loads a configuration from a JSON file. Missing fields keep their
    /// defaults.
    pub fn from_json_file(
        path: &Path,
    ) -> std::result::Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }
}

/// The main, top-level struct for the detection engine.
pub struct DetectionPipeline {
    config: DetectionConfig,
    coefficients: ModelCoefficients,
}

impl DetectionPipeline {
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            config,
            coefficients: ModelCoefficients::default(),
        }
    }

    pub fn with_coefficients(config: DetectionConfig, coefficients: ModelCoefficients) -> Self {
        Self {
            config,
            coefficients,
        }
    }

    /// Runs the full detection stack on one photograph.
    pub fn detect(&self, png_bytes: &[u8]) -> Result<BoundaryPolygon> {
        // Stage 1: Decode
        let raster = png_decoder::decode(png_bytes)?;
        if let Some(dir) = &self.config.debug_dump_dir {
            let path = dir.join("0_decoded.png");
            if let Err(error) = image_helper::save_raster(&path, &raster) {
                log::warn!("could not write decode snapshot: {error}");
            }
        }

        // Stage 2: Color Segmentation
        let candidate = segmenter::candidate_red_mask(&raster, &self.config.segmenter);
        self.dump_mask("1_candidate", &candidate);

        // Stage 3: Gradient Boundary Refinement
        let refined =
            edge_refine::refine_boundary(&raster, &candidate, self.config.gradient_threshold);
        self.dump_mask("2_refined", &refined);

        // Stage 4: Morphological Cleanup
        let cleaned = morphology::open(&refined);
        self.dump_mask("3_cleaned", &cleaned);

        // Stage 5: Spatial Grouping
        let cluster = cluster::largest_cluster(&cleaned, self.config.min_cluster_pixels)?;

        // Stage 6: Boundary Extraction
        Ok(polygon::extract_polygon(
            &cluster,
            &cleaned,
            self.config.vertex_count,
        ))
    }

    /// Like `detect`, but a failed detection yields an empty polygon the
    /// operator can build up by hand instead of an error.
    pub fn detect_or_empty(&self, png_bytes: &[u8]) -> BoundaryPolygon {
        match self.detect(png_bytes) {
            Ok(polygon) => polygon,
            Err(error) => {
                log::warn!("detection failed, starting from an empty polygon: {error}");
                BoundaryPolygon::empty()
            }
        }
    }

    /// Prices a boundary polygon in physical units and inverts the growth
    /// model. The reference object anchors the px-to-mm scale.
    pub fn analyze(
        &self,
        polygon: &BoundaryPolygon,
        reference: &ReferenceShape,
        film_diameter_mm: f64,
    ) -> Result<AnalysisResult> {
        let scale = CalibrationScale::from_shape(reference)?;
        let red_area_mm2 = geometry::polygon_area_mm2(polygon, scale);
        Ok(concentration::analyze(
            red_area_mm2,
            film_diameter_mm,
            self.config.film_thickness_mm,
            &self.coefficients,
        ))
    }

    pub fn get_config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Snapshot failures are logged and swallowed; they must never fail a
    /// detection.
    fn dump_mask(&self, stage: &str, mask: &crate::core_modules::raster::Mask) {
        if let Some(dir) = &self.config.debug_dump_dir {
            let path = dir.join(format!("{stage}.png"));
            if let Err(error) = image_helper::save_mask(&path, mask) {
                log::warn!("could not write {stage} snapshot: {error}");
            }
        }
    }
}
