// THEORY:
// This file is the main entry point for the `filmspot_vision` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the
// public API that will be exposed to external consumers (like a capture UI or
// a batch runner).
//
// The primary goal is to export the `DetectionPipeline` and the
// `DetectionSession` with their associated data structures
// (`DetectionConfig`, `BoundaryPolygon`, `AnalysisResult`, etc.) as the
// clean, high-level interface for the entire measurement engine. The internal
// stages (`core_modules`) stay reachable for callers that need to run a
// single stage in isolation, but the pipeline types are the supported
// surface.

pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use error::{DetectionError, Result};
pub use parallel_pipeline::{DetectionSession, SubmittedDetection};
pub use pipeline::{AnalysisResult, BoundaryPolygon, DetectionConfig, DetectionPipeline};
