pub mod calibration;
pub mod cluster;
pub mod concentration;
pub mod edge_refine;
pub mod geometry;
pub mod morphology;
pub mod pixel;
pub mod png_decoder;
pub mod polygon;
pub mod raster;
pub mod segmenter;
pub mod utils;
