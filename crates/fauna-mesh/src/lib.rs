//! fauna-mesh — Face-mesh landmark detection.
//!
//! Runs a 468-point face-mesh model via ONNX Runtime and returns landmarks
//! in source-image pixel coordinates, ready for `fauna_core::extract_ratios`.

pub mod detector;

pub use detector::{load_image, FaceMeshDetector, LandmarkDetector, MeshError};
