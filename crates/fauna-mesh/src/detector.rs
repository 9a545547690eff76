//! Face-mesh detector via ONNX Runtime.
//!
//! Expects the MediaPipe face-landmark model exported to ONNX: a single
//! 192×192 RGB input in NHWC layout with values in [0, 1], one output of
//! 468×3 landmark coordinates in input pixels and one face-presence logit.

use fauna_core::LandmarkPoint;
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

// --- Named constants (no magic numbers) ---
const MESH_INPUT_SIZE: u32 = 192;
const MESH_LANDMARKS: usize = 468;
const MESH_LANDMARK_VALUES: usize = MESH_LANDMARKS * 3;
const MESH_PIXEL_SCALE: f32 = 255.0;

#[derive(Error, Debug)]
pub enum MeshError {
    #[error("model file not found: {0} — place face_landmark.onnx in the model directory")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("image: {0}")]
    Image(#[from] image::ImageError),
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// Anything that can turn a photo into per-face landmark sequences.
pub trait LandmarkDetector: Send {
    /// Detect faces, returning one landmark sequence per face (possibly none).
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<Vec<LandmarkPoint>>, MeshError>;
}

/// Metadata for coordinate de-mapping after letterbox resize.
#[derive(Debug, Clone, Copy)]
struct LetterboxInfo {
    scale: f32,
    pad_x: f32,
    pad_y: f32,
}

impl LetterboxInfo {
    fn compute(width: u32, height: u32) -> Self {
        let size = MESH_INPUT_SIZE as f32;
        let scale = (size / width as f32).min(size / height as f32);
        let new_w = (width as f32 * scale).round();
        let new_h = (height as f32 * scale).round();
        Self {
            scale,
            pad_x: ((size - new_w) / 2.0).floor(),
            pad_y: ((size - new_h) / 2.0).floor(),
        }
    }

    fn to_source(self, x: f32, y: f32) -> (f64, f64) {
        (
            ((x - self.pad_x) / self.scale) as f64,
            ((y - self.pad_y) / self.scale) as f64,
        )
    }
}

/// Face-mesh landmark detector.
pub struct FaceMeshDetector {
    session: Session,
    output_count: usize,
    /// Face-presence probability below which a frame counts as faceless.
    presence_threshold: f32,
}

impl FaceMeshDetector {
    /// Load the face-mesh ONNX model from the given path.
    pub fn load(
        model_path: &str,
        intra_threads: usize,
        presence_threshold: f32,
    ) -> Result<Self, MeshError> {
        if !Path::new(model_path).exists() {
            return Err(MeshError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(intra_threads)?
            .commit_from_file(model_path)?;

        let output_names: Vec<String> = session.outputs().iter().map(|o| o.name().to_string()).collect();

        tracing::info!(
            path = model_path,
            inputs = ?session.inputs().iter().map(|i| (i.name(), i.dtype())).collect::<Vec<_>>(),
            outputs = ?output_names,
            "loaded face-mesh model"
        );

        if output_names.len() < 2 {
            return Err(MeshError::InferenceFailed(format!(
                "face-mesh model requires landmark and presence outputs, got {}",
                output_names.len()
            )));
        }

        Ok(Self {
            session,
            output_count: output_names.len(),
            presence_threshold,
        })
    }

    /// Letterbox an RGB image into the model's NHWC input tensor.
    fn preprocess(image: &RgbImage) -> (Array4<f32>, LetterboxInfo) {
        let letterbox = LetterboxInfo::compute(image.width(), image.height());
        let new_w = ((image.width() as f32 * letterbox.scale).round() as u32).max(1);
        let new_h = ((image.height() as f32 * letterbox.scale).round() as u32).max(1);

        let resized = imageops::resize(image, new_w, new_h, FilterType::Triangle);
        let mut canvas = RgbImage::from_pixel(MESH_INPUT_SIZE, MESH_INPUT_SIZE, Rgb([0, 0, 0]));
        imageops::overlay(
            &mut canvas,
            &resized,
            letterbox.pad_x as i64,
            letterbox.pad_y as i64,
        );

        let size = MESH_INPUT_SIZE as usize;
        let mut tensor = Array4::<f32>::zeros((1, size, size, 3));
        for (x, y, pixel) in canvas.enumerate_pixels() {
            for c in 0..3 {
                tensor[[0, y as usize, x as usize, c]] = pixel[c] as f32 / MESH_PIXEL_SCALE;
            }
        }

        (tensor, letterbox)
    }
}

impl LandmarkDetector for FaceMeshDetector {
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<Vec<LandmarkPoint>>, MeshError> {
        if image.width() == 0 || image.height() == 0 {
            return Ok(Vec::new());
        }

        let (input, letterbox) = Self::preprocess(image);
        let outputs = self.session.run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let mut tensors = Vec::with_capacity(self.output_count);
        for idx in 0..self.output_count {
            let (_, data) = outputs[idx]
                .try_extract_tensor::<f32>()
                .map_err(|e| MeshError::InferenceFailed(format!("output {idx}: {e}")))?;
            tensors.push(data.to_vec());
        }

        let lens: Vec<usize> = tensors.iter().map(Vec::len).collect();
        let (landmark_idx, presence_idx) = classify_outputs(&lens).ok_or_else(|| {
            MeshError::InferenceFailed(format!(
                "expected a {MESH_LANDMARK_VALUES}-value landmark output and a scalar presence output, got sizes {lens:?}"
            ))
        })?;

        let presence = sigmoid(tensors[presence_idx][0]);
        if presence < self.presence_threshold {
            tracing::debug!(presence, threshold = self.presence_threshold, "no face present");
            return Ok(Vec::new());
        }

        let face = decode_landmarks(&tensors[landmark_idx], letterbox);
        tracing::debug!(presence, points = face.len(), "face-mesh landmarks decoded");
        Ok(vec![face])
    }
}

/// Find the landmark and presence outputs by element count.
///
/// Exports name these tensors inconsistently, but their sizes are fixed.
/// Falls back to positional ordering (landmarks first, presence second)
/// when the sizes are not recognized but still usable.
fn classify_outputs(lens: &[usize]) -> Option<(usize, usize)> {
    let landmarks = lens.iter().position(|&n| n == MESH_LANDMARK_VALUES);
    let presence = lens.iter().position(|&n| n == 1);
    if let (Some(landmarks), Some(presence)) = (landmarks, presence) {
        return Some((landmarks, presence));
    }

    match lens {
        [first, second, ..] if *first >= MESH_LANDMARK_VALUES && *second > 0 => {
            tracing::info!(
                ?lens,
                "face-mesh: output sizes not recognized, using positional mapping [0]=landmarks, [1]=presence"
            );
            Some((0, 1))
        }
        _ => None,
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Map flat `[x, y, z] × 468` model output back to source pixels.
fn decode_landmarks(raw: &[f32], letterbox: LetterboxInfo) -> Vec<LandmarkPoint> {
    raw.chunks_exact(3)
        .take(MESH_LANDMARKS)
        .map(|p| {
            let (x, y) = letterbox.to_source(p[0], p[1]);
            LandmarkPoint {
                x,
                y,
                z: Some((p[2] / letterbox.scale) as f64),
            }
        })
        .collect()
}

/// Decode an image file into RGB.
pub fn load_image(path: &Path) -> Result<RgbImage, MeshError> {
    let image = image::open(path)?;
    tracing::debug!(path = %path.display(), width = image.width(), height = image.height(), "image loaded");
    Ok(image.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letterbox_landscape() {
        let lb = LetterboxInfo::compute(384, 192);
        assert!((lb.scale - 0.5).abs() < 1e-6);
        assert_eq!(lb.pad_x, 0.0);
        assert_eq!(lb.pad_y, 48.0);
    }

    #[test]
    fn test_letterbox_coordinate_roundtrip() {
        let lb = LetterboxInfo::compute(640, 480);
        let (orig_x, orig_y) = (100.0f32, 50.0f32);
        let boxed_x = orig_x * lb.scale + lb.pad_x;
        let boxed_y = orig_y * lb.scale + lb.pad_y;
        let (x, y) = lb.to_source(boxed_x, boxed_y);
        assert!((x - 100.0).abs() < 0.01, "x: {x}");
        assert!((y - 50.0).abs() < 0.01, "y: {y}");
    }

    #[test]
    fn test_preprocess_shape_and_range() {
        let image = RgbImage::from_pixel(320, 240, Rgb([255, 128, 0]));
        let (tensor, lb) = FaceMeshDetector::preprocess(&image);
        assert_eq!(tensor.shape(), &[1, 192, 192, 3]);
        assert!(tensor.iter().all(|v| (0.0..=1.0).contains(v)));

        // Inside the letterboxed region the source color survives.
        let cy = 96;
        let cx = 96;
        let tol = 1.5 / 255.0;
        assert!((tensor[[0, cy, cx, 0]] - 1.0).abs() < tol);
        assert!((tensor[[0, cy, cx, 1]] - 128.0 / 255.0).abs() < tol);
        assert!(tensor[[0, cy, cx, 2]] < tol);

        // Padding rows stay black.
        assert!(lb.pad_y > 0.0);
        assert_eq!(tensor[[0, 0, cx, 0]], 0.0);
    }

    #[test]
    fn test_classify_outputs() {
        assert_eq!(classify_outputs(&[1404, 1]), Some((0, 1)));
        assert_eq!(classify_outputs(&[1, 1404]), Some((1, 0)));
        assert_eq!(classify_outputs(&[1, 266, 1404]), Some((2, 0)));
        assert_eq!(classify_outputs(&[]), None);
    }

    #[test]
    fn test_classify_outputs_positional_fallback() {
        // Sizes not recognized, but output 0 holds enough landmark values.
        assert_eq!(classify_outputs(&[1404, 5]), Some((0, 1)));
        assert_eq!(classify_outputs(&[1434, 2, 7]), Some((0, 1)));
        // Too few landmark values or an empty presence tensor.
        assert_eq!(classify_outputs(&[1000, 5]), None);
        assert_eq!(classify_outputs(&[1404, 0]), None);
        assert_eq!(classify_outputs(&[1404]), None);
    }

    #[test]
    fn test_decode_landmarks_count_and_mapping() {
        let lb = LetterboxInfo { scale: 0.5, pad_x: 0.0, pad_y: 48.0 };
        let mut raw = vec![0.0f32; MESH_LANDMARK_VALUES];
        raw[0] = 10.0;
        raw[1] = 58.0;
        raw[2] = 2.0;
        let points = decode_landmarks(&raw, lb);
        assert_eq!(points.len(), MESH_LANDMARKS);
        assert!((points[0].x - 20.0).abs() < 1e-6);
        assert!((points[0].y - 20.0).abs() < 1e-6);
        assert_eq!(points[0].z, Some(4.0));
    }

    #[test]
    fn test_sigmoid() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!(sigmoid(10.0) > 0.99);
        assert!(sigmoid(-10.0) < 0.01);
    }

    #[test]
    fn test_load_missing_model() {
        let result = FaceMeshDetector::load("/nonexistent/face_landmark.onnx", 1, 0.5);
        assert!(matches!(result, Err(MeshError::ModelNotFound(_))));
    }

    #[test]
    fn test_load_image_missing_file() {
        assert!(matches!(
            load_image(Path::new("/nonexistent/photo.jpg")),
            Err(MeshError::Image(_))
        ));
    }
}
