//! Landmarks → ratio vector.
//!
//! Six distances are measured and normalized by face width or height, so
//! the result does not depend on image resolution or how large the face
//! appears. In-plane rotation and perspective skew are not corrected.

use crate::landmarks::LandmarkIndexMap;
use crate::types::{LandmarkPoint, RatioVector};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("face {measure} is degenerate ({value})")]
    DegenerateGeometry { measure: &'static str, value: f64 },
    #[error("landmark sequence too short: need {needed} points, got {got}")]
    TooFewLandmarks { needed: usize, got: usize },
}

/// Compute the five proportion ratios for one face.
///
/// Fails with [`ExtractError::DegenerateGeometry`] when face width or height
/// is zero or non-finite; no partial vector is ever returned.
pub fn extract_ratios(
    landmarks: &[LandmarkPoint],
    map: &LandmarkIndexMap,
) -> Result<RatioVector, ExtractError> {
    let needed = map.required_len();
    if landmarks.len() < needed {
        return Err(ExtractError::TooFewLandmarks {
            needed,
            got: landmarks.len(),
        });
    }

    let span = |a: usize, b: usize| landmarks[a].distance(&landmarks[b]);

    let face_height = span(map.face_top, map.face_bottom);
    let face_width = span(map.face_left, map.face_right);
    ensure_usable("width", face_width)?;
    ensure_usable("height", face_height)?;

    let eye_distance = span(map.left_eye_outer, map.right_eye_outer);
    let mouth_width = span(map.mouth_left, map.mouth_right);
    let nose_length = span(map.nose_bridge, map.nose_tip);
    let jaw_width = span(map.jaw_left, map.jaw_right);

    let ratios = RatioVector {
        face_ratio: face_height / face_width,
        eye_distance: eye_distance / face_width,
        nose_length: nose_length / face_height,
        mouth_width: mouth_width / face_width,
        jaw_width: jaw_width / face_width,
    };

    // Non-finite coordinates elsewhere in the face still poison a ratio.
    if let Some((key, value)) = ratios.first_invalid() {
        return Err(ExtractError::DegenerateGeometry {
            measure: key.as_str(),
            value,
        });
    }

    tracing::debug!(?ratios, face_width, face_height, "extracted face ratios");
    Ok(ratios)
}

fn ensure_usable(measure: &'static str, value: f64) -> Result<(), ExtractError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ExtractError::DegenerateGeometry { measure, value })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::RatioKey;

    /// Build a 468-point face whose ratios come out as requested.
    ///
    /// Face width is fixed at 1.0 and every measured span is axis-aligned
    /// and anchored at zero, so distances reproduce their inputs exactly.
    pub(crate) fn synthetic_face(r: &RatioVector) -> Vec<LandmarkPoint> {
        let map = LandmarkIndexMap::FACE_MESH_468;
        let height = r.face_ratio;
        let mut pts = vec![LandmarkPoint::new(0.5, 0.5); 468];
        pts[map.face_top] = LandmarkPoint::new(0.5, 0.0);
        pts[map.face_bottom] = LandmarkPoint::new(0.5, height);
        pts[map.face_left] = LandmarkPoint::new(0.0, 0.5);
        pts[map.face_right] = LandmarkPoint::new(1.0, 0.5);
        pts[map.left_eye_outer] = LandmarkPoint::new(0.0, 0.4);
        pts[map.right_eye_outer] = LandmarkPoint::new(r.eye_distance, 0.4);
        pts[map.mouth_left] = LandmarkPoint::new(0.0, 0.8);
        pts[map.mouth_right] = LandmarkPoint::new(r.mouth_width, 0.8);
        pts[map.nose_bridge] = LandmarkPoint::new(0.5, 0.0);
        pts[map.nose_tip] = LandmarkPoint::new(0.5, r.nose_length * height);
        pts[map.jaw_left] = LandmarkPoint::new(0.0, 0.9);
        pts[map.jaw_right] = LandmarkPoint::new(r.jaw_width, 0.9);
        pts
    }

    fn cat() -> RatioVector {
        RatioVector {
            face_ratio: 1.1,
            eye_distance: 0.55,
            nose_length: 0.28,
            mouth_width: 0.42,
            jaw_width: 0.5,
        }
    }

    #[test]
    fn test_extract_synthetic_face() {
        let face = synthetic_face(&cat());
        let r = extract_ratios(&face, &LandmarkIndexMap::FACE_MESH_468).unwrap();
        let expected = cat();
        for (key, value) in r.iter() {
            let want = expected.get(key);
            assert!((value - want).abs() < 1e-12, "{key}: got {value}, expected {want}");
        }
    }

    #[test]
    fn test_extract_scale_invariant() {
        let face = synthetic_face(&cat());
        let scaled: Vec<LandmarkPoint> = face
            .iter()
            .map(|p| LandmarkPoint::new(p.x * 640.0 + 12.0, p.y * 640.0 + 7.0))
            .collect();
        let map = LandmarkIndexMap::FACE_MESH_468;
        let a = extract_ratios(&face, &map).unwrap();
        let b = extract_ratios(&scaled, &map).unwrap();
        for key in RatioKey::ALL {
            assert!((a.get(key) - b.get(key)).abs() < 1e-9, "{key} changed with scale");
        }
    }

    #[test]
    fn test_zero_width_is_degenerate() {
        let map = LandmarkIndexMap::FACE_MESH_468;
        let mut face = synthetic_face(&cat());
        face[map.face_right] = face[map.face_left];
        let err = extract_ratios(&face, &map).unwrap_err();
        assert_eq!(
            err,
            ExtractError::DegenerateGeometry { measure: "width", value: 0.0 }
        );
    }

    #[test]
    fn test_zero_height_is_degenerate() {
        let map = LandmarkIndexMap::FACE_MESH_468;
        let mut face = synthetic_face(&cat());
        face[map.face_bottom] = face[map.face_top];
        assert!(matches!(
            extract_ratios(&face, &map),
            Err(ExtractError::DegenerateGeometry { measure: "height", .. })
        ));
    }

    #[test]
    fn test_non_finite_width_is_degenerate() {
        let map = LandmarkIndexMap::FACE_MESH_468;
        let mut face = synthetic_face(&cat());
        face[map.face_right] = LandmarkPoint::new(f64::INFINITY, 0.5);
        assert!(matches!(
            extract_ratios(&face, &map),
            Err(ExtractError::DegenerateGeometry { measure: "width", .. })
        ));
    }

    #[test]
    fn test_nan_feature_point_is_degenerate() {
        let map = LandmarkIndexMap::FACE_MESH_468;
        let mut face = synthetic_face(&cat());
        face[map.mouth_right] = LandmarkPoint::new(f64::NAN, 0.8);
        assert!(matches!(
            extract_ratios(&face, &map),
            Err(ExtractError::DegenerateGeometry { measure: "mouthWidth", .. })
        ));
    }

    #[test]
    fn test_too_few_landmarks() {
        let face = vec![LandmarkPoint::new(0.0, 0.0); 100];
        let err = extract_ratios(&face, &LandmarkIndexMap::FACE_MESH_468).unwrap_err();
        assert_eq!(err, ExtractError::TooFewLandmarks { needed: 455, got: 100 });
    }

    #[test]
    fn test_custom_index_map() {
        let map = LandmarkIndexMap {
            face_top: 0,
            face_bottom: 1,
            face_left: 2,
            face_right: 3,
            left_eye_outer: 4,
            right_eye_outer: 5,
            mouth_left: 6,
            mouth_right: 7,
            nose_bridge: 8,
            nose_tip: 9,
            jaw_left: 10,
            jaw_right: 11,
        };
        let face = vec![
            LandmarkPoint::new(0.0, 0.0),
            LandmarkPoint::new(0.0, 2.0),
            LandmarkPoint::new(0.0, 1.0),
            LandmarkPoint::new(2.0, 1.0),
            LandmarkPoint::new(0.0, 0.5),
            LandmarkPoint::new(1.0, 0.5),
            LandmarkPoint::new(0.0, 1.5),
            LandmarkPoint::new(0.8, 1.5),
            LandmarkPoint::new(1.0, 0.5),
            LandmarkPoint::new(1.0, 1.1),
            LandmarkPoint::new(0.0, 1.8),
            LandmarkPoint::new(1.2, 1.8),
        ];
        let r = extract_ratios(&face, &map).unwrap();
        assert!((r.face_ratio - 1.0).abs() < 1e-12);
        assert!((r.eye_distance - 0.5).abs() < 1e-12);
        assert!((r.mouth_width - 0.4).abs() < 1e-12);
        assert!((r.nose_length - 0.3).abs() < 1e-12);
        assert!((r.jaw_width - 0.6).abs() < 1e-12);
    }
}
