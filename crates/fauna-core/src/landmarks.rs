//! Landmark index table.
//!
//! The extractor reads twelve semantic points out of a detector's landmark
//! sequence. Which array index holds which point is a property of the
//! detector, so the mapping lives here as data and is passed explicitly.

use serde::{Deserialize, Serialize};

/// Index of each semantic point the extractor needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandmarkIndexMap {
    pub face_top: usize,
    pub face_bottom: usize,
    pub face_left: usize,
    pub face_right: usize,
    pub left_eye_outer: usize,
    pub right_eye_outer: usize,
    pub mouth_left: usize,
    pub mouth_right: usize,
    pub nose_bridge: usize,
    pub nose_tip: usize,
    pub jaw_left: usize,
    pub jaw_right: usize,
}

impl LandmarkIndexMap {
    /// MediaPipe 468-point face mesh numbering.
    pub const FACE_MESH_468: LandmarkIndexMap = LandmarkIndexMap {
        face_top: 10,
        face_bottom: 152,
        face_left: 234,
        face_right: 454,
        left_eye_outer: 33,
        right_eye_outer: 263,
        mouth_left: 61,
        mouth_right: 291,
        nose_bridge: 168,
        nose_tip: 1,
        jaw_left: 172,
        jaw_right: 397,
    };

    pub fn indices(&self) -> [usize; 12] {
        [
            self.face_top,
            self.face_bottom,
            self.face_left,
            self.face_right,
            self.left_eye_outer,
            self.right_eye_outer,
            self.mouth_left,
            self.mouth_right,
            self.nose_bridge,
            self.nose_tip,
            self.jaw_left,
            self.jaw_right,
        ]
    }

    /// Minimum landmark count a detection must have for this map.
    pub fn required_len(&self) -> usize {
        self.indices().iter().max().map_or(0, |&m| m + 1)
    }
}

impl Default for LandmarkIndexMap {
    fn default() -> Self {
        Self::FACE_MESH_468
    }
}
