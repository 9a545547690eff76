use crate::registry::ArchetypeProfile;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A detected facial keypoint in image space.
///
/// Units are whatever the detector produced (normalized [0, 1] or pixels),
/// but they must be consistent within one detection result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f64,
    pub y: f64,
    /// Depth, when the detector provides one. Ignored by ratio extraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl LandmarkPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    /// Planar Euclidean distance to another point.
    pub fn distance(&self, other: &LandmarkPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The five dimensions of a [`RatioVector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RatioKey {
    FaceRatio,
    EyeDistance,
    NoseLength,
    MouthWidth,
    JawWidth,
}

impl RatioKey {
    /// Canonical key order, shared by extracted vectors and catalog targets.
    pub const ALL: [RatioKey; 5] = [
        RatioKey::FaceRatio,
        RatioKey::EyeDistance,
        RatioKey::NoseLength,
        RatioKey::MouthWidth,
        RatioKey::JawWidth,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RatioKey::FaceRatio => "faceRatio",
            RatioKey::EyeDistance => "eyeDistance",
            RatioKey::NoseLength => "noseLength",
            RatioKey::MouthWidth => "mouthWidth",
            RatioKey::JawWidth => "jawWidth",
        }
    }
}

impl fmt::Display for RatioKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scale-normalized facial proportions.
///
/// `face_ratio` is height over width; `eye_distance`, `mouth_width` and
/// `jaw_width` are relative to face width; `nose_length` is relative to
/// face height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RatioVector {
    pub face_ratio: f64,
    pub eye_distance: f64,
    pub nose_length: f64,
    pub mouth_width: f64,
    pub jaw_width: f64,
}

impl RatioVector {
    pub fn get(&self, key: RatioKey) -> f64 {
        match key {
            RatioKey::FaceRatio => self.face_ratio,
            RatioKey::EyeDistance => self.eye_distance,
            RatioKey::NoseLength => self.nose_length,
            RatioKey::MouthWidth => self.mouth_width,
            RatioKey::JawWidth => self.jaw_width,
        }
    }

    /// Iterate `(key, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (RatioKey, f64)> + '_ {
        RatioKey::ALL.iter().map(move |&k| (k, self.get(k)))
    }

    /// Return the first key whose value is negative or non-finite.
    pub fn first_invalid(&self) -> Option<(RatioKey, f64)> {
        self.iter().find(|(_, v)| !v.is_finite() || *v < 0.0)
    }
}

/// One profile's score from a single ranking call.
#[derive(Debug, Clone, Copy)]
pub struct ScoredCandidate<'a> {
    pub profile: &'a ArchetypeProfile,
    /// Mean per-dimension closeness in [0, 1].
    pub score: f64,
}
