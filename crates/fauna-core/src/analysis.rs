//! Detection result → match report.
//!
//! Glues extraction, ranking and synthesis together and defines the error
//! kinds a caller sees for one analysis request.

use crate::extractor::{extract_ratios, ExtractError};
use crate::illustration::{synthesize, Illustration};
use crate::landmarks::LandmarkIndexMap;
use crate::ranker::{display_percent, rank};
use crate::registry::Registry;
use crate::types::{LandmarkPoint, RatioVector};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("face model is still loading — retry once it is ready")]
    ModelNotReady,
    #[error("face model failed to load: {0}")]
    ModelLoadFailure(String),
    #[error("no face detected — try a different photo")]
    NoFaceDetected,
    #[error("unusable face geometry: {0}")]
    DegenerateGeometry(ExtractError),
    #[error("detection failed: {0}")]
    Detection(String),
    #[error("archetype catalog is empty")]
    EmptyRegistry,
}

impl From<ExtractError> for AnalysisError {
    fn from(err: ExtractError) -> Self {
        AnalysisError::DegenerateGeometry(err)
    }
}

/// Lifecycle of the detection collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Loading,
    Ready,
    Failed(String),
}

impl Readiness {
    /// Fail fast unless the detector can take a request.
    pub fn check(&self) -> Result<(), AnalysisError> {
        match self {
            Readiness::Ready => Ok(()),
            Readiness::Loading => Err(AnalysisError::ModelNotReady),
            Readiness::Failed(reason) => Err(AnalysisError::ModelLoadFailure(reason.clone())),
        }
    }
}

/// One row of the full ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub key: String,
    pub name: String,
    pub score: f64,
    pub percent: u8,
}

/// Everything the presentation layer needs for one analyzed face.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    pub key: String,
    pub name: String,
    pub description: String,
    pub score: f64,
    pub percent: u8,
    pub ratios: RatioVector,
    pub illustration: Illustration,
    pub ranking: Vec<RankedEntry>,
}

/// Match the first detected face against the catalog.
///
/// Extraction completes before ranking starts; any geometry error aborts
/// the request without a partial result.
pub fn analyze_faces(
    faces: &[Vec<LandmarkPoint>],
    map: &LandmarkIndexMap,
    registry: &Registry,
) -> Result<MatchReport, AnalysisError> {
    let face = faces.first().ok_or(AnalysisError::NoFaceDetected)?;
    if faces.len() > 1 {
        tracing::warn!(faces = faces.len(), "multiple faces detected; using the first");
    }

    let ratios = extract_ratios(face, map)?;

    let ranked = rank(&ratios, registry.profiles());
    let best = ranked.first().ok_or(AnalysisError::EmptyRegistry)?;
    let percent = display_percent(best.score);

    tracing::info!(
        key = %best.profile.key,
        score = best.score,
        percent,
        "archetype matched"
    );

    let ranking = ranked
        .iter()
        .map(|c| RankedEntry {
            key: c.profile.key.clone(),
            name: c.profile.name.clone(),
            score: c.score,
            percent: display_percent(c.score),
        })
        .collect();

    Ok(MatchReport {
        key: best.profile.key.clone(),
        name: best.profile.name.clone(),
        description: best.profile.description.clone(),
        score: best.score,
        percent,
        ratios,
        illustration: synthesize(&best.profile.traits, &best.profile.accent),
        ranking,
    })
}
