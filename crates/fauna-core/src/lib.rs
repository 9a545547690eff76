//! fauna-core — Face-to-archetype matching engine.
//!
//! Turns facial landmarks into a scale-invariant ratio vector, ranks it
//! against a static catalog of animal archetypes, and synthesizes an SVG
//! illustration from the winning archetype's traits.

pub mod analysis;
pub mod extractor;
pub mod illustration;
pub mod landmarks;
pub mod ranker;
pub mod registry;
pub mod types;

pub use analysis::{analyze_faces, AnalysisError, MatchReport, RankedEntry, Readiness};
pub use extractor::{extract_ratios, ExtractError};
pub use illustration::{render_gallery, synthesize, Illustration};
pub use landmarks::LandmarkIndexMap;
pub use ranker::{display_percent, rank, rank_with, Scorer, ToleranceScorer, SIMILARITY_TOLERANCE};
pub use registry::{AccentColor, ArchetypeProfile, Registry, RegistryError, TraitSet};
pub use types::{LandmarkPoint, RatioKey, RatioVector, ScoredCandidate};
