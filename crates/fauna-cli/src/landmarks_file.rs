//! Landmark JSON produced by an external detector.
//!
//! Accepts either a single face (`[{"x":..,"y":..}, ...]`) or a list of
//! faces (`[[...], [...]]`). An empty array means no face was found.

use fauna_core::LandmarkPoint;
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkFile {
    Faces(Vec<Vec<LandmarkPoint>>),
    Single(Vec<LandmarkPoint>),
}

pub fn parse(src: &str) -> serde_json::Result<Vec<Vec<LandmarkPoint>>> {
    Ok(match serde_json::from_str::<LandmarkFile>(src)? {
        LandmarkFile::Faces(faces) => faces,
        LandmarkFile::Single(face) => vec![face],
    })
}

pub fn read(path: &Path) -> anyhow::Result<Vec<Vec<LandmarkPoint>>> {
    let src = std::fs::read_to_string(path)?;
    let faces = parse(&src)?;
    tracing::debug!(path = %path.display(), faces = faces.len(), "landmarks loaded");
    Ok(faces)
}
