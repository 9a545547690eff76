use std::path::PathBuf;

/// File name of the face-mesh model inside the model directory.
const MESH_MODEL_FILE: &str = "face_landmark.onnx";

/// CLI configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory containing the ONNX face-mesh model.
    pub model_dir: PathBuf,
    /// Replacement archetype catalog; the embedded one is used when unset.
    pub catalog_path: Option<PathBuf>,
    /// Face-presence probability below which a photo counts as faceless.
    pub face_threshold: f32,
    /// ONNX Runtime intra-op thread count.
    pub intra_threads: usize,
}

impl Config {
    /// Load configuration from `FAUNA_*` environment variables with defaults.
    pub fn from_env() -> Self {
        let model_dir = std::env::var("FAUNA_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir().join("models"));

        Self {
            model_dir,
            catalog_path: std::env::var("FAUNA_CATALOG").ok().map(PathBuf::from),
            face_threshold: env_f32("FAUNA_FACE_THRESHOLD", 0.5),
            intra_threads: env_usize("FAUNA_INTRA_THREADS", 2),
        }
    }

    /// Path to the face-mesh model.
    pub fn mesh_model_path(&self) -> String {
        self.model_dir
            .join(MESH_MODEL_FILE)
            .to_string_lossy()
            .into_owned()
    }
}

fn default_data_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local/share")
        })
        .join("fauna")
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
