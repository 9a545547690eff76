use fauna_core::{
    analyze_faces, AnalysisError, LandmarkIndexMap, LandmarkPoint, MatchReport, Readiness,
    Registry,
};
use fauna_mesh::{LandmarkDetector, MeshError};
use image::RgbImage;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to spawn engine thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Messages sent from callers to the engine thread.
enum EngineRequest {
    Detect {
        image: RgbImage,
        reply: oneshot::Sender<Result<Vec<Vec<LandmarkPoint>>, MeshError>>,
    },
}

/// Clone-safe handle to the engine thread.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineRequest>,
    state: watch::Receiver<Readiness>,
}

impl EngineHandle {
    /// Current detector state.
    pub fn readiness(&self) -> Readiness {
        self.state.borrow().clone()
    }

    /// Wait until the detector has either loaded or failed to load.
    pub async fn wait_ready(&self) -> Readiness {
        let mut state = self.state.clone();
        let settled = match state.wait_for(|s| *s != Readiness::Loading).await {
            Ok(s) => s.clone(),
            Err(_) => Readiness::Failed("engine thread exited".into()),
        };
        settled
    }

    /// Detect landmarks and match the first face against `registry`.
    ///
    /// Fails immediately with `ModelNotReady` or `ModelLoadFailure` instead
    /// of queuing while the detector is unavailable.
    pub async fn analyze(
        &self,
        image: RgbImage,
        map: &LandmarkIndexMap,
        registry: &Registry,
    ) -> Result<MatchReport, AnalysisError> {
        self.readiness().check()?;

        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::Detect {
                image,
                reply: reply_tx,
            })
            .await
            .map_err(|_| AnalysisError::Detection("engine thread exited".into()))?;
        let faces = reply_rx
            .await
            .map_err(|_| AnalysisError::Detection("engine thread exited".into()))?
            .map_err(|e| AnalysisError::Detection(e.to_string()))?;

        tracing::debug!(faces = faces.len(), "detection finished");
        analyze_faces(&faces, map, registry)
    }
}

/// Spawn the engine on a dedicated OS thread.
///
/// Returns immediately in the `Loading` state; `load` runs on the engine
/// thread and its outcome is published through the handle's readiness.
pub fn spawn_engine<D, F>(load: F) -> Result<EngineHandle, EngineError>
where
    D: LandmarkDetector + 'static,
    F: FnOnce() -> Result<D, MeshError> + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<EngineRequest>(4);
    let (state_tx, state_rx) = watch::channel(Readiness::Loading);

    std::thread::Builder::new()
        .name("fauna-engine".into())
        .spawn(move || {
            let mut detector = match load() {
                Ok(d) => {
                    tracing::info!("face-mesh detector ready");
                    let _ = state_tx.send(Readiness::Ready);
                    d
                }
                Err(err) => {
                    tracing::error!(error = %err, "face-mesh detector failed to load");
                    let _ = state_tx.send(Readiness::Failed(err.to_string()));
                    return;
                }
            };

            tracing::info!("engine thread started");
            while let Some(req) = rx.blocking_recv() {
                match req {
                    EngineRequest::Detect { image, reply } => {
                        let _ = reply.send(detector.detect(&image));
                    }
                }
            }
            tracing::info!("engine thread exiting");
        })?;

    Ok(EngineHandle { tx, state: state_rx })
}
