use std::path::Path;
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::application::ports::{ColdWorker, TranscriptionError};
use crate::domain::{Lane, TranscriptionRequest, TranscriptionResult};

use super::artifact_guard::ArtifactGuard;
use super::staging_area::StagingArea;

/// Transcribes by spawning one cold worker per request.
///
/// Never touches the hot engine or its admission permit. Each invocation moves
/// through staged, worker running, result ready or worker failed, and always
/// ends with both staged artifacts removed.
pub struct SlowLaneExecutor {
    staging: StagingArea,
    worker: Arc<dyn ColdWorker>,
    slots: Option<WorkerSlots>,
}

struct WorkerSlots {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

impl SlowLaneExecutor {
    /// Unbounded: every request that reaches the slow lane gets its own worker.
    pub fn new(staging: StagingArea, worker: Arc<dyn ColdWorker>) -> Self {
        Self {
            staging,
            worker,
            slots: None,
        }
    }

    /// Caps concurrent cold workers; `0` keeps the lane unbounded.
    pub fn with_max_workers(mut self, limit: usize) -> Self {
        self.slots = (limit > 0).then(|| WorkerSlots {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        });
        self
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    #[tracing::instrument(skip_all, fields(lane = %Lane::Slow, bytes = request.audio.len()))]
    pub async fn execute(
        &self,
        request: &TranscriptionRequest,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        let _slot = self.reserve_slot()?;

        tracing::debug!("Spawning new cold worker");

        let staging = self.staging.clone();
        let audio = request.audio.clone();
        let input = tokio::task::spawn_blocking(move || staging.stage_audio(&audio))
            .await
            .map_err(|e| TranscriptionError::failed(Lane::Slow, format!("staging aborted: {e}")))??;

        let output = ArtifactGuard::new(
            self.worker
                .output_path_for(input.path(), self.staging.root()),
        );

        let outcome = match self
            .worker
            .run(input.path(), self.staging.root(), &request.options)
            .await
        {
            Ok(()) => read_worker_result(output.path()).await,
            Err(e) => Err(e),
        };

        clean_up(input, output).await;

        if let Ok(result) = &outcome {
            tracing::info!(chars = result.text().len(), "Slow lane transcription completed");
        }
        outcome
    }

    fn reserve_slot(&self) -> Result<Option<OwnedSemaphorePermit>, TranscriptionError> {
        let Some(slots) = &self.slots else {
            return Ok(None);
        };
        match Arc::clone(&slots.semaphore).try_acquire_owned() {
            Ok(permit) => Ok(Some(permit)),
            Err(_) => {
                tracing::warn!(limit = slots.limit, "Cold worker limit reached");
                Err(TranscriptionError::SlowLaneSaturated { limit: slots.limit })
            }
        }
    }
}

async fn read_worker_result(path: &Path) -> Result<TranscriptionResult, TranscriptionError> {
    let unreadable = |reason: String| TranscriptionError::ResultUnreadable {
        path: path.to_path_buf(),
        reason,
    };

    let raw = tokio::fs::read(path)
        .await
        .map_err(|e| unreadable(e.to_string()))?;
    serde_json::from_slice(&raw).map_err(|e| unreadable(e.to_string()))
}

async fn clean_up(input: ArtifactGuard, output: ArtifactGuard) {
    let cleanup = tokio::task::spawn_blocking(move || {
        input.discard();
        output.discard();
    });
    if let Err(e) = cleanup.await {
        tracing::warn!(error = %e, "Artifact cleanup task failed");
    }
    tracing::debug!("Cold worker cleanup complete");
}
