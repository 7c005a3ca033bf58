use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::ports::{HotEngine, TranscriptionError};
use crate::domain::{DecodeOptions, Lane, TranscriptionRequest, TranscriptionResult};

use super::admission_permit::FastLaneTicket;
use super::artifact_guard::write_artifact;

const HOT_AUDIO_PREFIX: &str = "hot-";

/// Transcribes in-process on the shared hot engine.
pub struct FastLaneExecutor {
    engine: Arc<dyn HotEngine>,
    temp_dir: PathBuf,
}

impl FastLaneExecutor {
    pub fn new(engine: Arc<dyn HotEngine>) -> Self {
        Self {
            engine,
            temp_dir: std::env::temp_dir(),
        }
    }

    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Runs the engine on the blocking pool.
    ///
    /// The ticket travels with the blocking task and is released only once the
    /// engine call has returned, even if the caller stops waiting.
    #[tracing::instrument(skip_all, fields(lane = %Lane::Fast, bytes = request.audio.len()))]
    pub async fn execute(
        &self,
        ticket: FastLaneTicket,
        request: &TranscriptionRequest,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        let engine = Arc::clone(&self.engine);
        let temp_dir = self.temp_dir.clone();
        let audio = request.audio.clone();
        let options = request.options.clone();

        tokio::task::spawn_blocking(move || {
            let outcome = transcribe_on_hot_engine(engine.as_ref(), &temp_dir, &audio, &options);
            drop(ticket);
            outcome
        })
        .await
        .map_err(|e| TranscriptionError::failed(Lane::Fast, format!("engine task aborted: {e}")))?
    }
}

fn transcribe_on_hot_engine(
    engine: &dyn HotEngine,
    temp_dir: &Path,
    audio: &[u8],
    options: &DecodeOptions,
) -> Result<TranscriptionResult, TranscriptionError> {
    let artifact = write_artifact(temp_dir, HOT_AUDIO_PREFIX, "", audio)?;

    tracing::debug!(
        path = %artifact.path().display(),
        language = options.language.as_deref().unwrap_or("auto"),
        temperature = options.temperature,
        "Running hot engine"
    );

    let outcome = engine.transcribe(artifact.path(), options);
    artifact.discard();

    let result = outcome.map_err(|e| TranscriptionError::failed(Lane::Fast, e.to_string()))?;
    tracing::info!(chars = result.text().len(), "Fast lane transcription completed");
    Ok(result)
}
