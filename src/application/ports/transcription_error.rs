use std::io;
use std::path::PathBuf;

use crate::domain::Lane;

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("Model not loaded.")]
    EngineUnavailable,
    #[error("{lane} lane transcription failed: {message}")]
    TranscriptionFailed { lane: Lane, message: String },
    #[error("worker result at {} is unreadable: {reason}", path.display())]
    ResultUnreadable { path: PathBuf, reason: String },
    #[error("artifact io failed at {}: {source}", path.display())]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("slow lane saturated: {limit} cold workers already running")]
    SlowLaneSaturated { limit: usize },
}

impl TranscriptionError {
    pub fn failed(lane: Lane, message: impl Into<String>) -> Self {
        Self::TranscriptionFailed {
            lane,
            message: message.into(),
        }
    }

    pub fn artifact_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::ArtifactIo {
            path: path.into(),
            source,
        }
    }

    /// Errors that mean "try again later" rather than "this request failed".
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            TranscriptionError::EngineUnavailable | TranscriptionError::SlowLaneSaturated { .. }
        )
    }
}
