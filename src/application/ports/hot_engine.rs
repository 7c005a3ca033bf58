use std::path::Path;

use crate::domain::{DecodeOptions, TranscriptionResult};

/// A memory-resident speech-to-text engine.
///
/// Calls block the current thread for the whole inference and must never run
/// concurrently on the same instance; callers serialize access through the
/// admission permit and run the call on the blocking pool.
pub trait HotEngine: Send + Sync {
    fn transcribe(
        &self,
        audio_path: &Path,
        options: &DecodeOptions,
    ) -> Result<TranscriptionResult, EngineError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("audio decoding failed: {0}")]
    DecodingFailed(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("model loading failed: {0}")]
    ModelLoadFailed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
