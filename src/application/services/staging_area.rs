use std::io;
use std::path::{Path, PathBuf};

use crate::application::ports::TranscriptionError;

use super::artifact_guard::{ArtifactGuard, write_artifact};

/// Extension given to staged audio so the cold worker can infer the container format.
pub const STAGED_AUDIO_SUFFIX: &str = ".wav";
const STAGED_AUDIO_PREFIX: &str = "cold-";

/// Shared directory holding per-request input and output files for cold workers.
///
/// Concurrent invocations never collide because every staged file gets a
/// freshly generated name; no locking is involved.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stage_audio(&self, audio: &[u8]) -> Result<ArtifactGuard, TranscriptionError> {
        let guard = write_artifact(&self.root, STAGED_AUDIO_PREFIX, STAGED_AUDIO_SUFFIX, audio)?;
        tracing::debug!(path = %guard.path().display(), bytes = audio.len(), "Audio staged");
        Ok(guard)
    }
}
