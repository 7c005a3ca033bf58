use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::application::ports::TranscriptionError;

/// Owns a transient file for the span of one lane invocation.
///
/// The file is removed by [`ArtifactGuard::release`], [`ArtifactGuard::discard`]
/// or, as a last resort, on drop. A file that never appeared is not an error.
#[derive(Debug)]
pub struct ArtifactGuard {
    path: PathBuf,
    armed: bool,
}

impl ArtifactGuard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            armed: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the file now. `Ok(false)` means there was nothing to remove.
    pub fn release(mut self) -> io::Result<bool> {
        self.armed = false;
        remove_if_exists(&self.path)
    }

    /// Removes the file now, logging instead of returning a failure.
    pub fn discard(self) {
        let path = self.path.clone();
        match self.release() {
            Ok(true) => tracing::debug!(path = %path.display(), "Artifact removed"),
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "Failed to remove artifact")
            }
        }
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = remove_if_exists(&self.path) {
            tracing::warn!(
                error = %e,
                path = %self.path.display(),
                "Failed to remove abandoned artifact"
            );
        }
    }
}

/// Writes `data` to a freshly named file in `dir` and hands ownership to a guard.
pub fn write_artifact(
    dir: &Path,
    prefix: &str,
    suffix: &str,
    data: &[u8],
) -> Result<ArtifactGuard, TranscriptionError> {
    let mut file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(suffix)
        .tempfile_in(dir)
        .map_err(|e| TranscriptionError::artifact_io(dir, e))?;

    if let Err(e) = file.write_all(data).and_then(|_| file.flush()) {
        return Err(TranscriptionError::artifact_io(file.path(), e));
    }

    let path = file
        .into_temp_path()
        .keep()
        .map_err(|e| TranscriptionError::artifact_io(e.path.to_path_buf(), e.error))?;

    Ok(ArtifactGuard::new(path))
}

fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
