use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::DecodeOptions;

use super::TranscriptionError;

/// A short-lived external process that transcribes one staged file and exits.
#[async_trait]
pub trait ColdWorker: Send + Sync {
    /// Runs the worker to completion. Success means the worker exited cleanly;
    /// the result is read from [`ColdWorker::output_path_for`] afterwards.
    async fn run(
        &self,
        input: &Path,
        output_dir: &Path,
        options: &DecodeOptions,
    ) -> Result<(), TranscriptionError>;

    /// Where the worker writes the result for `input`.
    fn output_path_for(&self, input: &Path, output_dir: &Path) -> PathBuf;
}
