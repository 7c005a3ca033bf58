use std::path::Path;
use std::sync::Arc;

use crate::application::ports::{EngineError, HotEngine};

use super::candle_whisper_engine::CandleWhisperEngine;

pub struct HotEngineFactory;

impl HotEngineFactory {
    pub fn create(model: &str, cache_dir: &Path) -> Result<Arc<dyn HotEngine>, EngineError> {
        let engine = CandleWhisperEngine::load(model, cache_dir)?;
        Ok(Arc::new(engine))
    }

    /// Loads the hot engine once at startup. A failure is permanent for the
    /// life of the process: the handle stays empty and the fast lane is never
    /// offered.
    pub fn load_or_disable(model: &str, cache_dir: &Path) -> Option<Arc<dyn HotEngine>> {
        match Self::create(model, cache_dir) {
            Ok(engine) => Some(engine),
            Err(e) => {
                tracing::error!(error = %e, model, "CRITICAL: could not load hot engine model");
                None
            }
        }
    }
}
