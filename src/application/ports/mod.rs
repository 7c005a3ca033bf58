mod cold_worker;
mod hot_engine;
mod transcription_error;

pub use cold_worker::ColdWorker;
pub use hot_engine::{EngineError, HotEngine};
pub use transcription_error::TranscriptionError;
