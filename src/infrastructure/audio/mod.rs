pub mod audio_decoder;
mod candle_whisper_engine;
mod hot_engine_factory;
mod mock_hot_engine;

pub use candle_whisper_engine::{CandleWhisperEngine, model_repo_id};
pub use hot_engine_factory::HotEngineFactory;
pub use mock_hot_engine::{EngineGate, MockHotEngine, SeenCall};
