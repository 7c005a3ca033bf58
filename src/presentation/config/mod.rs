mod environment;
mod settings;

pub use environment::{ENVIRONMENT_VAR, Environment};
pub use settings::{
    EngineSettings, LaneSettings, LoggingSettings, ServerSettings, Settings, WorkerSettings,
};
