use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::Environment as EnvironmentSource;
use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::infrastructure::observability::debug_enabled;

use super::Environment;

const MODEL_CACHE_SUBDIR: &str = "whisper";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub engine: EngineSettings,
    pub worker: WorkerSettings,
    pub lanes: LaneSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Whisper model id shared by the hot engine and cold workers.
    pub model: String,
    pub cache_home: PathBuf,
}

impl EngineSettings {
    /// Model cache directory shared by both lanes.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_home.join(MODEL_CACHE_SUBDIR)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSettings {
    /// Empty means the script is executed directly.
    pub interpreter: String,
    pub script: PathBuf,
}

impl WorkerSettings {
    pub fn interpreter(&self) -> Option<&Path> {
        let trimmed = self.interpreter.trim();
        (!trimmed.is_empty()).then(|| Path::new(trimmed))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LaneSettings {
    pub staging_dir: Option<PathBuf>,
    pub fast_lane_temp_dir: Option<PathBuf>,
    /// `0` leaves the slow lane unbounded.
    pub max_cold_workers: usize,
    pub blocking_threads: usize,
}

impl LaneSettings {
    /// Falls back to the model cache directory when no staging dir is configured.
    pub fn staging_dir(&self, engine: &EngineSettings) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(|| engine.cache_dir())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub debug: bool,
    pub enable_json: bool,
}

impl Settings {
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Self::from_env_map(environment, std::env::vars().collect())
    }

    /// Layers defaults, the optional `appsettings.<env>` file, `APP_` variables
    /// (`__` separates sections) and finally the legacy whisper variables.
    pub fn from_env_map(
        environment: Environment,
        env: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let legacy = |key: &str| env.get(key).cloned();
        let debug = env.get("DEBUG").map(|v| debug_enabled(Some(v)));

        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("server.max_upload_mb", 100)?
            .set_default("engine.model", "medium")?
            .set_default("engine.cache_home", "/opt/ai/models/speech")?
            .set_default("worker.interpreter", "/usr/local/lib/whisper/bin/python")?
            .set_default("worker.script", "/usr/local/lib/whisper/bin/whisper")?
            .set_default("lanes.max_cold_workers", 0)?
            .set_default("lanes.blocking_threads", 8)?
            .set_default("logging.debug", false)?
            .set_default("logging.enable_json", false)?
            .add_source(File::with_name(&environment.settings_file()).required(false))
            .add_source(
                EnvironmentSource::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(env.clone())),
            )
            .set_override_option("engine.model", legacy("WHISPER_MODEL"))?
            .set_override_option("engine.cache_home", legacy("XDG_CACHE_HOME"))?
            .set_override_option("server.port", legacy("SERVER_PORT"))?
            .set_override_option("logging.debug", debug)?
            .build()?
            .try_deserialize()
    }
}
