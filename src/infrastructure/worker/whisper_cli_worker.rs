use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::application::ports::{ColdWorker, TranscriptionError};
use crate::domain::{DecodeOptions, Lane};

/// Structured output format requested from the worker; also the result file extension.
pub const WORKER_OUTPUT_FORMAT: &str = "json";

/// Runs the `whisper` command-line tool as a one-shot cold worker.
///
/// The tool writes `<output_dir>/<input stem>.json`. That naming rule lives in
/// [`WhisperCliWorker::output_path_for`] and nowhere else.
#[derive(Debug, Clone)]
pub struct WhisperCliWorker {
    interpreter: Option<PathBuf>,
    script: PathBuf,
    model: String,
    env: Vec<(String, OsString)>,
}

impl WhisperCliWorker {
    pub fn new(script: impl Into<PathBuf>, model: impl Into<String>) -> Self {
        Self {
            interpreter: None,
            script: script.into(),
            model: model.into(),
            env: Vec::new(),
        }
    }

    /// Launch the script through an interpreter, e.g. a virtualenv's python.
    pub fn with_interpreter(mut self, interpreter: impl Into<PathBuf>) -> Self {
        self.interpreter = Some(interpreter.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Points the worker at the model cache shared with the hot engine, so a
    /// cold start costs a process launch and never a model download.
    pub fn with_model_cache(self, cache_home: &Path, cache_dir: &Path) -> Self {
        self.with_env("WHISPER_CACHE_DIR", cache_dir)
            .with_env("XDG_CACHE_HOME", cache_home)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Arguments handed to the whisper CLI itself, in invocation order.
    pub fn cli_arguments(
        &self,
        input: &Path,
        output_dir: &Path,
        options: &DecodeOptions,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            input.into(),
            "--model".into(),
            self.model.clone().into(),
            "--output_format".into(),
            WORKER_OUTPUT_FORMAT.into(),
            "--output_dir".into(),
            output_dir.into(),
            "--temperature".into(),
            format_temperature(options.temperature).into(),
        ];
        if let Some(language) = &options.language {
            args.push("--language".into());
            args.push(language.into());
        }
        if let Some(prompt) = &options.prompt {
            args.push("--initial_prompt".into());
            args.push(prompt.into());
        }
        args
    }

    /// Full command line for log output.
    pub fn command_line(&self, input: &Path, output_dir: &Path, options: &DecodeOptions) -> String {
        let (program, leading) = self.program();
        std::iter::once(program.as_os_str().to_owned())
            .chain(leading.map(|p| p.as_os_str().to_owned()))
            .chain(self.cli_arguments(input, output_dir, options))
            .map(|part| part.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn program(&self) -> (&Path, Option<&Path>) {
        match &self.interpreter {
            Some(interpreter) => (interpreter.as_path(), Some(self.script.as_path())),
            None => (self.script.as_path(), None),
        }
    }

    fn command(&self, input: &Path, output_dir: &Path, options: &DecodeOptions) -> Command {
        let (program, leading) = self.program();
        let mut command = Command::new(program);
        if let Some(script) = leading {
            command.arg(script);
        }
        command
            .args(self.cli_arguments(input, output_dir, options))
            .envs(self.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl ColdWorker for WhisperCliWorker {
    async fn run(
        &self,
        input: &Path,
        output_dir: &Path,
        options: &DecodeOptions,
    ) -> Result<(), TranscriptionError> {
        tracing::debug!(
            command = %self.command_line(input, output_dir, options),
            "Executing cold worker"
        );

        let output = self
            .command(input, output_dir, options)
            .output()
            .await
            .map_err(|e| {
                TranscriptionError::failed(
                    Lane::Slow,
                    format!("failed to spawn worker {}: {e}", self.program().0.display()),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(status = %output.status, "Cold worker failed");
            return Err(TranscriptionError::failed(
                Lane::Slow,
                format!("worker exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        tracing::debug!(stdout_bytes = output.stdout.len(), "Cold worker finished");
        Ok(())
    }

    fn output_path_for(&self, input: &Path, output_dir: &Path) -> PathBuf {
        let mut name = input
            .file_stem()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".");
        name.push(WORKER_OUTPUT_FORMAT);
        output_dir.join(name)
    }
}

/// Always keeps a decimal point so `0` is passed as `0.0`.
fn format_temperature(temperature: f32) -> String {
    format!("{temperature:?}")
}
