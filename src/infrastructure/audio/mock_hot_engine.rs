use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use crate::application::ports::{EngineError, HotEngine};
use crate::domain::{DecodeOptions, TranscriptionResult};

/// Blocks engine calls until opened. Used to hold the fast lane busy.
#[derive(Debug, Clone, Default)]
pub struct EngineGate {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl EngineGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self) {
        let (open, signal) = &*self.inner;
        if let Ok(mut open) = open.lock() {
            *open = true;
        }
        signal.notify_all();
    }

    fn wait(&self) {
        let (open, signal) = &*self.inner;
        let Ok(guard) = open.lock() else {
            return;
        };
        let _guard = signal.wait_while(guard, |open| !*open);
    }
}

/// In-memory engine double with scripted output and call bookkeeping.
#[derive(Debug, Default)]
pub struct MockHotEngine {
    failure: Option<String>,
    text: String,
    gate: Option<EngineGate>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    seen: Mutex<Vec<SeenCall>>,
}

/// What the engine observed during one call.
#[derive(Debug, Clone, PartialEq)]
pub struct SeenCall {
    pub path: PathBuf,
    pub audio: Vec<u8>,
    pub options: DecodeOptions,
}

impl MockHotEngine {
    pub fn returning(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_gate(mut self, gate: EngineGate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<SeenCall> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

impl HotEngine for MockHotEngine {
    fn transcribe(
        &self,
        audio_path: &Path,
        options: &DecodeOptions,
    ) -> Result<TranscriptionResult, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let audio = std::fs::read(audio_path);
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(SeenCall {
                path: audio_path.to_path_buf(),
                audio: audio.as_ref().cloned().unwrap_or_default(),
                options: options.clone(),
            });
        }

        if let Some(gate) = &self.gate {
            gate.wait();
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        audio?;
        match &self.failure {
            Some(message) => Err(EngineError::InferenceFailed(message.clone())),
            None => Ok(TranscriptionResult::from_text(self.text.clone()).with_field(
                "language",
                options
                    .language
                    .clone()
                    .map(serde_json::Value::String)
                    .unwrap_or(serde_json::Value::Null),
            )),
        }
    }
}
