use std::fmt;

use super::TranscriptionResult;

/// Execution strategy chosen for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    /// In-process transcription on the shared hot engine.
    Fast,
    /// One-shot cold worker process.
    Slow,
}

impl Lane {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lane::Fast => "fast",
            Lane::Slow => "slow",
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transcription result tagged with the lane that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneOutcome {
    pub lane: Lane,
    pub result: TranscriptionResult,
}
