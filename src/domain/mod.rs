mod lane;
mod transcription_request;
mod transcription_result;

pub use lane::{Lane, LaneOutcome};
pub use transcription_request::{
    DEFAULT_TEMPERATURE, DecodeOptions, ResponseFormat, TranscriptionRequest,
};
pub use transcription_result::TranscriptionResult;
