use bytes::Bytes;

pub const DEFAULT_TEMPERATURE: f32 = 0.0;

/// Shape of a successful response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Json,
    Text,
}

impl ResponseFormat {
    /// Only `text` selects the bare transcript; every other value falls back to JSON.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("text") {
            Self::Text
        } else {
            Self::Json
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Text => "text",
        }
    }
}

/// Decoding parameters shared by both lanes.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeOptions {
    pub language: Option<String>,
    pub prompt: Option<String>,
    pub temperature: f32,
}

impl DecodeOptions {
    pub fn new(language: Option<String>, prompt: Option<String>, temperature: f32) -> Self {
        Self {
            language: non_empty(language),
            prompt: non_empty(prompt),
            temperature,
        }
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            language: None,
            prompt: None,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub audio: Bytes,
    pub options: DecodeOptions,
    pub response_format: ResponseFormat,
}

impl TranscriptionRequest {
    pub fn new(audio: impl Into<Bytes>, options: DecodeOptions) -> Self {
        Self {
            audio: audio.into(),
            options,
            response_format: ResponseFormat::default(),
        }
    }

    pub fn with_response_format(mut self, response_format: ResponseFormat) -> Self {
        self.response_format = response_format;
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
