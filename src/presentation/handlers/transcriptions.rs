use axum::Json;
use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use super::openai_types::ErrorResponse;
use crate::domain::{
    DEFAULT_TEMPERATURE, DecodeOptions, LaneOutcome, ResponseFormat, TranscriptionRequest,
};
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

pub const LANE_HEADER: &str = "x-transcription-lane";

/// Raw multipart fields of an OpenAI-style transcription request.
#[derive(Debug, Default)]
struct TranscriptionForm {
    file: Option<Bytes>,
    language: Option<String>,
    prompt: Option<String>,
    response_format: Option<String>,
    temperature: Option<String>,
}

impl TranscriptionForm {
    async fn read(multipart: &mut Multipart) -> Result<Self, String> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| format!("Failed to read multipart: {}", e))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match name.as_str() {
                "file" => {
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| format!("Failed to read file: {}", e))?;
                    form.file = Some(data);
                }
                "language" => form.language = Some(read_text(field, &name).await?),
                "prompt" => form.prompt = Some(read_text(field, &name).await?),
                "response_format" => form.response_format = Some(read_text(field, &name).await?),
                "temperature" => form.temperature = Some(read_text(field, &name).await?),
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }
        Ok(form)
    }

    fn into_request(self) -> Result<TranscriptionRequest, String> {
        let audio = self.file.ok_or_else(|| "No file uploaded".to_string())?;
        let temperature = match self.temperature.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_TEMPERATURE,
            Some(raw) => parse_temperature(raw)?,
        };
        let response_format = self
            .response_format
            .as_deref()
            .map(ResponseFormat::parse)
            .unwrap_or_default();

        Ok(TranscriptionRequest::new(
            audio,
            DecodeOptions::new(self.language, self.prompt, temperature),
        )
        .with_response_format(response_format))
    }
}

async fn read_text(field: Field<'_>, name: &str) -> Result<String, String> {
    field
        .text()
        .await
        .map_err(|e| format!("Failed to read field {}: {}", name, e))
}

fn parse_temperature(raw: &str) -> Result<f32, String> {
    match raw.parse::<f32>() {
        Ok(t) if t.is_finite() && t >= 0.0 => Ok(t),
        _ => Err(format!("Invalid temperature: {}", raw)),
    }
}

/// Runs inside the request span opened by the request id middleware, which
/// picks up the chosen lane.
pub async fn transcriptions_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let request = match TranscriptionForm::read(&mut multipart)
        .await
        .and_then(TranscriptionForm::into_request)
    {
        Ok(request) => request,
        Err(message) => {
            tracing::warn!(error = %message, "Rejected transcription request");
            return error_response(StatusCode::BAD_REQUEST, message);
        }
    };

    tracing::debug!(
        bytes = request.audio.len(),
        language = request.options.language.as_deref().unwrap_or("auto"),
        prompt = %sanitize_prompt(request.options.prompt.as_deref()),
        temperature = request.options.temperature,
        response_format = request.response_format.as_str(),
        "Transcription request received"
    );

    match state.dispatcher.dispatch(&request).await {
        Ok(outcome) => {
            tracing::Span::current().record("lane", outcome.lane.as_str());
            render(outcome, request.response_format)
        }
        Err(e) => {
            tracing::error!(error = %e, "Transcription failed");
            let status = if e.is_unavailable() {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            error_response(status, e.to_string())
        }
    }
}

fn render(outcome: LaneOutcome, format: ResponseFormat) -> Response {
    let lane = [(LANE_HEADER, outcome.lane.as_str())];
    match format {
        ResponseFormat::Text => (StatusCode::OK, lane, outcome.result.text().to_string()).into_response(),
        ResponseFormat::Json => (StatusCode::OK, lane, Json(outcome.result)).into_response(),
    }
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}
