use std::path::Path;
use std::sync::Mutex;

use candle_core::{Device, IndexOp, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::whisper::{self as m, Config};
use hf_hub::api::sync::ApiBuilder;
use hf_hub::{Repo, RepoType};
use serde_json::{Value, json};
use tokenizers::Tokenizer;

use crate::application::ports::{EngineError, HotEngine};
use crate::domain::{DecodeOptions, TranscriptionResult};

use super::audio_decoder::{TARGET_SAMPLE_RATE, decode_audio_file};

const START_OF_PREV_TOKEN: &str = "<|startofprev|>";
const SAMPLING_SEED: u64 = 299_792_458;
const MEL_FILTERS_REPO: &str = "FL33TW00D-HF/whisper-base";

const LANGUAGE_CODES: &[&str] = &[
    "en", "zh", "de", "es", "ru", "ko", "fr", "ja", "pt", "tr", "pl", "ca", "nl", "ar", "sv",
    "it", "id", "hi", "fi", "vi", "he", "uk", "el", "ms", "cs", "ro", "da", "hu", "ta", "no",
    "th", "ur", "hr", "bg", "lt", "la", "mi", "ml", "cy", "sk", "te", "fa", "lv", "bn", "sr",
    "az", "sl", "kn", "et", "mk", "br", "eu", "is", "hy", "ne", "mn", "bs", "kk", "sq", "sw",
    "gl", "mr", "pa", "si", "km", "sn", "yo", "so", "af", "oc", "ka", "be", "tg", "sd", "gu",
    "am", "yi", "lo", "uz", "fo", "ht", "ps", "tk", "nn", "mt", "sa", "lb", "my", "bo", "tl",
    "mg", "as", "tt", "haw", "ln", "ha", "ba", "jw", "su", "yue",
];

/// Maps a bare whisper model size (`medium`, `large-v3`) to its Hugging Face
/// repository. Ids that already name a repository are kept as-is.
pub fn model_repo_id(model: &str) -> String {
    if model.contains('/') {
        model.to_string()
    } else {
        format!("openai/whisper-{model}")
    }
}

/// Whisper loaded once into memory and run with Candle.
pub struct CandleWhisperEngine {
    model: Mutex<m::model::Whisper>,
    tokenizer: Tokenizer,
    config: Config,
    device: Device,
    mel_filters: Vec<f32>,
}

impl CandleWhisperEngine {
    /// Downloads (or reuses from `cache_dir`) the weights for `model` and loads them.
    pub fn load(model: &str, cache_dir: &Path) -> Result<Self, EngineError> {
        let device = Device::cuda_if_available(0)
            .map_err(|e| EngineError::ModelLoadFailed(format!("device: {}", e)))?;
        let repo_id = model_repo_id(model);

        tracing::info!(
            device = ?device,
            repo = %repo_id,
            cache_dir = %cache_dir.display(),
            "Loading hot worker model into memory"
        );

        let api = ApiBuilder::new()
            .with_cache_dir(cache_dir.to_path_buf())
            .build()
            .map_err(|e| EngineError::ModelLoadFailed(e.to_string()))?;
        let repo = api.repo(Repo::new(repo_id, RepoType::Model));

        let config_path = repo
            .get("config.json")
            .map_err(|e| EngineError::ModelLoadFailed(format!("config.json: {}", e)))?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(|e| EngineError::ModelLoadFailed(format!("tokenizer.json: {}", e)))?;
        let weights_path = repo
            .get("model.safetensors")
            .map_err(|e| EngineError::ModelLoadFailed(format!("model.safetensors: {}", e)))?;

        let config_contents = std::fs::read_to_string(&config_path)
            .map_err(|e| EngineError::ModelLoadFailed(format!("read config: {}", e)))?;
        let config: Config = serde_json::from_str(&config_contents)
            .map_err(|e| EngineError::ModelLoadFailed(format!("parse config: {}", e)))?;

        let mel_file = mel_filters_file(config.num_mel_bins);
        let mel_bytes_path = api
            .repo(Repo::new(MEL_FILTERS_REPO.to_string(), RepoType::Model))
            .get(mel_file)
            .map_err(|e| EngineError::ModelLoadFailed(format!("{}: {}", mel_file, e)))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| EngineError::ModelLoadFailed(format!("tokenizer: {}", e)))?;

        let mel_bytes = std::fs::read(&mel_bytes_path)
            .map_err(|e| EngineError::ModelLoadFailed(format!("mel filters: {}", e)))?;
        let mel_filters = read_mel_filters(&mel_bytes, &config)?;

        // SAFETY: safetensors files are memory-mapped read-only
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], m::DTYPE, &device)
                .map_err(|e| EngineError::ModelLoadFailed(format!("weights: {}", e)))?
        };

        let whisper = m::model::Whisper::load(&vb, config.clone())
            .map_err(|e| EngineError::ModelLoadFailed(format!("model: {}", e)))?;

        tracing::info!(model, "Hot worker model loaded");

        Ok(Self {
            model: Mutex::new(whisper),
            tokenizer,
            config,
            device,
            mel_filters,
        })
    }

    fn mel_for_window(&self, window: &[f32]) -> Result<Tensor, EngineError> {
        let mut samples = window.to_vec();
        samples.resize(m::N_SAMPLES, 0.0);

        let mel_data = m::audio::pcm_to_mel(&self.config, &samples, &self.mel_filters);
        let n_mel = self.config.num_mel_bins;
        let n_frames = mel_data.len() / n_mel;

        Tensor::from_vec(mel_data, (1, n_mel, n_frames), &self.device)
            .map_err(|e| EngineError::InferenceFailed(format!("mel tensor: {}", e)))
    }

    fn special_token(&self, token: &str) -> Result<u32, EngineError> {
        self.tokenizer
            .token_to_id(token)
            .ok_or_else(|| EngineError::InferenceFailed(format!("token not found: {}", token)))
    }

    /// Prompt tokens placed before the start-of-transcript marker.
    fn priming_tokens(&self, prompt: Option<&str>) -> Result<Vec<u32>, EngineError> {
        let Some(prompt) = prompt else {
            return Ok(Vec::new());
        };
        let Some(start_of_prev) = self.tokenizer.token_to_id(START_OF_PREV_TOKEN) else {
            tracing::warn!("Tokenizer has no previous-text token, ignoring prompt");
            return Ok(Vec::new());
        };

        let encoding = self
            .tokenizer
            .encode(format!(" {}", prompt.trim()), false)
            .map_err(|e| EngineError::InferenceFailed(format!("prompt encoding: {}", e)))?;
        let ids = encoding.get_ids();
        let keep = (self.config.max_target_positions / 2).saturating_sub(1);
        let start = ids.len().saturating_sub(keep);

        let mut tokens = Vec::with_capacity(ids.len() - start + 1);
        tokens.push(start_of_prev);
        tokens.extend_from_slice(&ids[start..]);
        Ok(tokens)
    }
}

impl HotEngine for CandleWhisperEngine {
    fn transcribe(
        &self,
        audio_path: &Path,
        options: &DecodeOptions,
    ) -> Result<TranscriptionResult, EngineError> {
        let audio = decode_audio_file(audio_path)?;
        let total_secs = audio.duration_secs();

        let sot = self.special_token(m::SOT_TOKEN)?;
        let transcribe = self.special_token(m::TRANSCRIBE_TOKEN)?;
        let no_timestamps = self.special_token(m::NO_TIMESTAMPS_TOKEN)?;
        let eot = self.special_token(m::EOT_TOKEN)?;
        let priming = self.priming_tokens(options.prompt.as_deref())?;
        let context = self.config.max_target_positions;
        let max_tokens = context / 2;

        let temperature = (options.temperature > 0.0).then_some(options.temperature as f64);
        let mut sampler = LogitsProcessor::new(SAMPLING_SEED, temperature, None);

        let mut model = self
            .model
            .lock()
            .map_err(|_| EngineError::InferenceFailed("model lock poisoned".to_string()))?;

        let mut language = options.language.clone();
        let mut segments = Vec::new();
        let mut texts = Vec::new();
        let window_secs = m::N_SAMPLES as f32 / TARGET_SAMPLE_RATE as f32;

        for (index, window) in audio.samples.chunks(m::N_SAMPLES).enumerate() {
            let mel = self.mel_for_window(window)?;
            let features = model
                .encoder
                .forward(&mel, true)
                .map_err(|e| EngineError::InferenceFailed(format!("encoder: {}", e)))?;

            let code = match &language {
                Some(code) => code.clone(),
                None => {
                    let detected = detect_language(&mut model, &self.tokenizer, &features, sot)
                        .map_err(|e| {
                            EngineError::InferenceFailed(format!("language detection: {}", e))
                        })?;
                    tracing::debug!(language = %detected, "Language detected");
                    language = Some(detected.clone());
                    detected
                }
            };
            let language_token = self.special_token(&format!("<|{}|>", code))?;

            let mut prefix = priming.clone();
            prefix.extend([sot, language_token, transcribe, no_timestamps]);

            tracing::debug!(segment = index, "Transcribing audio window");
            let steps = decode_budget(prefix.len(), max_tokens, context);
            let generated = decode_tokens(&mut model, &features, &prefix, eot, steps, &mut sampler)
                .map_err(|e| EngineError::InferenceFailed(format!("decoder: {}", e)))?;
            let text = self
                .tokenizer
                .decode(&generated, true)
                .map_err(|e| EngineError::InferenceFailed(format!("detokenize: {}", e)))?
                .trim()
                .to_string();

            let start = index as f32 * window_secs;
            let end = (start + window_secs).min(total_secs);
            segments.push(json!({
                "id": index,
                "start": start,
                "end": end,
                "text": text,
            }));
            if !text.is_empty() {
                texts.push(text);
            }
        }

        let transcript = texts.join(" ");

        tracing::info!(
            segments = segments.len(),
            chars = transcript.len(),
            "Hot engine transcription completed"
        );

        Ok(TranscriptionResult::from_text(transcript)
            .with_field("segments", Value::Array(segments))
            .with_field("language", language.map(Value::String).unwrap_or(Value::Null)))
    }
}

/// Steps left for generation so that prefix plus output never exceeds the
/// decoder context.
fn decode_budget(prefix_len: usize, max_tokens: usize, context: usize) -> usize {
    max_tokens.min(context.saturating_sub(prefix_len))
}

fn decode_tokens(
    model: &mut m::model::Whisper,
    features: &Tensor,
    prefix: &[u32],
    eot: u32,
    steps: usize,
    sampler: &mut LogitsProcessor,
) -> candle_core::Result<Vec<u32>> {
    let device = features.device();
    let mut tokens = prefix.to_vec();
    let mut generated = Vec::new();

    for step in 0..steps {
        let token_tensor = Tensor::new(tokens.as_slice(), device)?.unsqueeze(0)?;
        let ys = model.decoder.forward(&token_tensor, features, step == 0)?;
        let (_, seq_len, _) = ys.dims3()?;
        let logits = model
            .decoder
            .final_linear(&ys.i((..1, seq_len - 1..))?)?
            .i(0)?
            .i(0)?;

        let next = sampler.sample(&logits)?;
        if next == eot {
            break;
        }
        tokens.push(next);
        generated.push(next);
    }

    model.reset_kv_cache();
    Ok(generated)
}

fn detect_language(
    model: &mut m::model::Whisper,
    tokenizer: &Tokenizer,
    features: &Tensor,
    sot: u32,
) -> candle_core::Result<String> {
    let device = features.device();
    let (codes, ids): (Vec<&str>, Vec<u32>) = LANGUAGE_CODES
        .iter()
        .filter_map(|code| {
            tokenizer
                .token_to_id(&format!("<|{}|>", code))
                .map(|id| (*code, id))
        })
        .unzip();

    let tokens = Tensor::new(&[sot], device)?.unsqueeze(0)?;
    let ys = model.decoder.forward(&tokens, features, true)?;
    let logits = model.decoder.final_linear(&ys.i((..1, ..1))?)?.i(0)?.i(0)?;
    let language_logits = logits.index_select(&Tensor::new(ids.as_slice(), device)?, 0)?;
    let best = language_logits.argmax(0)?.to_scalar::<u32>()? as usize;
    model.reset_kv_cache();

    Ok(codes.get(best).copied().unwrap_or("en").to_string())
}

/// large-v3 uses 128 mel bins, every earlier model 80.
fn mel_filters_file(num_mel_bins: usize) -> &'static str {
    if num_mel_bins == 128 {
        "melfilters128.bytes"
    } else {
        "melfilters.bytes"
    }
}

fn read_mel_filters(bytes: &[u8], config: &Config) -> Result<Vec<f32>, EngineError> {
    let expected_len = config.num_mel_bins * (m::N_FFT / 2 + 1);
    if bytes.len() < expected_len * 4 {
        return Err(EngineError::ModelLoadFailed(format!(
            "mel filters file too small: {} bytes, expected at least {}",
            bytes.len(),
            expected_len * 4
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .take(expected_len)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}
