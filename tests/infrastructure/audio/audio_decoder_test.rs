use stt_lanes::application::ports::EngineError;
use stt_lanes::infrastructure::audio::audio_decoder::{TARGET_SAMPLE_RATE, decode_audio_file};

fn build_wav(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
    let data_size = (samples.len() * 2) as u32;
    let block_align = channels * 2;
    let byte_rate = sample_rate * block_align as u32;

    let mut wav = Vec::with_capacity(44 + data_size as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_size).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());
    for &s in samples {
        wav.extend_from_slice(&s.to_le_bytes());
    }
    wav
}

fn write_temp(bytes: &[u8], suffix: &str) -> tempfile::NamedTempFile {
    let file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    std::fs::write(file.path(), bytes).unwrap();
    file
}

#[test]
fn given_16khz_wav_when_decoding_then_returns_samples_unchanged_in_length() {
    let file = write_temp(&build_wav(TARGET_SAMPLE_RATE, 1, &[0i16; 1600]), ".wav");

    let audio = decode_audio_file(file.path()).unwrap();

    assert_eq!(audio.samples.len(), 1600);
    assert!((audio.duration_secs() - 0.1).abs() < f32::EPSILON);
}

#[test]
fn given_44100hz_wav_when_decoding_then_resamples_to_16khz() {
    let file = write_temp(&build_wav(44_100, 1, &[0i16; 4410]), ".wav");

    let audio = decode_audio_file(file.path()).unwrap();

    assert!(!audio.samples.is_empty());
    assert!(audio.samples.len() < 4410);
}

#[test]
fn given_stereo_wav_when_decoding_then_downmixes_to_mono() {
    let interleaved: Vec<i16> = (0..800).flat_map(|_| [1000i16, -1000i16]).collect();
    let file = write_temp(&build_wav(TARGET_SAMPLE_RATE, 2, &interleaved), ".wav");

    let audio = decode_audio_file(file.path()).unwrap();

    assert_eq!(audio.samples.len(), 800);
    assert!(audio.samples.iter().all(|s| s.abs() < 1e-3));
}

#[test]
fn given_file_without_extension_when_decoding_then_probes_content() {
    let file = write_temp(&build_wav(TARGET_SAMPLE_RATE, 1, &[0i16; 160]), "");

    let audio = decode_audio_file(file.path()).unwrap();

    assert_eq!(audio.samples.len(), 160);
}

#[test]
fn given_corrupted_bytes_when_decoding_then_returns_decoding_error() {
    let file = write_temp(&[0xFFu8; 128], ".wav");

    let result = decode_audio_file(file.path());

    assert!(matches!(result, Err(EngineError::DecodingFailed(_))));
}

#[test]
fn given_missing_file_when_decoding_then_returns_io_error() {
    let dir = tempfile::TempDir::new().unwrap();

    let result = decode_audio_file(&dir.path().join("gone.wav"));

    assert!(matches!(result, Err(EngineError::Io(_))));
}
