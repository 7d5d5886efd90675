use std::path::Path;

use tempfile::NamedTempFile;

use voxrelay::application::ports::{AudioDecoder, AudioDecoderError};
use voxrelay::infrastructure::audio::audio_decoder::{
    FfmpegAudioDecoder, SymphoniaAudioDecoder, TARGET_SAMPLE_RATE, check_ffmpeg_binary,
};

use crate::helpers::build_wav;

fn write_temp(bytes: &[u8], suffix: &str) -> NamedTempFile {
    let file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    std::fs::write(file.path(), bytes).unwrap();
    file
}

fn ffmpeg_available() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn decode_with(decoder: &dyn AudioDecoder, path: &Path) -> Vec<f32> {
    decoder.decode(path).unwrap()
}

#[test]
fn given_16khz_mono_wav_when_decoding_with_symphonia_then_keeps_samples() {
    let wav = build_wav(TARGET_SAMPLE_RATE, 1, &vec![16_384i16; 1600]);
    let file = write_temp(&wav, ".wav");

    let pcm = decode_with(&SymphoniaAudioDecoder, file.path());

    assert_eq!(pcm.len(), 1600);
    assert!(pcm.iter().all(|s| (s - 0.5).abs() < 1e-3));
}

#[test]
fn given_stereo_wav_when_decoding_with_symphonia_then_averages_channels() {
    let interleaved: Vec<i16> = (0..1600).flat_map(|_| [16_384i16, 0]).collect();
    let wav = build_wav(TARGET_SAMPLE_RATE, 2, &interleaved);
    let file = write_temp(&wav, ".wav");

    let pcm = decode_with(&SymphoniaAudioDecoder, file.path());

    assert_eq!(pcm.len(), 1600);
    assert!(pcm.iter().all(|s| (s - 0.25).abs() < 1e-3));
}

#[test]
fn given_44100hz_wav_when_decoding_with_symphonia_then_resamples_to_16khz() {
    let wav = build_wav(44_100, 1, &vec![0i16; 4410]);
    let file = write_temp(&wav, ".wav");

    let pcm = decode_with(&SymphoniaAudioDecoder, file.path());

    // 0.1 s of audio is about 1600 samples at 16 kHz
    assert!(
        (1500..=1600).contains(&pcm.len()),
        "unexpected resampled length {}",
        pcm.len()
    );
}

#[test]
fn given_wav_without_extension_hint_when_decoding_with_symphonia_then_probes_content() {
    let wav = build_wav(TARGET_SAMPLE_RATE, 1, &vec![1000i16; 800]);
    let file = write_temp(&wav, ".bin");

    let pcm = decode_with(&SymphoniaAudioDecoder, file.path());

    assert_eq!(pcm.len(), 800);
}

#[test]
fn given_garbage_bytes_when_decoding_with_symphonia_then_returns_error() {
    let file = write_temp(&[0xFFu8; 128], ".wav");

    let result = SymphoniaAudioDecoder.decode(file.path());

    assert!(result.is_err());
}

#[test]
fn given_missing_file_when_decoding_with_symphonia_then_returns_io_error() {
    let result = SymphoniaAudioDecoder.decode(Path::new("/nonexistent/voxrelay/clip.wav"));

    assert!(matches!(result, Err(AudioDecoderError::Io(_))));
}

#[test]
fn given_wav_when_decoding_via_ffmpeg_then_returns_pcm_samples() {
    if !ffmpeg_available() {
        return;
    }

    let wav = build_wav(TARGET_SAMPLE_RATE, 1, &vec![8_192i16; 1600]);
    let file = write_temp(&wav, ".wav");

    let pcm = decode_with(&FfmpegAudioDecoder, file.path());

    assert_eq!(pcm.len(), 1600);
    assert!(pcm.iter().all(|s| (s - 0.25).abs() < 1e-3));
}

#[test]
fn given_44100hz_wav_when_decoding_via_ffmpeg_then_resamples_to_16khz() {
    if !ffmpeg_available() {
        return;
    }

    let wav = build_wav(44_100, 2, &vec![0i16; 8820]);
    let file = write_temp(&wav, ".wav");

    let pcm = decode_with(&FfmpegAudioDecoder, file.path());

    assert!(
        (1500..=1700).contains(&pcm.len()),
        "unexpected resampled length {}",
        pcm.len()
    );
}

#[test]
fn given_corrupted_file_when_decoding_via_ffmpeg_then_returns_decoding_error() {
    if !ffmpeg_available() {
        return;
    }

    let file = write_temp(&[0xFFu8; 128], ".webm");

    let result = FfmpegAudioDecoder.decode(file.path());

    assert!(matches!(result, Err(AudioDecoderError::DecodingFailed(_))));
}

#[test]
fn given_ffmpeg_in_path_when_checking_binary_then_returns_ok() {
    if !ffmpeg_available() {
        return;
    }

    assert!(check_ffmpeg_binary().is_ok());
}
