use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Stdio};

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{AudioDecoder, AudioDecoderError};

pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Shells out to `ffmpeg`, which resamples and downmixes to 16 kHz mono s16le.
pub struct FfmpegAudioDecoder;

/// Fails when no runnable `ffmpeg` is on `PATH`.
pub fn check_ffmpeg_binary() -> Result<(), AudioDecoderError> {
    let output = Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;

    if output.success() {
        Ok(())
    } else {
        Err(AudioDecoderError::DecodingFailed(
            "ffmpeg -version exited with an error".to_string(),
        ))
    }
}

impl AudioDecoder for FfmpegAudioDecoder {
    fn decode(&self, path: &Path) -> Result<Vec<f32>, AudioDecoderError> {
        let output = Command::new("ffmpeg")
            .arg("-nostdin")
            .args(["-threads", "0"])
            .arg("-i")
            .arg(path)
            .args(["-f", "s16le", "-ac", "1", "-acodec", "pcm_s16le"])
            .args(["-ar", &TARGET_SAMPLE_RATE.to_string()])
            .arg("-")
            .stdin(Stdio::null())
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let last_line = stderr.lines().last().unwrap_or("unknown error");
            return Err(AudioDecoderError::DecodingFailed(format!(
                "ffmpeg: {}",
                last_line
            )));
        }

        let samples: Vec<f32> = output
            .stdout
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0)
            .collect();

        if samples.is_empty() {
            return Err(AudioDecoderError::DecodingFailed(
                "no audio samples decoded".to_string(),
            ));
        }

        tracing::debug!(
            samples = samples.len(),
            duration_secs = samples.len() as f32 / TARGET_SAMPLE_RATE as f32,
            "Audio decoded via ffmpeg"
        );

        Ok(samples)
    }
}

/// In-process decoder for containers and codecs symphonia supports (WAV,
/// FLAC, MP3, Ogg Vorbis, AAC/MP4). The file extension is the probe hint.
pub struct SymphoniaAudioDecoder;

impl AudioDecoder for SymphoniaAudioDecoder {
    fn decode(&self, path: &Path) -> Result<Vec<f32>, AudioDecoderError> {
        let file = File::open(path)?;
        let stream = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let mut reader = TrackReader::open(stream, &hint)?;
        let mono = reader.read_mono()?;

        let pcm = if reader.sample_rate == TARGET_SAMPLE_RATE {
            mono
        } else {
            resample(&mono, reader.sample_rate, TARGET_SAMPLE_RATE)?
        };

        tracing::debug!(
            samples = pcm.len(),
            source_rate = reader.sample_rate,
            duration_secs = pcm.len() as f32 / TARGET_SAMPLE_RATE as f32,
            "Audio decoded via symphonia"
        );

        Ok(pcm)
    }
}

/// The default track of a probed container with its codec ready to decode.
struct TrackReader {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    channels: usize,
}

enum Step {
    Frames(Vec<f32>),
    Skip,
    End,
}

impl TrackReader {
    fn open(stream: MediaSourceStream, hint: &Hint) -> Result<Self, AudioDecoderError> {
        let probed = symphonia::default::get_probe()
            .format(
                hint,
                stream,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| AudioDecoderError::UnsupportedFormat(format!("probe: {}", e)))?;

        let track = probed
            .format
            .default_track()
            .ok_or_else(|| AudioDecoderError::DecodingFailed("no audio track found".to_string()))?;
        let params = &track.codec_params;

        let sample_rate = params
            .sample_rate
            .ok_or_else(|| AudioDecoderError::DecodingFailed("unknown sample rate".to_string()))?;
        let channels = params.channels.map_or(1, |c| c.count());
        let track_id = track.id;

        let decoder = symphonia::default::get_codecs()
            .make(params, &DecoderOptions::default())
            .map_err(|e| AudioDecoderError::UnsupportedFormat(format!("codec: {}", e)))?;

        Ok(Self {
            format: probed.format,
            decoder,
            track_id,
            sample_rate,
            channels,
        })
    }

    /// Decodes every packet of the track, averaging channels per frame.
    fn read_mono(&mut self) -> Result<Vec<f32>, AudioDecoderError> {
        let mut mono = Vec::new();

        loop {
            match self.next_frames()? {
                Step::Frames(interleaved) => push_mono(&mut mono, &interleaved, self.channels),
                Step::Skip => continue,
                Step::End => break,
            }
        }

        if mono.is_empty() {
            return Err(AudioDecoderError::DecodingFailed(
                "no audio samples decoded".to_string(),
            ));
        }
        Ok(mono)
    }

    fn next_frames(&mut self) -> Result<Step, AudioDecoderError> {
        let packet = match self.format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                return Ok(Step::End);
            }
            Err(e) => return Err(AudioDecoderError::DecodingFailed(format!("packet: {}", e))),
        };

        if packet.track_id() != self.track_id {
            return Ok(Step::Skip);
        }

        let decoded = match self.decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::warn!(error = %e, "Skipping corrupt audio frame");
                return Ok(Step::Skip);
            }
            Err(e) => return Err(AudioDecoderError::DecodingFailed(format!("decode: {}", e))),
        };

        if decoded.frames() == 0 {
            return Ok(Step::Skip);
        }

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        buffer.copy_interleaved_ref(decoded);
        Ok(Step::Frames(buffer.samples().to_vec()))
    }
}

fn push_mono(out: &mut Vec<f32>, interleaved: &[f32], channels: usize) {
    match channels {
        0 | 1 => out.extend_from_slice(interleaved),
        n => out.extend(
            interleaved
                .chunks(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32),
        ),
    }
}

/// Band-limited sinc resampling of a mono signal. The final partial chunk is
/// flushed and the output is cut to `len * to / from`.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AudioDecoderError> {
    const CHUNK_FRAMES: usize = 1024;

    let ratio = f64::from(to_rate) / f64::from(from_rate);
    let target_len = (samples.len() as f64 * ratio) as usize;
    let failed =
        |e: rubato::ResampleError| AudioDecoderError::DecodingFailed(format!("resample: {}", e));

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, sinc_params(), CHUNK_FRAMES, 1)
        .map_err(|e| AudioDecoderError::DecodingFailed(format!("resampler init: {}", e)))?;

    let mut out = Vec::with_capacity(target_len + CHUNK_FRAMES);
    let mut chunks = samples.chunks_exact(CHUNK_FRAMES);

    for chunk in &mut chunks {
        let frames = resampler.process(&[chunk], None).map_err(failed)?;
        out.extend(frames.into_iter().flatten());
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        let frames = resampler
            .process_partial(Some(&[tail]), None)
            .map_err(failed)?;
        out.extend(frames.into_iter().flatten());
    }

    out.truncate(target_len);
    Ok(out)
}

fn sinc_params() -> SincInterpolationParameters {
    SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    }
}
