//! # Audio Normalizer
//!
//! Decodes an arbitrary supported audio container/codec and produces the
//! canonical PCM format required by the recognition engine: 16 kHz, mono,
//! 16-bit linear PCM.
//!
//! ## Pipeline:
//! 1. Probe and decode the input with symphonia (wav, mp3, ogg/vorbis,
//!    flac, aac/m4a, raw pcm)
//! 2. Downmix interleaved multi-channel audio to mono
//! 3. Resample to 16 kHz with rubato when the source rate differs
//! 4. Write the canonical samples to a temporary WAV artifact
//!
//! The artifact is owned by [`CanonicalAudio`]; dropping it deletes the
//! file, so cleanup happens on every exit path of the caller.

use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tempfile::NamedTempFile;

use crate::audio::pcm::{self, PcmChunks};
use crate::error::TranscriptionError;

/// Sample rate the recognition engine accepts.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Input to the normalizer: raw uploaded bytes or a file already on disk.
#[derive(Debug)]
pub enum AudioInput {
    Bytes(Vec<u8>),
    File(PathBuf),
}

/// Canonical 16 kHz mono 16-bit PCM, materialized as a temporary WAV file.
///
/// The temp file lives exactly as long as this value; it is removed on drop
/// regardless of whether the transcription that consumed it succeeded.
pub struct CanonicalAudio {
    temp: NamedTempFile,
    num_frames: u64,
}

impl CanonicalAudio {
    /// Location of the temporary WAV artifact.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Duration of the canonical audio in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.num_frames as f64 / TARGET_SAMPLE_RATE as f64
    }

    /// Open a lazy, finite, non-restartable chunk stream over the artifact.
    ///
    /// Each item is at most `chunk_frames` samples; the iterator ends when
    /// the artifact is exhausted, which is the feed loop's termination
    /// condition.
    pub fn chunks(&self, chunk_frames: usize) -> Result<PcmChunks, TranscriptionError> {
        PcmChunks::open(self.temp.path(), chunk_frames)
    }
}

/// Decode `input` and produce canonical PCM.
///
/// ## Errors:
/// - [`TranscriptionError::Decode`] when the bytes cannot be parsed as
///   audio at all (corrupt data, unsupported codec, no audio track)
/// - [`TranscriptionError::Io`] when the temporary artifact cannot be
///   written
pub fn normalize(input: AudioInput) -> Result<CanonicalAudio, TranscriptionError> {
    let (mss, hint) = open_source(input)?;
    let samples = decode_to_mono_f32(mss, hint)?;
    write_canonical_wav(&samples)
}

fn open_source(input: AudioInput) -> Result<(MediaSourceStream, Hint), TranscriptionError> {
    let mut hint = Hint::new();
    let mss = match input {
        AudioInput::Bytes(data) => {
            MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default())
        }
        AudioInput::File(path) => {
            if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                hint.with_extension(ext);
            }
            let file = File::open(&path)
                .map_err(|e| TranscriptionError::Io(format!("open {}: {}", path.display(), e)))?;
            MediaSourceStream::new(Box::new(file), Default::default())
        }
    };
    Ok((mss, hint))
}

/// Decode the stream into mono f32 samples at [`TARGET_SAMPLE_RATE`].
fn decode_to_mono_f32(
    mss: MediaSourceStream,
    hint: Hint,
) -> Result<Vec<f32>, TranscriptionError> {
    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| TranscriptionError::Decode(format!("probe failed: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| TranscriptionError::Decode("no audio track found".to_string()))?;

    let codec_params = track.codec_params.clone();
    let track_id = track.id;
    let source_rate = codec_params.sample_rate.unwrap_or(TARGET_SAMPLE_RATE);
    let channels = codec_params.channels.map_or(1, |c| c.count());

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| TranscriptionError::Decode(format!("codec init failed: {}", e)))?;

    let mut all_samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(TranscriptionError::Decode(format!("packet read: {}", e)));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| TranscriptionError::Decode(format!("decode: {}", e)))?;

        let spec = *decoded.spec();
        let n_frames = decoded.capacity();
        let mut sample_buf = SampleBuffer::<f32>::new(n_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        let samples = sample_buf.samples();

        if channels > 1 {
            for chunk in samples.chunks(channels) {
                let mono: f32 = chunk.iter().sum::<f32>() / channels as f32;
                all_samples.push(mono);
            }
        } else {
            all_samples.extend_from_slice(samples);
        }
    }

    // A parseable stream with zero frames is valid audio: it normalizes to
    // an empty canonical stream, not a decode failure.
    if source_rate != TARGET_SAMPLE_RATE && !all_samples.is_empty() {
        all_samples = resample(&all_samples, source_rate, TARGET_SAMPLE_RATE)?;
    }

    Ok(all_samples)
}

/// Resample mono audio from `from_rate` to `to_rate` using rubato.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, TranscriptionError> {
    use rubato::{
        Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
    };

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = f64::from(to_rate) / f64::from(from_rate);
    let chunk_size = 1024;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, chunk_size, 1)
        .map_err(|e| TranscriptionError::Decode(format!("resampler init: {}", e)))?;

    let mut output = Vec::with_capacity((samples.len() as f64 * ratio) as usize + 1024);

    for chunk in samples.chunks(chunk_size) {
        let input = if chunk.len() < chunk_size {
            // Pad the last chunk with zeros
            let mut padded = chunk.to_vec();
            padded.resize(chunk_size, 0.0);
            vec![padded]
        } else {
            vec![chunk.to_vec()]
        };

        let resampled = resampler
            .process(&input, None)
            .map_err(|e| TranscriptionError::Decode(format!("resample: {}", e)))?;

        if let Some(channel) = resampled.first() {
            output.extend_from_slice(channel);
        }
    }

    Ok(output)
}

/// Write mono f32 samples as a canonical 16 kHz 16-bit WAV temp artifact.
fn write_canonical_wav(samples: &[f32]) -> Result<CanonicalAudio, TranscriptionError> {
    let temp = tempfile::Builder::new()
        .prefix("voicescribe-pcm-")
        .suffix(".wav")
        .tempfile()
        .map_err(|e| TranscriptionError::Io(format!("create temp artifact: {}", e)))?;

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: TARGET_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(temp.path(), spec)?;
    for &sample in pcm::float_to_pcm(samples).iter() {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    Ok(CanonicalAudio {
        temp,
        num_frames: samples.len() as u64,
    })
}
