//! # PCM Utilities
//!
//! Sample format conversions between the decoder's f32 output and the
//! 16-bit integer PCM the recognition engine consumes, plus the chunked
//! reader the orchestrator drives a recognition session with.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::TranscriptionError;

/// Convert 32-bit float samples to 16-bit PCM.
///
/// Scales from the float range [-1.0, 1.0] to [-32768, 32767], clamping
/// out-of-range values rather than wrapping.
pub fn float_to_pcm(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&sample| {
            let scaled = sample * 32768.0;
            scaled.clamp(-32768.0, 32767.0) as i16
        })
        .collect()
}

/// Convert 16-bit PCM samples to 32-bit float in [-1.0, 1.0).
pub fn pcm_to_float(samples: &[i16]) -> Vec<f32> {
    samples.iter().map(|&sample| sample as f32 / 32768.0).collect()
}

/// A lazy, finite, non-restartable stream of fixed-size PCM chunks read
/// from a canonical WAV artifact.
///
/// Yields `Vec<i16>` chunks of at most `chunk_frames` samples in stream
/// order; returning `None` is the typed end-of-stream signal, so the feed
/// loop needs no sentinel value.
pub struct PcmChunks {
    reader: hound::WavReader<BufReader<File>>,
    chunk_frames: usize,
}

impl PcmChunks {
    pub(crate) fn open(path: &Path, chunk_frames: usize) -> Result<Self, TranscriptionError> {
        debug_assert!(chunk_frames > 0);
        let reader = hound::WavReader::open(path)
            .map_err(|e| TranscriptionError::Io(format!("open PCM artifact: {}", e)))?;
        Ok(Self {
            reader,
            chunk_frames,
        })
    }
}

impl Iterator for PcmChunks {
    type Item = Result<Vec<i16>, TranscriptionError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut chunk = Vec::with_capacity(self.chunk_frames);
        for sample in self.reader.samples::<i16>() {
            match sample {
                Ok(s) => chunk.push(s),
                Err(e) => return Some(Err(TranscriptionError::Io(e.to_string()))),
            }
            if chunk.len() == self.chunk_frames {
                return Some(Ok(chunk));
            }
        }
        if chunk.is_empty() {
            None
        } else {
            Some(Ok(chunk))
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[test]
    fn test_pcm_conversion_roundtrip() {
        let pcm_samples = vec![0i16, 16384, -16384, 32767, -32768];
        let float_samples = pcm_to_float(&pcm_samples);
        let converted_back = float_to_pcm(&float_samples);

        for (original, converted) in pcm_samples.iter().zip(converted_back.iter()) {
            let diff = (original - converted).abs();
            assert!(diff <= 1, "conversion drift: {} vs {}", original, converted);
        }
    }

    #[test]
    fn test_float_to_pcm_clamps() {
        let clipped = float_to_pcm(&[2.0, -2.0]);
        assert_eq!(clipped, vec![32767, -32768]);
    }

    #[test]
    fn test_chunk_iteration_sizes() {
        let samples: Vec<i16> = (0..9000).map(|i| (i % 100) as i16).collect();
        let wav = wav_from_samples(16000, 1, &samples);
        let mut artifact = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        std::io::Write::write_all(&mut artifact, &wav).unwrap();

        let chunks: Vec<Vec<i16>> = PcmChunks::open(artifact.path(), 4000)
            .unwrap()
            .map(|c| c.unwrap())
            .collect();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 4000);
        assert_eq!(chunks[1].len(), 4000);
        assert_eq!(chunks[2].len(), 1000);
        assert_eq!(chunks[0][1], 1);
    }

    #[test]
    fn test_empty_stream_yields_no_chunks() {
        let wav = wav_from_samples(16000, 1, &[]);
        let mut artifact = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        std::io::Write::write_all(&mut artifact, &wav).unwrap();

        let mut chunks = PcmChunks::open(artifact.path(), 4000).unwrap();
        assert!(chunks.next().is_none());
    }

    /// Build an in-memory WAV file of silence for decoder tests.
    pub(crate) fn generate_test_wav(sample_rate: u32, channels: u16, num_frames: u32) -> Vec<u8> {
        let samples = vec![0i16; (num_frames * u32::from(channels)) as usize];
        wav_from_samples(sample_rate, channels, &samples)
    }

    /// Build an in-memory WAV file from interleaved 16-bit samples.
    pub(crate) fn wav_from_samples(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let bits_per_sample: u16 = 16;
        let byte_rate = sample_rate * u32::from(channels) * u32::from(bits_per_sample) / 8;
        let block_align = channels * bits_per_sample / 8;
        let data_size = (samples.len() * 2) as u32;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(file_size as usize + 8);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&channels.to_le_bytes());
        buf.extend_from_slice(&sample_rate.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for s in samples {
            buf.extend_from_slice(&s.to_le_bytes());
        }
        buf
    }
}
