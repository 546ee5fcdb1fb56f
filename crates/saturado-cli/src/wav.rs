//! Multi-channel WAV reading and writing.
//!
//! Unlike a mixdown pipeline, channels are kept separate end-to-end: the
//! filter engines hold per-channel state, so a stereo file renders through
//! two independent recursion states.

use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;
use thiserror::Error;

/// Errors from WAV file operations.
#[derive(Debug, Error)]
pub enum WavError {
    /// WAV container read/write error.
    #[error("WAV file error: {0}")]
    Format(#[from] hound::Error),

    /// The file decoded to zero sample frames.
    #[error("audio file contains no samples")]
    Empty,
}

/// Decoded audio: one `Vec<f32>` per channel, equal lengths.
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Channel buffers, outer index = channel.
    pub channels: Vec<Vec<f32>>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioData {
    /// Number of sample frames per channel.
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, |ch| ch.len())
    }
}

/// Read a WAV file, deinterleaving into per-channel `f32` buffers.
///
/// Integer formats are normalized into `[-1.0, 1.0)` by their bit depth.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<AudioData, WavError> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channel_count = spec.channels as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    if interleaved.is_empty() {
        return Err(WavError::Empty);
    }

    let mut channels = vec![Vec::with_capacity(interleaved.len() / channel_count); channel_count];
    for frame in interleaved.chunks(channel_count) {
        for (ch, &sample) in frame.iter().enumerate() {
            channels[ch].push(sample);
        }
    }

    Ok(AudioData {
        channels,
        sample_rate: spec.sample_rate,
    })
}

/// Write per-channel buffers to a 32-bit float WAV file.
pub fn write_wav<P: AsRef<Path>>(
    path: P,
    channels: &[Vec<f32>],
    sample_rate: u32,
) -> Result<(), WavError> {
    let frames = channels.first().map_or(0, |ch| ch.len());
    if frames == 0 {
        return Err(WavError::Empty);
    }

    let spec = hound::WavSpec {
        channels: channels.len() as u16,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for frame in 0..frames {
        for ch in channels {
            writer.write_sample(ch[frame])?;
        }
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_preserves_channels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.wav");

        let left: Vec<f32> = (0..64).map(|i| (i as f32 * 0.1).sin()).collect();
        let right: Vec<f32> = (0..64).map(|i| (i as f32 * 0.2).cos()).collect();
        write_wav(&path, &[left.clone(), right.clone()], 48000).unwrap();

        let audio = read_wav(&path).unwrap();
        assert_eq!(audio.sample_rate, 48000);
        assert_eq!(audio.channels.len(), 2);
        assert_eq!(audio.frames(), 64);
        assert_eq!(audio.channels[0], left);
        assert_eq!(audio.channels[1], right);
    }

    #[test]
    fn rejects_empty_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        let err = write_wav(&path, &[Vec::new()], 48000).unwrap_err();
        assert!(matches!(err, WavError::Empty));
    }

    #[test]
    fn missing_file_is_a_format_error() {
        let err = read_wav("/definitely/not/here.wav").unwrap_err();
        assert!(matches!(err, WavError::Format(_)));
    }
}
