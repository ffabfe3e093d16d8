use crate::error::{Result, ShortsError};
use base64::{engine::general_purpose, Engine as _};

/// Decoded narration audio: one normalized f32 sample vector per
/// channel, every value in [-1.0, 1.0).
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
    pub frame_count: usize,
}

/// Decodes a standard-alphabet base64 payload. Empty input decodes to
/// an empty buffer; malformed input is a `Decode` error.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    Ok(general_purpose::STANDARD.decode(data)?)
}

/// Reinterprets raw bytes as interleaved little-endian signed 16-bit
/// PCM and splits them into per-channel normalized f32 samples.
///
/// Pure function: no I/O, no allocation beyond the output buffers.
pub fn decode_pcm16(bytes: &[u8], sample_rate: u32, num_channels: usize) -> Result<AudioBuffer> {
    if sample_rate == 0 {
        return Err(ShortsError::Format("sample rate must be positive".to_string()));
    }
    if num_channels == 0 {
        return Err(ShortsError::Format("channel count must be positive".to_string()));
    }
    if bytes.len() % 2 != 0 {
        return Err(ShortsError::Format(format!(
            "byte length {} is not a whole number of 16-bit samples",
            bytes.len()
        )));
    }

    let total_samples = bytes.len() / 2;
    if total_samples % num_channels != 0 {
        return Err(ShortsError::Format(format!(
            "{} samples do not divide into {} channels",
            total_samples, num_channels
        )));
    }

    let frame_count = total_samples / num_channels;
    let mut channels = vec![Vec::with_capacity(frame_count); num_channels];

    for frame in 0..frame_count {
        for (channel, samples) in channels.iter_mut().enumerate() {
            let idx = (frame * num_channels + channel) * 2;
            let value = i16::from_le_bytes([bytes[idx], bytes[idx + 1]]);
            samples.push(value as f32 / 32768.0);
        }
    }

    Ok(AudioBuffer {
        channels,
        sample_rate,
        frame_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_round_trip() {
        let original: Vec<u8> = (0u8..=255).collect();
        let encoded = general_purpose::STANDARD.encode(&original);
        assert_eq!(decode_base64(&encoded).unwrap(), original);
    }

    #[test]
    fn empty_base64_decodes_to_empty_bytes() {
        assert!(decode_base64("").unwrap().is_empty());
    }

    #[test]
    fn malformed_base64_is_a_decode_error() {
        let err = decode_base64("not valid base64!!!").unwrap_err();
        assert!(matches!(err, ShortsError::Decode(_)));
    }

    #[test]
    fn known_mono_samples_normalize() {
        // Little-endian i16 values [0, 16384, -32768, 32767].
        let bytes = [0u8, 0, 0, 64, 0, 128, 255, 127];
        let buffer = decode_pcm16(&bytes, 24_000, 1).unwrap();
        assert_eq!(buffer.frame_count, 4);
        assert_eq!(buffer.sample_rate, 24_000);
        let samples = &buffer.channels[0];
        assert_eq!(samples[0], 0.0);
        assert_eq!(samples[1], 0.5);
        assert_eq!(samples[2], -1.0);
        assert!((samples[3] - 32767.0 / 32768.0).abs() < 1e-6);
    }

    #[test]
    fn stereo_deinterleaves() {
        // L=[1, 3], R=[2, 4] interleaved.
        let mut bytes = Vec::new();
        for v in [1i16, 2, 3, 4] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let buffer = decode_pcm16(&bytes, 48_000, 2).unwrap();
        assert_eq!(buffer.frame_count, 2);
        assert_eq!(buffer.channels[0], vec![1.0 / 32768.0, 3.0 / 32768.0]);
        assert_eq!(buffer.channels[1], vec![2.0 / 32768.0, 4.0 / 32768.0]);
    }

    #[test]
    fn odd_byte_length_is_a_format_error() {
        let err = decode_pcm16(&[0, 1, 2], 24_000, 1).unwrap_err();
        assert!(matches!(err, ShortsError::Format(_)));
    }

    #[test]
    fn length_not_divisible_by_channels_is_a_format_error() {
        // 3 samples cannot split into 2 channels.
        let err = decode_pcm16(&[0, 0, 0, 0, 0, 0], 24_000, 2).unwrap_err();
        assert!(matches!(err, ShortsError::Format(_)));
    }

    #[test]
    fn zero_channels_or_rate_rejected() {
        assert!(decode_pcm16(&[0, 0], 24_000, 0).is_err());
        assert!(decode_pcm16(&[0, 0], 0, 1).is_err());
    }
}
