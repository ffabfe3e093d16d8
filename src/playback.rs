use crate::audio::{decode_base64, decode_pcm16, AudioBuffer};
use crate::error::Result;
use std::sync::Arc;

/// The speech model returns raw 16-bit PCM at 24 kHz, mono.
pub const NARRATION_SAMPLE_RATE: u32 = 24_000;
pub const NARRATION_CHANNELS: usize = 1;

/// Seam to whatever renders the clip. `restart` rewinds to the first
/// frame and begins playing. The bundled GUI deliberately leaves the
/// clip to an external player (it shows the output path instead), so
/// implementations live with the embedding presentation layer.
pub trait VideoSurface {
    fn restart(&mut self);
}

/// Seam to the audio output device, same arrangement as
/// [`VideoSurface`]: the embedding presentation layer supplies it.
pub trait AudioSink {
    fn play(&mut self, buffer: &AudioBuffer) -> Result<()>;
}

/// Starts video and narration playback together. The narration is
/// decoded from its base64 payload on first play and cached for the
/// rest of the run; a new run must call `invalidate`.
///
/// The two streams share no clock: the video restarts and the audio
/// starts back to back, which is close enough for a 30-40 second
/// short but is not lip-sync.
pub struct PlaybackController {
    sample_rate: u32,
    num_channels: usize,
    decoded: Option<Arc<AudioBuffer>>,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackController {
    pub fn new() -> Self {
        Self {
            sample_rate: NARRATION_SAMPLE_RATE,
            num_channels: NARRATION_CHANNELS,
            decoded: None,
        }
    }

    pub fn play(
        &mut self,
        audio_base64: &str,
        video: &mut dyn VideoSurface,
        sink: &mut dyn AudioSink,
    ) -> Result<()> {
        video.restart();
        let buffer = self.ensure_decoded(audio_base64)?;
        sink.play(&buffer)
    }

    /// Drops the cached narration buffer. Called when a new run
    /// replaces the audio payload.
    pub fn invalidate(&mut self) {
        self.decoded = None;
    }

    fn ensure_decoded(&mut self, audio_base64: &str) -> Result<Arc<AudioBuffer>> {
        if let Some(buffer) = &self.decoded {
            return Ok(Arc::clone(buffer));
        }

        let bytes = decode_base64(audio_base64)?;
        let buffer = Arc::new(decode_pcm16(&bytes, self.sample_rate, self.num_channels)?);
        self.decoded = Some(Arc::clone(&buffer));
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShortsError;
    use base64::{engine::general_purpose, Engine as _};

    struct RecordingSurface {
        restarts: u32,
    }

    impl VideoSurface for RecordingSurface {
        fn restart(&mut self) {
            self.restarts += 1;
        }
    }

    struct RecordingSink {
        plays: u32,
        last_frames: usize,
    }

    impl AudioSink for RecordingSink {
        fn play(&mut self, buffer: &AudioBuffer) -> Result<()> {
            self.plays += 1;
            self.last_frames = buffer.frame_count;
            Ok(())
        }
    }

    fn pcm_payload(samples: &[i16]) -> String {
        let mut bytes = Vec::new();
        for s in samples {
            bytes.extend_from_slice(&s.to_le_bytes());
        }
        general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn play_restarts_video_and_feeds_decoded_audio() {
        let payload = pcm_payload(&[0, 16384, -32768, 32767]);
        let mut controller = PlaybackController::new();
        let mut surface = RecordingSurface { restarts: 0 };
        let mut sink = RecordingSink { plays: 0, last_frames: 0 };

        controller.play(&payload, &mut surface, &mut sink).unwrap();

        assert_eq!(surface.restarts, 1);
        assert_eq!(sink.plays, 1);
        assert_eq!(sink.last_frames, 4);
    }

    #[test]
    fn narration_is_decoded_once_and_cached() {
        let payload = pcm_payload(&[1, 2, 3, 4]);
        let mut controller = PlaybackController::new();
        let mut surface = RecordingSurface { restarts: 0 };
        let mut sink = RecordingSink { plays: 0, last_frames: 0 };

        controller.play(&payload, &mut surface, &mut sink).unwrap();
        let first = Arc::clone(controller.decoded.as_ref().unwrap());
        controller.play(&payload, &mut surface, &mut sink).unwrap();
        let second = Arc::clone(controller.decoded.as_ref().unwrap());

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(surface.restarts, 2);
        assert_eq!(sink.plays, 2);
    }

    #[test]
    fn invalidate_drops_the_cache() {
        let payload = pcm_payload(&[5, 6]);
        let mut controller = PlaybackController::new();
        let mut surface = RecordingSurface { restarts: 0 };
        let mut sink = RecordingSink { plays: 0, last_frames: 0 };

        controller.play(&payload, &mut surface, &mut sink).unwrap();
        assert!(controller.decoded.is_some());
        controller.invalidate();
        assert!(controller.decoded.is_none());
    }

    #[test]
    fn bad_payload_surfaces_the_decode_error_after_video_restart() {
        let mut controller = PlaybackController::new();
        let mut surface = RecordingSurface { restarts: 0 };
        let mut sink = RecordingSink { plays: 0, last_frames: 0 };

        let err = controller
            .play("!!not-base64!!", &mut surface, &mut sink)
            .unwrap_err();

        assert!(matches!(err, ShortsError::Decode(_)));
        // Mirrors the source: the video is already restarted when the
        // audio path fails.
        assert_eq!(surface.restarts, 1);
        assert_eq!(sink.plays, 0);
    }
}
