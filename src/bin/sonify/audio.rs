//! cpal output: a stream running the voice bank, wrapped as an `AudioContext`.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rand::rngs::StdRng;
use tracing::{info, warn};

use neurosonic::{
    config::RenderConfig,
    synth::{AudioContext, ContextState, RingContext},
    voices::VoiceKind,
    AudioError, MAX_BLOCK_SIZE,
};

/// A `RingContext` that also owns the device stream feeding from it.
///
/// The stream is built paused; `resume` starts it.
pub struct CpalContext {
    ring: RingContext,
    stream: cpal::Stream,
}

impl CpalContext {
    pub fn open(render: &RenderConfig, rng: StdRng) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        let config = device
            .default_output_config()
            .map_err(|e| AudioError::Stream(e.to_string()))?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        if sample_rate != render.sample_rate {
            info!(
                device = sample_rate,
                configured = render.sample_rate,
                "using the device sample rate"
            );
        }

        let (ring, mut bank) =
            RingContext::pair(render.max_voices, render.queue_capacity, sample_rate, rng);
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _| {
                    let total_frames = data.len() / channels;
                    let mut frames_written = 0;

                    while frames_written < total_frames {
                        let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                        let block = &mut render_buf[..frames_to_render];
                        bank.render_block(block);

                        // Mono to every channel
                        let out_off = frames_written * channels;
                        for (i, &s) in block.iter().enumerate() {
                            let frame = out_off + i * channels;
                            data[frame..frame + channels].fill(s.clamp(-1.0, 1.0));
                        }

                        frames_written += frames_to_render;
                    }
                },
                |err| warn!(%err, "output stream error"),
                None,
            )
            .map_err(|e| AudioError::Stream(e.to_string()))?;

        // Some backends start playing as soon as the stream exists
        if let Err(err) = stream.pause() {
            warn!(%err, "could not pause new output stream");
        }

        info!(sample_rate, channels, "output stream ready");
        Ok(Self { ring, stream })
    }
}

impl AudioContext for CpalContext {
    fn state(&self) -> ContextState {
        self.ring.state()
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        if self.ring.state() == ContextState::Closed {
            return Err(AudioError::Closed);
        }
        self.stream
            .play()
            .map_err(|e| AudioError::Blocked(e.to_string()))?;
        self.ring.resume()
    }

    fn play(&mut self, kind: VoiceKind, frequency: f32, amplitude: f32) {
        self.ring.play(kind, frequency, amplitude);
    }

    fn stop_all(&mut self) {
        self.ring.stop_all();
    }

    fn close(&mut self) {
        if self.ring.state() == ContextState::Closed {
            return;
        }
        self.ring.close();
        if let Err(err) = self.stream.pause() {
            warn!(%err, "could not pause output stream");
        }
    }
}
