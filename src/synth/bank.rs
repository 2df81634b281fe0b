use crate::{
    synth::{
        message::{MessageReceiver, StopSignal, SynthMessage, VoiceSink},
        voice::VoiceInstance,
    },
    MAX_BLOCK_SIZE,
};

/// The render side: every live voice, mixed into one output.
///
/// The bank is the registry the global teardown sweeps. Each block it checks
/// the stop signal, drains control messages, renders and sums all live
/// voices, then retires the ones that finished into its sink. When full, a
/// new voice steals the oldest.
pub struct VoiceBank<R: MessageReceiver, S: VoiceSink = ()> {
    voices: Vec<VoiceInstance>,
    rx: R,
    sink: S,
    stop: StopSignal,
    seen_epoch: u64,
    max_voices: usize,
    temp_buffer: Vec<f32>,
    frame_counter: u64,
}

impl<R: MessageReceiver> VoiceBank<R> {
    /// A bank that drops finished voices in place.
    pub fn new(max_voices: usize, rx: R) -> Self {
        Self::with_sink(max_voices, rx, ())
    }
}

impl<R: MessageReceiver, S: VoiceSink> VoiceBank<R, S> {
    pub fn with_sink(max_voices: usize, rx: R, sink: S) -> Self {
        let max_voices = max_voices.max(1);
        Self {
            voices: Vec::with_capacity(max_voices),
            rx,
            sink,
            stop: StopSignal::new(),
            seen_epoch: 0,
            max_voices,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
            frame_counter: 0,
        }
    }

    /// Handle for stopping this bank from another thread.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn render_block(&mut self, out: &mut [f32]) {
        let epoch = self.stop.epoch();
        if epoch != self.seen_epoch {
            self.seen_epoch = epoch;
            self.teardown();
        }

        // Process control messages
        while let Some(msg) = self.rx.pop() {
            match msg {
                SynthMessage::Start(voice) if voice.epoch() < self.seen_epoch => {
                    // Queued before the last stop
                    self.sink.retire(voice);
                }
                SynthMessage::Start(voice) => self.start(voice),
            }
        }

        // Mix voices
        out.fill(0.0);
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            let temp = &mut self.temp_buffer[..chunk.len()];
            for voice in &mut self.voices {
                voice.render(temp);
                for (o, v) in chunk.iter_mut().zip(temp.iter()) {
                    *o += v;
                }
            }
        }

        let mut i = 0;
        while i < self.voices.len() {
            if self.voices[i].is_disposed() {
                let voice = self.voices.remove(i);
                self.sink.retire(voice);
            } else {
                i += 1;
            }
        }
        self.frame_counter += out.len() as u64;
    }

    fn start(&mut self, voice: VoiceInstance) {
        if self.voices.len() >= self.max_voices {
            // Voices are pushed in start order, so the front is the oldest
            let mut oldest = self.voices.remove(0);
            oldest.dispose();
            self.sink.retire(oldest);
        }
        self.voices.push(voice);
    }

    /// Force-stop and retire every live voice. Idempotent.
    pub fn teardown(&mut self) {
        for mut voice in self.voices.drain(..) {
            voice.dispose();
            self.sink.retire(voice);
        }
    }

    pub fn live_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn voices(&self) -> impl Iterator<Item = &VoiceInstance> {
        self.voices.iter()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Frames rendered since the bank was created.
    pub fn frames(&self) -> u64 {
        self.frame_counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voices::{self, VoiceKind};
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::VecDeque;

    const SAMPLE_RATE: f32 = 8_000.0;

    fn voice(rng: &mut StdRng, kind: VoiceKind, frequency: f32) -> VoiceInstance {
        VoiceInstance::new(kind, voices::build(kind, rng), frequency, 0.2, SAMPLE_RATE)
    }

    #[test]
    fn finished_voices_are_retired() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut bank = VoiceBank::with_sink(8, VecDeque::new(), Vec::<VoiceInstance>::new());
        bank.rx.push_back(SynthMessage::Start(voice(&mut rng, VoiceKind::Bell, 440.0)));

        let mut out = vec![0.0; 256];
        bank.render_block(&mut out);
        assert_eq!(bank.live_voices(), 1);
        assert!(out.iter().any(|s| s.abs() > 0.0));

        // bell decays within 1.83 s, hard cap 2.08 s
        for _ in 0..(3.0 * SAMPLE_RATE / 256.0) as usize {
            bank.render_block(&mut out);
        }
        assert_eq!(bank.live_voices(), 0);
        assert!(out.iter().all(|&s| s == 0.0));

        assert_eq!(bank.sink().len(), 1);
        assert!(bank.sink()[0].is_disposed());
    }

    #[test]
    fn full_bank_steals_the_oldest() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut bank = VoiceBank::with_sink(2, VecDeque::new(), Vec::<VoiceInstance>::new());
        for f in [110.0, 220.0, 330.0] {
            bank.rx.push_back(SynthMessage::Start(voice(&mut rng, VoiceKind::Pad, f)));
        }

        let mut out = vec![0.0; 64];
        bank.render_block(&mut out);

        let live: Vec<f32> = bank.voices().map(|v| v.frequency()).collect();
        assert_eq!(live, vec![220.0, 330.0]);
        let stolen: Vec<f32> = bank.sink().iter().map(|v| v.frequency()).collect();
        assert_eq!(stolen, vec![110.0]);
    }

    #[test]
    fn stop_signal_silences_everything_and_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut bank = VoiceBank::new(8, VecDeque::new());
        let stop = bank.stop_signal();
        for kind in [VoiceKind::Pad, VoiceKind::Synth, VoiceKind::Harp] {
            bank.rx.push_back(SynthMessage::Start(voice(&mut rng, kind, 220.0)));
        }
        let mut out = vec![0.0; 128];
        bank.render_block(&mut out);
        assert_eq!(bank.live_voices(), 3);

        stop.raise();
        stop.raise();
        bank.render_block(&mut out);
        assert_eq!(bank.live_voices(), 0);
        assert!(out.iter().all(|&s| s == 0.0));

        bank.teardown();
        assert_eq!(bank.live_voices(), 0);
    }

    #[test]
    fn starts_queued_before_a_stop_are_discarded() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut bank = VoiceBank::with_sink(8, VecDeque::new(), Vec::<VoiceInstance>::new());
        let stop = bank.stop_signal();

        bank.rx.push_back(SynthMessage::Start(
            voice(&mut rng, VoiceKind::Pad, 110.0).with_epoch(stop.epoch()),
        ));
        stop.raise();
        bank.rx.push_back(SynthMessage::Start(
            voice(&mut rng, VoiceKind::Pad, 220.0).with_epoch(stop.epoch()),
        ));

        let mut out = vec![0.0; 64];
        bank.render_block(&mut out);

        let live: Vec<f32> = bank.voices().map(|v| v.frequency()).collect();
        assert_eq!(live, vec![220.0]);
        assert_eq!(bank.sink().len(), 1);
    }

    #[test]
    fn oversized_blocks_are_rendered_in_chunks() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut bank = VoiceBank::new(4, VecDeque::new());
        bank.rx.push_back(SynthMessage::Start(voice(&mut rng, VoiceKind::Synth, 110.0)));

        let mut out = vec![0.0; MAX_BLOCK_SIZE * 2 + 17];
        bank.render_block(&mut out);
        assert!(out[MAX_BLOCK_SIZE * 2..].iter().any(|s| s.abs() > 0.0));
        assert_eq!(bank.frames(), out.len() as u64);
    }
}
