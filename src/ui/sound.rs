/// Sound engine: procedural 8-bit style sound effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

use crate::sim::event::GameEvent;

/// Which effect a session event should trigger, if any.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sfx {
    Step,
    Push,
    BoxOnGoal,
    Blocked,
    Undo,
    Clear,
    AllClear,
}

impl Sfx {
    pub fn for_event(event: &GameEvent) -> Option<Sfx> {
        match event {
            GameEvent::PlayerMoved { .. } => Some(Sfx::Step),
            GameEvent::BoxPushed { on_goal: true, .. } => Some(Sfx::BoxOnGoal),
            GameEvent::BoxPushed { on_goal: false, .. } => Some(Sfx::Push),
            GameEvent::MoveBlocked(_) => Some(Sfx::Blocked),
            GameEvent::Undone { .. } => Some(Sfx::Undo),
            GameEvent::StageCleared { .. } => Some(Sfx::Clear),
            GameEvent::AllStagesCleared => Some(Sfx::AllClear),
            _ => None,
        }
    }
}

/// Reduce one frame's events to the effects worth playing.
/// A push drowns out its own footstep; a clear drowns out everything else.
pub fn effects_for(events: &[GameEvent]) -> Vec<Sfx> {
    let mut out: Vec<Sfx> = vec![];
    for sfx in events.iter().filter_map(Sfx::for_event) {
        if !out.contains(&sfx) {
            out.push(sfx);
        }
    }
    if out.iter().any(|s| matches!(s, Sfx::Push | Sfx::BoxOnGoal)) {
        out.retain(|&s| s != Sfx::Step);
    }
    if out.iter().any(|s| matches!(s, Sfx::Clear | Sfx::AllClear)) {
        out.retain(|&s| matches!(s, Sfx::Clear | Sfx::AllClear));
    }
    out
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::Sfx;

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::TAU;

    /// Pre-generated WAV buffers for each sound effect.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_step: Arc<Vec<u8>>,
        sfx_push: Arc<Vec<u8>>,
        sfx_on_goal: Arc<Vec<u8>>,
        sfx_blocked: Arc<Vec<u8>>,
        sfx_undo: Arc<Vec<u8>>,
        sfx_clear: Arc<Vec<u8>>,
        sfx_all_clear: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!(error = %e, "no audio output, sound disabled");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_step: Arc::new(make_wav(&gen_tone(220.0, 0.02, 0.12))),
                sfx_push: Arc::new(make_wav(&gen_push())),
                sfx_on_goal: Arc::new(make_wav(&gen_arpeggio(&[784.0, 1047.0], 0.05))),
                sfx_blocked: Arc::new(make_wav(&gen_tone(110.0, 0.06, 0.2))),
                sfx_undo: Arc::new(make_wav(&gen_sweep(700.0, 350.0, 0.1))),
                sfx_clear: Arc::new(make_wav(&gen_arpeggio(&[523.0, 659.0, 784.0, 1047.0], 0.1))),
                sfx_all_clear: Arc::new(make_wav(&gen_fanfare())),
            })
        }

        pub fn play(&self, sfx: Sfx) {
            let buf = match sfx {
                Sfx::Step => &self.sfx_step,
                Sfx::Push => &self.sfx_push,
                Sfx::BoxOnGoal => &self.sfx_on_goal,
                Sfx::Blocked => &self.sfx_blocked,
                Sfx::Undo => &self.sfx_undo,
                Sfx::Clear => &self.sfx_clear,
                Sfx::AllClear => &self.sfx_all_clear,
            };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn sample_count(duration: f32) -> usize {
        (SAMPLE_RATE as f32 * duration) as usize
    }

    /// Plain sine with a linear fade out
    fn gen_tone(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = sample_count(duration);
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32);
                (t * freq * TAU).sin() * env * volume
            })
            .collect()
    }

    /// Linear pitch sweep from `from` to `to` Hz
    fn gen_sweep(from: f32, to: f32, duration: f32) -> Vec<f32> {
        let n = sample_count(duration);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = from + (to - from) * t;
                phase += freq / SAMPLE_RATE as f32;
                (phase * TAU).sin() * (1.0 - t).powf(0.6) * 0.25
            })
            .collect()
    }

    /// Push: low scrape, tone plus noise
    fn gen_push() -> Vec<f32> {
        let n = sample_count(0.08);
        let mut rng: u32 = 12345;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let tone = (ti * 150.0 * TAU).sin();
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                (tone * 0.5 + noise * 0.5) * (1.0 - t).powf(0.8) * 0.25
            })
            .collect()
    }

    /// Ascending notes, sine + 3rd harmonic for a retro feel
    fn gen_arpeggio(notes: &[f32], note_dur: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in notes {
            let n = sample_count(note_dur);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                let wave = (t * freq * TAU).sin() * 0.7
                    + (t * freq * 3.0 * TAU).sin() * 0.3;
                samples.push(wave * env * 0.25);
            }
        }
        samples
    }

    /// All stages clear: arpeggio plus a long sustained top note
    fn gen_fanfare() -> Vec<f32> {
        let mut samples = gen_arpeggio(&[523.0, 659.0, 784.0, 1047.0, 1319.0], 0.09);
        let freq = 1568.0_f32;
        let n = sample_count(0.4);
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32);
            let wave = (t * freq * TAU).sin() * 0.6 + (t * freq * 2.0 * TAU).sin() * 0.2;
            samples.push(wave * env * 0.3);
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_matches_payload() {
            let samples = gen_tone(440.0, 0.01, 0.5);
            let wav = make_wav(&samples);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..12], b"WAVE");
            assert_eq!(wav.len(), 44 + samples.len() * 2);
            let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
            assert_eq!(data_size as usize, samples.len() * 2);
        }

        #[test]
        fn generators_stay_in_range() {
            for s in gen_push().into_iter().chain(gen_fanfare()).chain(gen_sweep(700.0, 350.0, 0.1)) {
                assert!((-1.0..=1.0).contains(&s));
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sfx: Sfx) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Position;
    use crate::domain::rules::MoveRejected;

    #[test]
    fn push_replaces_step() {
        let events = [
            GameEvent::PlayerMoved { to: Position::new(2, 1) },
            GameEvent::BoxPushed { box_index: 0, to: Position::new(3, 1), on_goal: false },
        ];
        assert_eq!(effects_for(&events), vec![Sfx::Push]);
    }

    #[test]
    fn clear_silences_the_rest() {
        let events = [
            GameEvent::PlayerMoved { to: Position::new(2, 1) },
            GameEvent::BoxPushed { box_index: 0, to: Position::new(3, 1), on_goal: true },
            GameEvent::StageCleared { stage: 1 },
        ];
        assert_eq!(effects_for(&events), vec![Sfx::Clear]);
    }

    #[test]
    fn quiet_events_play_nothing() {
        let events = [GameEvent::LevelLoaded { index: 0 }, GameEvent::AdvanceCancelled];
        assert!(effects_for(&events).is_empty());
        assert_eq!(
            effects_for(&[GameEvent::MoveBlocked(MoveRejected::WallAhead)]),
            vec![Sfx::Blocked],
        );
    }
}
