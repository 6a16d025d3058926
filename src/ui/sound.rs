/// Sound effects: short procedural blips via rodio.
///
/// Every effect is synthesized once into an in-memory WAV buffer at init.
/// Playback is fire-and-forget through a detached rodio Sink.
///
/// Without the "sound" feature (or without an output device) the stub
/// engine does nothing.

use crate::sim::event::GameEvent;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Sfx {
    Pickup,
    Hit,
    Slay,
    BossSlain,
    Hurt,
    Gate,
    Die,
}

/// Which effect a turn event plays, if any.
pub fn sfx_for(event: &GameEvent) -> Option<Sfx> {
    match event {
        GameEvent::ItemPicked { .. } => Some(Sfx::Pickup),
        GameEvent::EnemyHit { damage, .. } if *damage > 0 => Some(Sfx::Hit),
        GameEvent::EnemyHit { .. } => None,
        GameEvent::EnemySlain { boss: true, .. } => Some(Sfx::BossSlain),
        GameEvent::EnemySlain { .. } => Some(Sfx::Slay),
        GameEvent::PlayerHit { .. } => Some(Sfx::Hurt),
        GameEvent::RoomChanged { .. } => Some(Sfx::Gate),
        GameEvent::PlayerDied => Some(Sfx::Die),
        GameEvent::EnemyTaunt { .. } => None,
    }
}

/// Effects for a whole turn. A slay replaces its hit; death replaces hurt.
pub fn sfx_for_turn(events: &[GameEvent]) -> Vec<Sfx> {
    let mut out: Vec<Sfx> = Vec::new();
    for sfx in events.iter().filter_map(sfx_for) {
        match sfx {
            Sfx::Slay | Sfx::BossSlain => out.retain(|s| *s != Sfx::Hit),
            Sfx::Die => out.retain(|s| *s != Sfx::Hurt),
            _ => {}
        }
        if !out.contains(&sfx) {
            out.push(sfx);
        }
    }
    out
}

#[cfg(feature = "sound")]
mod inner {
    use std::collections::HashMap;
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::Sfx;

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        buffers: HashMap<Sfx, Arc<Vec<u8>>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output: {e}");
                    return None;
                }
            };

            let effects = [
                (Sfx::Pickup, arpeggio(&[880.0, 1175.0, 1397.0], 0.05, 0.25)),
                (Sfx::Hit, noise_burst(0.07, 320.0, 0.3)),
                (Sfx::Slay, sweep(700.0, 150.0, 0.2, 0.3)),
                (Sfx::BossSlain, arpeggio(&[523.0, 659.0, 784.0, 1047.0, 1319.0], 0.09, 0.3)),
                (Sfx::Hurt, sweep(260.0, 110.0, 0.12, 0.35)),
                (Sfx::Gate, sweep(300.0, 900.0, 0.18, 0.2)),
                (Sfx::Die, arpeggio(&[392.0, 330.0, 262.0, 196.0], 0.16, 0.3)),
            ];
            let buffers = effects
                .into_iter()
                .map(|(sfx, samples)| (sfx, Arc::new(make_wav(&samples))))
                .collect();

            Some(SoundEngine { _stream: stream, handle, buffers })
        }

        pub fn play(&self, sfx: Sfx) {
            let buf = match self.buffers.get(&sfx) {
                Some(b) => b,
                None => return,
            };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Generators (mono f32 samples)
    // ════════════════════════════════════════════════════════════

    fn samples_for(duration: f32) -> usize {
        (SAMPLE_RATE as f32 * duration) as usize
    }

    /// Square-ish notes in sequence, each fading out.
    fn arpeggio(notes: &[f32], note_dur: f32, volume: f32) -> Vec<f32> {
        let n = samples_for(note_dur);
        let mut out = Vec::with_capacity(n * notes.len());
        for &freq in notes {
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).sqrt() * 0.8;
                let wave = (t * freq * TAU).sin() * 0.75 + (t * freq * 3.0 * TAU).sin() * 0.25;
                out.push(wave * env * volume);
            }
        }
        out
    }

    /// Sine glide from `from` Hz to `to` Hz.
    fn sweep(from: f32, to: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = samples_for(duration);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let freq = from + (to - from) * p;
                phase += freq * TAU / SAMPLE_RATE as f32;
                phase.sin() * (1.0 - p) * volume
            })
            .collect()
    }

    /// Noise mixed with a low tone, for impacts.
    fn noise_burst(duration: f32, freq: f32, volume: f32) -> Vec<f32> {
        let n = samples_for(duration);
        let mut rng: u32 = 0x2545_F491;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let t = i as f32 / SAMPLE_RATE as f32;
                rng ^= rng << 13;
                rng ^= rng >> 17;
                rng ^= rng << 5;
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let tone = (t * freq * TAU).sin();
                (noise * 0.6 + tone * 0.4) * (1.0 - p).powi(2) * volume
            })
            .collect()
    }

    /// 16-bit mono PCM WAV.
    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let data_size = samples.len() as u32 * 2;
        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());            // PCM
        buf.extend_from_slice(&1u16.to_le_bytes());            // mono
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes()); // byte rate
        buf.extend_from_slice(&2u16.to_le_bytes());            // block align
        buf.extend_from_slice(&16u16.to_le_bytes());           // bits per sample

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let v = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_and_length() {
            let samples = sweep(200.0, 400.0, 0.01, 0.5);
            let wav = make_wav(&samples);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..12], b"WAVE");
            assert_eq!(wav.len(), 44 + samples.len() * 2);
        }

        #[test]
        fn generators_stay_in_range() {
            for s in arpeggio(&[440.0, 880.0], 0.02, 0.3)
                .into_iter()
                .chain(noise_burst(0.02, 300.0, 0.3))
            {
                assert!(s.abs() <= 1.0);
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API (no-ops when the sound feature is off)
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
    use crate::domain::entity::RoomKey;

    #[test]
    fn turn_sounds_collapse() {
        let events = vec![
            GameEvent::EnemyHit { name: "Ratatouille".into(), damage: 1 },
            GameEvent::EnemySlain { name: "Ratatouille".into(), boss: false },
            GameEvent::PlayerHit { by: "Emulgealo".into(), damage: 2 },
            GameEvent::EnemyTaunt { name: "Emulgealo".into() },
            GameEvent::PlayerDied,
        ];
        assert_eq!(sfx_for_turn(&events), vec![Sfx::Slay, Sfx::Die]);
    }

    #[test]
    fn blocked_hit_is_silent() {
        let events = vec![
            GameEvent::EnemyHit { name: "Draconoid".into(), damage: 0 },
            GameEvent::RoomChanged { from: RoomKey::A, to: RoomKey::B },
        ];
        assert_eq!(sfx_for_turn(&events), vec![Sfx::Gate]);
        assert_eq!(sfx_for(&GameEvent::EnemySlain { name: "Draconoid".into(), boss: true }), Some(Sfx::BossSlain));
    }
}
