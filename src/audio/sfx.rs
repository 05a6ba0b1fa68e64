use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use super::envelope::ToneEnvelope;
use super::synth::{sine, Phase};
use super::SAMPLE_RATE;

const ATTACK_SECS: f32 = 0.01;
const RELEASE_SECS: f32 = 0.05;

/// Discrete game events that have a sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    Move,
    Rotate,
    Drop,
    LineClear,
    /// Four lines cleared at once
    Tetris,
    LevelUp,
    GameOver,
}

/// One piece of an effect. Segments of an effect are played back to back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Tone { freq: f32, secs: f32, volume: f32 },
    /// Frequency moves linearly from `from` to `to` over the segment.
    Sweep { from: f32, to: f32, secs: f32, volume: f32 },
}

const fn tone(freq: f32, secs: f32, volume: f32) -> Segment {
    Segment::Tone { freq, secs, volume }
}

// C4 E4 G4 C5 E5 G5 C6
const C4: f32 = 261.63;
const E4: f32 = 329.63;
const G4: f32 = 392.00;
const C5: f32 = 523.25;
const E5: f32 = 659.25;
const G5: f32 = 783.99;
const C6: f32 = 1046.50;

// short low click
const MOVE: &[Segment] = &[tone(200.0, 0.05, 0.2)];
const ROTATE: &[Segment] = &[Segment::Sweep { from: 300.0, to: 500.0, secs: 0.08, volume: 0.25 }];
// thud
const DROP: &[Segment] = &[tone(100.0, 0.1, 0.4), tone(80.0, 0.1, 0.3)];
const LINE_CLEAR: &[Segment] = &[tone(C5, 0.1, 0.3), tone(E5, 0.1, 0.3), tone(G5, 0.15, 0.3)];
// fanfare
const TETRIS: &[Segment] = &[
    tone(C5, 0.1, 0.35),
    tone(E5, 0.1, 0.35),
    tone(G5, 0.1, 0.35),
    tone(C6, 0.2, 0.4),
];
const LEVEL_UP: &[Segment] = &[
    tone(C4, 0.1, 0.3),
    tone(E4, 0.1, 0.3),
    tone(G4, 0.1, 0.3),
    tone(C5, 0.2, 0.35),
];
// descending sigh
const GAME_OVER: &[Segment] = &[
    tone(400.0, 0.2, 0.3),
    tone(300.0, 0.2, 0.3),
    tone(200.0, 0.3, 0.25),
    tone(150.0, 0.4, 0.2),
];

impl SoundEffect {
    pub const ALL: [SoundEffect; 7] = [
        SoundEffect::Move,
        SoundEffect::Rotate,
        SoundEffect::Drop,
        SoundEffect::LineClear,
        SoundEffect::Tetris,
        SoundEffect::LevelUp,
        SoundEffect::GameOver,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SoundEffect::Move => "move",
            SoundEffect::Rotate => "rotate",
            SoundEffect::Drop => "drop",
            SoundEffect::LineClear => "line_clear",
            SoundEffect::Tetris => "tetris",
            SoundEffect::LevelUp => "level_up",
            SoundEffect::GameOver => "game_over",
        }
    }

    pub fn segments(self) -> &'static [Segment] {
        match self {
            SoundEffect::Move => MOVE,
            SoundEffect::Rotate => ROTATE,
            SoundEffect::Drop => DROP,
            SoundEffect::LineClear => LINE_CLEAR,
            SoundEffect::Tetris => TETRIS,
            SoundEffect::LevelUp => LEVEL_UP,
            SoundEffect::GameOver => GAME_OVER,
        }
    }

    /// Synthesize the whole effect at the engine sample rate.
    pub fn render(self) -> Vec<f32> {
        let sample_rate = SAMPLE_RATE as f32;
        let total = self
            .segments()
            .iter()
            .map(|seg| seg.len(sample_rate))
            .sum();
        let mut out = Vec::with_capacity(total);
        for seg in self.segments() {
            seg.render_into(&mut out, sample_rate);
        }
        out
    }
}

impl fmt::Display for SoundEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Error)]
#[error("unknown sound effect: {0:?}")]
pub struct UnknownEffect(pub String);

impl FromStr for SoundEffect {
    type Err = UnknownEffect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        SoundEffect::ALL
            .into_iter()
            .find(|e| e.name() == key)
            .ok_or_else(|| UnknownEffect(s.to_string()))
    }
}

impl Segment {
    pub fn secs(&self) -> f32 {
        match *self {
            Segment::Tone { secs, .. } | Segment::Sweep { secs, .. } => secs,
        }
    }

    pub fn len(&self, sample_rate: f32) -> usize {
        (self.secs() * sample_rate).round() as usize
    }

    fn render_into(&self, out: &mut Vec<f32>, sample_rate: f32) {
        let len = self.len(sample_rate);
        let env = ToneEnvelope::from_secs(len, ATTACK_SECS, RELEASE_SECS, sample_rate);
        match *self {
            Segment::Tone { freq, volume, .. } => {
                for i in 0..len {
                    let t = i as f32 / sample_rate;
                    out.push((2.0 * std::f32::consts::PI * freq * t).sin() * volume * env.gain(i));
                }
            }
            Segment::Sweep { from, to, volume, .. } => {
                let mut phase = Phase::new();
                for i in 0..len {
                    let progress = i as f32 / len as f32;
                    let s = sine(phase.value());
                    phase.advance(from + (to - from) * progress, sample_rate);
                    out.push(s * volume * env.gain(i));
                }
            }
        }
    }
}

/// Samples of the effect currently playing, plus the read cursor.
#[derive(Debug, Default)]
struct EffectBuffer {
    samples: Vec<f32>,
    cursor: usize,
}

/// Renders triggered effects and hands them to the output thread.
///
/// Clones share one buffer. [`EffectSynth::trigger`] is called from the
/// control thread and [`EffectSynth::mix_into`] from the output callback.
/// A new trigger replaces whatever has not been played yet.
#[derive(Clone, Default)]
pub struct EffectSynth {
    buffer: Arc<Mutex<EffectBuffer>>,
}

impl EffectSynth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `effect` and make it the one that plays next.
    ///
    /// Rendering happens before the lock is taken, so the output thread only
    /// ever waits for a pointer swap.
    pub fn trigger(&self, effect: SoundEffect) {
        let rendered = effect.render();
        log::debug!("sfx {} ({} samples)", effect, rendered.len());
        let _stale = {
            let mut buf = self.buffer.lock();
            buf.cursor = 0;
            std::mem::replace(&mut buf.samples, rendered)
        };
    }

    /// Drop anything still playing.
    pub fn cancel(&self) {
        let mut buf = self.buffer.lock();
        buf.samples.clear();
        buf.cursor = 0;
    }

    /// Unplayed samples left in the buffer.
    pub fn pending(&self) -> usize {
        let buf = self.buffer.lock();
        buf.samples.len() - buf.cursor
    }

    /// Add as much of the pending effect as fits into `out`.
    ///
    /// Once the last sample has been read the buffer is emptied, so later
    /// calls return straight away.
    pub fn mix_into(&self, out: &mut [f32]) {
        let mut buf = self.buffer.lock();
        if buf.samples.is_empty() {
            return;
        }
        let start = buf.cursor;
        let n = (buf.samples.len() - start).min(out.len());
        for (o, s) in out.iter_mut().zip(&buf.samples[start..start + n]) {
            *o += *s;
        }
        buf.cursor += n;
        if buf.cursor >= buf.samples.len() {
            // keeps capacity; nothing is freed on the output thread
            buf.samples.clear();
            buf.cursor = 0;
        }
    }
}
