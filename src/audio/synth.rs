use std::f32::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seed for every noise source. Drum texture is reproducible run to run.
pub const NOISE_SEED: u64 = 42;

/// Running position within one waveform cycle, kept in [0, 1).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Phase(f32);

impl Phase {
    pub fn new() -> Self {
        Self(0.0)
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Step forward by one sample at `frequency` and return the new position.
    #[inline]
    pub fn advance(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        self.0 += frequency / sample_rate;
        if self.0 >= 1.0 {
            self.0 -= 1.0;
        }
        self.0
    }

    pub fn reset(&mut self) {
        self.0 = 0.0;
    }
}

// ──────────────── Waveforms ────────────────

#[inline]
pub fn saw(phase: f32) -> f32 {
    2.0 * phase - 1.0
}

#[inline]
pub fn square(phase: f32) -> f32 {
    if phase < 0.5 {
        1.0
    } else {
        -1.0
    }
}

#[inline]
pub fn sine(phase: f32) -> f32 {
    (phase * 2.0 * PI).sin()
}

/// Saturate a summed signal into (-1, 1) without a hard corner.
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    x.tanh()
}

/// Convert MIDI note number to frequency (note 69 = A4 = 440 Hz)
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * 2.0f32.powf((note as f32 - 69.0) / 12.0)
}

/// Uniform white noise in [-1, 1] from a fixed-seed generator.
pub struct Noise {
    rng: StdRng,
}

impl Noise {
    pub fn new() -> Self {
        Self {
            rng: StdRng::seed_from_u64(NOISE_SEED),
        }
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        self.rng.gen_range(-1.0..=1.0)
    }

    /// Rewind to the start of the seeded sequence.
    pub fn reseed(&mut self) {
        self.rng = StdRng::seed_from_u64(NOISE_SEED);
    }
}

impl Default for Noise {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circular_distance(a: f32, b: f32) -> f32 {
        let d = (a - b).abs();
        d.min(1.0 - d)
    }

    #[test]
    fn test_octave_doubles_frequency() {
        for note in 0..=115u8 {
            let low = midi_to_freq(note);
            let high = midi_to_freq(note + 12);
            assert!(
                (high - 2.0 * low).abs() <= 1e-4 * high,
                "note {} -> {} Hz, note {} -> {} Hz",
                note,
                low,
                note + 12,
                high
            );
        }
    }

    #[test]
    fn test_reference_pitch() {
        assert!((midi_to_freq(69) - 440.0).abs() < 1e-4);
        assert!((midi_to_freq(57) - 220.0).abs() < 1e-4);
    }

    #[test]
    fn test_phase_returns_after_one_period() {
        let sample_rate = 44_100.0;
        for &freq in &[441.0f32, 100.0, 220.5] {
            let mut phase = Phase::new();
            let start = phase.value();
            let period = (sample_rate / freq).round() as usize;
            for _ in 0..period {
                phase.advance(freq, sample_rate);
            }
            assert!(
                circular_distance(phase.value(), start) < 1e-3,
                "{} Hz ended at {}",
                freq,
                phase.value()
            );
        }
    }

    #[test]
    fn test_phase_stays_in_unit_interval() {
        let mut phase = Phase::new();
        for _ in 0..10_000 {
            let p = phase.advance(5_000.0, 44_100.0);
            assert!((0.0..1.0).contains(&p));
        }
    }

    #[test]
    fn test_waveform_shapes() {
        assert_eq!(saw(0.0), -1.0);
        assert_eq!(saw(0.5), 0.0);
        assert_eq!(square(0.25), 1.0);
        assert_eq!(square(0.5), -1.0);
        assert!(sine(0.25) > 0.999);
    }

    #[test]
    fn test_soft_clip_bounded() {
        for &x in &[0.0f32, 0.5, 1.0, 3.0, 40.0, -40.0, 1e6] {
            assert!(soft_clip(x).abs() <= 1.0);
        }
        assert!((soft_clip(0.1) - 0.1).abs() < 1e-3);
    }

    #[test]
    fn test_noise_is_bounded_and_seeded() {
        let mut a = Noise::new();
        let mut b = Noise::new();
        for _ in 0..1_000 {
            let x = a.next_sample();
            assert!((-1.0..=1.0).contains(&x));
            assert_eq!(x, b.next_sample());
        }
        let first = {
            let mut fresh = Noise::new();
            fresh.next_sample()
        };
        a.reseed();
        assert_eq!(a.next_sample(), first);
    }
}
