//! Amplitude curves multiplied into raw oscillator output.

/// Exponential decay from 1 towards 0. Used for drums and plucks.
#[inline]
pub fn percussive(position: f32, decay_rate: f32) -> f32 {
    (-position * decay_rate).exp()
}

/// Linear rise capped at 1, times an exponential decay.
#[inline]
pub fn attack_decay(position: f32, attack_rate: f32, decay_rate: f32) -> f32 {
    (position * attack_rate).min(1.0) * (-position * decay_rate).exp()
}

/// Linear fade-in and fade-out over a finite tone, measured in samples.
///
/// The gain is the lower of the two ramps, so a tone shorter than its
/// release window still rises and falls without a step. Sample 0 and the
/// last sample are both silent.
#[derive(Debug, Clone, Copy)]
pub struct ToneEnvelope {
    len: usize,
    attack: usize,
    release: usize,
}

impl ToneEnvelope {
    pub fn new(len: usize, attack: usize, release: usize) -> Self {
        Self {
            len,
            attack: attack.max(1),
            release: release.max(1),
        }
    }

    pub fn from_secs(len: usize, attack_secs: f32, release_secs: f32, sample_rate: f32) -> Self {
        Self::new(
            len,
            (attack_secs * sample_rate).round() as usize,
            (release_secs * sample_rate).round() as usize,
        )
    }

    pub fn gain(&self, index: usize) -> f32 {
        if index >= self.len {
            return 0.0;
        }
        let rise = (index as f32 / self.attack as f32).min(1.0);
        let remaining = self.len - 1 - index;
        let fall = (remaining as f32 / self.release as f32).min(1.0);
        rise.min(fall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percussive_never_negative() {
        assert_eq!(percussive(0.0, 15.0), 1.0);
        let mut prev = 1.0;
        for i in 1..1_000 {
            let v = percussive(i as f32 * 0.01, 15.0);
            assert!(v >= 0.0);
            assert!(v <= prev);
            prev = v;
        }
    }

    #[test]
    fn test_attack_decay_rises_then_falls() {
        assert_eq!(attack_decay(0.0, 20.0, 3.0), 0.0);
        let peak = attack_decay(0.05, 20.0, 3.0);
        assert!(attack_decay(0.025, 20.0, 3.0) < peak);
        assert!(attack_decay(0.5, 20.0, 3.0) < peak);
        assert!(attack_decay(0.99, 20.0, 3.0) > 0.0);
    }

    #[test]
    fn test_tone_envelope_endpoints() {
        let env = ToneEnvelope::from_secs(2205, 0.01, 0.05, 44_100.0);
        assert_eq!(env.gain(0), 0.0);
        assert_eq!(env.gain(2204), 0.0);
        assert_eq!(env.gain(2205), 0.0);
        assert!(env.gain(441) > 0.7);
        for i in 1..2204 {
            assert!(env.gain(i) > 0.0 && env.gain(i) <= 1.0);
        }
    }

    #[test]
    fn test_tone_envelope_sustains_between_ramps() {
        let env = ToneEnvelope::from_secs(8820, 0.01, 0.05, 44_100.0);
        assert_eq!(env.gain(2000), 1.0);
        assert!((env.gain(220) - 0.5).abs() < 0.01);
    }
}
