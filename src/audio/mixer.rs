use super::device::BlockSource;
use super::score::Score;
use super::sfx::EffectSynth;
use super::synth::soft_clip;

/// Everything the output thread renders: the score plus triggered effects,
/// summed and soft clipped into one mono signal.
pub struct Mixer {
    score: Score,
    effects: EffectSynth,
}

impl Mixer {
    pub fn new(score: Score, effects: EffectSynth) -> Self {
        Self { score, effects }
    }

    pub fn score(&self) -> &Score {
        &self.score
    }
}

impl BlockSource for Mixer {
    fn fill(&mut self, out: &mut [f32]) {
        if self.score.transport().take_rewind() {
            self.score.reset();
        }
        // The score runs for every slot, audible or not.
        self.score.fill(out);
        self.effects.mix_into(out);
        for s in out.iter_mut() {
            *s = soft_clip(*s);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::audio::score::Transport;
    use crate::audio::sfx::SoundEffect;

    fn mixer(playing: bool) -> (Mixer, Arc<Transport>, EffectSynth) {
        let transport = Arc::new(Transport::new(1.0));
        if playing {
            transport.play();
        }
        let effects = EffectSynth::new();
        let mixer = Mixer::new(Score::new(transport.clone()), effects.clone());
        (mixer, transport, effects)
    }

    #[test]
    fn test_stopped_score_passes_effect_through() {
        let (mut mixer, _transport, effects) = mixer(false);
        effects.trigger(SoundEffect::Move);
        let mut out = vec![0.0; 512];
        mixer.fill(&mut out);
        let expected = SoundEffect::Move.render();
        for (o, s) in out.iter().zip(&expected) {
            assert!((o - s.tanh()).abs() < 1e-6);
        }
        assert_eq!(mixer.score().clock(), 512);
    }

    #[test]
    fn test_silence_when_nothing_plays() {
        let (mut mixer, _transport, _effects) = mixer(false);
        let mut out = vec![0.3; 256];
        mixer.fill(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_combined_output_is_bounded() {
        let (mut mixer, _transport, effects) = mixer(true);
        let mut out = vec![0.0; 1024];
        for block in 0..200 {
            if block % 10 == 0 {
                effects.trigger(SoundEffect::Tetris);
            }
            mixer.fill(&mut out);
            assert!(out.iter().all(|s| s.abs() <= 1.0));
        }
    }

    #[test]
    fn test_rewind_applies_on_next_block() {
        let (mut mixer, transport, _effects) = mixer(true);
        let mut out = vec![0.0; 1000];
        mixer.fill(&mut out);
        mixer.fill(&mut out);
        assert_eq!(mixer.score().clock(), 2000);

        transport.request_rewind();
        mixer.fill(&mut out);
        assert_eq!(mixer.score().clock(), 1000);
    }

    #[test]
    fn test_block_size_does_not_change_signal() {
        let (mut whole, _t1, _e1) = mixer(true);
        let (mut pieces, _t2, _e2) = mixer(true);

        let mut a = vec![0.0; 3000];
        whole.fill(&mut a);

        let mut b = vec![0.0; 3000];
        for chunk in b.chunks_mut(441) {
            pieces.fill(chunk);
        }
        assert_eq!(a, b);
    }
}
