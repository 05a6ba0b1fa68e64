use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use super::composition::{
    self, gain, ARRANGEMENT_BARS, BAR_SECS, BEAT_SECS, STEPS_PER_BAR, STEP_SECS,
};
use super::envelope;
use super::synth::{midi_to_freq, saw, sine, soft_clip, square, Noise, Phase};
use super::SAMPLE_RATE;

/// Control state for the score, shared between the control thread and the
/// output thread without a lock. A stale read costs at most one sample.
#[derive(Debug)]
pub struct Transport {
    playing: AtomicBool,
    volume: AtomicU32,
    rewind: AtomicBool,
}

impl Transport {
    pub fn new(volume: f32) -> Self {
        let transport = Self {
            playing: AtomicBool::new(false),
            volume: AtomicU32::new(0),
            rewind: AtomicBool::new(false),
        };
        transport.set_volume(volume);
        transport
    }

    pub fn play(&self) {
        self.playing.store(true, Ordering::Relaxed);
    }

    pub fn stop(&self) {
        self.playing.store(false, Ordering::Relaxed);
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }

    /// Clamped to [0, 1]. NaN is treated as silence.
    pub fn set_volume(&self, volume: f32) {
        let v = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        self.volume.store(v.to_bits(), Ordering::Relaxed);
    }

    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }

    /// Ask the output thread to rewind the score before its next block.
    pub fn request_rewind(&self) {
        self.rewind.store(true, Ordering::Release);
    }

    pub fn take_rewind(&self) -> bool {
        self.rewind.swap(false, Ordering::AcqRel)
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Persistent oscillator phase for every voice of the score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VoicePhases {
    pub kick: Phase,
    pub snare: Phase,
    pub bass: Phase,
    pub arp: Phase,
    pub lead: Phase,
    pub lead_detune: Phase,
    pub pad: [Phase; 3],
}

/// Weighted contribution of each voice to one sample, before the soft clip.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VoiceMix {
    pub kick: f32,
    pub snare: f32,
    pub hihat: f32,
    pub bass: f32,
    pub arp: f32,
    pub lead: f32,
    pub pad: f32,
}

impl VoiceMix {
    pub fn sum(&self) -> f32 {
        self.kick + self.snare + self.hihat + self.bass + self.arp + self.lead + self.pad
    }
}

/// The continuously evolving background score.
///
/// Owned by the output thread. Every call to [`Score::next_sample`] advances
/// the sample clock and every sounding voice by exactly one sample, whether
/// or not the transport is playing, so resuming never jumps in phase.
pub struct Score {
    sample_rate: f32,
    clock: u64,
    phases: VoicePhases,
    noise: Noise,
    transport: Arc<Transport>,
}

impl Score {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self {
            sample_rate: SAMPLE_RATE as f32,
            clock: 0,
            phases: VoicePhases::default(),
            noise: Noise::new(),
            transport,
        }
    }

    pub fn transport(&self) -> &Arc<Transport> {
        &self.transport
    }

    /// Samples emitted since construction or the last reset.
    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn phases(&self) -> VoicePhases {
        self.phases
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.clock as f64 / self.sample_rate as f64
    }

    /// Bar within the arrangement for the next sample to be emitted.
    pub fn bar(&self) -> u64 {
        (self.elapsed_secs() / BAR_SECS) as u64 % ARRANGEMENT_BARS
    }

    /// Back to the state of a freshly built score.
    pub fn reset(&mut self) {
        self.clock = 0;
        self.phases = VoicePhases::default();
        self.noise.reseed();
    }

    pub fn next_sample(&mut self) -> f32 {
        let mix = soft_clip(self.render_voices().sum());
        if self.transport.is_playing() {
            mix * self.transport.volume()
        } else {
            0.0
        }
    }

    pub fn fill(&mut self, out: &mut [f32]) {
        for s in out.iter_mut() {
            *s = self.next_sample();
        }
    }

    /// Render one sample of every voice and advance the clock.
    pub fn render_voices(&mut self) -> VoiceMix {
        let t = self.elapsed_secs();
        self.clock += 1;

        let bar_pos = (t % BAR_SECS) / BAR_SECS;
        let beat_pos = ((t % BEAT_SECS) / BEAT_SECS) as f32;
        let steps = bar_pos * STEPS_PER_BAR as f64;
        let step = steps as usize % STEPS_PER_BAR;
        let step_pos = steps.fract() as f32;
        let bar = (t / BAR_SECS) as u64 % ARRANGEMENT_BARS;

        let mut mix = VoiceMix {
            kick: self.kick(beat_pos) * gain::KICK,
            snare: self.snare(beat_pos) * gain::SNARE,
            hihat: self.hihat(step_pos) * gain::HIHAT,
            ..VoiceMix::default()
        };
        if bar >= composition::BASS_ENTRY_BAR {
            mix.bass = self.bass(step, step_pos) * gain::BASS;
        }
        if bar >= composition::ARP_ENTRY_BAR {
            mix.arp = self.arp(t) * gain::ARP;
        }
        if bar >= composition::LEAD_ENTRY_BAR {
            mix.lead = self.lead(t) * gain::LEAD;
        }
        mix.pad = self.pad(t) * gain::PAD;
        mix
    }

    // ──────────────── Drums ────────────────

    /// Pitch-dropping sine thump on every beat.
    fn kick(&mut self, beat_pos: f32) -> f32 {
        if beat_pos > 0.15 {
            return 0.0;
        }
        let t = beat_pos * BEAT_SECS as f32;
        let freq = 150.0 * (-t * 40.0).exp() + 45.0;
        let p = self.phases.kick.advance(freq, self.sample_rate);
        sine(p) * envelope::percussive(t, 15.0)
    }

    /// Tone plus noise, halfway through every beat.
    fn snare(&mut self, beat_pos: f32) -> f32 {
        let pos = (beat_pos + 0.5) % 1.0;
        if pos > 0.12 {
            return 0.0;
        }
        let t = pos * BEAT_SECS as f32;
        let tone = sine(self.phases.snare.advance(200.0, self.sample_rate)) * 0.3;
        let rattle = self.noise.next_sample() * 0.7;
        (tone + rattle) * envelope::percussive(t, 20.0)
    }

    fn hihat(&mut self, step_pos: f32) -> f32 {
        if step_pos > 0.3 {
            return 0.0;
        }
        let t = step_pos * STEP_SECS as f32;
        self.noise.next_sample() * envelope::percussive(t, 50.0)
    }

    // ──────────────── Melodic voices ────────────────

    fn bass(&mut self, step: usize, step_pos: f32) -> f32 {
        let note = composition::BASS_PATTERN[step];
        if note == 0 {
            return 0.0;
        }
        let p = self.phases.bass.advance(midi_to_freq(note), self.sample_rate);
        (saw(p) * 0.6 + square(p) * 0.4) * envelope::percussive(step_pos, 8.0)
    }

    /// Sixteenth-note pluck cycling through the arpeggio table.
    fn arp(&mut self, t: f64) -> f32 {
        let steps = t / STEP_SECS;
        let note = composition::ARP_NOTES[steps as usize % composition::ARP_NOTES.len()];
        let step_pos = steps.fract() as f32;
        let p = self.phases.arp.advance(midi_to_freq(note), self.sample_rate);
        saw(p) * envelope::percussive(step_pos, 12.0) * 0.7
    }

    fn lead(&mut self, t: f64) -> f32 {
        let melody_secs = BAR_SECS * composition::LEAD_BARS;
        let notes = composition::LEAD_MELODY.len();
        let pos = (t % melody_secs) / melody_secs * notes as f64;
        let note = composition::LEAD_MELODY[pos as usize % notes];
        let note_pos = pos.fract() as f32;
        let freq = midi_to_freq(note);

        let p = self.phases.lead.advance(freq, self.sample_rate);
        let p2 = self
            .phases
            .lead_detune
            .advance(freq * composition::LEAD_DETUNE, self.sample_rate);
        let osc = square(p) * 0.4 + saw(p) * 0.3 + saw(p2) * 0.3;
        osc * envelope::attack_decay(note_pos, 20.0, 3.0)
    }

    /// Static chord with a slow tremolo per note.
    fn pad(&mut self, t: f64) -> f32 {
        let mut sum = 0.0f32;
        for (i, &note) in composition::PAD_CHORD.iter().enumerate() {
            let p = self.phases.pad[i].advance(midi_to_freq(note), self.sample_rate);
            let lfo = (t * 0.5 + i as f64 * 0.5).sin() as f32 * 0.3 + 0.7;
            sum += sine(p) * lfo;
        }
        sum / composition::PAD_CHORD.len() as f32
    }
}
