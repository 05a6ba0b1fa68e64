//! Fixed composition data for the background score.

pub const BPM: f64 = 128.0;
pub const BEAT_SECS: f64 = 60.0 / BPM;
pub const BAR_SECS: f64 = BEAT_SECS * 4.0;
/// Sixteenth-note steps per bar
pub const STEPS_PER_BAR: usize = 16;
pub const STEP_SECS: f64 = BEAT_SECS / 4.0;
/// The arrangement loops after this many bars, dropping back to drums and pad.
pub const ARRANGEMENT_BARS: u64 = 8;

// Bar (within the arrangement) at which each melodic voice enters.
pub const BASS_ENTRY_BAR: u64 = 1;
pub const ARP_ENTRY_BAR: u64 = 2;
pub const LEAD_ENTRY_BAR: u64 = 4;

/// E minor pentatonic bass line, MIDI notes, 0 = rest.
pub const BASS_PATTERN: [u8; STEPS_PER_BAR] = [
    40, 0, 40, 0, 43, 0, 40, 45, //
    0, 40, 0, 0, 43, 0, 40, 0,
];

/// E4 G4 B4 D5 E5 G5 B5 D6, one per sixteenth.
pub const ARP_NOTES: [u8; 8] = [52, 55, 59, 62, 64, 67, 71, 74];

/// Two-bar lead melody, one note per half beat.
pub const LEAD_MELODY: [u8; 16] = [
    64, 64, 67, 67, 71, 71, 69, 67, //
    64, 67, 71, 74, 72, 71, 69, 67,
];
pub const LEAD_BARS: f64 = 2.0;
pub const LEAD_DETUNE: f32 = 1.005;

/// E3 G3 B3
pub const PAD_CHORD: [u8; 3] = [40, 43, 47];

/// Mix weights applied to each voice before the soft clip.
pub mod gain {
    pub const KICK: f32 = 0.5;
    pub const SNARE: f32 = 0.3;
    pub const HIHAT: f32 = 0.15;
    pub const BASS: f32 = 0.35;
    pub const ARP: f32 = 0.2;
    pub const LEAD: f32 = 0.25;
    pub const PAD: f32 = 0.1;
}
