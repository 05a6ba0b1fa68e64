//! Procedural audio for Stackfall: an evolving background score and short
//! event sounds, synthesized sample by sample with no recorded assets.

pub mod audio;

pub use audio::engine::{AudioEngine, EngineConfig};
pub use audio::error::AudioError;
pub use audio::sfx::{SoundEffect, UnknownEffect};
pub use audio::SAMPLE_RATE;
