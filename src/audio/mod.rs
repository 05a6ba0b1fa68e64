pub mod composition;
pub mod device;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod mixer;
pub mod score;
pub mod sfx;
pub mod synth;

/// Every sample in the engine is computed for exactly this rate.
pub const SAMPLE_RATE: u32 = 44_100;
