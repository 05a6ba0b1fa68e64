use std::sync::Arc;

use super::device::AudioDevice;
use super::error::AudioError;
use super::mixer::Mixer;
use super::score::{Score, Transport};
use super::sfx::{EffectSynth, SoundEffect};

/// Host-tunable settings. Tempo, pitch tables and sample rate are fixed.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Initial score volume, clamped to [0, 1]
    pub volume: f32,
    /// Requested device buffer size in frames
    pub buffer_frames: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            volume: 0.5,
            buffer_frames: 1024,
        }
    }
}

enum DeviceState {
    Closed,
    Open(AudioDevice),
    /// Opening failed once; audio stays off for the rest of the session.
    Failed,
}

/// Control-thread facade over the score, the effects and the output device.
///
/// Audio is optional: if [`AudioEngine::init`] fails every other call still
/// works and simply produces nothing.
pub struct AudioEngine {
    config: EngineConfig,
    transport: Arc<Transport>,
    effects: EffectSynth,
    device: DeviceState,
}

impl AudioEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            transport: Arc::new(Transport::new(config.volume)),
            effects: EffectSynth::new(),
            device: DeviceState::Closed,
        }
    }

    /// Open the output device. Returns whether audio is running.
    ///
    /// A failure is logged once and latched; later calls return `false`
    /// without touching the device again.
    pub fn init(&mut self) -> bool {
        match self.device {
            DeviceState::Open(_) => return true,
            DeviceState::Failed => return false,
            DeviceState::Closed => {}
        }
        match self.open_device() {
            Ok(device) => {
                self.device = DeviceState::Open(device);
                true
            }
            Err(e) => {
                log::warn!("audio disabled: {}", e);
                self.device = DeviceState::Failed;
                false
            }
        }
    }

    fn open_device(&self) -> Result<AudioDevice, AudioError> {
        let mixer = Mixer::new(Score::new(self.transport.clone()), self.effects.clone());
        AudioDevice::open(mixer, self.config.buffer_frames)
    }

    /// Stop playback and close the device. Safe before `init` and after a
    /// failed `init`, and safe to call repeatedly.
    pub fn shutdown(&mut self) {
        self.transport.stop();
        match std::mem::replace(&mut self.device, DeviceState::Closed) {
            DeviceState::Open(mut device) => {
                device.close();
                self.effects.cancel();
            }
            // Failed stays failed.
            other => self.device = other,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.device, DeviceState::Open(_))
    }

    pub fn play(&self) {
        self.transport.play();
    }

    pub fn stop(&self) {
        self.transport.stop();
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    /// Score volume only; effects always play at their own level.
    pub fn set_volume(&self, volume: f32) {
        self.transport.set_volume(volume);
    }

    pub fn volume(&self) -> f32 {
        self.transport.volume()
    }

    /// Rewind the score to bar one with fresh oscillator state.
    pub fn restart(&self) {
        self.transport.request_rewind();
    }

    /// Play `effect`, cutting off any effect still sounding.
    pub fn trigger(&self, effect: SoundEffect) {
        if !self.is_active() {
            return;
        }
        self.effects.trigger(effect);
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controls_work_without_device() {
        let engine = AudioEngine::new(EngineConfig::default());
        assert!(!engine.is_active());
        assert!(!engine.is_playing());
        assert_eq!(engine.volume(), 0.5);

        engine.play();
        engine.play();
        assert!(engine.is_playing());
        engine.stop();
        engine.stop();
        assert!(!engine.is_playing());

        engine.set_volume(7.0);
        assert_eq!(engine.volume(), 1.0);
    }

    #[test]
    fn test_trigger_without_device_is_silent() {
        let engine = AudioEngine::new(EngineConfig::default());
        engine.trigger(SoundEffect::Tetris);
        assert_eq!(engine.effects.pending(), 0);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut engine = AudioEngine::new(EngineConfig::default());
        engine.shutdown();
        engine.shutdown();
        assert!(!engine.is_active());
    }

    #[test]
    fn test_failed_init_is_latched() {
        let mut engine = AudioEngine::new(EngineConfig::default());
        engine.device = DeviceState::Failed;
        assert!(!engine.init());
        assert!(!engine.init());
        engine.shutdown();
        assert!(matches!(engine.device, DeviceState::Failed));
        engine.play();
        engine.trigger(SoundEffect::Move);
        assert_eq!(engine.effects.pending(), 0);
    }

    #[test]
    fn test_restart_requests_rewind() {
        let engine = AudioEngine::new(EngineConfig::default());
        engine.restart();
        assert!(engine.transport.take_rewind());
    }
}
