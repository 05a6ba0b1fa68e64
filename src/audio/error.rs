use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no output device found")]
    NoOutputDevice,
    #[error("output device has no mono-compatible f32 config at {sample_rate} Hz")]
    ConfigurationMismatch { sample_rate: u32 },
    #[error("failed to query output configs: {0}")]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),
    #[error("failed to build stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("failed to play stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
    #[error("failed to start audio thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("audio thread exited before the stream was ready")]
    DeviceThread,
}
