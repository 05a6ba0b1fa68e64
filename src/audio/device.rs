use std::thread::{self, JoinHandle};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    BufferSize, SampleFormat, SampleRate, StreamConfig, SupportedBufferSize,
    SupportedStreamConfigRange,
};
use crossbeam_channel::{bounded, Sender};

use super::error::AudioError;
use super::SAMPLE_RATE;

/// Frames of mono scratch reserved for multi-channel devices. Larger device
/// buffers are filled in chunks of this size.
const SCRATCH_FRAMES: usize = 4096;

/// Produces mono samples on demand for the output callback.
pub trait BlockSource: Send + 'static {
    /// Overwrite every slot of `out` with the next samples, in order.
    fn fill(&mut self, out: &mut [f32]);
}

/// An open output stream.
///
/// cpal streams are not `Send` on every backend, so the stream is built and
/// dropped on a dedicated thread that parks until [`AudioDevice::close`].
/// Closing joins that thread, which guarantees the callback has stopped
/// before the caller's state goes away.
pub struct AudioDevice {
    config: StreamConfig,
    shutdown_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl AudioDevice {
    pub fn open<S: BlockSource>(source: S, buffer_frames: u32) -> Result<Self, AudioError> {
        let (ready_tx, ready_rx) = bounded::<Result<StreamConfig, AudioError>>(1);
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);

        let thread = thread::Builder::new()
            .name("audio-output".into())
            .spawn(move || {
                let stream = match start_stream(source, buffer_frames) {
                    Ok((stream, config)) => {
                        let _ = ready_tx.send(Ok(config));
                        stream
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                // Returns on close() or when the handle is dropped.
                let _ = shutdown_rx.recv();
                if let Err(e) = stream.pause() {
                    log::debug!("pause on close failed: {}", e);
                }
                drop(stream);
            })?;

        match ready_rx.recv() {
            Ok(Ok(config)) => Ok(Self {
                config,
                shutdown_tx: Some(shutdown_tx),
                thread: Some(thread),
            }),
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                Err(AudioError::DeviceThread)
            }
        }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.thread.is_some()
    }

    /// Stop the stream and wait for the output thread. Safe to call twice.
    pub fn close(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("audio output thread panicked");
            } else {
                log::info!("audio device closed");
            }
        }
    }
}

impl Drop for AudioDevice {
    fn drop(&mut self) {
        self.close();
    }
}

fn start_stream<S: BlockSource>(
    mut source: S,
    buffer_frames: u32,
) -> Result<(cpal::Stream, StreamConfig), AudioError> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(AudioError::NoOutputDevice)?;
    let config = choose_config(device.supported_output_configs()?, buffer_frames)?;

    let channels = config.channels as usize;
    let mut scratch = vec![0.0f32; SCRATCH_FRAMES.max(buffer_frames as usize)];
    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            write_frames(&mut source, &mut scratch, data, channels);
        },
        |err| log::error!("audio stream error: {}", err),
        None,
    )?;
    stream.play()?;

    log::info!(
        "audio device '{}' open: {} Hz, {} ch, buffer {:?}",
        device.name().unwrap_or_else(|_| "unknown".to_string()),
        config.sample_rate.0,
        config.channels,
        config.buffer_size
    );
    Ok((stream, config))
}

/// Pick an F32 config that runs at exactly [`SAMPLE_RATE`], preferring the
/// fewest channels. Nothing is ever resampled; no match is a hard error.
fn choose_config(
    ranges: impl IntoIterator<Item = SupportedStreamConfigRange>,
    buffer_frames: u32,
) -> Result<StreamConfig, AudioError> {
    let rate = SampleRate(SAMPLE_RATE);
    let mut chosen: Option<SupportedStreamConfigRange> = None;
    for range in ranges {
        if range.sample_format() != SampleFormat::F32 {
            continue;
        }
        if range.min_sample_rate() > rate || range.max_sample_rate() < rate {
            continue;
        }
        if chosen.as_ref().map_or(true, |c| range.channels() < c.channels()) {
            chosen = Some(range);
        }
    }
    let range = chosen.ok_or(AudioError::ConfigurationMismatch { sample_rate: SAMPLE_RATE })?;

    let buffer_size = match range.buffer_size() {
        SupportedBufferSize::Range { min, max } if !(*min..=*max).contains(&buffer_frames) => {
            log::debug!(
                "buffer of {} frames outside device range {}..={}, using default",
                buffer_frames,
                min,
                max
            );
            BufferSize::Default
        }
        _ => BufferSize::Fixed(buffer_frames),
    };
    Ok(StreamConfig {
        channels: range.channels(),
        sample_rate: rate,
        buffer_size,
    })
}

/// Fill an interleaved device buffer from a mono source, copying each
/// sample into every channel of its frame.
///
/// `scratch` is never resized; buffers longer than it are filled in chunks.
fn write_frames<S: BlockSource>(
    source: &mut S,
    scratch: &mut [f32],
    data: &mut [f32],
    channels: usize,
) {
    if channels <= 1 {
        source.fill(data);
        return;
    }
    if scratch.is_empty() {
        data.fill(0.0);
        return;
    }
    for chunk in data.chunks_mut(scratch.len() * channels) {
        let mono = &mut scratch[..chunk.len() / channels];
        source.fill(mono);
        for (frame, &s) in chunk.chunks_mut(channels).zip(mono.iter()) {
            frame.fill(s);
        }
    }
}
