//! Audio output device
//!
//! Opens the default cpal output device and drives [`MixerState::fill`]
//! from the device callback. The callback takes the shared state lock for
//! the duration of one fill; the control path holds that lock only for
//! short, bounded mutations.

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{debug, error};

use crate::engine::{MixerState, lock_state};
use crate::error::MixerError;

/// Audio output stream bound to the shared mixer state
pub struct AudioOutput {
    /// The cpal stream (kept alive for the duration)
    _stream: cpal::Stream,
    /// Negotiated output sample rate
    sample_rate: u32,
}

impl AudioOutput {
    /// Open the default device and start the stream
    pub fn new(state: Arc<Mutex<MixerState>>) -> Result<Self, MixerError> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or(MixerError::NoOutputDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| MixerError::DeviceConfig(e.to_string()))?;

        let sample_rate = config.sample_rate().0;

        // The engine fills i16 natively; other formats convert from an i16
        // scratch buffer inside the callback.
        let stream = match config.sample_format() {
            cpal::SampleFormat::I16 => {
                let config = config.into();
                device
                    .build_output_stream(
                        &config,
                        move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                            lock_state(&state).fill(data);
                        },
                        |err| error!("audio stream error: {err}"),
                        None,
                    )
                    .map_err(|e| MixerError::StreamBuild(e.to_string()))?
            }
            cpal::SampleFormat::F32 => {
                let config = config.into();
                let mut scratch: Vec<i16> = vec![0; 4096];
                device
                    .build_output_stream(
                        &config,
                        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                            if scratch.len() < data.len() {
                                scratch.resize(data.len(), 0);
                            }
                            let scratch = &mut scratch[..data.len()];
                            lock_state(&state).fill(scratch);
                            for (out, &s) in data.iter_mut().zip(scratch.iter()) {
                                *out = s as f32 / 32768.0;
                            }
                        },
                        |err| error!("audio stream error: {err}"),
                        None,
                    )
                    .map_err(|e| MixerError::StreamBuild(e.to_string()))?
            }
            cpal::SampleFormat::U16 => {
                let config = config.into();
                let mut scratch: Vec<i16> = vec![0; 4096];
                device
                    .build_output_stream(
                        &config,
                        move |data: &mut [u16], _: &cpal::OutputCallbackInfo| {
                            if scratch.len() < data.len() {
                                scratch.resize(data.len(), 0);
                            }
                            let scratch = &mut scratch[..data.len()];
                            lock_state(&state).fill(scratch);
                            for (out, &s) in data.iter_mut().zip(scratch.iter()) {
                                *out = (s as i32 + 32768) as u16;
                            }
                        },
                        |err| error!("audio stream error: {err}"),
                        None,
                    )
                    .map_err(|e| MixerError::StreamBuild(e.to_string()))?
            }
            other => {
                return Err(MixerError::UnsupportedFormat(format!("{other:?}")));
            }
        };

        stream
            .play()
            .map_err(|e| MixerError::StreamPlay(e.to_string()))?;

        debug!("audio stream started ({sample_rate} Hz)");

        Ok(Self {
            _stream: stream,
            sample_rate,
        })
    }

    /// Negotiated output sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
