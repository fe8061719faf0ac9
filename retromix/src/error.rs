//! Mixer error types

use thiserror::Error;

/// Mixer error types
///
/// Channel exhaustion is deliberately absent: allocation always succeeds by
/// evicting a slot. Missing effect samples normally substitute the cache's
/// default sound; `MissingSample` only fires when no default is registered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MixerError {
    /// A computed channel gain left the gain table's representable range.
    /// The table is indexed unchecked in the mixing loop, so the offending
    /// request is rejected outright rather than clamped.
    #[error("{side} gain {value} outside [0, 127]")]
    GainOutOfRange { side: &'static str, value: i32 },

    /// Effect has no registered sample and the cache has no default
    #[error("effect {0} has no registered sample and no default is set")]
    MissingSample(u16),

    /// No output device is available on the default host
    #[error("no audio output device available")]
    NoOutputDevice,

    /// Failed to query the device's output configuration
    #[error("failed to get default output config: {0}")]
    DeviceConfig(String),

    /// Device negotiated a sample format the mixer cannot fill
    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// Failed to build the output stream
    #[error("failed to build audio stream: {0}")]
    StreamBuild(String),

    /// Failed to start the output stream
    #[error("failed to play audio stream: {0}")]
    StreamPlay(String),
}
