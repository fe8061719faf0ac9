//! Retromix — fixed-channel software audio mixer
//!
//! Combines a small fixed number of independently pitched, panned one-shot
//! sample streams plus one continuous music substream into interleaved
//! stereo 16-bit PCM, on demand from the audio device callback.
//!
//! # Architecture
//!
//! ```text
//! Game logic                      Mixer state                cpal thread
//!     │                               │                          │
//! [start_effect]──(pan law, step      │                          │
//!     │            table, channel ──►[slot bound]                │
//!     │            allocation)        │                          │
//! [start_music]──(synth render)────►[buffer bound]               │
//!     │                               │◄──────(lock + fill)────[callback]
//! ```
//!
//! The control path (effect/music start, volume changes) and the device
//! callback share one state object behind a single coarse mutex. The
//! callback fills its whole output buffer per invocation: per frame it sums
//! one stereo pair from the circular music buffer plus one gain-table
//! contribution per active channel, advances every 16.16 fixed-point read
//! cursor, and saturates the result into the output. The hot loop performs
//! no allocation and no transcendental math; both lookup tables are built
//! once at mixer start.
//!
//! # Format summary
//!
//! - Interleaved stereo, 16-bit signed output
//! - 8-bit unsigned mono source samples, pitch-shifted by a 16.16
//!   fixed-point step with nearest-neighbor resampling
//! - 8 one-shot channels; contention evicts the oldest slot
//! - One music substream, rendered up front by an external synthesizer and
//!   consumed circularly

pub mod channels;
pub mod config;
pub mod engine;
pub mod error;
pub mod mixer;
pub mod music;
pub mod output;
pub mod pan;
pub mod samples;
pub mod tables;

pub use channels::{Channel, ChannelPool, NUM_CHANNELS, SfxHandle};
pub use config::MixerConfig;
pub use engine::MixerState;
pub use error::MixerError;
pub use mixer::Mixer;
pub use music::{MusicStream, MusicSynth, SongId};
pub use output::AudioOutput;
pub use pan::pan_gains;
pub use samples::{EffectId, SampleCache, Sound};
pub use tables::{G_MAX, GainTable, NORM_PITCH, StepTable};
