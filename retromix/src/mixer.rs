//! Control-path API
//!
//! `Mixer` is the owned context object: game logic drives it from one
//! thread while the device callback reads the same state at its own
//! cadence. Every mutation of channel slots or the music buffer happens
//! under the shared state mutex.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::channels::SfxHandle;
use crate::config::MixerConfig;
use crate::engine::{MixerState, lock_state};
use crate::error::MixerError;
use crate::music::{MusicSynth, SongId};
use crate::output::AudioOutput;
use crate::pan::pan_gains;
use crate::samples::{EffectId, SampleCache};

/// The mixer: channel pool, music substream, lookup tables and the device
/// stream that consumes them
pub struct Mixer {
    state: Arc<Mutex<MixerState>>,
    cache: SampleCache,
    synth: Box<dyn MusicSynth>,
    /// Keeps the device stream alive; `None` when no device could be opened
    output: Option<AudioOutput>,
}

impl Mixer {
    /// Build the mixer and open the default output device
    ///
    /// A device failure is reported once and leaves the mixer inert (no
    /// channel ever reaches a speaker) rather than failing construction.
    pub fn new(config: &MixerConfig, cache: SampleCache, synth: Box<dyn MusicSynth>) -> Self {
        let state = Arc::new(Mutex::new(MixerState::new(config)));
        let output = match AudioOutput::new(Arc::clone(&state)) {
            Ok(output) => Some(output),
            Err(e) => {
                warn!("audio output unavailable: {e}; mixer disabled");
                None
            }
        };
        Self {
            state,
            cache,
            synth,
            output,
        }
    }

    /// Build the mixer without opening a device
    ///
    /// For hosts that pull samples themselves via [`MixerState::fill`]
    /// through [`Mixer::state`].
    pub fn detached(config: &MixerConfig, cache: SampleCache, synth: Box<dyn MusicSynth>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MixerState::new(config))),
            cache,
            synth,
            output: None,
        }
    }

    /// Start a one-shot effect, returning its allocation receipt
    ///
    /// `volume` is the 0..=127 base volume before the global effect volume
    /// is applied, `pitch` indexes the step table (128 plays unshifted),
    /// `separation` pans from 0 (hard left) over 128 (centered) to 256
    /// (hard right).
    ///
    /// Allocation itself never fails; all channels busy means the oldest
    /// is evicted. Errors are configuration faults: gains that would index
    /// the gain table out of range, or an unknown effect with no default
    /// sample to substitute.
    pub fn start_effect(
        &mut self,
        effect: EffectId,
        volume: i32,
        pitch: u8,
        separation: i32,
    ) -> Result<SfxHandle, MixerError> {
        let sound = self
            .cache
            .lookup(effect)
            .ok_or(MixerError::MissingSample(effect.0))?;

        let mut state = lock_state(&self.state);
        let scaled = (volume * state.sfx_volume) / 15;
        let (left_gain, right_gain) = pan_gains(scaled, separation)?;
        let step = state.steps.step(pitch);
        Ok(state.pool.allocate(effect, sound, step, left_gain, right_gain))
    }

    /// No-op: handles are allocation receipts, not channel addresses
    ///
    /// The pool keeps no handle-to-slot mapping; a sound plays until its
    /// data runs out or a new allocation preempts its slot.
    pub fn stop_effect(&mut self, _handle: SfxHandle) {}

    /// Always false, for the same reason [`Mixer::stop_effect`] is a no-op
    pub fn is_playing(&self, _handle: SfxHandle) -> bool {
        false
    }

    /// Set the global effect volume level (0..=15)
    pub fn set_sfx_volume(&mut self, level: u8) {
        lock_state(&self.state).set_sfx_volume(level);
    }

    /// Set the music volume level (0..=15)
    pub fn set_music_volume(&mut self, level: u8) {
        lock_state(&self.state).set_music_volume(level);
    }

    /// Render a song through the synthesizer and start looping it
    ///
    /// Rendering happens before the state lock is taken; the mixing loop
    /// never waits on the synthesizer. Replaces (and releases) any
    /// previously bound song. A failed render leaves music stopped.
    pub fn start_music(&mut self, song: SongId) {
        let Some(pcm) = self.synth.render(song) else {
            warn!("music synth has nothing for song {}, music stays off", song.0);
            lock_state(&self.state).music.release();
            return;
        };
        info!("music: song {} bound ({} samples)", song.0, pcm.len());
        lock_state(&self.state).music.bind(pcm);
    }

    /// Stop music playback and release the buffer
    pub fn stop_music(&mut self) {
        lock_state(&self.state).music.release();
    }

    /// Registry of the loaded effect samples
    pub fn cache(&self) -> &SampleCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut SampleCache {
        &mut self.cache
    }

    /// Shared state handle, for hosts driving [`MixerState::fill`] directly
    pub fn state(&self) -> Arc<Mutex<MixerState>> {
        Arc::clone(&self.state)
    }

    /// Whether an output device is actually attached
    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }

    /// Silence everything, then close the device
    ///
    /// Channel slots and the music buffer are cleared under the lock first,
    /// so a callback invocation already in flight only ever observes
    /// inactive state; only then is the stream itself dropped.
    pub fn shutdown(&mut self) {
        {
            let mut state = lock_state(&self.state);
            state.pool.silence_all();
            state.music.release();
        }
        if self.output.take().is_some() {
            info!("mixer shut down");
        }
    }
}

impl Drop for Mixer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
