//! Mixing engine: the periodic callback body
//!
//! `MixerState` is everything the device callback touches. The control
//! path mutates it under the shared mutex (see `mixer`); the callback
//! locks, fills its whole output buffer, and unlocks.

use std::sync::{Mutex, MutexGuard};

use tracing::warn;

use crate::channels::ChannelPool;
use crate::config::MixerConfig;
use crate::music::MusicStream;
use crate::samples::EffectId;
use crate::tables::{GainTable, StepTable};

/// Maximum volume level accepted by the volume setters
pub const MAX_VOLUME_LEVEL: u8 = 15;

/// Shared mixer state
///
/// Built once at mixer start (lookup tables included) and alive until
/// shutdown, which silences all channels before the device stops calling.
pub struct MixerState {
    pub(crate) pool: ChannelPool,
    pub(crate) music: MusicStream,
    pub(crate) steps: StepTable,
    pub(crate) gains: GainTable,
    /// Effect volume level, 0..=15
    pub(crate) sfx_volume: i32,
    /// Squared music volume level, 0..=225, applied as (vol * sample) >> 8
    pub(crate) music_volume: i32,
}

impl MixerState {
    pub fn new(config: &MixerConfig) -> Self {
        let exclusive = config
            .exclusive_effects
            .iter()
            .copied()
            .map(EffectId)
            .collect();
        let mut state = Self {
            pool: ChannelPool::new(exclusive),
            music: MusicStream::new(),
            steps: StepTable::new(),
            gains: GainTable::new(),
            sfx_volume: 0,
            music_volume: 0,
        };
        state.set_sfx_volume(config.sfx_volume);
        state.set_music_volume(config.music_volume);
        state
    }

    /// Effect volume level, scaling the base volume of new allocations
    pub fn set_sfx_volume(&mut self, level: u8) {
        self.sfx_volume = level.min(MAX_VOLUME_LEVEL) as i32;
    }

    /// Music volume level, stored squared for the multiply-shift mix path
    pub fn set_music_volume(&mut self, level: u8) {
        let level = level.min(MAX_VOLUME_LEVEL) as i32;
        self.music_volume = level * level;
    }

    /// Fill an interleaved stereo buffer with one callback's worth of audio
    ///
    /// Walks the music substream plus every active channel once per output
    /// frame, sums their contributions, advances every read cursor, and
    /// saturates into the output. A channel whose cursor reaches the end of
    /// its data is deactivated before the next frame reads it. Performs no
    /// allocation and takes no locks.
    pub fn fill(&mut self, out: &mut [i16]) {
        let music_volume = self.music_volume;

        for frame in out.chunks_exact_mut(2) {
            let mut left_acc: i32 = 0;
            let mut right_acc: i32 = 0;

            if let Some((ml, mr)) = self.music.next_frame() {
                left_acc += (music_volume * ml) >> 8;
                right_acc += (music_volume * mr) >> 8;
            }

            for ch in self.pool.channels_mut() {
                let Some(sound) = ch.sound.as_ref() else {
                    continue;
                };
                let sample = sound.sample(ch.position);
                let end = sound.len();

                left_acc += self.gains.mix(ch.left_gain, sample);
                right_acc += self.gains.mix(ch.right_gain, sample);

                // 16.16 fractional stepping: whole part advances the read
                // cursor, the fraction accumulates for the next frame
                ch.step_remainder += ch.step;
                ch.position += (ch.step_remainder >> 16) as usize;
                ch.step_remainder &= 0xFFFF;
                if ch.position >= end {
                    ch.deactivate();
                }
            }

            frame[0] = left_acc.clamp(-0x8000, 0x7FFF) as i16;
            frame[1] = right_acc.clamp(-0x8000, 0x7FFF) as i16;
        }
    }
}

/// Lock the shared state, recovering from a poisoned mutex
///
/// The callback and the control path both go through here; a panic on
/// either side must not silence the device forever.
pub(crate) fn lock_state(state: &Mutex<MixerState>) -> MutexGuard<'_, MixerState> {
    state.lock().unwrap_or_else(|e| {
        warn!("mixer state mutex poisoned; continuing");
        e.into_inner()
    })
}
