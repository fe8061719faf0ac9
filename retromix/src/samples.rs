//! Effect sample registry
//!
//! Loading and decoding sample data is the job of external collaborators;
//! the registry only holds reference-counted, silence-padded PCM so channel
//! slots can check out a view of the data for as long as they play it. The
//! data behind a checked-out `Sound` stays valid until the last player
//! drops it, even if the registry entry is replaced meanwhile.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

/// Identifier of a sound effect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(pub u16);

/// Silence value for unsigned 8-bit PCM
pub const SILENCE: u8 = 0x80;

/// Lookahead padding appended to every registered sample, in samples
///
/// Guarantees a reader may fetch one sample past the playable length (for
/// interpolating consumers) without ever leaving valid memory.
pub const PAD_SAMPLES: usize = 8;

/// One registered sound: unsigned 8-bit mono PCM with a silence-padded tail
#[derive(Clone, Debug)]
pub struct Sound {
    data: Arc<[u8]>,
    /// Playable length, excluding the padding tail
    len: usize,
}

impl Sound {
    pub fn new(pcm: &[u8]) -> Self {
        let mut padded = Vec::with_capacity(pcm.len() + PAD_SAMPLES);
        padded.extend_from_slice(pcm);
        padded.resize(pcm.len() + PAD_SAMPLES, SILENCE);
        Self {
            data: padded.into(),
            len: pcm.len(),
        }
    }

    /// Playable sample count
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sample byte at `pos`
    ///
    /// `pos` may reach `PAD_SAMPLES` into the padding tail.
    #[inline]
    pub fn sample(&self, pos: usize) -> u8 {
        self.data[pos]
    }
}

/// Registry of loaded effect samples
///
/// A designated default effect substitutes for missing assets, so a typo'd
/// or unloaded effect id degrades to a recognizable stand-in sound instead
/// of failing the caller.
#[derive(Debug, Default)]
pub struct SampleCache {
    sounds: HashMap<EffectId, Sound>,
    default: Option<EffectId>,
}

impl SampleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register PCM for an effect, replacing any previous data
    ///
    /// Channels already playing the previous data keep their checked-out
    /// view; only new lookups see the replacement.
    pub fn insert(&mut self, id: EffectId, pcm: &[u8]) {
        self.sounds.insert(id, Sound::new(pcm));
    }

    /// Designate the effect substituted for missing assets
    pub fn set_default(&mut self, id: EffectId) {
        self.default = Some(id);
    }

    /// Check out the sound for an effect
    ///
    /// Missing effects fall back to the default sound with a warning;
    /// `None` only when no usable default exists either.
    pub fn lookup(&self, id: EffectId) -> Option<Sound> {
        if let Some(sound) = self.sounds.get(&id) {
            return Some(sound.clone());
        }
        warn!("no sample registered for effect {}, substituting default", id.0);
        self.default.and_then(|d| self.sounds.get(&d)).cloned()
    }

    /// Number of registered effects
    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sound_pads_tail_with_silence() {
        let sound = Sound::new(&[1, 2, 3]);
        assert_eq!(sound.len(), 3);
        for i in 0..PAD_SAMPLES {
            assert_eq!(sound.sample(3 + i), SILENCE);
        }
    }

    #[test]
    fn lookup_substitutes_default_for_missing_effect() {
        let mut cache = SampleCache::new();
        cache.insert(EffectId(1), &[10, 20, 30]);
        cache.set_default(EffectId(1));

        let sound = cache.lookup(EffectId(99)).expect("default should substitute");
        assert_eq!(sound.sample(0), 10);
    }

    #[test]
    fn lookup_without_default_returns_none() {
        let cache = SampleCache::new();
        assert!(cache.lookup(EffectId(7)).is_none());
    }

    #[test]
    fn replacing_an_entry_keeps_checked_out_data_alive() {
        let mut cache = SampleCache::new();
        cache.insert(EffectId(1), &[10, 20]);
        let checked_out = cache.lookup(EffectId(1)).unwrap();

        cache.insert(EffectId(1), &[99]);
        assert_eq!(checked_out.sample(0), 10);
        assert_eq!(cache.lookup(EffectId(1)).unwrap().sample(0), 99);
    }
}
