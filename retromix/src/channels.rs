//! Channel pool: fixed playback slots with deterministic eviction
//!
//! Exactly `NUM_CHANNELS` slots exist for the life of the pool. There is no
//! free operation; a slot empties when its data runs out in the mixing loop
//! or when a new allocation preempts it.

use crate::samples::{EffectId, Sound};

/// Number of one-shot mixing channels
pub const NUM_CHANNELS: usize = 8;

/// Number of distinct handle values before the counter wraps
const HANDLE_RANGE: u16 = 100;

/// Receipt issued for each allocation attempt
///
/// Handles come from a small wrap-around counter and the pool keeps no
/// handle-to-slot mapping, so a handle distinguishes allocation attempts
/// but cannot address its channel later. Wrap-around does not check for
/// collision with still-active handles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SfxHandle(pub u16);

/// One playback slot
#[derive(Clone, Debug, Default)]
pub struct Channel {
    /// Checked-out sample data; `None` means the slot is inactive
    pub(crate) sound: Option<Sound>,
    /// Read cursor, in samples from the start of the data
    pub(crate) position: usize,
    /// 16.16 fixed-point playback-rate multiplier
    pub(crate) step: u32,
    /// 16-bit fractional accumulator, always < 65536
    pub(crate) step_remainder: u32,
    /// Logical allocation time, used only for eviction ordering
    pub(crate) start_time: u64,
    /// Quantized left/right gain levels, within the gain table range
    pub(crate) left_gain: i32,
    pub(crate) right_gain: i32,
    /// Effect bound to this slot
    pub(crate) effect: EffectId,
    /// Receipt issued at allocation
    pub(crate) handle: SfxHandle,
}

impl Channel {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.sound.is_some()
    }

    pub fn effect(&self) -> EffectId {
        self.effect
    }

    pub fn handle(&self) -> SfxHandle {
        self.handle
    }

    pub(crate) fn deactivate(&mut self) {
        self.sound = None;
        self.position = 0;
        self.step_remainder = 0;
    }
}

/// Fixed-size pool of playback slots
pub struct ChannelPool {
    channels: [Channel; NUM_CHANNELS],
    /// Logical clock, advanced once per allocation
    clock: u64,
    /// Wrap-around handle counter, cycling 99 down to 0
    handles: u16,
    /// Effects that must never overlap themselves; always routed to slot 0
    exclusive: Vec<EffectId>,
}

impl ChannelPool {
    pub fn new(exclusive: Vec<EffectId>) -> Self {
        Self {
            channels: Default::default(),
            clock: 0,
            handles: 0,
            exclusive,
        }
    }

    pub fn is_exclusive(&self, effect: EffectId) -> bool {
        self.exclusive.contains(&effect)
    }

    /// Bind a sound to a slot, returning the allocation receipt
    ///
    /// Never fails: an exclusive-family effect preempts slot 0, anything
    /// else takes the first inactive slot in 1..N or, with all of them
    /// busy, preempts the slot with the smallest start time.
    pub fn allocate(
        &mut self,
        effect: EffectId,
        sound: Sound,
        step: u32,
        left_gain: i32,
        right_gain: i32,
    ) -> SfxHandle {
        let slot = self.select_slot(effect);

        self.clock += 1;
        if self.handles == 0 {
            self.handles = HANDLE_RANGE;
        }
        self.handles -= 1;
        let handle = SfxHandle(self.handles);

        let ch = &mut self.channels[slot];
        ch.sound = Some(sound);
        ch.position = 0;
        ch.step = step;
        ch.step_remainder = 0;
        ch.start_time = self.clock;
        ch.left_gain = left_gain;
        ch.right_gain = right_gain;
        ch.effect = effect;
        ch.handle = handle;
        handle
    }

    fn select_slot(&self, effect: EffectId) -> usize {
        if self.is_exclusive(effect) {
            return 0;
        }

        // First inactive slot wins and ends the scan; otherwise evict the
        // oldest slot seen. Strict comparison keeps the first-found slot on
        // equal start times.
        let mut oldest_slot = 0;
        let mut oldest = u64::MAX;
        for (i, ch) in self.channels.iter().enumerate().skip(1) {
            if !ch.is_active() {
                return i;
            }
            if ch.start_time < oldest {
                oldest_slot = i;
                oldest = ch.start_time;
            }
        }
        oldest_slot
    }

    /// Forcibly deactivate every slot (shutdown path)
    pub fn silence_all(&mut self) {
        for ch in &mut self.channels {
            ch.deactivate();
        }
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub(crate) fn channels_mut(&mut self) -> &mut [Channel] {
        &mut self.channels
    }

    /// Number of currently active slots
    pub fn active_count(&self) -> usize {
        self.channels.iter().filter(|ch| ch.is_active()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_sound() -> Sound {
        Sound::new(&[0x80; 64])
    }

    fn pool() -> ChannelPool {
        ChannelPool::new(vec![EffectId(100)])
    }

    fn allocate(pool: &mut ChannelPool, effect: u16) -> SfxHandle {
        pool.allocate(EffectId(effect), test_sound(), 65536, 64, 64)
    }

    #[test]
    fn non_exclusive_allocations_fill_slots_in_order() {
        let mut pool = pool();
        for i in 0..3 {
            allocate(&mut pool, i);
        }
        assert!(!pool.channels()[0].is_active());
        for slot in 1..=3 {
            assert!(pool.channels()[slot].is_active());
            assert_eq!(pool.channels()[slot].effect(), EffectId(slot as u16 - 1));
        }
    }

    #[test]
    fn first_free_slot_is_selected_even_with_later_gaps() {
        let mut pool = pool();
        for i in 0..7 {
            allocate(&mut pool, i);
        }
        // Free slot 3; the next allocation must land there
        pool.channels_mut()[3].deactivate();
        allocate(&mut pool, 42);
        assert_eq!(pool.channels()[3].effect(), EffectId(42));
    }

    #[test]
    fn contention_evicts_the_oldest_slot() {
        let mut pool = pool();
        // Occupy slot 0 via the exclusive effect, then fill 1..=7
        allocate(&mut pool, 100);
        for i in 0..7 {
            allocate(&mut pool, i);
        }
        assert_eq!(pool.active_count(), NUM_CHANNELS);

        // All busy: the next non-exclusive sound evicts slot 1, which holds
        // the earliest surviving allocation
        allocate(&mut pool, 50);
        assert_eq!(pool.channels()[1].effect(), EffectId(50));

        // And the one after that evicts slot 2
        allocate(&mut pool, 51);
        assert_eq!(pool.channels()[2].effect(), EffectId(51));
    }

    #[test]
    fn eviction_never_targets_slot_zero_for_non_exclusive_effects() {
        let mut pool = pool();
        allocate(&mut pool, 100); // slot 0, oldest of all
        for i in 0..20 {
            allocate(&mut pool, i);
        }
        assert_eq!(pool.channels()[0].effect(), EffectId(100));
    }

    #[test]
    fn exclusive_effects_always_preempt_slot_zero() {
        let mut pool = pool();
        for i in 0..7 {
            allocate(&mut pool, i);
        }
        assert!(!pool.channels()[0].is_active());

        allocate(&mut pool, 100);
        assert!(pool.channels()[0].is_active());
        assert_eq!(pool.channels()[0].effect(), EffectId(100));

        // A second exclusive start replaces slot 0 rather than spreading
        let t0 = pool.channels()[0].start_time;
        allocate(&mut pool, 100);
        assert_eq!(pool.channels()[0].effect(), EffectId(100));
        assert!(pool.channels()[0].start_time > t0);
    }

    #[test]
    fn allocation_binds_fresh_cursor_state() {
        let mut pool = pool();
        let handle = pool.allocate(EffectId(3), test_sound(), 131072, 10, 20);
        let ch = &pool.channels()[1];
        assert_eq!(ch.position, 0);
        assert_eq!(ch.step_remainder, 0);
        assert_eq!(ch.step, 131072);
        assert_eq!(ch.left_gain, 10);
        assert_eq!(ch.right_gain, 20);
        assert_eq!(ch.handle(), handle);
    }

    #[test]
    fn handles_count_down_and_wrap() {
        let mut pool = pool();
        assert_eq!(allocate(&mut pool, 0), SfxHandle(99));
        assert_eq!(allocate(&mut pool, 1), SfxHandle(98));

        for _ in 0..97 {
            allocate(&mut pool, 2);
        }
        assert_eq!(allocate(&mut pool, 3), SfxHandle(0));
        // Counter wraps back to the top of the range
        assert_eq!(allocate(&mut pool, 4), SfxHandle(99));
    }

    #[test]
    fn silence_all_deactivates_everything() {
        let mut pool = pool();
        allocate(&mut pool, 100);
        for i in 0..7 {
            allocate(&mut pool, i);
        }
        pool.silence_all();
        assert_eq!(pool.active_count(), 0);
    }
}
