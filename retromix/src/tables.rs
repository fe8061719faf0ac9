//! Pitch-step and gain lookup tables
//!
//! Both tables are built once at mixer start. The mixing loop only indexes
//! them; no transcendental math or multiply-and-bias runs per sample.

/// Number of quantized gain levels in the gain table
pub const GAIN_LEVELS: usize = 128;

/// Maximum representable gain level
pub const G_MAX: i32 = GAIN_LEVELS as i32 - 1;

/// Pitch index that plays a sample at its recorded rate
pub const NORM_PITCH: u8 = 128;

/// Pitch-to-step lookup
///
/// Maps a pitch index to a 16.16 fixed-point playback-rate multiplier on a
/// log scale: each 64 pitch steps double or halve the rate.
pub struct StepTable {
    steps: [u32; 256],
}

impl StepTable {
    pub fn new() -> Self {
        let mut steps = [0u32; 256];
        for (p, step) in steps.iter_mut().enumerate() {
            // step = 2^((p - 128) / 64) * 65536, rounded
            let exponent = (p as f64 - NORM_PITCH as f64) / 64.0;
            *step = (exponent.exp2() * 65536.0).round() as u32;
        }
        Self { steps }
    }

    /// 16.16 playback-rate multiplier for a pitch index
    #[inline]
    pub fn step(&self, pitch: u8) -> u32 {
        self.steps[pitch as usize]
    }
}

impl Default for StepTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Gain/sample lookup
///
/// Maps a quantized gain level and a raw unsigned sample byte to a signed
/// mix contribution. The unsigned-to-signed bias (`sample - 128`) and the
/// scale up to the output's 16-bit dynamic range are folded into the
/// entries, so each channel side costs one indexed load in the mixing loop.
pub struct GainTable {
    table: Vec<i16>,
}

impl GainTable {
    pub fn new() -> Self {
        let mut table = vec![0i16; GAIN_LEVELS * 256];
        for (g, row) in table.chunks_exact_mut(256).enumerate() {
            for (s, entry) in row.iter_mut().enumerate() {
                *entry = ((g as i32 * (s as i32 - 128) * 256) / G_MAX) as i16;
            }
        }
        Self { table }
    }

    /// Signed contribution of `sample` at gain level `gain`
    ///
    /// `gain` must be in `[0, G_MAX]`. The pan law enforces this before a
    /// gain is ever bound to a channel; there is no bounds check here.
    #[inline]
    pub fn mix(&self, gain: i32, sample: u8) -> i32 {
        self.table[((gain as usize) << 8) | sample as usize] as i32
    }
}

impl Default for GainTable {
    fn default() -> Self {
        Self::new()
    }
}
