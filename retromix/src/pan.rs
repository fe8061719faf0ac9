//! Stereo panning law
//!
//! Converts a linear separation parameter and a base volume into the
//! quantized left/right gain levels a channel slot carries.

use crate::error::MixerError;
use crate::tables::G_MAX;

/// Separation value for a centered source
pub const SEP_CENTER: i32 = 128;

/// Separation value for a hard-right source (0 = hard left)
pub const SEP_MAX: i32 = 256;

/// Compute per-side gain levels from a base volume and stereo separation
///
/// `separation` runs 0 (hard left) through 128 (centered) to 256 (hard
/// right). The taper is quadratic in the separation, mirrored about
/// `SEP_MAX` for the right side:
///
/// ```text
/// left  = volume - (volume * separation^2) >> 16
/// right = volume - (volume * (256 - separation)^2) >> 16
/// ```
///
/// Either gain leaving `[0, G_MAX]` is a configuration error: the gain
/// table is indexed unchecked in the mixing loop, so such a value must
/// never reach a channel slot. Out-of-range volumes and separations both
/// surface here.
pub fn pan_gains(volume: i32, separation: i32) -> Result<(i32, i32), MixerError> {
    let left = volume - ((volume * separation * separation) >> 16);
    let mirrored = SEP_MAX - separation;
    let right = volume - ((volume * mirrored * mirrored) >> 16);

    if !(0..=G_MAX).contains(&left) {
        return Err(MixerError::GainOutOfRange { side: "left", value: left });
    }
    if !(0..=G_MAX).contains(&right) {
        return Err(MixerError::GainOutOfRange { side: "right", value: right });
    }
    Ok((left, right))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_separation_gives_equal_gains() {
        let (left, right) = pan_gains(100, SEP_CENTER).unwrap();
        assert_eq!(left, right);
        assert_eq!(left, 75);
    }

    #[test]
    fn hard_left_silences_right() {
        let (left, right) = pan_gains(100, 0).unwrap();
        assert_eq!(left, 100);
        assert_eq!(right, 0);
        assert!(right < left);
    }

    #[test]
    fn hard_right_mirrors_hard_left() {
        let (left, right) = pan_gains(100, SEP_MAX).unwrap();
        assert_eq!(left, 0);
        assert_eq!(right, 100);
    }

    #[test]
    fn gains_stay_in_table_range_over_valid_inputs() {
        for volume in 0..=G_MAX {
            for separation in 0..=SEP_MAX {
                let (left, right) = pan_gains(volume, separation)
                    .unwrap_or_else(|e| panic!("vol={volume} sep={separation}: {e}"));
                assert!((0..=G_MAX).contains(&left));
                assert!((0..=G_MAX).contains(&right));
            }
        }
    }

    #[test]
    fn excessive_volume_is_an_error_not_a_clamp() {
        let err = pan_gains(200, SEP_CENTER).unwrap_err();
        assert!(matches!(err, MixerError::GainOutOfRange { side: "left", .. }));
    }

    #[test]
    fn out_of_range_separation_is_an_error() {
        assert!(pan_gains(100, 300).is_err());
        assert!(pan_gains(100, -10).is_err());
    }
}
