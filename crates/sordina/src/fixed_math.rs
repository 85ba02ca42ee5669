//! Fixed-point helpers shared by the spectral pipeline.
//!
//! Every cross-scale combine in the engine goes through these so that a
//! stored quantity is never mixed with another without an explicit
//! exponent adjustment.
//!
//! C source: `webrtc/common_audio/signal_processing/`

/// Left shifts that bring a positive 16-bit value into `[2^14, 2^15)`.
///
/// Returns 0 for values that are zero or negative.
pub(crate) fn norm_w16(value: i16) -> u8 {
    if value <= 0 {
        return 0;
    }
    (value.leading_zeros() - 1) as u8
}

/// Floor of the integer square root.
pub(crate) fn sqrt_floor(value: u32) -> u16 {
    let mut root: u32 = 0;
    let mut remainder = value;
    let mut bit = 1u32 << 30;
    while bit > remainder {
        bit >>= 2;
    }
    while bit != 0 {
        if remainder >= root + bit {
            remainder -= root + bit;
            root = (root >> 1) + bit;
        } else {
            root >>= 1;
        }
        bit >>= 2;
    }
    // sqrt(u32::MAX) < 2^16.
    root as u16
}

/// `(numerator << q) / denominator`, saturated to `u32::MAX`.
///
/// The denominator must be non-zero.
pub(crate) fn div_q(numerator: u32, denominator: u32, q: u8) -> u32 {
    debug_assert!(denominator != 0, "division by zero");
    let scaled = (u64::from(numerator) << q) / u64::from(denominator.max(1));
    scaled.min(u64::from(u32::MAX)) as u32
}

/// Move a value between scale exponents: positive `right_shift` divides
/// with round-half-up, negative multiplies.
pub(crate) fn rescale_i32(value: i32, right_shift: i32) -> i32 {
    if right_shift > 0 {
        (value + (1 << (right_shift - 1))) >> right_shift
    } else {
        value << -right_shift
    }
}

pub(crate) fn sat_i16(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}
