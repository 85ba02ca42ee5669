//! In-place fixed-point radix-2 complex FFT.
//!
//! Butterflies use Q14 twiddle factors over interleaved re/im `i16`
//! buffers. The forward transform halves the signal at every stage (an
//! overall `1/N` scaling), which keeps every intermediate within `i16`
//! range for spectra of real-valued input. The inverse transform grows the
//! signal back toward the time domain, so it scales adaptively instead: a
//! stage output is halved only when the stage input could overflow, and
//! the number of shifts taken is returned to the caller.
//!
//! C source: `webrtc/common_audio/signal_processing/complex_fft.c`

/// Largest supported transform order (`block_len` = 256).
pub const MAX_ORDER: usize = 8;

const TWIDDLE_TABLE_LEN: usize = 1 << MAX_ORDER;
/// Offset turning a sine lookup into a cosine lookup (a quarter period).
const COS_OFFSET: usize = TWIDDLE_TABLE_LEN / 4;

/// One full period of `round(16384 * sin(2 * pi * i / 256))`.
const SIN_Q14: [i16; TWIDDLE_TABLE_LEN] = [
    0, 402, 804, 1205, 1606, 2006, 2404, 2801, 3196, 3590, //
    3981, 4370, 4756, 5139, 5520, 5897, 6270, 6639, 7005, 7366, //
    7723, 8076, 8423, 8765, 9102, 9434, 9760, 10080, 10394, 10702, //
    11003, 11297, 11585, 11866, 12140, 12406, 12665, 12916, 13160, 13395, //
    13623, 13842, 14053, 14256, 14449, 14635, 14811, 14978, 15137, 15286, //
    15426, 15557, 15679, 15791, 15893, 15986, 16069, 16143, 16207, 16261, //
    16305, 16340, 16364, 16379, 16384, 16379, 16364, 16340, 16305, 16261, //
    16207, 16143, 16069, 15986, 15893, 15791, 15679, 15557, 15426, 15286, //
    15137, 14978, 14811, 14635, 14449, 14256, 14053, 13842, 13623, 13395, //
    13160, 12916, 12665, 12406, 12140, 11866, 11585, 11297, 11003, 10702, //
    10394, 10080, 9760, 9434, 9102, 8765, 8423, 8076, 7723, 7366, //
    7005, 6639, 6270, 5897, 5520, 5139, 4756, 4370, 3981, 3590, //
    3196, 2801, 2404, 2006, 1606, 1205, 804, 402, 0, -402, //
    -804, -1205, -1606, -2006, -2404, -2801, -3196, -3590, -3981, -4370, //
    -4756, -5139, -5520, -5897, -6270, -6639, -7005, -7366, -7723, -8076, //
    -8423, -8765, -9102, -9434, -9760, -10080, -10394, -10702, -11003, -11297, //
    -11585, -11866, -12140, -12406, -12665, -12916, -13160, -13395, -13623, -13842, //
    -14053, -14256, -14449, -14635, -14811, -14978, -15137, -15286, -15426, -15557, //
    -15679, -15791, -15893, -15986, -16069, -16143, -16207, -16261, -16305, -16340, //
    -16364, -16379, -16384, -16379, -16364, -16340, -16305, -16261, -16207, -16143, //
    -16069, -15986, -15893, -15791, -15679, -15557, -15426, -15286, -15137, -14978, //
    -14811, -14635, -14449, -14256, -14053, -13842, -13623, -13395, -13160, -12916, //
    -12665, -12406, -12140, -11866, -11585, -11297, -11003, -10702, -10394, -10080, //
    -9760, -9434, -9102, -8765, -8423, -8076, -7723, -7366, -7005, -6639, //
    -6270, -5897, -5520, -5139, -4756, -4370, -3981, -3590, -3196, -2801, //
    -2404, -2006, -1606, -1205, -804, -402, //
];

/// Unshifted inverse butterflies add one component plus one complex
/// magnitude, so they stay within `i16` while every component is at most
/// `i16::MAX / (1 + sqrt(2))`.
const INVERSE_SCALE_THRESHOLD: i32 = 13572;

/// Fixed-size in-place complex FFT over interleaved `i16` re/im pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexFft {
    order: usize,
}

impl ComplexFft {
    /// Create a transform of length `2^order`.
    ///
    /// # Panics
    ///
    /// Panics if `order` is 0 or greater than [`MAX_ORDER`].
    pub fn new(order: usize) -> Self {
        assert!(
            (1..=MAX_ORDER).contains(&order),
            "FFT order {order} out of range 1..={MAX_ORDER}"
        );
        Self { order }
    }

    /// Number of complex values per transform.
    pub fn block_len(&self) -> usize {
        1 << self.order
    }

    /// Forward transform, scaled by `1/N`.
    ///
    /// `buf` holds `block_len()` interleaved re/im pairs and is replaced by
    /// the spectrum in the same layout. Inputs whose complex magnitude is
    /// within `i16` range (always true for spectra of real signals) cannot
    /// overflow; butterfly outputs saturate otherwise.
    ///
    /// # Panics
    ///
    /// Panics if `buf.len() != 2 * block_len()`.
    pub fn forward(&self, buf: &mut [i16]) {
        let n = self.block_len();
        assert_eq!(buf.len(), 2 * n, "complex buffer length mismatch");

        bit_reverse(buf, n);

        let mut len = 2;
        let mut table_step = TWIDDLE_TABLE_LEN / 2;
        while len <= n {
            let half = len / 2;
            for start in (0..n).step_by(len) {
                for k in 0..half {
                    let tw = k * table_step;
                    let wc = i32::from(SIN_Q14[tw + COS_OFFSET]);
                    let ws = i32::from(SIN_Q14[tw]);

                    let i = 2 * (start + k);
                    let j = 2 * (start + k + half);
                    let ar = i32::from(buf[i]);
                    let ai = i32::from(buf[i + 1]);
                    let br = i32::from(buf[j]);
                    let bi = i32::from(buf[j + 1]);

                    // t = e^{-i*2*pi*tw/256} * b, in Q14.
                    let tr = wc * br + ws * bi;
                    let ti = wc * bi - ws * br;

                    // Butterfly with a builtin 1/2 scale: Q14 >> 15.
                    let round = 1 << 14;
                    buf[i] = sat16(((ar << 14) + tr + round) >> 15);
                    buf[i + 1] = sat16(((ai << 14) + ti + round) >> 15);
                    buf[j] = sat16(((ar << 14) - tr + round) >> 15);
                    buf[j + 1] = sat16(((ai << 14) - ti + round) >> 15);
                }
            }
            len *= 2;
            table_step /= 2;
        }
    }

    /// Inverse transform with adaptive scaling.
    ///
    /// Expects the layout produced by [`forward`](Self::forward) and leaves
    /// the time-domain signal in `buf`, attenuated by `2^shifts` relative
    /// to the signal whose spectrum was given. Returns `shifts`; the caller
    /// compensates for it together with any pre-transform normalization.
    ///
    /// # Panics
    ///
    /// Panics if `buf.len() != 2 * block_len()`.
    pub fn inverse(&self, buf: &mut [i16]) -> u32 {
        let n = self.block_len();
        assert_eq!(buf.len(), 2 * n, "complex buffer length mismatch");

        bit_reverse(buf, n);

        let mut shifts = 0;
        let mut len = 2;
        let mut table_step = TWIDDLE_TABLE_LEN / 2;
        while len <= n {
            // Scale this stage down only if its additions could leave i16.
            let max_abs = buf.iter().fold(0i32, |m, &v| m.max(i32::from(v).abs()));
            let shift = u32::from(max_abs > INVERSE_SCALE_THRESHOLD);
            shifts += shift;

            let round = 1 << (13 + shift);
            let half = len / 2;
            for start in (0..n).step_by(len) {
                for k in 0..half {
                    let tw = k * table_step;
                    let wc = i32::from(SIN_Q14[tw + COS_OFFSET]);
                    let ws = i32::from(SIN_Q14[tw]);

                    let i = 2 * (start + k);
                    let j = 2 * (start + k + half);
                    let ar = i32::from(buf[i]);
                    let ai = i32::from(buf[i + 1]);
                    let br = i32::from(buf[j]);
                    let bi = i32::from(buf[j + 1]);

                    // t = e^{+i*2*pi*tw/256} * b, in Q14.
                    let tr = wc * br - ws * bi;
                    let ti = wc * bi + ws * br;

                    buf[i] = sat16(((ar << 14) + tr + round) >> (14 + shift));
                    buf[i + 1] = sat16(((ai << 14) + ti + round) >> (14 + shift));
                    buf[j] = sat16(((ar << 14) - tr + round) >> (14 + shift));
                    buf[j + 1] = sat16(((ai << 14) - ti + round) >> (14 + shift));
                }
            }
            len *= 2;
            table_step /= 2;
        }
        shifts
    }
}

fn sat16(v: i32) -> i16 {
    v.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Reorder interleaved complex pairs into bit-reversed index order.
fn bit_reverse(buf: &mut [i16], n: usize) {
    let mut j = 0;
    for i in 0..n - 1 {
        if i < j {
            buf.swap(2 * i, 2 * j);
            buf.swap(2 * i + 1, 2 * j + 1);
        }
        let mut mask = n >> 1;
        while mask <= j {
            j -= mask;
            mask >>= 1;
        }
        j += mask;
    }
}
