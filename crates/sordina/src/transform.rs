//! Adapter between time-domain analysis blocks and the fixed-point
//! spectrum.
//!
//! Windows the block, left-shifts it to full 16-bit width, and runs the
//! forward transform; the inverse retraces both scalings. A bin value `b`
//! produced here stands for `b * 2^-norm` of the `1/N`-scaled DFT of the
//! windowed block, where `norm` is the headroom shift reported by
//! [`TransformAdapter::forward`].

use sordina_fft::real_fft::RealFft;

use crate::fixed_math::{norm_w16, rescale_i32, sat_i16};
use crate::windows;

/// Owns the transform and its work buffers; everything is allocated here
/// once, the per-frame paths only reuse it.
#[derive(Debug)]
pub(crate) struct TransformAdapter {
    fft: RealFft,
    window: &'static [i16],
    windowed: Vec<i16>,
    freq: Vec<i16>,
    time: Vec<i16>,
}

impl TransformAdapter {
    pub(crate) fn new(block_len: usize, fft_order: usize) -> Self {
        let fft = RealFft::new(fft_order);
        debug_assert_eq!(fft.block_len(), block_len);
        let freq = vec![0; 2 * fft.num_bins()];
        Self {
            fft,
            window: windows::for_block_len(block_len),
            windowed: vec![0; block_len],
            freq,
            time: vec![0; block_len],
        }
    }

    /// The analysis window, shared with synthesis.
    pub(crate) fn window(&self) -> &'static [i16] {
        self.window
    }

    /// Window and transform one analysis block into [`freq`](Self::freq).
    ///
    /// Returns the headroom shift `norm`, or `None` for an all-zero
    /// windowed block, which short-circuits the whole spectral path.
    pub(crate) fn forward(&mut self, block: &[i16]) -> Option<u8> {
        let mut max_abs: i16 = 0;
        for ((&w, &x), out) in self.window.iter().zip(block).zip(&mut self.windowed) {
            // Full-scale input keeps the product within 30 bits.
            let v = ((i32::from(w) * i32::from(x)) >> 14).clamp(-32767, 32767) as i16;
            max_abs = max_abs.max(v.unsigned_abs() as i16);
            *out = v;
        }
        if max_abs == 0 {
            return None;
        }

        let norm = norm_w16(max_abs);
        for v in &mut self.windowed {
            *v <<= norm;
        }
        self.fft.forward(&self.windowed, &mut self.freq);
        Some(norm)
    }

    /// The current spectrum, interleaved re/im pairs.
    pub(crate) fn freq(&self) -> &[i16] {
        &self.freq
    }

    pub(crate) fn freq_mut(&mut self) -> &mut [i16] {
        &mut self.freq
    }

    /// Inverse-transform [`freq`](Self::freq) and undo the forward's
    /// headroom shift, returning the windowed-domain time block.
    pub(crate) fn inverse(&mut self, norm: u8) -> &[i16] {
        let shifts = self.fft.inverse(&self.freq, &mut self.time);
        let right_shift = i32::from(norm) - shifts as i32;
        for v in &mut self.time {
            *v = sat_i16(rescale_i32(i32::from(*v), right_shift));
        }
        &self.time
    }
}
