//! Real-signal wrapper around the complex FFT.
//!
//! Packs a block of real samples into the interleaved complex buffer,
//! exposes the non-redundant `N/2 + 1` bins, and restores conjugate
//! symmetry before running the inverse transform.
//!
//! C source: `webrtc/common_audio/signal_processing/real_fft.c`

use crate::complex_fft::ComplexFft;

/// Forward/inverse transform between real `i16` blocks and interleaved
/// re/im spectra.
///
/// Owns its complex work buffer; neither direction allocates.
#[derive(Debug)]
pub struct RealFft {
    fft: ComplexFft,
    work: Vec<i16>,
}

impl RealFft {
    /// Create a transform for real blocks of `2^order` samples.
    ///
    /// # Panics
    ///
    /// Panics if `order` is 0 or greater than
    /// [`MAX_ORDER`](crate::complex_fft::MAX_ORDER).
    pub fn new(order: usize) -> Self {
        let fft = ComplexFft::new(order);
        let work = vec![0; 2 * fft.block_len()];
        Self { fft, work }
    }

    /// Number of time-domain samples per block.
    pub fn block_len(&self) -> usize {
        self.fft.block_len()
    }

    /// Number of non-redundant frequency bins (`block_len() / 2 + 1`).
    pub fn num_bins(&self) -> usize {
        self.fft.block_len() / 2 + 1
    }

    /// Forward transform, scaled by `1/N`.
    ///
    /// Writes `num_bins()` interleaved re/im pairs to `freq`. Bins `0` and
    /// `N/2` are purely real for real input.
    ///
    /// # Panics
    ///
    /// Panics if `time.len() != block_len()` or
    /// `freq.len() != 2 * num_bins()`.
    pub fn forward(&mut self, time: &[i16], freq: &mut [i16]) {
        let n = self.block_len();
        assert_eq!(time.len(), n, "time block length mismatch");
        assert_eq!(freq.len(), 2 * self.num_bins(), "spectrum length mismatch");

        for (pair, &sample) in self.work.chunks_exact_mut(2).zip(time) {
            pair[0] = sample;
            pair[1] = 0;
        }
        self.fft.forward(&mut self.work);
        freq.copy_from_slice(&self.work[..freq.len()]);
    }

    /// Inverse transform with adaptive scaling.
    ///
    /// Takes the `num_bins()` interleaved pairs produced by
    /// [`forward`](Self::forward) (possibly rescaled bin-wise by the
    /// caller) and writes the real time block, attenuated by the returned
    /// number of shifts.
    ///
    /// # Panics
    ///
    /// Panics if `freq.len() != 2 * num_bins()` or
    /// `time.len() != block_len()`.
    pub fn inverse(&mut self, freq: &[i16], time: &mut [i16]) -> u32 {
        let n = self.block_len();
        assert_eq!(freq.len(), 2 * self.num_bins(), "spectrum length mismatch");
        assert_eq!(time.len(), n, "time block length mismatch");

        self.work[..freq.len()].copy_from_slice(freq);
        // Upper half of the spectrum is the conjugate mirror of the lower.
        for k in n / 2 + 1..n {
            let src = 2 * (n - k);
            self.work[2 * k] = freq[src];
            self.work[2 * k + 1] = freq[src + 1].saturating_neg();
        }
        let shifts = self.fft.inverse(&mut self.work);
        for (sample, pair) in time.iter_mut().zip(self.work.chunks_exact(2)) {
            *sample = pair[0];
        }
        shifts
    }
}
