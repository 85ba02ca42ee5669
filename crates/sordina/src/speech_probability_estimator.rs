//! Per-bin speech probability from the post SNR.
//!
//! Maps the SNR through a monotone knee into a bin probability, tracks a
//! slow frame-level prior, and combines both into the posterior the noise
//! estimator uses to brake its upward adaptation.

use crate::config::NUM_FREQUENCY_BINS;

/// SNR at the probability midpoint, Q11 (2.0).
const KNEE_Q11: u64 = 4096;
/// Smoothing rate of the frame prior, Q15.
const PRIOR_SMOOTH_Q15: i32 = 3277; // 0.1
/// Lower clamp of the frame prior, Q15.
const MIN_PRIOR_Q15: i32 = 328; // 0.01

/// Per-band speech probability estimator.
#[derive(Debug)]
pub(crate) struct SpeechProbabilityEstimator {
    prior_q15: i32,
    probability_q15: Vec<u16>,
}

impl SpeechProbabilityEstimator {
    pub(crate) fn new() -> Self {
        Self {
            prior_q15: 16384, // 0.5 until evidence arrives
            probability_q15: vec![0; NUM_FREQUENCY_BINS],
        }
    }

    /// Compute the per-bin probability for the current frame.
    pub(crate) fn update(&mut self, post_snr_q11: &[u32]) {
        // Bin likelihoods: snr / (snr + knee), Q15.
        let mut sum: u64 = 0;
        for (p, &snr) in self.probability_q15.iter_mut().zip(post_snr_q11) {
            let snr = u64::from(snr);
            let likelihood = ((snr << 15) / (snr + KNEE_Q11)) as u16;
            sum += u64::from(likelihood);
            *p = likelihood;
        }

        // Frame prior follows the average likelihood, slowly.
        let average = (sum / post_snr_q11.len().max(1) as u64) as i32;
        self.prior_q15 += (PRIOR_SMOOTH_Q15 * (average - self.prior_q15)) >> 15;
        self.prior_q15 = self.prior_q15.clamp(MIN_PRIOR_Q15, 32767);

        // Posterior: likelihood weighted by the prior.
        for p in &mut self.probability_q15[..post_snr_q11.len()] {
            *p = ((u32::from(*p) * self.prior_q15 as u32) >> 15) as u16;
        }
    }

    /// Per-bin posterior speech probability, Q15.
    pub(crate) fn probability(&self) -> &[u16] {
        &self.probability_q15
    }

    /// Frame-level prior speech probability, Q15.
    pub(crate) fn prior(&self) -> u16 {
        self.prior_q15 as u16
    }
}
