//! Recursive per-bin noise floor estimation.
//!
//! Bin magnitudes arrive in Q11. The stored estimate carries an adaptive
//! exponent on top of that base: quiet floors are renormalized upward so
//! the recursion keeps precision, loud ones back down. The update is
//! asymmetric on purpose: drops and in-margin moves track at the fast
//! rate, rises creep, scaled further by the inverse speech probability so
//! speech transients are not learned as noise. A residual rise rate keeps
//! the floor from freezing entirely under sustained speech.

use crate::config::{NOISE_ESTIMATE_BASE_Q, NUM_FREQUENCY_BINS, STARTUP_PHASE_FRAMES};
use crate::fixed_math::div_q;

/// Rate for downward and in-margin moves, Q15.
const SMOOTH_DOWN_Q15: u64 = 6554; // 0.2
/// Rate for upward moves, Q15, scaled by (1 - speech probability).
const SMOOTH_UP_Q15: u64 = 1638; // 0.05
/// Residual upward rate, Q15.
const SMOOTH_UP_FLOOR_Q15: u64 = 131; // 0.004
/// Upward moves within this factor of the estimate still count as
/// tracking the floor, Q11.
const BIAS_MARGIN_Q11: u64 = 2560; // 1.25

/// Renormalization bounds on the stored magnitudes.
const RENORM_UP_BELOW: u32 = 1 << 25;
const RENORM_DOWN_AT: u32 = 1 << 28;
const MAX_Q_ADJUST: u8 = 13;

/// Cap on the per-bin post SNR, Q11.
pub(crate) const MAX_POST_SNR_Q11: u32 = 1 << 20;

/// Per-band recursive noise floor.
#[derive(Debug)]
pub(crate) struct NoiseEstimator {
    /// Magnitudes at `NOISE_ESTIMATE_BASE_Q + q_adjust`.
    estimate: Vec<u32>,
    q_adjust: u8,
}

impl NoiseEstimator {
    pub(crate) fn new() -> Self {
        Self {
            estimate: vec![0; NUM_FREQUENCY_BINS],
            q_adjust: 0,
        }
    }

    /// Combined scale exponent of [`estimate`](Self::estimate).
    pub(crate) fn q(&self) -> u8 {
        NOISE_ESTIMATE_BASE_Q + self.q_adjust
    }

    pub(crate) fn estimate(&self) -> &[u32] {
        &self.estimate
    }

    /// Per-bin SNR of the given magnitudes against the current floor,
    /// Q11, capped at [`MAX_POST_SNR_Q11`].
    pub(crate) fn post_snr(&self, magn_q11: &[u32], snr_q11: &mut [u32]) {
        for ((snr, &magn), &noise) in snr_q11.iter_mut().zip(magn_q11).zip(&self.estimate) {
            let noise_q11 = noise >> self.q_adjust;
            *snr = if magn == 0 {
                0
            } else if noise_q11 == 0 {
                MAX_POST_SNR_Q11
            } else {
                div_q(magn, noise_q11, 11).min(MAX_POST_SNR_Q11)
            };
        }
    }

    /// Fold one frame of magnitudes into the floor.
    pub(crate) fn update(
        &mut self,
        magn_q11: &[u32],
        speech_prob_q15: &[u16],
        num_analyzed_frames: u32,
    ) {
        if num_analyzed_frames < STARTUP_PHASE_FRAMES {
            // Running mean: converges from the zero state in a few frames.
            let count = u64::from(num_analyzed_frames) + 1;
            for (est, &magn) in self.estimate.iter_mut().zip(magn_q11) {
                let target = u64::from(magn) << self.q_adjust;
                let current = u64::from(*est);
                let next = if target >= current {
                    current + (target - current) / count
                } else {
                    current - (current - target) / count
                };
                *est = next.min(u64::from(u32::MAX)) as u32;
            }
        } else {
            for ((est, &magn), &prob) in
                self.estimate.iter_mut().zip(magn_q11).zip(speech_prob_q15)
            {
                let target = u64::from(magn) << self.q_adjust;
                let current = u64::from(*est);
                let margin = (current * BIAS_MARGIN_Q11) >> 11;
                let next = if target <= margin {
                    if target >= current {
                        current + (((target - current) * SMOOTH_DOWN_Q15) >> 15)
                    } else {
                        current - (((current - target) * SMOOTH_DOWN_Q15) >> 15)
                    }
                } else {
                    let inverse_prob = u64::from(32768 - u32::from(prob));
                    let rate = SMOOTH_UP_FLOOR_Q15 + ((SMOOTH_UP_Q15 * inverse_prob) >> 15);
                    current + (((target - current) * rate) >> 15)
                };
                *est = next.min(u64::from(u32::MAX)) as u32;
            }
        }
        self.renormalize();
    }

    /// One exponent step per frame toward the precision window.
    fn renormalize(&mut self) {
        let max = self.estimate.iter().copied().max().unwrap_or(0);
        if max >= RENORM_DOWN_AT && self.q_adjust > 0 {
            for est in &mut self.estimate {
                *est >>= 1;
            }
            self.q_adjust -= 1;
        } else if max > 0 && max < RENORM_UP_BELOW && self.q_adjust < MAX_Q_ADJUST {
            for est in &mut self.estimate {
                *est <<= 1;
            }
            self.q_adjust += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_SPEECH: [u16; NUM_FREQUENCY_BINS] = [32767; NUM_FREQUENCY_BINS];
    const NO_SPEECH: [u16; NUM_FREQUENCY_BINS] = [0; NUM_FREQUENCY_BINS];

    /// Estimate of bin 0 expressed back in Q11.
    fn bin0_q11(est: &NoiseEstimator) -> u32 {
        est.estimate()[0] >> (est.q() - NOISE_ESTIMATE_BASE_Q)
    }

    #[test]
    fn fresh_state_is_zero_at_base_q() {
        let est = NoiseEstimator::new();
        assert_eq!(est.q(), NOISE_ESTIMATE_BASE_Q);
        assert!(est.estimate().iter().all(|&v| v == 0));
    }

    #[test]
    fn startup_mean_converges_to_constant_magnitude() {
        let mut est = NoiseEstimator::new();
        let magn = [4096u32; NUM_FREQUENCY_BINS];
        for frame in 0..STARTUP_PHASE_FRAMES {
            est.update(&magn, &NO_SPEECH, frame);
        }
        let value = bin0_q11(&est);
        assert!(
            (4090..=4102).contains(&value),
            "startup mean settled at {value}"
        );
    }

    #[test]
    fn floor_drops_fast_and_rises_slowly() {
        let mut est = NoiseEstimator::new();
        let high = [8192u32; NUM_FREQUENCY_BINS];
        let low = [1024u32; NUM_FREQUENCY_BINS];
        for frame in 0..STARTUP_PHASE_FRAMES {
            est.update(&high, &NO_SPEECH, frame);
        }
        let before = bin0_q11(&est);
        est.update(&low, &NO_SPEECH, STARTUP_PHASE_FRAMES);
        let fall = before - bin0_q11(&est);

        let mut est_up = NoiseEstimator::new();
        for frame in 0..STARTUP_PHASE_FRAMES {
            est_up.update(&low, &NO_SPEECH, frame);
        }
        let before = bin0_q11(&est_up);
        est_up.update(&high, &NO_SPEECH, STARTUP_PHASE_FRAMES);
        let rise = bin0_q11(&est_up) - before;

        // Same step size in both directions, asymmetric response.
        assert!(fall > 3 * rise, "fall {fall} should dwarf rise {rise}");
    }

    #[test]
    fn speech_probability_brakes_upward_adaptation() {
        let mut with_speech = NoiseEstimator::new();
        let mut without = NoiseEstimator::new();
        let quiet = [512u32; NUM_FREQUENCY_BINS];
        let loud = [16384u32; NUM_FREQUENCY_BINS];
        for frame in 0..STARTUP_PHASE_FRAMES {
            with_speech.update(&quiet, &NO_SPEECH, frame);
            without.update(&quiet, &NO_SPEECH, frame);
        }
        for frame in STARTUP_PHASE_FRAMES..STARTUP_PHASE_FRAMES + 20 {
            with_speech.update(&loud, &ALL_SPEECH, frame);
            without.update(&loud, &NO_SPEECH, frame);
        }
        let braked = bin0_q11(&with_speech);
        let free = bin0_q11(&without);
        assert!(
            braked < free / 2,
            "speech-weighted rise {braked} vs unweighted {free}"
        );
        // Residual rate still moved the floor.
        assert!(braked > 512, "floor must not freeze, got {braked}");
    }

    #[test]
    fn quiet_floor_gains_precision_through_the_exponent() {
        let mut est = NoiseEstimator::new();
        let tiny = [12u32; NUM_FREQUENCY_BINS];
        for frame in 0..STARTUP_PHASE_FRAMES + 40 {
            est.update(&tiny, &NO_SPEECH, frame);
        }
        assert!(est.q() > NOISE_ESTIMATE_BASE_Q, "exponent stuck at base");
        assert!(
            (10..=14).contains(&bin0_q11(&est)),
            "floor drifted to {}",
            bin0_q11(&est)
        );
    }

    #[test]
    fn post_snr_is_capped_against_a_zero_floor() {
        let est = NoiseEstimator::new();
        let magn = [100u32; NUM_FREQUENCY_BINS];
        let mut snr = [0u32; NUM_FREQUENCY_BINS];
        est.post_snr(&magn, &mut snr);
        assert!(snr.iter().all(|&v| v == MAX_POST_SNR_Q11));
    }
}
