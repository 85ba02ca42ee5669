//! Decision-directed Wiener gain computation.
//!
//! Per bin: a prior SNR from the decision-directed rule, a gain of
//! `prior / (prior + overdrive)` clamped to the policy floor, then
//! temporal and spectral smoothing to keep bin-independent decisions from
//! turning into musical noise. Also derives the frame-wide scaling factor
//! applied on top of the per-bin gains when the policy enables it.

use crate::config::NUM_FREQUENCY_BINS;
use crate::fixed_math::sqrt_floor;
use crate::noise_estimator::MAX_POST_SNR_Q11;
use crate::suppression_params::SuppressionParams;

/// Weight of the filtered previous SNR in the decision-directed rule,
/// Q15.
const DD_Q15: u64 = 32113; // 0.98
/// Smoothing toward lower gains (attack), Q15.
const ATTACK_Q15: i32 = 29491; // 0.9
/// Smoothing toward higher gains (release), Q15.
const RELEASE_Q15: i32 = 9830; // 0.3
/// Gain-energy pivot of the overall factor, Q14.
const GAIN_ENERGY_PIVOT_Q14: u32 = 8192; // 0.5
/// Slope above the pivot (amplifying), Q14.
const AMPLIFY_SLOPE_Q14: u32 = 21299; // 1.3
/// Slope below the pivot (attenuating), Q14.
const ATTENUATE_SLOPE_Q14: u32 = 4915; // 0.3

/// Per-band suppression gain state.
#[derive(Debug)]
pub(crate) struct WienerFilter {
    /// Smoothed per-bin gains, Q14.
    gain_q14: Vec<u16>,
    /// Scratch for the pre-smoothing gains of the current frame.
    raw_gain_q14: Vec<u16>,
    /// Post SNR of the previous frame, Q11.
    prev_post_snr_q11: Vec<u32>,
}

impl WienerFilter {
    pub(crate) fn new() -> Self {
        Self {
            gain_q14: vec![1 << 14; NUM_FREQUENCY_BINS],
            raw_gain_q14: vec![1 << 14; NUM_FREQUENCY_BINS],
            prev_post_snr_q11: vec![1 << 11; NUM_FREQUENCY_BINS],
        }
    }

    /// Smoothed per-bin gains, Q14, within `[min_gain, 1.0]`.
    pub(crate) fn gains(&self) -> &[u16] {
        &self.gain_q14
    }

    /// Compute this frame's gains from the post SNR.
    pub(crate) fn update(&mut self, post_snr_q11: &[u32], params: &SuppressionParams) {
        let bins = post_snr_q11.len();
        let overdrive_q11 = u64::from(params.overdrive_q8) << 3;
        let min_gain = params.min_gain_q14;

        for (k, &post) in post_snr_q11.iter().enumerate() {
            // Decision-directed prior SNR: mostly the previous frame seen
            // through its own gain, plus a little over-subtracted evidence.
            let prev_gain = u64::from(self.gain_q14[k]);
            let gain_sq_q14 = (prev_gain * prev_gain) >> 14;
            let filtered_prev_q11 =
                (gain_sq_q14 * u64::from(self.prev_post_snr_q11[k])) >> 14;
            let evidence_q11 = u64::from(post.saturating_sub(1 << 11));
            let prior_q11 = ((DD_Q15 * filtered_prev_q11
                + (32768 - DD_Q15) * evidence_q11)
                >> 15)
                .min(u64::from(MAX_POST_SNR_Q11));

            let gain = ((prior_q11 << 14) / (prior_q11 + overdrive_q11)) as u16;
            self.raw_gain_q14[k] = gain.clamp(min_gain, 1 << 14);
            self.prev_post_snr_q11[k] = post;
        }

        self.smooth(bins, min_gain);
    }

    /// Spectral [1 2 1]/4 pass over the raw gains, then an asymmetric
    /// temporal pass into the persisted gains.
    fn smooth(&mut self, bins: usize, min_gain: u16) {
        for k in 0..bins {
            let center = u32::from(self.raw_gain_q14[k]);
            let left = u32::from(self.raw_gain_q14[k.saturating_sub(1)]);
            let right = u32::from(self.raw_gain_q14[(k + 1).min(bins - 1)]);
            let spectral = ((left + 2 * center + right + 2) >> 2) as i32;

            let current = i32::from(self.gain_q14[k]);
            let rate = if spectral < current {
                ATTACK_Q15
            } else {
                RELEASE_Q15
            };
            let next = current + ((rate * (spectral - current)) >> 15);
            self.gain_q14[k] = (next as u16).clamp(min_gain, 1 << 14);
        }
    }

    /// Frame-wide gain factor from the energy the per-bin gains kept,
    /// blended between an amplifying and an attenuating branch by the
    /// speech prior. Q14.
    pub(crate) fn overall_gain_factor(&self, magn_q11: &[u32], speech_prior_q15: u16) -> u16 {
        let max_magn = magn_q11.iter().copied().max().unwrap_or(0);
        if max_magn == 0 {
            return 1 << 14;
        }
        // Normalize magnitudes to 15 bits so the energy sums fit u64.
        let bits = 32 - max_magn.leading_zeros();
        let shift = bits.saturating_sub(15);

        let mut kept: u64 = 0;
        let mut total: u64 = 0;
        for (&magn, &gain) in magn_q11.iter().zip(&self.gain_q14) {
            let m = u64::from(magn >> shift);
            let energy = m * m;
            let gain_sq_q14 = (u64::from(gain) * u64::from(gain)) >> 14;
            kept += gain_sq_q14 * energy;
            total += energy;
        }
        if total == 0 {
            return 1 << 14;
        }

        // Weighted average of squared gains, Q14 in [0, 1].
        let kept_energy_sq_q14 = (kept / total) as u32;
        let gain_energy_q14 = u32::from(sqrt_floor(kept_energy_sq_q14 << 14));

        let amplify = if gain_energy_q14 > GAIN_ENERGY_PIVOT_Q14 {
            let raised = (1 << 14)
                + ((AMPLIFY_SLOPE_Q14 * (gain_energy_q14 - GAIN_ENERGY_PIVOT_Q14)) >> 14);
            // Never push the kept energy back above unity.
            if (gain_energy_q14 * raised) >> 14 > 1 << 14 {
                (1 << 28) / gain_energy_q14
            } else {
                raised
            }
        } else {
            1 << 14
        };
        let attenuate = if gain_energy_q14 < GAIN_ENERGY_PIVOT_Q14 {
            (1 << 14) - ((ATTENUATE_SLOPE_Q14 * (GAIN_ENERGY_PIVOT_Q14 - gain_energy_q14)) >> 14)
        } else {
            1 << 14
        };

        let prior = u32::from(speech_prior_q15);
        (((prior * amplify + (32768 - prior) * attenuate) >> 15) as u16).min(1 << 15)
    }
}
