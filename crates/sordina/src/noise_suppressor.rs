//! Engine instance and public control surface.
//!
//! Owns the per-band pipeline state and drives each 10 ms frame through
//! analysis, noise estimation, gain computation and overlap-add
//! synthesis.
//!
//! C source: `webrtc/modules/audio_processing/ns/nsx_core.c`

use tracing::debug;

use crate::config::{
    ConfigError, EngineConfig, SuppressionPolicy, NUM_FREQUENCY_BINS, STARTUP_PHASE_FRAMES,
};
use crate::fixed_math::{rescale_i32, sat_i16, sqrt_floor};
use crate::noise_estimator::NoiseEstimator;
use crate::speech_probability_estimator::SpeechProbabilityEstimator;
use crate::suppression_params::SuppressionParams;
use crate::transform::TransformAdapter;
use crate::wiener_filter::WienerFilter;

/// Number of frequency bins every noise estimate spans, independent of
/// any instance or sample rate.
pub const fn num_frequency_bins() -> usize {
    NUM_FREQUENCY_BINS
}

/// Fixed-point noise suppressor for one audio stream.
///
/// Create one per channel, initialize it for the stream's sample rate,
/// then feed 10 ms frames through `process`. Re-initialization is always
/// safe and resets every estimator; the configured policy is kept.
/// Dropping the instance releases the transform and all history buffers.
#[derive(Debug)]
pub struct NoiseSuppressor {
    policy: SuppressionPolicy,
    params: SuppressionParams,
    state: Option<EngineState>,
}

/// Everything fixed by `init`: the shared transform, per-band pipeline
/// state and the spectral scratch buffers reused across bands.
#[derive(Debug)]
struct EngineState {
    config: EngineConfig,
    transform: TransformAdapter,
    bands: Vec<BandState>,
    magn_q11: Vec<u32>,
    post_snr_q11: Vec<u32>,
}

/// Per-band history. Bands never share estimator state, only the
/// transform and the scratch buffers.
#[derive(Debug)]
struct BandState {
    /// Sliding analysis window, frame plus lookahead.
    analysis: Vec<i16>,
    /// Overlap-add accumulator for the synthesized signal.
    synthesis: Vec<i16>,
    noise: NoiseEstimator,
    speech: SpeechProbabilityEstimator,
    wiener: WienerFilter,
    num_analyzed_frames: u32,
}

impl NoiseSuppressor {
    /// Creates an engine with no transform attached. `process` is not
    /// usable until `init` has fixed a sample rate.
    pub fn new() -> Self {
        let policy = SuppressionPolicy::default();
        Self {
            policy,
            params: SuppressionParams::for_policy(policy),
            state: None,
        }
    }

    /// Sizes the transform and history for `sample_rate_hz` and clears
    /// all accumulated state. Calling this on a running instance starts
    /// it over from scratch; the suppression policy is configuration,
    /// not history, and survives.
    pub fn init(&mut self, sample_rate_hz: u32) -> Result<(), ConfigError> {
        let config = EngineConfig::for_sample_rate(sample_rate_hz)?;
        let bands = (0..config.num_bands)
            .map(|_| BandState::new(config.block_len))
            .collect();
        self.state = Some(EngineState {
            transform: TransformAdapter::new(config.block_len, config.fft_order),
            bands,
            magn_q11: vec![0; config.bins_in_use],
            post_snr_q11: vec![0; config.bins_in_use],
            config,
        });
        debug!(
            "initialized for {} Hz: {} band(s), block {}, {} bins",
            config.sample_rate_hz, config.num_bands, config.block_len, config.bins_in_use
        );
        Ok(())
    }

    /// Selects how hard low-SNR bins are attenuated. Takes effect on the
    /// next processed frame; noise estimates are not touched.
    pub fn set_policy(&mut self, policy: SuppressionPolicy) {
        self.policy = policy;
        self.params = SuppressionParams::for_policy(policy);
        debug!("suppression policy set to {policy:?}");
    }

    /// Currently configured aggressiveness.
    pub fn policy(&self) -> SuppressionPolicy {
        self.policy
    }

    /// Suppresses noise in one 10 ms frame, one input and one output
    /// slice per band. Band splitting and recombination belong to the
    /// caller.
    ///
    /// Calling this before `init`, or with a band count or frame length
    /// other than the initialized configuration, is a caller bug and
    /// panics. Frames are processed without allocating.
    pub fn process(&mut self, input_bands: &[&[i16]], output_bands: &mut [&mut [i16]]) {
        let params = self.params;
        let state = self
            .state
            .as_mut()
            .expect("process called before init fixed a sample rate");
        let EngineState {
            config,
            transform,
            bands,
            magn_q11,
            post_snr_q11,
        } = state;

        assert_eq!(
            input_bands.len(),
            config.num_bands,
            "expected {} input bands, got {}",
            config.num_bands,
            input_bands.len()
        );
        assert_eq!(
            output_bands.len(),
            config.num_bands,
            "expected {} output bands, got {}",
            config.num_bands,
            output_bands.len()
        );

        for ((input, output), band) in input_bands
            .iter()
            .zip(output_bands.iter_mut())
            .zip(bands.iter_mut())
        {
            assert_eq!(
                input.len(),
                config.frame_len,
                "input frame length {} does not match the configured {}",
                input.len(),
                config.frame_len
            );
            assert_eq!(
                output.len(),
                config.frame_len,
                "output frame length {} does not match the configured {}",
                output.len(),
                config.frame_len
            );
            band.process(
                transform,
                &params,
                config.bins_in_use,
                config.frame_len,
                magn_q11,
                post_snr_q11,
                input,
                output,
            );
        }
    }

    /// Current noise power estimate of the lowest band, or `None` if the
    /// engine was never initialized. Values are magnitudes stored as
    /// `value * 2^q`; the exponent grows while the floor is quiet and
    /// shrinks back when it rises.
    pub fn noise_estimate(&self) -> Option<NoiseEstimate<'_>> {
        self.state.as_ref().map(|state| {
            let noise = &state.bands[0].noise;
            NoiseEstimate {
                bins: noise.estimate(),
                q: noise.q(),
            }
        })
    }
}

impl Default for NoiseSuppressor {
    fn default() -> Self {
        Self::new()
    }
}

impl BandState {
    fn new(block_len: usize) -> Self {
        Self {
            analysis: vec![0; block_len],
            synthesis: vec![0; block_len],
            noise: NoiseEstimator::new(),
            speech: SpeechProbabilityEstimator::new(),
            wiener: WienerFilter::new(),
            num_analyzed_frames: 0,
        }
    }

    /// Runs the full pipeline for one band of one frame.
    #[allow(clippy::too_many_arguments, reason = "flat per-band data flow")]
    fn process(
        &mut self,
        transform: &mut TransformAdapter,
        params: &SuppressionParams,
        bins_in_use: usize,
        frame_len: usize,
        magn_q11: &mut [u32],
        post_snr_q11: &mut [u32],
        input: &[i16],
        output: &mut [i16],
    ) {
        // Slide the analysis window: keep the lookahead, append the frame.
        let block_len = self.analysis.len();
        self.analysis.copy_within(frame_len.., 0);
        self.analysis[block_len - frame_len..].copy_from_slice(input);

        let Some(norm) = transform.forward(&self.analysis) else {
            // All-zero block: nothing to estimate, only the tail drains.
            self.emit_frame(frame_len, output);
            return;
        };

        let magn_q11 = &mut magn_q11[..bins_in_use];
        let post_snr_q11 = &mut post_snr_q11[..bins_in_use];

        // Bin magnitudes in Q11, realigned from the block's headroom scale.
        for (magn, pair) in magn_q11.iter_mut().zip(transform.freq().chunks_exact(2)) {
            let re = i32::from(pair[0]);
            let im = i32::from(pair[1]);
            let energy = (re * re) as u32 + (im * im) as u32;
            *magn = rescale_i32(i32::from(sqrt_floor(energy)), i32::from(norm) - 11) as u32;
        }

        // SNR against the previous estimate, then classify, then learn.
        self.noise.post_snr(magn_q11, post_snr_q11);
        self.speech.update(post_snr_q11);
        self.noise
            .update(magn_q11, self.speech.probability(), self.num_analyzed_frames);
        self.wiener.update(post_snr_q11, params);

        // Attenuate in place before the inverse transform.
        for (pair, &gain) in transform
            .freq_mut()
            .chunks_exact_mut(2)
            .zip(self.wiener.gains())
        {
            for v in pair {
                *v = ((i32::from(*v) * i32::from(gain) + (1 << 13)) >> 14) as i16;
            }
        }

        // Energy compensation is only trustworthy once the estimate is.
        let factor_q14 = if params.use_gain_map && self.num_analyzed_frames >= STARTUP_PHASE_FRAMES
        {
            self.wiener.overall_gain_factor(magn_q11, self.speech.prior())
        } else {
            1 << 14
        };

        let window = transform.window();
        let time = transform.inverse(norm);

        // Windowed overlap-add of the synthesized block.
        for ((acc, &sample), &w) in self.synthesis.iter_mut().zip(time).zip(window) {
            let windowed = (i32::from(sample) * i32::from(w) + (1 << 13)) >> 14;
            let scaled = (windowed * i32::from(factor_q14) + (1 << 13)) >> 14;
            *acc = acc.saturating_add(sat_i16(scaled));
        }

        self.num_analyzed_frames = self.num_analyzed_frames.saturating_add(1);
        self.emit_frame(frame_len, output);
    }

    /// Emits the settled head of the overlap buffer and slides the rest
    /// forward for the next frame.
    fn emit_frame(&mut self, frame_len: usize, output: &mut [i16]) {
        output.copy_from_slice(&self.synthesis[..frame_len]);
        self.synthesis.copy_within(frame_len.., 0);
        let tail_start = self.synthesis.len() - frame_len;
        self.synthesis[tail_start..].fill(0);
    }
}

/// A borrowed view of the per-bin noise power estimate.
#[derive(Debug, Clone, Copy)]
pub struct NoiseEstimate<'a> {
    bins: &'a [u32],
    q: u8,
}

impl NoiseEstimate<'_> {
    /// Per-bin magnitude estimates. The true magnitude of a bin is
    /// `bins()[k] * 2^(-q())`.
    pub fn bins(&self) -> &[u32] {
        self.bins
    }

    /// Scale exponent shared by every bin.
    pub fn q(&self) -> u8 {
        self.q
    }
}
