//! Engine sizing, suppression policy, and configuration errors.

/// Longest analysis block, used at 16 kHz and above.
pub const MAX_BLOCK_LEN: usize = 256;

/// Number of non-redundant frequency bins of the longest analysis block.
pub const NUM_FREQUENCY_BINS: usize = MAX_BLOCK_LEN / 2 + 1;

/// Base scale exponent of the noise estimate; a fresh instance reports
/// exactly this until the floor adapts.
pub const NOISE_ESTIMATE_BASE_Q: u8 = 11;

/// Frames of accelerated adaptation after `init`, before the estimators
/// switch to their steady-state rates.
pub(crate) const STARTUP_PHASE_FRAMES: u32 = 50;

/// Error returned for configuration values outside the supported set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Sample rate does not map to a supported rate class.
    UnsupportedSampleRate { sample_rate_hz: u32 },
    /// Policy mode integer is outside `0..=3`.
    UnsupportedPolicy { mode: i32 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::UnsupportedSampleRate { sample_rate_hz } => write!(
                f,
                "unsupported sample rate {sample_rate_hz}; expected 8000, 16000, 32000 or 48000",
            ),
            Self::UnsupportedPolicy { mode } => {
                write!(f, "unsupported policy mode {mode}; expected 0..=3")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Suppression aggressiveness.
///
/// Higher levels attenuate noise-only regions harder, at an increasing
/// risk of speech distortion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum SuppressionPolicy {
    /// Mildest setting, about -6 dB in noise-only regions.
    #[default]
    Conservative,
    /// About -12 dB.
    Moderate,
    /// About -18 dB.
    Aggressive,
    /// About -21 dB.
    VeryAggressive,
}

impl TryFrom<i32> for SuppressionPolicy {
    type Error = ConfigError;

    /// Map the legacy mode integer onto a policy.
    fn try_from(mode: i32) -> Result<Self, ConfigError> {
        match mode {
            0 => Ok(Self::Conservative),
            1 => Ok(Self::Moderate),
            2 => Ok(Self::Aggressive),
            3 => Ok(Self::VeryAggressive),
            _ => Err(ConfigError::UnsupportedPolicy { mode }),
        }
    }
}

/// Sizing fixed at `init` by the sample-rate class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EngineConfig {
    pub(crate) sample_rate_hz: u32,
    /// Bands the caller splits the signal into (one per 16 kHz of rate).
    pub(crate) num_bands: usize,
    /// Samples per band per 10 ms frame.
    pub(crate) frame_len: usize,
    /// Analysis block length (frame plus lookahead).
    pub(crate) block_len: usize,
    pub(crate) fft_order: usize,
    /// Non-redundant bins of this block length.
    pub(crate) bins_in_use: usize,
}

impl EngineConfig {
    pub(crate) fn for_sample_rate(sample_rate_hz: u32) -> Result<Self, ConfigError> {
        match sample_rate_hz {
            8_000 => Ok(Self {
                sample_rate_hz,
                num_bands: 1,
                frame_len: 80,
                block_len: 128,
                fft_order: 7,
                bins_in_use: 65,
            }),
            16_000 | 32_000 | 48_000 => Ok(Self {
                sample_rate_hz,
                num_bands: (sample_rate_hz / 16_000) as usize,
                frame_len: 160,
                block_len: MAX_BLOCK_LEN,
                fft_order: 8,
                bins_in_use: NUM_FREQUENCY_BINS,
            }),
            _ => Err(ConfigError::UnsupportedSampleRate { sample_rate_hz }),
        }
    }
}
