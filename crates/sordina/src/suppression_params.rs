//! Per-policy suppression tuning.
//!
//! C source: `webrtc/modules/audio_processing/ns/nsx_core.c`
//! (`WebRtcNsx_set_policy_core`)

use crate::config::SuppressionPolicy;

/// Tuning constants selected by the suppression policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SuppressionParams {
    /// Over-subtraction factor in the Wiener gain denominator, Q8.
    pub(crate) overdrive_q8: u16,
    /// Gain floor in noise-only regions, Q14.
    pub(crate) min_gain_q14: u16,
    /// Whether the energy-based frame gain factor is applied on top of
    /// the per-bin gains.
    pub(crate) use_gain_map: bool,
}

impl SuppressionParams {
    pub(crate) const fn for_policy(policy: SuppressionPolicy) -> Self {
        match policy {
            // 1.0 overdrive, -6 dB floor.
            SuppressionPolicy::Conservative => Self {
                overdrive_q8: 256,
                min_gain_q14: 8192,
                use_gain_map: false,
            },
            // 1.0 overdrive, -12 dB floor.
            SuppressionPolicy::Moderate => Self {
                overdrive_q8: 256,
                min_gain_q14: 4096,
                use_gain_map: true,
            },
            // 1.1 overdrive, -18 dB floor.
            SuppressionPolicy::Aggressive => Self {
                overdrive_q8: 282,
                min_gain_q14: 2048,
                use_gain_map: true,
            },
            // 1.25 overdrive, -21 dB floor.
            SuppressionPolicy::VeryAggressive => Self {
                overdrive_q8: 320,
                min_gain_q14: 1475,
                use_gain_map: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floors_drop_with_aggressiveness() {
        let policies = [
            SuppressionPolicy::Conservative,
            SuppressionPolicy::Moderate,
            SuppressionPolicy::Aggressive,
            SuppressionPolicy::VeryAggressive,
        ];
        let params = policies.map(SuppressionParams::for_policy);
        for pair in params.windows(2) {
            assert!(
                pair[0].min_gain_q14 > pair[1].min_gain_q14,
                "gain floor must shrink: {pair:?}"
            );
            assert!(
                pair[0].overdrive_q8 <= pair[1].overdrive_q8,
                "overdrive must not shrink: {pair:?}"
            );
        }
    }

    #[test]
    fn conservative_disables_the_gain_map() {
        assert!(!SuppressionParams::for_policy(SuppressionPolicy::Conservative).use_gain_map);
        assert!(SuppressionParams::for_policy(SuppressionPolicy::Moderate).use_gain_map);
    }
}
