//! Fixed-point noise suppression for speech audio.
//!
//! Spectral Wiener filtering driven by a recursive noise-floor estimate,
//! entirely in integer arithmetic with explicit Q-format scaling.
//!
//! C source: `webrtc/modules/audio_processing/ns/noise_suppression_x.c`

pub mod config;
pub(crate) mod fixed_math;
pub(crate) mod noise_estimator;
pub mod noise_suppressor;
pub(crate) mod speech_probability_estimator;
pub(crate) mod suppression_params;
pub(crate) mod transform;
pub(crate) mod wiener_filter;
pub(crate) mod windows;
