#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod complex_fft;
pub mod real_fft;
