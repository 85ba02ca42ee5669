#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sordina::config::{NUM_FREQUENCY_BINS, SuppressionPolicy};
use sordina::noise_suppressor::NoiseSuppressor;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    steps: Vec<FuzzStep>,
    /// Audio samples processed between lifecycle steps.
    samples: Vec<i16>,
}

#[derive(Debug, Arbitrary)]
enum FuzzStep {
    Init { sample_rate_idx: u8 },
    SetPolicy { mode: i32 },
    Process,
    ReadEstimate,
}

fn stream_shape(idx: u8) -> (u32, usize, usize) {
    match idx % 4 {
        0 => (8_000, 1, 80),
        1 => (16_000, 1, 160),
        2 => (32_000, 2, 160),
        _ => (48_000, 3, 160),
    }
}

fuzz_target!(|input: FuzzInput| {
    if input.samples.len() < 3 * 160 {
        return;
    }

    let mut ns = NoiseSuppressor::new();
    let mut shape = None;

    for step in &input.steps {
        match step {
            FuzzStep::Init { sample_rate_idx } => {
                let (rate, num_bands, frame_len) = stream_shape(*sample_rate_idx);
                ns.init(rate).unwrap();
                shape = Some((num_bands, frame_len));
            }
            FuzzStep::SetPolicy { mode } => {
                if let Ok(policy) = SuppressionPolicy::try_from(*mode) {
                    ns.set_policy(policy);
                }
            }
            FuzzStep::Process => {
                // Calling process before init is a contract violation, so
                // only exercise it on an initialized engine.
                let Some((num_bands, frame_len)) = shape else {
                    continue;
                };
                let inputs: Vec<&[i16]> = (0..num_bands)
                    .map(|band| &input.samples[band * frame_len..(band + 1) * frame_len])
                    .collect();
                let mut outputs = vec![vec![0i16; frame_len]; num_bands];
                let mut dst: Vec<&mut [i16]> =
                    outputs.iter_mut().map(|v| v.as_mut_slice()).collect();
                ns.process(&inputs, &mut dst);
            }
            FuzzStep::ReadEstimate => {
                if let Some(estimate) = ns.noise_estimate() {
                    assert_eq!(estimate.bins().len(), NUM_FREQUENCY_BINS);
                }
            }
        }
    }
});
