#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sordina::noise_suppressor::NoiseSuppressor;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    /// Sample rate index: 0=8k, 1=16k, 2=32k, 3=48k
    sample_rate_idx: u8,
    /// Time-domain samples, consumed one multi-band frame per call.
    samples: Vec<i16>,
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
    let (rate, num_bands, frame_len) = stream_shape(input.sample_rate_idx);
    let samples_per_call = num_bands * frame_len;
    if input.samples.len() < samples_per_call {
        return;
    }

    let mut ns = NoiseSuppressor::new();
    ns.init(rate).unwrap();

    let mut outputs = vec![vec![0i16; frame_len]; num_bands];
    for call in input.samples.chunks_exact(samples_per_call) {
        let inputs: Vec<&[i16]> = call.chunks_exact(frame_len).collect();
        let mut dst: Vec<&mut [i16]> = outputs.iter_mut().map(|v| v.as_mut_slice()).collect();
        ns.process(&inputs, &mut dst);
    }
});
