//! Benchmarks for the suppression pipeline and the fixed-point FFT.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use sordina::config::SuppressionPolicy;
use sordina::noise_suppressor::NoiseSuppressor;
use sordina_fft::real_fft::RealFft;

fn speech_like_frame(len: usize, frame_index: usize) -> Vec<i16> {
    (0..len)
        .map(|i| {
            let n = (frame_index * len + i) as f32;
            let tone = (n * 0.4).sin() * 9_000.0;
            let hiss = (n * 1.7).sin() * (n * 0.013).cos() * 900.0;
            (tone + hiss) as i16
        })
        .collect()
}

fn warmed_suppressor(sample_rate_hz: u32, num_bands: usize, frame_len: usize) -> NoiseSuppressor {
    let mut ns = NoiseSuppressor::new();
    ns.init(sample_rate_hz).unwrap();
    ns.set_policy(SuppressionPolicy::Aggressive);

    // Run the estimators past the startup phase so we bench steady state.
    let mut outputs = vec![vec![0i16; frame_len]; num_bands];
    for frame in 0..60 {
        let input = speech_like_frame(frame_len, frame);
        let inputs: Vec<&[i16]> = (0..num_bands).map(|_| input.as_slice()).collect();
        let mut dst: Vec<&mut [i16]> = outputs.iter_mut().map(Vec::as_mut_slice).collect();
        ns.process(&inputs, &mut dst);
    }
    ns
}

fn bench_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("process");

    for (name, rate, num_bands, frame_len) in [
        ("8k_mono", 8_000u32, 1usize, 80usize),
        ("16k_mono", 16_000, 1, 160),
        ("48k_three_bands", 48_000, 3, 160),
    ] {
        let mut ns = warmed_suppressor(rate, num_bands, frame_len);
        let input = speech_like_frame(frame_len, 0);
        let inputs: Vec<&[i16]> = (0..num_bands).map(|_| input.as_slice()).collect();
        let mut outputs = vec![vec![0i16; frame_len]; num_bands];

        group.bench_function(name, |b| {
            b.iter(|| {
                let mut dst: Vec<&mut [i16]> = outputs.iter_mut().map(Vec::as_mut_slice).collect();
                ns.process(black_box(&inputs), &mut dst);
            });
        });
    }

    group.finish();
}

fn bench_real_fft(c: &mut Criterion) {
    let mut group = c.benchmark_group("real_fft");

    for order in [7usize, 8] {
        let mut fft = RealFft::new(order);
        let block_len = fft.block_len();
        let time: Vec<i16> = (0..block_len)
            .map(|i| ((i as f32 * 0.3).sin() * 12_000.0) as i16)
            .collect();
        let mut freq = vec![0i16; 2 * fft.num_bins()];
        let mut back = vec![0i16; block_len];

        group.bench_function(format!("forward_{block_len}"), |b| {
            b.iter(|| {
                fft.forward(black_box(&time), &mut freq);
            });
        });

        group.bench_function(format!("roundtrip_{block_len}"), |b| {
            b.iter(|| {
                fft.forward(black_box(&time), &mut freq);
                fft.inverse(&freq, &mut back);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_process, bench_real_fft);
criterion_main!(benches);
