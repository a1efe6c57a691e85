//! Minimal noise reduction demo.
//!
//! Generates a noisy tone preceded by a stretch of background noise, runs it
//! through the reducer frame by frame and reports how much cleaner the tone
//! got.
//!
//! ```sh
//! cargo run -p hush --example simple
//! ```

use std::f32::consts::PI;

use hush::{Config, NoiseReducer, Phase, StreamConfig};

fn main() {
    let stream_config = StreamConfig::new(48_000, 1024);
    let frame_size = stream_config.frame_size();
    let config = Config::default();

    let mut reducer = NoiseReducer::builder()
        .config(config)
        .stream_config(stream_config)
        .build()
        .unwrap();

    let warmup_frames = config.startup.warmup_frames();
    let num_frames = warmup_frames + 40;
    let (clean, noisy) = sample_signal(frame_size, warmup_frames, num_frames);

    let mut output = vec![0.0f32; noisy.len()];
    for (input, out) in noisy
        .chunks_exact(frame_size)
        .zip(output.chunks_exact_mut(frame_size))
    {
        reducer.process_frame(input, out).unwrap();
    }

    let stats = reducer.statistics();
    assert_eq!(stats.phase, Phase::Filter);
    assert_eq!(stats.frames_filtered, 40);

    // Compare the last second, after the filter has settled.
    let tail = noisy.len() - 48_000;
    let noise_before = error_power(&noisy[tail..], &clean[tail..]);
    let noise_after = error_power(&output[tail..], &clean[tail..]);
    assert!(
        noise_after < noise_before,
        "noise reduction should have reduced the error"
    );

    println!(
        "Residual noise: {:.1} dB -> {:.1} dB ({} frames, {} solver failures)",
        10.0 * noise_before.log10(),
        10.0 * noise_after.log10(),
        stats.frames_processed,
        stats.solver_failures,
    );
}

/// Generate a 440 Hz tone that starts after `warmup_frames` frames of
/// silence, plus loud white noise throughout.
fn sample_signal(
    frame_size: usize,
    warmup_frames: usize,
    num_frames: usize,
) -> (Vec<f32>, Vec<f32>) {
    let start = warmup_frames * frame_size;
    let len = num_frames * frame_size;
    let mut seed = 0x2545_f491_4f6c_dd1du64;
    let mut clean = vec![0.0f32; len];
    let mut noisy = vec![0.0f32; len];

    for i in 0..len {
        if i >= start {
            clean[i] = 0.4 * (2.0 * PI * 440.0 * (i - start) as f32 / 48_000.0).sin();
        }
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        let noise = ((seed >> 40) as f32 / (1u64 << 24) as f32 - 0.5) * 0.6;
        noisy[i] = clean[i] + noise;
    }

    (clean, noisy)
}

fn error_power(actual: &[f32], expected: &[f32]) -> f32 {
    actual
        .iter()
        .zip(expected)
        .map(|(a, e)| (a - e) * (a - e))
        .sum::<f32>()
        / actual.len() as f32
}
