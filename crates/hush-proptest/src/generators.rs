//! Generators for property-based testing.
//!
//! Provides both strategy functions (for use with `#[strategy(...)]`) and
//! `Arbitrary`-deriving structs for common noise reduction test inputs.

use proptest::collection::SizeRange;
use proptest::prelude::*;
use test_strategy::Arbitrary;

/// Filter and frame dimensions satisfying `frame_size > num_taps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub struct FilterShape {
    #[strategy(1usize..=32)]
    pub num_taps: usize,
    #[strategy((#num_taps + 1)..=256usize)]
    pub frame_size: usize,
}

/// Signal and noise autocorrelations for the Wiener solver.
///
/// `signal_corr` is positive definite (every reflection coefficient lies
/// inside the unit circle); `noise_corr` is arbitrary. All values lie in
/// `[-1, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationPair {
    pub signal_corr: Vec<f32>,
    pub noise_corr: Vec<f32>,
}

/// Generate an audio frame with samples in `[-1, 1]`.
pub fn frame_f32(len: impl Into<SizeRange>) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..=1.0f32, len)
}

/// Generate FIR filter coefficients.
pub fn fir_coefficients(max_len: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..=1.0f32, 1..=max_len)
}

/// Generate a [`CorrelationPair`] of `1..=max_taps` lags.
///
/// The signal autocorrelation is the biased autocorrelation of a random
/// sequence, which is positive semi-definite, with extra weight on lag 0 to
/// keep the Toeplitz matrix well conditioned in `f32`.
pub fn correlation_pair(max_taps: usize) -> impl Strategy<Value = CorrelationPair> {
    (1..=max_taps).prop_flat_map(|num_taps| {
        (
            proptest::collection::vec(-1.0f32..=1.0f32, num_taps..=4 * num_taps),
            proptest::collection::vec(-1.0f32..=1.0f32, num_taps..=num_taps),
            0.1f32..=1.0f32,
        )
            .prop_map(move |(sequence, noise, scale)| {
                let mut signal_corr = sequence_autocorrelation(&sequence, num_taps);
                signal_corr[0] += 0.5 * signal_corr[0] + 0.1;
                let norm = scale / signal_corr[0];
                for r in &mut signal_corr {
                    *r *= norm;
                }
                let noise_corr = noise.iter().map(|n| n * scale).collect();
                CorrelationPair {
                    signal_corr,
                    noise_corr,
                }
            })
    })
}

fn sequence_autocorrelation(x: &[f32], num_lags: usize) -> Vec<f32> {
    let n = x.len() as f32;
    (0..num_lags)
        .map(|lag| {
            x.iter()
                .zip(x.iter().skip(lag))
                .map(|(a, b)| a * b)
                .sum::<f32>()
                / n
        })
        .collect()
}

/// Deterministic uniform noise in `[-amplitude, amplitude]` (xorshift64).
pub fn white_noise(len: usize, seed: u64, amplitude: f32) -> Vec<f32> {
    let mut state = (seed ^ 0x9e37_79b9_7f4a_7c15) | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            // Top 24 bits give an exact f32 in [0, 1).
            let unit = (state >> 40) as f32 / (1u64 << 24) as f32;
            (2.0 * unit - 1.0) * amplitude
        })
        .collect()
}
