//! Float comparison utilities for audio buffers.

use std::fmt;

/// How far one buffer strays from another, sample by sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deviation {
    /// Largest absolute difference, NaN if any pair of samples differs by NaN.
    pub max: f32,
    /// Index of the first sample with the largest difference.
    pub index: usize,
    /// Samples further apart than the tolerance.
    pub outliers: usize,
    /// Samples compared.
    pub len: usize,
}

impl fmt::Display for Deviation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} samples out of tolerance, worst {} at {}",
            self.outliers, self.len, self.max, self.index
        )
    }
}

/// Compares `actual` against `expected` with an absolute `tolerance`.
///
/// # Panics
///
/// Panics if the buffers differ in length.
pub fn deviation(actual: &[f32], expected: &[f32], tolerance: f32) -> Deviation {
    assert_eq!(actual.len(), expected.len(), "buffers differ in length");
    let mut dev = Deviation {
        max: 0.0,
        index: 0,
        outliers: 0,
        len: actual.len(),
    };
    for (i, diff) in actual
        .iter()
        .zip(expected)
        .map(|(a, e)| (a - e).abs())
        .enumerate()
    {
        // NaN never compares within a bound.
        if !(diff <= tolerance) {
            dev.outliers += 1;
        }
        if !dev.max.is_nan() && !(diff <= dev.max) {
            dev.max = diff;
            dev.index = i;
        }
    }
    dev
}

/// Asserts that no sample of `actual` is further than `tolerance` from
/// `expected`.
#[track_caller]
pub fn assert_close(actual: &[f32], expected: &[f32], tolerance: f32) {
    let dev = deviation(actual, expected, tolerance);
    if dev.outliers > 0 {
        panic!(
            "buffers are not close: {dev} (actual {}, expected {})",
            actual[dev.index], expected[dev.index]
        );
    }
}

/// Mean energy of a buffer.
pub fn mean_square(x: &[f32]) -> f32 {
    if x.is_empty() {
        return 0.0;
    }
    x.iter().map(|&v| v * v).sum::<f32>() / x.len() as f32
}

/// Mean squared difference between two buffers.
pub fn mean_square_error(actual: &[f32], expected: &[f32]) -> f32 {
    assert_eq!(actual.len(), expected.len(), "buffers differ in length");
    if actual.is_empty() {
        return 0.0;
    }
    actual
        .iter()
        .zip(expected)
        .map(|(&a, &e)| (a - e) * (a - e))
        .sum::<f32>()
        / actual.len() as f32
}
