//! Short-window autocorrelation estimation.

/// Estimates the autocorrelation of `data` for lags `0..out.len()`.
///
/// ```text
/// r(d) = sum_{n < N - D} x[n] * x[n + d] / (N - D)
/// ```
///
/// where `N = data.len()` and `D = out.len()`. Every lag sums over the same
/// window of `N - D` products, which keeps the estimate cheap but biased for
/// lags close to `N`. `data` is expected to be zero-mean; removing the mean
/// is the caller's job.
///
/// `out` is overwritten.
///
/// # Panics
///
/// Panics if `data.len() <= out.len()`.
pub fn estimate_autocorrelation(data: &[f32], out: &mut [f32]) {
    let max_lag = out.len();
    assert!(
        data.len() > max_lag,
        "frame of {} samples is too short for {max_lag} lags",
        data.len()
    );
    let window = data.len() - max_lag;

    out.fill(0.0);
    for (i, &x) in data[..window].iter().enumerate() {
        for (r, &y) in out.iter_mut().zip(&data[i..i + max_lag]) {
            *r += x * y;
        }
    }

    let norm_factor = 1.0 / window as f32;
    for r in out.iter_mut() {
        *r *= norm_factor;
    }
}

/// Removes the mean from `input`, writing the result to `out`, and returns
/// the removed mean.
pub(crate) fn remove_mean(input: &[f32], out: &mut [f32]) -> f32 {
    debug_assert_eq!(input.len(), out.len());
    let mean = input.iter().sum::<f32>() / input.len() as f32;
    for (o, &x) in out.iter_mut().zip(input) {
        *o = x - mean;
    }
    mean
}
