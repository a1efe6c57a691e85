//! Wiener coefficient solver based on the Levinson-Durbin recursion.
//!
//! The Wiener-Hopf equations for a time-domain noise reduction filter are
//!
//! ```text
//! R_x * c = r_x - r_n
//! ```
//!
//! where `R_x` is the symmetric Toeplitz matrix built from the autocorrelation
//! `r_x` of the noisy input and `r_n` is the autocorrelation of the noise.
//! The recursion solves this in `O(n^2)` by growing the solution one order at
//! a time, alongside a helper vector `v` that solves `R * v = e_i` at the
//! current order.

use std::fmt;

/// Failure of a single [`WienerSolver::solve`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolverError {
    /// The zero-lag signal energy is zero, negative or not finite.
    DegenerateEnergy { energy: f32 },
    /// A reflection coefficient reached magnitude 1 (or is not finite): the
    /// autocorrelation matrix is not positive definite at this order.
    UnstableReflection { order: usize, reflection: f32 },
    /// A coefficient became non-finite.
    NonFinite { order: usize },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::DegenerateEnergy { energy } => {
                write!(f, "degenerate signal energy {energy}")
            }
            Self::UnstableReflection { order, reflection } => write!(
                f,
                "reflection coefficient {reflection} at order {order} is not inside (-1, 1)"
            ),
            Self::NonFinite { order } => write!(f, "non-finite coefficient at order {order}"),
        }
    }
}

impl std::error::Error for SolverError {}

/// Dot product of `vec[..row_length]` with row `row_index` of the symmetric
/// Toeplitz matrix generated by `autocorr`.
///
/// The matrix is never formed; element `(row_index, i)` is
/// `autocorr[|i - row_index|]`. A `row_length` shorter than the full order
/// emulates the leading principal submatrix used by the recursion.
pub fn toeplitz_row_dot(autocorr: &[f32], vec: &[f32], row_index: usize, row_length: usize) -> f32 {
    autocorr_row(autocorr, row_index, row_length)
        .zip(&vec[..row_length])
        .map(|(a, &v)| a * v)
        .sum()
}

fn autocorr_row(
    autocorr: &[f32],
    row_index: usize,
    row_length: usize,
) -> impl Iterator<Item = f32> + '_ {
    (0..row_length).map(move |i| autocorr[i.abs_diff(row_index)])
}

/// Solver for the Wiener filter coefficients.
///
/// Owns the helper vector of the recursion, sized once for `num_taps`
/// coefficients, so solving never allocates.
#[derive(derive_more::Debug, Clone)]
pub struct WienerSolver {
    #[debug(skip)]
    backward: Vec<f32>,
}

impl WienerSolver {
    /// Create a solver for `num_taps` coefficients.
    ///
    /// # Panics
    ///
    /// Panics if `num_taps` is zero.
    pub fn new(num_taps: usize) -> Self {
        assert!(num_taps > 0, "num_taps must be > 0");
        Self {
            backward: vec![0.0; num_taps],
        }
    }

    /// Number of coefficients this solver produces.
    pub fn num_taps(&self) -> usize {
        self.backward.len()
    }

    /// Solve `R(signal_corr) * coeffs = signal_corr - noise_corr`.
    ///
    /// On error the content of `coeffs` is unspecified.
    ///
    /// # Panics
    ///
    /// Panics if any slice length differs from [`num_taps`](Self::num_taps).
    pub fn solve(
        &mut self,
        signal_corr: &[f32],
        noise_corr: &[f32],
        coeffs: &mut [f32],
    ) -> Result<(), SolverError> {
        let num_taps = self.num_taps();
        assert_eq!(signal_corr.len(), num_taps, "signal_corr length");
        assert_eq!(noise_corr.len(), num_taps, "noise_corr length");
        assert_eq!(coeffs.len(), num_taps, "coeffs length");

        let energy = signal_corr[0];
        if !(energy.is_finite() && energy > 0.0) {
            return Err(SolverError::DegenerateEnergy { energy });
        }

        let vec = &mut self.backward;
        vec[0] = 1.0 / energy;
        coeffs[0] = (energy - noise_corr[0]) / energy;
        if !coeffs[0].is_finite() {
            return Err(SolverError::NonFinite { order: 0 });
        }

        for i in 1..num_taps {
            vec[i] = 0.0;

            // For a symmetric Toeplitz matrix the backward error equals the
            // forward error, which is the reflection coefficient.
            let forward_error = toeplitz_row_dot(signal_corr, vec, i, i + 1);
            if !(forward_error.abs() < 1.0) {
                return Err(SolverError::UnstableReflection {
                    order: i,
                    reflection: forward_error,
                });
            }
            let scale = 1.0 / (1.0 - forward_error * forward_error);

            // Update the helper vector in place, both ends at once.
            for j in 0..=i / 2 {
                let upper = scale * vec[j] - forward_error * scale * vec[i - j];
                let lower = scale * vec[i - j] - forward_error * scale * vec[j];
                vec[j] = upper;
                vec[i - j] = lower;
            }

            coeffs[i] = 0.0;
            let y_error = toeplitz_row_dot(signal_corr, coeffs, i, i + 1);
            let correction = signal_corr[i] - noise_corr[i] - y_error;
            for j in 0..=i {
                coeffs[j] += correction * vec[i - j];
            }

            if !coeffs[..=i].iter().all(|c| c.is_finite()) {
                return Err(SolverError::NonFinite { order: i });
            }
        }

        Ok(())
    }
}
