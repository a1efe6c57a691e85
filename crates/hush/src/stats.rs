//! Processing statistics.

use hush_ns::{Phase, SolverError};

/// Statistics from the noise reducer, see
/// [`NoiseReducer::statistics()`](crate::NoiseReducer::statistics).
///
/// `Option` fields are `None` while the statistic is unavailable (for
/// example before noise learning has finished).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessingStats {
    /// Phase the next frame will be processed in.
    pub phase: Phase,
    /// Frames processed since construction.
    pub frames_processed: u64,
    /// Frames that went through the Wiener filter.
    pub frames_filtered: u64,
    /// Frames for which the solver failed and the previous coefficients were
    /// reused.
    pub solver_failures: u64,
    /// Frames passed through without adapting because they held NaN or
    /// infinite samples.
    pub frames_rejected: u64,
    /// The most recent solver failure.
    pub last_solver_error: Option<SolverError>,
    /// Zero-lag value of the learned noise autocorrelation (the mean noise
    /// power). Available once the learn-noise phase has finished.
    pub noise_power: Option<f32>,
}

impl ProcessingStats {
    /// Fraction of filtered frames for which the solver failed.
    pub fn solver_failure_rate(&self) -> Option<f64> {
        if self.frames_filtered == 0 {
            return None;
        }
        Some(self.solver_failures as f64 / self.frames_filtered as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(frames_filtered: u64, solver_failures: u64) -> ProcessingStats {
        ProcessingStats {
            phase: Phase::Filter,
            frames_processed: frames_filtered + 15,
            frames_filtered,
            solver_failures,
            frames_rejected: 0,
            last_solver_error: None,
            noise_power: Some(0.01),
        }
    }

    #[test]
    fn failure_rate_needs_filtered_frames() {
        assert_eq!(stats(0, 0).solver_failure_rate(), None);
    }

    #[test]
    fn failure_rate_is_a_fraction() {
        assert_eq!(stats(8, 2).solver_failure_rate(), Some(0.25));
        assert_eq!(stats(8, 0).solver_failure_rate(), Some(0.0));
    }
}
