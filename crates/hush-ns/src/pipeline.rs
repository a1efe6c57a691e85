//! Frame-by-frame noise reduction pipeline.
//!
//! Every frame goes through one of three phases, selected by the number of
//! frames seen so far:
//!
//! 1. [`Phase::Discard`]: startup transients are passed through.
//! 2. [`Phase::LearnNoise`]: the input is passed through while the mean noise
//!    autocorrelation is learned. Only background noise may be present.
//! 3. [`Phase::Filter`]: the signal autocorrelation is tracked, the Wiener
//!    coefficients are solved and the frame is filtered.

use std::fmt;

use crate::autocorrelation::{estimate_autocorrelation, remove_mean};
use crate::config::{ConfigError, NrConfig};
use crate::fir_filter::FirFilter;
use crate::levinson::{SolverError, WienerSolver};

/// Warnings of each kind logged per pipeline before going quiet.
const MAX_WARNINGS: u64 = 5;

/// Processing phase of the pipeline. Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Output equals input; nothing is learned.
    Discard,
    /// Output equals input; the noise profile is accumulated.
    LearnNoise,
    /// The adaptive Wiener filter is applied.
    Filter,
}

impl Phase {
    /// Phase of the frame with the given 0-based index.
    pub fn at_frame(frame_index: u64, discard_frames: usize, learn_noise_frames: usize) -> Self {
        let discard = discard_frames as u64;
        if frame_index < discard {
            Self::Discard
        } else if frame_index < discard + learn_noise_frames as u64 {
            Self::LearnNoise
        } else {
            Self::Filter
        }
    }

    /// Short lowercase name, as used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Discard => "discard",
            Self::LearnNoise => "learn-noise",
            Self::Filter => "filter",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of processing one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Phase the frame was processed in.
    pub phase: Phase,
    /// Set when the solver failed and the previous coefficients were reused.
    pub solver_error: Option<SolverError>,
    /// Set when the frame held non-finite samples. It was passed through with
    /// those samples silenced and nothing was learned from it.
    pub rejected: bool,
}

/// Adaptive Wiener noise reduction for a single channel.
///
/// All buffers are allocated by [`new`](Self::new); [`process`](Self::process)
/// does not allocate.
#[derive(derive_more::Debug)]
pub struct NoiseReductionPipeline {
    config: NrConfig,
    phase: Phase,
    frame_index: u64,
    solver_failures: u64,
    rejected_frames: u64,
    #[debug(skip)]
    zero_mean: Vec<f32>,
    #[debug(skip)]
    current_corr: Vec<f32>,
    #[debug(skip)]
    signal_corr: Vec<f32>,
    #[debug(skip)]
    noise_corr: Vec<f32>,
    #[debug(skip)]
    coeffs: Vec<f32>,
    #[debug(skip)]
    candidate: Vec<f32>,
    solver: WienerSolver,
    fir: FirFilter,
}

impl NoiseReductionPipeline {
    /// Create a pipeline, validating `config` first.
    pub fn new(config: NrConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let num_taps = config.num_taps;

        // Unit impulse: holding these coefficients is an exact pass-through.
        let mut coeffs = vec![0.0; num_taps];
        coeffs[0] = 1.0;

        tracing::debug!(
            num_taps,
            frame_size = config.frame_size,
            learning_factor = config.learning_factor,
            discard_frames = config.discard_frames,
            learn_noise_frames = config.learn_noise_frames,
            "created noise reduction pipeline"
        );

        Ok(Self {
            phase: Phase::at_frame(0, config.discard_frames, config.learn_noise_frames),
            frame_index: 0,
            solver_failures: 0,
            rejected_frames: 0,
            zero_mean: vec![0.0; config.frame_size],
            current_corr: vec![0.0; num_taps],
            signal_corr: vec![0.0; num_taps],
            noise_corr: vec![0.0; num_taps],
            candidate: coeffs.clone(),
            coeffs,
            solver: WienerSolver::new(num_taps),
            fir: FirFilter::new(num_taps),
            config,
        })
    }

    /// Process one frame of `frame_size` samples.
    ///
    /// # Panics
    ///
    /// Panics if `input` or `output` is not exactly `frame_size` long.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) -> FrameReport {
        let frame_size = self.config.frame_size;
        assert_eq!(input.len(), frame_size, "input frame length");
        assert_eq!(output.len(), frame_size, "output frame length");

        let phase = self.phase;
        let mut rejected = false;
        let solver_error = match phase {
            Phase::Discard => {
                output.copy_from_slice(input);
                None
            }
            Phase::LearnNoise => {
                if self.analyze(input).is_some() {
                    self.learn_noise();
                    output.copy_from_slice(input);
                } else {
                    self.reject(input, output);
                    rejected = true;
                }
                None
            }
            Phase::Filter => match self.analyze(input) {
                Some(mean) => self.filter(input, mean, output),
                None => {
                    self.reject(input, output);
                    rejected = true;
                    None
                }
            },
        };

        self.advance();
        FrameReport {
            phase,
            solver_error,
            rejected,
        }
    }

    /// Removes the mean of `input` and estimates its autocorrelation into
    /// `current_corr`. Returns the mean, or `None` if either is not finite.
    fn analyze(&mut self, input: &[f32]) -> Option<f32> {
        let mean = remove_mean(input, &mut self.zero_mean);
        // Any NaN or infinity in the frame makes the mean non-finite.
        if !mean.is_finite() {
            return None;
        }
        estimate_autocorrelation(&self.zero_mean, &mut self.current_corr);
        self.current_corr
            .iter()
            .all(|c| c.is_finite())
            .then_some(mean)
    }

    /// Passes `input` through with non-finite samples silenced. Profiles,
    /// coefficients and the delay line are left alone.
    fn reject(&mut self, input: &[f32], output: &mut [f32]) {
        self.rejected_frames += 1;
        if self.rejected_frames <= MAX_WARNINGS {
            tracing::warn!(
                frame_index = self.frame_index,
                phase = %self.phase,
                "frame is not finite; passing it through without adapting"
            );
        }
        for (y, &x) in output.iter_mut().zip(input) {
            *y = if x.is_finite() { x } else { 0.0 };
        }
    }

    fn learn_noise(&mut self) {
        let num_frames = self.config.learn_noise_frames as f32;
        for (n, &c) in self.noise_corr.iter_mut().zip(&self.current_corr) {
            *n += c / num_frames;
        }
    }

    fn filter(&mut self, input: &[f32], mean: f32, output: &mut [f32]) -> Option<SolverError> {
        // Blend instead of replacing: a rapidly changing estimate (e.g. at
        // speech onsets) makes the filter quack.
        let alpha = self.config.learning_factor;
        for (s, &c) in self.signal_corr.iter_mut().zip(&self.current_corr) {
            *s = *s * (1.0 - alpha) + c * alpha;
        }

        let solver_error = match self
            .solver
            .solve(&self.signal_corr, &self.noise_corr, &mut self.candidate)
        {
            Ok(()) => {
                self.coeffs.copy_from_slice(&self.candidate);
                None
            }
            Err(err) => {
                self.solver_failures += 1;
                if self.solver_failures <= MAX_WARNINGS {
                    tracing::warn!(
                        frame_index = self.frame_index,
                        error = %err,
                        "wiener solver failed; holding previous coefficients"
                    );
                }
                Some(err)
            }
        };

        // Filter the raw input; the frame mean goes on top.
        self.fir.apply(&self.coeffs, input, output);
        for y in output.iter_mut() {
            *y += mean;
        }

        solver_error
    }

    fn advance(&mut self) {
        self.frame_index += 1;
        let next = Phase::at_frame(
            self.frame_index,
            self.config.discard_frames,
            self.config.learn_noise_frames,
        );
        debug_assert!(next >= self.phase, "phase moved backwards");
        if next != self.phase {
            match next {
                Phase::Filter => tracing::debug!(
                    frame_index = self.frame_index,
                    noise_floor = self.noise_corr[0],
                    "noise profile learned, starting to filter"
                ),
                _ => tracing::debug!(
                    frame_index = self.frame_index,
                    phase = %next,
                    "entering phase"
                ),
            }
            self.phase = next;
        }
    }

    /// Phase the next frame will be processed in.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of frames processed so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Number of frames where the solver failed.
    pub fn solver_failures(&self) -> u64 {
        self.solver_failures
    }

    /// The validated configuration.
    pub fn config(&self) -> &NrConfig {
        &self.config
    }

    /// Number of frames rejected for holding non-finite samples.
    pub fn rejected_frames(&self) -> u64 {
        self.rejected_frames
    }

    /// Learned noise autocorrelation. Frozen once filtering starts.
    pub fn noise_profile(&self) -> &[f32] {
        &self.noise_corr
    }

    /// Smoothed autocorrelation of the noisy input.
    pub fn signal_profile(&self) -> &[f32] {
        &self.signal_corr
    }

    /// Coefficients used for the most recently filtered frame.
    pub fn coefficients(&self) -> &[f32] {
        &self.coeffs
    }

    /// History carried into the next filtered frame.
    pub fn delay_line(&self) -> &[f32] {
        self.fir.delay_line()
    }
}
