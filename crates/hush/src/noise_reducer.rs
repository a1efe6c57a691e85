//! The public noise reducer.

use std::fmt;

use hush_ns::{ConfigError, NoiseReductionPipeline, Phase, SolverError};

use crate::config::Config;
use crate::stats::ProcessingStats;
use crate::stream_config::{StreamConfig, StreamConfigError};

/// Errors returned by the noise reducer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// The filter or startup configuration is invalid.
    Config(ConfigError),
    /// The stream configuration is invalid.
    Stream(StreamConfigError),
    /// A frame did not have the configured number of samples.
    FrameSizeMismatch {
        expected: usize,
        input: usize,
        output: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
            Self::Stream(e) => write!(f, "invalid stream configuration: {e}"),
            Self::FrameSizeMismatch {
                expected,
                input,
                output,
            } => write!(
                f,
                "frame size mismatch: expected {expected} samples, got input {input} and output {output}"
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Stream(e) => Some(e),
            Self::FrameSizeMismatch { .. } => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<StreamConfigError> for Error {
    fn from(e: StreamConfigError) -> Self {
        Self::Stream(e)
    }
}

/// What the audio driver should do after a frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamControl {
    /// Keep the stream running.
    Continue,
    /// Stop the stream; the frame could not be processed.
    Stop,
}

/// Builder for [`NoiseReducer`].
#[derive(Debug, Clone, Default)]
pub struct NoiseReducerBuilder {
    config: Config,
    stream_config: StreamConfig,
}

impl NoiseReducerBuilder {
    /// Set the filter and startup configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the sample rate and frame size of the stream.
    pub fn stream_config(mut self, stream_config: StreamConfig) -> Self {
        self.stream_config = stream_config;
        self
    }

    /// Validate the configuration and allocate all processing buffers.
    pub fn build(self) -> Result<NoiseReducer, Error> {
        self.stream_config.check()?;
        let nr_config = self.config.to_nr_config(self.stream_config.frame_size());
        let pipeline = NoiseReductionPipeline::new(nr_config)?;
        tracing::debug!(
            sample_rate_hz = self.stream_config.sample_rate_hz(),
            frame_ms = self.stream_config.frame_duration().as_secs_f64() * 1e3,
            "noise reducer ready"
        );
        Ok(NoiseReducer {
            config: self.config,
            stream_config: self.stream_config,
            pipeline,
            frames_filtered: 0,
            last_solver_error: None,
        })
    }
}

/// Single-channel adaptive Wiener noise reducer.
///
/// Feed it consecutive frames of [`StreamConfig::frame_size`] mono samples,
/// typically from an audio device callback. The first
/// [`Startup::discard_frames`](crate::config::Startup::discard_frames) frames
/// are passed through, the next
/// [`Startup::learn_noise_frames`](crate::config::Startup::learn_noise_frames)
/// frames are passed through while the background noise is learned, and every
/// later frame is filtered.
///
/// Processing never allocates once the reducer is built. The reducer is
/// `Send` so it can be moved into an audio thread.
///
/// # Example
///
/// ```
/// use hush::{NoiseReducer, StreamConfig};
///
/// let stream = StreamConfig::new(48_000, 1024);
/// let mut reducer = NoiseReducer::builder().stream_config(stream).build()?;
///
/// let input = vec![0.0f32; stream.frame_size()];
/// let mut output = vec![0.0f32; stream.frame_size()];
/// reducer.process_frame(&input, &mut output)?;
/// # Ok::<(), hush::Error>(())
/// ```
#[derive(Debug)]
pub struct NoiseReducer {
    config: Config,
    stream_config: StreamConfig,
    pipeline: NoiseReductionPipeline,
    frames_filtered: u64,
    last_solver_error: Option<SolverError>,
}

impl NoiseReducer {
    /// Returns a builder with the default configuration.
    pub fn builder() -> NoiseReducerBuilder {
        NoiseReducerBuilder::default()
    }

    /// Create a noise reducer with default settings: 48 kHz, 1024-sample
    /// frames, 127 taps.
    pub fn new() -> Result<Self, Error> {
        Self::builder().build()
    }

    /// Process one frame. `input` and `output` must both hold exactly
    /// [`StreamConfig::frame_size`] samples.
    ///
    /// A failure of the Wiener solver is not an error: the previous
    /// coefficients are reused and the failure is reported in
    /// [`statistics`](Self::statistics). Neither is a frame holding NaN or
    /// infinite samples once noise learning has started: it is passed through
    /// with those samples silenced and does not affect the learned state.
    pub fn process_frame(&mut self, input: &[f32], output: &mut [f32]) -> Result<(), Error> {
        let expected = self.stream_config.frame_size();
        if input.len() != expected || output.len() != expected {
            return Err(Error::FrameSizeMismatch {
                expected,
                input: input.len(),
                output: output.len(),
            });
        }

        let report = self.pipeline.process(input, output);
        if report.phase == Phase::Filter && !report.rejected {
            self.frames_filtered += 1;
        }
        if report.solver_error.is_some() {
            self.last_solver_error = report.solver_error;
        }
        Ok(())
    }

    /// Process one frame from an audio callback.
    ///
    /// Never panics and never leaves `output` uninitialised. On a size
    /// mismatch the overlapping samples are passed through, the rest of
    /// `output` is zeroed and [`StreamControl::Stop`] is returned.
    pub fn on_frame(&mut self, input: &[f32], output: &mut [f32]) -> StreamControl {
        match self.process_frame(input, output) {
            Ok(()) => StreamControl::Continue,
            Err(e) => {
                tracing::error!(error = %e, "stopping stream");
                let n = input.len().min(output.len());
                output[..n].copy_from_slice(&input[..n]);
                output[n..].fill(0.0);
                StreamControl::Stop
            }
        }
    }

    /// Current processing statistics.
    pub fn statistics(&self) -> ProcessingStats {
        let frames_processed = self.pipeline.frame_index();
        let noise_learned = frames_processed >= self.pipeline.config().first_filtered_frame();
        ProcessingStats {
            phase: self.pipeline.phase(),
            frames_processed,
            frames_filtered: self.frames_filtered,
            solver_failures: self.pipeline.solver_failures(),
            frames_rejected: self.pipeline.rejected_frames(),
            last_solver_error: self.last_solver_error,
            noise_power: noise_learned.then(|| self.pipeline.noise_profile()[0]),
        }
    }

    /// Phase the next frame will be processed in.
    pub fn phase(&self) -> Phase {
        self.pipeline.phase()
    }

    /// The configuration the reducer was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The stream configuration the reducer was built with.
    pub fn stream_config(&self) -> &StreamConfig {
        &self.stream_config
    }

    /// The underlying pipeline, for inspecting the learned profiles and the
    /// current filter.
    pub fn pipeline(&self) -> &NoiseReductionPipeline {
        &self.pipeline
    }
}

#[cfg(test)]
mod tests {
    use hush_proptest::comparison::deviation;

    use super::*;
    use crate::config::{Startup, WienerFilter};

    fn small_reducer() -> NoiseReducer {
        NoiseReducer::builder()
            .config(Config {
                filter: WienerFilter {
                    num_taps: 8,
                    ..Default::default()
                },
                startup: Startup {
                    discard_frames: 1,
                    learn_noise_frames: 2,
                },
            })
            .stream_config(StreamConfig::new(16_000, 64))
            .build()
            .unwrap()
    }

    #[test]
    fn default_reducer_builds() {
        let reducer = NoiseReducer::new().unwrap();
        assert_eq!(reducer.stream_config().frame_size(), 1024);
        assert_eq!(reducer.phase(), Phase::Discard);
        assert_eq!(reducer.config(), &Config::default());
    }

    #[test]
    fn reducer_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<NoiseReducer>();
    }

    #[test]
    fn build_rejects_invalid_filter() {
        let err = NoiseReducer::builder()
            .config(Config {
                filter: WienerFilter {
                    num_taps: 1024,
                    ..Default::default()
                },
                ..Default::default()
            })
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            Error::Config(ConfigError::FrameTooShort {
                frame_size: 1024,
                num_taps: 1024,
            })
        );
    }

    #[test]
    fn build_rejects_invalid_stream() {
        let err = NoiseReducer::builder()
            .stream_config(StreamConfig::new(1_000, 1024))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Stream(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn process_frame_rejects_wrong_length() {
        let mut reducer = small_reducer();
        let input = vec![0.1f32; 63];
        let mut output = vec![0.0f32; 64];
        let err = reducer.process_frame(&input, &mut output).unwrap_err();
        assert_eq!(
            err,
            Error::FrameSizeMismatch {
                expected: 64,
                input: 63,
                output: 64,
            }
        );
        // Nothing was consumed.
        assert_eq!(reducer.statistics().frames_processed, 0);
    }

    #[test]
    fn on_frame_stops_and_fills_output_on_mismatch() {
        let mut reducer = small_reducer();
        let input = vec![0.5f32; 10];
        let mut output = vec![1.0f32; 64];
        assert_eq!(reducer.on_frame(&input, &mut output), StreamControl::Stop);
        assert!(output[..10].iter().all(|&s| s == 0.5));
        assert!(output[10..].iter().all(|&s| s == 0.0));

        let input = vec![0.5f32; 100];
        let mut output = vec![1.0f32; 64];
        assert_eq!(reducer.on_frame(&input, &mut output), StreamControl::Stop);
        assert!(output.iter().all(|&s| s == 0.5));
    }

    #[test]
    fn statistics_follow_the_phases() {
        let mut reducer = small_reducer();
        let input = hush_proptest::generators::white_noise(64, 7, 0.1);
        let mut output = vec![0.0f32; 64];

        let stats = reducer.statistics();
        assert_eq!(stats.phase, Phase::Discard);
        assert_eq!(stats.noise_power, None);

        for _ in 0..3 {
            assert_eq!(reducer.on_frame(&input, &mut output), StreamControl::Continue);
            assert_eq!(output, input);
        }
        let stats = reducer.statistics();
        assert_eq!(stats.phase, Phase::Filter);
        assert_eq!(stats.frames_processed, 3);
        assert_eq!(stats.frames_filtered, 0);
        let noise_power = stats.noise_power.unwrap();
        assert!(noise_power > 0.0);

        reducer.process_frame(&input, &mut output).unwrap();
        let stats = reducer.statistics();
        assert_eq!(stats.frames_processed, 4);
        assert_eq!(stats.frames_filtered, 1);
        assert_eq!(stats.noise_power, Some(noise_power));
    }

    #[test]
    fn non_finite_frame_is_counted_and_silenced() {
        let mut reducer = small_reducer();
        let input = hush_proptest::generators::white_noise(64, 7, 0.1);
        let mut output = vec![0.0f32; 64];
        for _ in 0..3 {
            reducer.process_frame(&input, &mut output).unwrap();
        }

        let mut bad = input.clone();
        bad[5] = f32::NAN;
        assert_eq!(reducer.on_frame(&bad, &mut output), StreamControl::Continue);
        let mut expected = input.clone();
        expected[5] = 0.0;
        let dev = deviation(&output, &expected, 0.0);
        assert_eq!(dev.outliers, 0, "{dev}");

        reducer.process_frame(&input, &mut output).unwrap();
        assert!(output.iter().all(|y| y.is_finite()));
        let stats = reducer.statistics();
        assert_eq!(stats.frames_filtered, 1);
        assert_eq!(stats.frames_rejected, 1);
        assert_eq!(stats.solver_failures, 0);
    }

    #[test]
    fn error_messages() {
        let err = Error::FrameSizeMismatch {
            expected: 1024,
            input: 512,
            output: 1024,
        };
        assert_eq!(
            err.to_string(),
            "frame size mismatch: expected 1024 samples, got input 512 and output 1024"
        );
        let err = Error::from(ConfigError::ZeroTaps);
        assert!(err.to_string().starts_with("invalid configuration: "));
    }
}
