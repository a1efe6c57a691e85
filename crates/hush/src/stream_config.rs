//! Stream configuration.

use std::fmt;
use std::time::Duration;

use hush_ns::config::{DEFAULT_FRAME_SIZE, DEFAULT_SAMPLE_RATE_HZ};

/// Minimum supported sample rate in Hz.
pub const MIN_SAMPLE_RATE_HZ: u32 = 8_000;
/// Maximum supported sample rate in Hz.
pub const MAX_SAMPLE_RATE_HZ: u32 = 384_000;

/// Error returned by [`StreamConfig::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamConfigError {
    /// Sample rate is outside the supported range.
    UnsupportedSampleRate { sample_rate_hz: u32 },
}

impl fmt::Display for StreamConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::UnsupportedSampleRate { sample_rate_hz } => write!(
                f,
                "unsupported sample rate {sample_rate_hz}; expected {MIN_SAMPLE_RATE_HZ}..={MAX_SAMPLE_RATE_HZ}",
            ),
        }
    }
}

impl std::error::Error for StreamConfigError {}

/// Properties of the mono stream: sample rate and samples per callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    sample_rate_hz: u32,
    frame_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE_HZ, DEFAULT_FRAME_SIZE)
    }
}

impl StreamConfig {
    /// Create a new stream configuration. Values are checked when the
    /// noise reducer is built.
    pub const fn new(sample_rate_hz: u32, frame_size: usize) -> Self {
        Self {
            sample_rate_hz,
            frame_size,
        }
    }

    /// The sampling rate in Hz.
    #[inline]
    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    /// The number of samples in every frame.
    #[inline]
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Time covered by one frame. Processing a frame must finish within this
    /// budget or the audio device underruns.
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(self.frame_size as f64 / f64::from(self.sample_rate_hz))
    }

    /// Check the sample rate. The frame size is checked against the filter
    /// length by the pipeline configuration.
    pub fn check(&self) -> Result<(), StreamConfigError> {
        if !(MIN_SAMPLE_RATE_HZ..=MAX_SAMPLE_RATE_HZ).contains(&self.sample_rate_hz) {
            return Err(StreamConfigError::UnsupportedSampleRate {
                sample_rate_hz: self.sample_rate_hz,
            });
        }
        Ok(())
    }
}
