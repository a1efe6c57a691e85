//! Noise reduction configuration and common constants.

use std::fmt;

/// Default number of Wiener filter taps.
pub const DEFAULT_NUM_TAPS: usize = 127;

/// Default number of samples per frame.
pub const DEFAULT_FRAME_SIZE: usize = 1024;

/// Default sample rate of the live stream in Hz.
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 48_000;

/// Default smoothing factor for the signal autocorrelation.
///
/// Higher values remove more noise but react to onsets with audible glitches.
/// Lower values glitch less but leave a kind of "noise reverb" behind speech.
pub const DEFAULT_LEARNING_FACTOR: f32 = 0.3;

/// Default number of frames passed through untouched at startup, to skip
/// clicks and key presses made while starting the stream.
pub const DEFAULT_DISCARD_FRAMES: usize = 10;

/// Default number of frames the noise autocorrelation is averaged over.
/// The input must contain only background noise during these frames.
pub const DEFAULT_LEARN_NOISE_FRAMES: usize = 5;

/// Error returned by [`NrConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// The filter needs at least one tap.
    ZeroTaps,
    /// The frame must be strictly longer than the filter, otherwise the
    /// autocorrelation normalizer `frame_size - num_taps` is not positive.
    FrameTooShort { frame_size: usize, num_taps: usize },
    /// The learning factor must lie in `(0, 1]`.
    LearningFactorOutOfRange(f32),
    /// At least one frame is needed to learn the noise profile.
    NoNoiseFrames,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ZeroTaps => write!(f, "num_taps must be at least 1"),
            Self::FrameTooShort {
                frame_size,
                num_taps,
            } => write!(
                f,
                "frame size {frame_size} must be larger than the number of taps ({num_taps})"
            ),
            Self::LearningFactorOutOfRange(factor) => {
                write!(f, "learning factor {factor} is outside (0, 1]")
            }
            Self::NoNoiseFrames => write!(f, "learn_noise_frames must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Configuration for the noise reduction pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NrConfig {
    /// Number of FIR taps, which is also the number of autocorrelation lags.
    pub num_taps: usize,
    /// Number of samples in every frame handed to the pipeline.
    pub frame_size: usize,
    /// Exponential smoothing factor for the signal autocorrelation.
    pub learning_factor: f32,
    /// Frames passed through before anything is learned.
    pub discard_frames: usize,
    /// Frames used to learn the noise autocorrelation.
    pub learn_noise_frames: usize,
}

impl Default for NrConfig {
    fn default() -> Self {
        Self {
            num_taps: DEFAULT_NUM_TAPS,
            frame_size: DEFAULT_FRAME_SIZE,
            learning_factor: DEFAULT_LEARNING_FACTOR,
            discard_frames: DEFAULT_DISCARD_FRAMES,
            learn_noise_frames: DEFAULT_LEARN_NOISE_FRAMES,
        }
    }
}

impl NrConfig {
    /// Check the invariants the pipeline relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_taps == 0 {
            return Err(ConfigError::ZeroTaps);
        }
        if self.frame_size <= self.num_taps {
            return Err(ConfigError::FrameTooShort {
                frame_size: self.frame_size,
                num_taps: self.num_taps,
            });
        }
        // Written so that NaN is rejected too.
        if !(self.learning_factor > 0.0 && self.learning_factor <= 1.0) {
            return Err(ConfigError::LearningFactorOutOfRange(self.learning_factor));
        }
        if self.learn_noise_frames == 0 {
            return Err(ConfigError::NoNoiseFrames);
        }
        Ok(())
    }

    /// Index of the first frame that is filtered.
    pub fn first_filtered_frame(&self) -> u64 {
        (self.discard_frames + self.learn_noise_frames) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_program() {
        let config = NrConfig::default();
        assert_eq!(config.num_taps, 127);
        assert_eq!(config.frame_size, 1024);
        assert_eq!(config.learning_factor, 0.3);
        assert_eq!(config.discard_frames, 10);
        assert_eq!(config.learn_noise_frames, 5);
        assert_eq!(config.first_filtered_frame(), 15);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_taps() {
        let config = NrConfig {
            num_taps: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTaps));
    }

    #[test]
    fn rejects_frame_not_longer_than_filter() {
        let config = NrConfig {
            num_taps: 64,
            frame_size: 64,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::FrameTooShort {
                frame_size: 64,
                num_taps: 64,
            })
        );

        let config = NrConfig {
            num_taps: 64,
            frame_size: 65,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_learning_factor_outside_unit_interval() {
        for factor in [0.0, -0.5, 1.5, f32::NAN] {
            let config = NrConfig {
                learning_factor: factor,
                ..Default::default()
            };
            assert!(
                matches!(
                    config.validate(),
                    Err(ConfigError::LearningFactorOutOfRange(_))
                ),
                "factor {factor} should be rejected"
            );
        }

        let config = NrConfig {
            learning_factor: 1.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_empty_noise_phase() {
        let config = NrConfig {
            learn_noise_frames: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoNoiseFrames));
    }

    #[test]
    fn error_messages_name_the_offending_values() {
        let err = ConfigError::FrameTooShort {
            frame_size: 8,
            num_taps: 16,
        };
        assert_eq!(
            err.to_string(),
            "frame size 8 must be larger than the number of taps (16)"
        );
    }
}
