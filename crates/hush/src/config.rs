//! Noise reducer configuration.

use hush_ns::config::{
    DEFAULT_DISCARD_FRAMES, DEFAULT_LEARN_NOISE_FRAMES, DEFAULT_LEARNING_FACTOR, DEFAULT_NUM_TAPS,
    NrConfig,
};

/// Top-level configuration for the noise reducer.
///
/// This config is applied once, before streaming starts. The frame size and
/// sample rate live in [`StreamConfig`](crate::StreamConfig).
///
/// # Example
///
/// ```
/// use hush::Config;
/// use hush::config::{Startup, WienerFilter};
///
/// let config = Config {
///     filter: WienerFilter {
///         num_taps: 63,
///         ..Default::default()
///     },
///     startup: Startup {
///         discard_frames: 0,
///         ..Default::default()
///     },
/// };
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Config {
    /// Wiener filter settings.
    pub filter: WienerFilter,
    /// How the stream start is handled before filtering begins.
    pub startup: Startup,
}

/// Wiener filter settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WienerFilter {
    /// Number of FIR taps (default: 127). Must be smaller than the frame size.
    pub num_taps: usize,
    /// Smoothing factor in `(0, 1]` for the input autocorrelation
    /// (default: 0.3). Higher values remove more noise but glitch at
    /// onsets; lower values leave a "noise reverb" behind speech.
    pub learning_factor: f32,
}

impl Default for WienerFilter {
    fn default() -> Self {
        Self {
            num_taps: DEFAULT_NUM_TAPS,
            learning_factor: DEFAULT_LEARNING_FACTOR,
        }
    }
}

/// Startup behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Startup {
    /// Frames passed through untouched to skip clicks and key presses made
    /// while starting the stream (default: 10).
    pub discard_frames: usize,
    /// Frames used to learn the background noise (default: 5). Nobody
    /// should be speaking while they are captured.
    pub learn_noise_frames: usize,
}

impl Default for Startup {
    fn default() -> Self {
        Self {
            discard_frames: DEFAULT_DISCARD_FRAMES,
            learn_noise_frames: DEFAULT_LEARN_NOISE_FRAMES,
        }
    }
}

impl Startup {
    /// Number of frames before filtering starts.
    pub fn warmup_frames(&self) -> usize {
        self.discard_frames + self.learn_noise_frames
    }
}

impl Config {
    pub(crate) fn to_nr_config(self, frame_size: usize) -> NrConfig {
        NrConfig {
            num_taps: self.filter.num_taps,
            frame_size,
            learning_factor: self.filter.learning_factor,
            discard_frames: self.startup.discard_frames,
            learn_noise_frames: self.startup.learn_noise_frames,
        }
    }
}
