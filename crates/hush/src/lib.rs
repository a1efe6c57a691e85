//! Real-time adaptive Wiener noise reduction for mono audio.
//!
//! The reducer first passes a few frames through untouched, then learns the
//! background noise from the next few, and from then on filters every frame
//! with a Wiener filter that is re-solved per frame from the running input
//! statistics and the learned noise profile.
//!
//! # Quick Start
//!
//! ```
//! use hush::{Config, NoiseReducer, StreamConfig, StreamControl};
//! use hush::config::Startup;
//!
//! let config = Config {
//!     startup: Startup {
//!         discard_frames: 2,
//!         learn_noise_frames: 3,
//!     },
//!     ..Default::default()
//! };
//! let stream = StreamConfig::new(48_000, 1024);
//! let mut reducer = NoiseReducer::builder()
//!     .config(config)
//!     .stream_config(stream)
//!     .build()?;
//!
//! // From the audio callback, for each frame:
//! let input = vec![0.0f32; stream.frame_size()];
//! let mut output = vec![0.0f32; stream.frame_size()];
//! assert_eq!(reducer.on_frame(&input, &mut output), StreamControl::Continue);
//! # Ok::<(), hush::Error>(())
//! ```
//!
//! The signal processing lives in [`hush_ns`]; this crate wraps it with
//! configuration, validation and statistics.

pub mod config;
mod noise_reducer;
pub mod stats;
pub(crate) mod stream_config;

// Public re-exports.
pub use config::Config;
pub use hush_ns::{Phase, SolverError};
pub use noise_reducer::{Error, NoiseReducer, NoiseReducerBuilder, StreamControl};
pub use stats::ProcessingStats;
pub use stream_config::{MAX_SAMPLE_RATE_HZ, MIN_SAMPLE_RATE_HZ, StreamConfig, StreamConfigError};
