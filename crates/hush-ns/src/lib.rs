//! Adaptive Wiener noise reduction in the time domain.
//!
//! The noise autocorrelation is learned from a few frames of background
//! noise. Afterwards, every frame updates a smoothed estimate of the input
//! autocorrelation, the Wiener-Hopf equations are solved with the
//! Levinson-Durbin recursion and the frame is run through the resulting FIR
//! filter.
//!
//! ```
//! use hush_ns::config::NrConfig;
//! use hush_ns::pipeline::NoiseReductionPipeline;
//!
//! let config = NrConfig::default();
//! let mut pipeline = NoiseReductionPipeline::new(config).unwrap();
//!
//! let input = vec![0.0f32; config.frame_size];
//! let mut output = vec![0.0f32; config.frame_size];
//! pipeline.process(&input, &mut output);
//! ```

pub mod autocorrelation;
pub mod config;
pub mod fir_filter;
pub mod levinson;
pub mod pipeline;

pub use config::{ConfigError, NrConfig};
pub use levinson::SolverError;
pub use pipeline::{FrameReport, NoiseReductionPipeline, Phase};
