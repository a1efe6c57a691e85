//! Property-based test helpers for the hush crates.
//!
//! Provides strategies for audio frames, filter coefficients and
//! autocorrelation sequences, deterministic test signals, and float
//! comparison utilities.
//!
//! # Usage
//!
//! ```ignore
//! use hush_proptest::generators::*;
//! use test_strategy::proptest;
//!
//! #[proptest]
//! fn my_test(#[strategy(frame_f32(1024..=1024))] frame: Vec<f32>) {
//!     assert_eq!(frame.len(), 1024);
//! }
//! ```

pub mod comparison;
pub mod generators;

pub use proptest;
pub use test_strategy;
