#![no_main]

use arbitrary::Arbitrary;
use hush::config::{Startup, WienerFilter};
use hush::{Config, NoiseReducer, StreamConfig, StreamControl};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    /// Filter length (clamped to 1-64)
    num_taps: u8,
    /// Extra samples per frame beyond the filter length (clamped to 1-256)
    frame_extra: u8,
    /// Learning factor in 1/255 steps, 0 maps to 1.0
    learning_factor: u8,
    discard_frames: u8,
    learn_noise_frames: u8,
    /// Audio samples, chopped into frames
    samples: Vec<f32>,
}

/// Clamp finite samples to the audio range [-1, 1]. NaN and infinities are
/// kept so frame rejection gets exercised.
fn sanitize_sample(s: f32) -> f32 {
    if s.is_finite() { s.clamp(-1.0, 1.0) } else { s }
}

fuzz_target!(|input: FuzzInput| {
    let num_taps = (input.num_taps % 64) as usize + 1;
    let frame_size = num_taps + (input.frame_extra as usize).max(1);
    let learning_factor = match input.learning_factor {
        0 => 1.0,
        n => f32::from(n) / 255.0,
    };

    let config = Config {
        filter: WienerFilter {
            num_taps,
            learning_factor,
        },
        startup: Startup {
            discard_frames: (input.discard_frames % 4) as usize,
            learn_noise_frames: (input.learn_noise_frames % 4) as usize + 1,
        },
    };
    let Ok(mut reducer) = NoiseReducer::builder()
        .config(config)
        .stream_config(StreamConfig::new(16_000, frame_size))
        .build()
    else {
        return;
    };

    let sanitized: Vec<f32> = input.samples.iter().copied().map(sanitize_sample).collect();
    let mut output = vec![0.0f32; frame_size];
    for frame in sanitized.chunks(frame_size) {
        let control = reducer.on_frame(frame, &mut output);
        if frame.len() == frame_size {
            assert_eq!(control, StreamControl::Continue);
        } else {
            assert_eq!(control, StreamControl::Stop);
        }
    }
});
