//! End-to-end tests for the noise reducer.

use std::f32::consts::PI;

use hush::config::{Startup, WienerFilter};
use hush::{Config, NoiseReducer, Phase, StreamConfig, StreamControl};
use hush_proptest::comparison::{mean_square, mean_square_error};
use hush_proptest::generators::{FilterShape, frame_f32, white_noise};
use proptest::prelude::ProptestConfig;
use test_strategy::proptest;

const FRAME_SIZE: usize = 1024;
const NUM_TAPS: usize = 32;
const DISCARD_FRAMES: usize = 1;
const LEARN_NOISE_FRAMES: usize = 6;
const SIGNAL_FRAMES: usize = 20;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn reducer() -> NoiseReducer {
    NoiseReducer::builder()
        .config(Config {
            filter: WienerFilter {
                num_taps: NUM_TAPS,
                learning_factor: 0.3,
            },
            startup: Startup {
                discard_frames: DISCARD_FRAMES,
                learn_noise_frames: LEARN_NOISE_FRAMES,
            },
        })
        .stream_config(StreamConfig::new(48_000, FRAME_SIZE))
        .build()
        .unwrap()
}

/// Silence during startup, then `signal`, with white noise throughout.
fn scenario(signal: impl Fn(usize) -> f32, noise_amplitude: f32) -> (Vec<f32>, Vec<f32>) {
    let warmup = FRAME_SIZE * (DISCARD_FRAMES + LEARN_NOISE_FRAMES);
    let total = warmup + FRAME_SIZE * SIGNAL_FRAMES;
    let clean: Vec<f32> = (0..total)
        .map(|n| if n < warmup { 0.0 } else { signal(n - warmup) })
        .collect();
    let noisy = white_noise(total, 7, noise_amplitude)
        .into_iter()
        .zip(&clean)
        .map(|(n, &s)| s + n)
        .collect();
    (clean, noisy)
}

fn run(reducer: &mut NoiseReducer, input: &[f32]) -> Vec<f32> {
    let mut output = vec![0.0f32; input.len()];
    for (inp, out) in input
        .chunks_exact(FRAME_SIZE)
        .zip(output.chunks_exact_mut(FRAME_SIZE))
    {
        assert_eq!(reducer.on_frame(inp, out), StreamControl::Continue);
    }
    output
}

#[test]
fn suppresses_noise_around_a_tone() {
    init_tracing();
    let (clean, noisy) = scenario(|n| 0.5 * (2.0 * PI * n as f32 / 64.0).sin(), 0.2);
    let mut reducer = reducer();
    let output = run(&mut reducer, &noisy);

    // Startup frames are passed through untouched.
    let warmup = FRAME_SIZE * (DISCARD_FRAMES + LEARN_NOISE_FRAMES);
    assert_eq!(output[..warmup], noisy[..warmup]);

    // Once the signal profile has settled the tone is much cleaner.
    let tail = clean.len() - 8 * FRAME_SIZE;
    let input_error = mean_square_error(&noisy[tail..], &clean[tail..]);
    let output_error = mean_square_error(&output[tail..], &clean[tail..]);
    assert!(
        output_error < 0.25 * input_error,
        "output error {output_error} vs input error {input_error}"
    );

    let stats = reducer.statistics();
    assert_eq!(stats.phase, Phase::Filter);
    assert_eq!(stats.frames_processed, (clean.len() / FRAME_SIZE) as u64);
    assert_eq!(stats.frames_filtered, SIGNAL_FRAMES as u64);
    assert_eq!(stats.solver_failures, 0);
    assert_eq!(stats.last_solver_error, None);

    // Uniform noise in [-0.2, 0.2] has power 0.04 / 3.
    let noise_power = stats.noise_power.unwrap();
    assert!(
        (noise_power - 0.04 / 3.0).abs() < 0.002,
        "noise power {noise_power}"
    );
}

#[test]
fn suppresses_stationary_noise() {
    init_tracing();
    let (_, noisy) = scenario(|_| 0.0, 0.1);
    let mut reducer = reducer();
    let output = run(&mut reducer, &noisy);

    let tail = noisy.len() - 8 * FRAME_SIZE;
    let input_energy = mean_square(&noisy[tail..]);
    let output_energy = mean_square(&output[tail..]);
    assert!(
        output_energy < 0.1 * input_energy,
        "output energy {output_energy} vs input energy {input_energy}"
    );
}

#[test]
fn dc_offset_survives_filtering() {
    init_tracing();
    let (_, noisy) = scenario(|_| 0.0, 0.1);
    let offset: Vec<f32> = noisy.iter().map(|&s| s + 0.25).collect();
    let mut reducer = reducer();
    let output = run(&mut reducer, &offset);

    // The mean is added on top of the filtered input, which still carries
    // the offset scaled by the sum of the taps. Those sum to roughly zero
    // once only noise is left.
    let settled = DISCARD_FRAMES + LEARN_NOISE_FRAMES + 8;
    for frame in output.chunks_exact(FRAME_SIZE).skip(settled) {
        let mean = frame.iter().sum::<f32>() / FRAME_SIZE as f32;
        assert!((mean - 0.25).abs() < 0.05, "frame mean {mean}");
    }
}

#[test]
fn frame_size_mismatch_stops_the_stream() {
    init_tracing();
    let mut reducer = reducer();
    let input = vec![0.1f32; FRAME_SIZE / 2];
    let mut output = vec![1.0f32; FRAME_SIZE];
    assert_eq!(reducer.on_frame(&input, &mut output), StreamControl::Stop);
    assert_eq!(output[..FRAME_SIZE / 2], input[..]);
    assert!(output[FRAME_SIZE / 2..].iter().all(|&s| s == 0.0));
    assert_eq!(reducer.statistics().frames_processed, 0);
}

#[test]
fn block_size_is_reflected_in_frame_duration() {
    let reducer = reducer();
    let budget = reducer.stream_config().frame_duration();
    assert_eq!(budget.as_micros(), 21_333);
}

#[proptest(ProptestConfig::with_cases(32))]
fn arbitrary_frames_produce_finite_output(
    shape: FilterShape,
    #[strategy(frame_f32(#shape.frame_size * 8))] input: Vec<f32>,
) {
    let mut reducer = NoiseReducer::builder()
        .config(Config {
            filter: WienerFilter {
                num_taps: shape.num_taps,
                ..Default::default()
            },
            startup: Startup {
                discard_frames: 1,
                learn_noise_frames: 2,
            },
        })
        .stream_config(StreamConfig::new(16_000, shape.frame_size))
        .build()
        .unwrap();

    let mut output = vec![0.0f32; shape.frame_size];
    for (i, frame) in input.chunks_exact(shape.frame_size).enumerate() {
        assert_eq!(reducer.on_frame(frame, &mut output), StreamControl::Continue);
        if i < 3 {
            assert_eq!(&output, frame);
        }
        assert!(output.iter().all(|s| s.is_finite()));
    }
    let stats = reducer.statistics();
    assert_eq!(stats.frames_processed, 8);
    assert_eq!(stats.frames_filtered, 5);
}
