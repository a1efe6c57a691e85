//! Live noise reduction: microphone in, denoised audio out.
//!
//! Keep quiet for the first second or so after starting: the reducer skips a
//! few frames of startup clicks and then learns the background noise.
//!
//! Uses cpal for audio I/O and ring buffers to shuttle samples between the
//! input/output callbacks and a processing thread.
//!
//! ```sh
//! cargo run -p hush --features examples --example realtime -- --list
//! cargo run -p hush --features examples --example realtime -- --input 2 --output 0
//! ```

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::HeapRb;
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use tracing_subscriber::EnvFilter;

use hush::config::{Startup, WienerFilter};
use hush::{Config, NoiseReducer, StreamConfig, StreamControl};

const SAMPLE_RATE: u32 = 48_000;
const NUM_CHANNELS: u16 = 1;

#[derive(Parser, Debug)]
#[command(about = "Denoise a microphone in real time and play it back")]
struct Args {
    /// List audio devices and exit.
    #[arg(short, long)]
    list: bool,

    /// Input device index from `--list` (default: system default input).
    #[arg(short, long)]
    input: Option<usize>,

    /// Output device index from `--list` (default: system default output).
    #[arg(short, long)]
    output: Option<usize>,

    /// Samples per frame.
    #[arg(long, default_value_t = 1024)]
    frame_size: usize,

    /// Number of Wiener filter taps.
    #[arg(long, default_value_t = 127)]
    taps: usize,

    /// Smoothing factor for the input statistics, in (0, 1].
    #[arg(long, default_value_t = 0.3)]
    learning_factor: f32,

    /// Frames passed through at startup.
    #[arg(long, default_value_t = 10)]
    discard_frames: usize,

    /// Frames used to learn the background noise.
    #[arg(long, default_value_t = 5)]
    learn_noise_frames: usize,
}

fn list_devices(host: &cpal::Host) -> Result<()> {
    for (index, device) in host.devices()?.enumerate() {
        let input = if device.default_input_config().is_ok() {
            "in "
        } else {
            "   "
        };
        let output = if device.default_output_config().is_ok() {
            "out"
        } else {
            "   "
        };
        let name = device.name().unwrap_or_else(|_| "<unknown>".to_owned());
        println!("{index:>3}  [{input} {output}]  {name}");
    }
    Ok(())
}

fn pick_device(
    host: &cpal::Host,
    index: Option<usize>,
    default: Option<cpal::Device>,
    kind: &str,
) -> Result<cpal::Device> {
    match index {
        Some(index) => host
            .devices()?
            .nth(index)
            .with_context(|| format!("no device with index {index}")),
        None => default.with_context(|| format!("no {kind} device available")),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let host = cpal::default_host();

    if args.list {
        return list_devices(&host);
    }

    let config = Config {
        filter: WienerFilter {
            num_taps: args.taps,
            learning_factor: args.learning_factor,
        },
        startup: Startup {
            discard_frames: args.discard_frames,
            learn_noise_frames: args.learn_noise_frames,
        },
    };
    let stream_config = StreamConfig::new(SAMPLE_RATE, args.frame_size);
    // Build up front so bad settings fail before any device is opened.
    let mut reducer = NoiseReducer::builder()
        .config(config)
        .stream_config(stream_config)
        .build()?;

    let input_device = pick_device(&host, args.input, host.default_input_device(), "input")?;
    let output_device = pick_device(&host, args.output, host.default_output_device(), "output")?;

    println!("Input:  {}", input_device.name()?);
    println!("Output: {}", output_device.name()?);
    println!(
        "Frame:  {} samples ({:.1} ms)",
        args.frame_size,
        stream_config.frame_duration().as_secs_f64() * 1e3
    );

    let running = Arc::new(AtomicBool::new(true));

    ctrlc::set_handler({
        let running = running.clone();
        move || running.store(false, Ordering::SeqCst)
    })?;

    // ENTER stops too.
    thread::spawn({
        let running = running.clone();
        move || {
            let mut line = String::new();
            let _ = io::stdin().read_line(&mut line);
            running.store(false, Ordering::SeqCst);
        }
    });

    let cpal_config = cpal::StreamConfig {
        channels: NUM_CHANNELS,
        sample_rate: cpal::SampleRate(SAMPLE_RATE),
        buffer_size: cpal::BufferSize::Default,
    };

    // Ring buffers: input callback → processing thread → output callback.
    let frame_size = args.frame_size;
    let ring_size = frame_size * 8;
    let (mut in_prod, mut in_cons) = HeapRb::<f32>::new(ring_size).split();
    let (mut out_prod, mut out_cons) = HeapRb::<f32>::new(ring_size).split();

    let input_stream = input_device.build_input_stream(
        &cpal_config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            in_prod.push_slice(data);
        },
        |err| tracing::error!(%err, "input stream error"),
        None,
    )?;

    let output_stream = output_device.build_output_stream(
        &cpal_config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            let filled = out_cons.pop_slice(data);
            data[filled..].fill(0.0);
        },
        |err| tracing::error!(%err, "output stream error"),
        None,
    )?;

    input_stream.play()?;
    output_stream.play()?;

    // Processing thread: read whole frames, denoise, push to output.
    let running_proc = running.clone();
    let proc_thread = thread::spawn(move || {
        let mut input_buf = vec![0.0f32; frame_size];
        let mut output_buf = vec![0.0f32; frame_size];

        while running_proc.load(Ordering::SeqCst) {
            if in_cons.occupied_len() < frame_size {
                thread::sleep(Duration::from_millis(1));
                continue;
            }
            in_cons.pop_slice(&mut input_buf);

            let control = reducer.on_frame(&input_buf, &mut output_buf);
            out_prod.push_slice(&output_buf);
            if control == StreamControl::Stop {
                running_proc.store(false, Ordering::SeqCst);
            }
        }
        reducer.statistics()
    });

    println!("Stay quiet while the noise is learned. Press ENTER or Ctrl+C to stop.");

    while running.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(100));
    }

    drop(input_stream);
    drop(output_stream);
    let stats = proc_thread
        .join()
        .map_err(|_| anyhow::anyhow!("processing thread panicked"))?;

    println!(
        "\nProcessed {} frames ({} filtered, {} solver failures).",
        stats.frames_processed, stats.frames_filtered, stats.solver_failures
    );
    Ok(())
}
