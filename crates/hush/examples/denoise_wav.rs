//! Denoise a WAV file offline.
//!
//! The file is processed exactly like a live stream, so it should start with
//! a short stretch of background noise only. Multi-channel files are mixed
//! down to mono. The result is written as 32-bit float WAV.
//!
//! ```sh
//! cargo run -p hush --features examples --example denoise_wav -- noisy.wav clean.wav
//! ```

use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result, bail};
use clap::Parser;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing_subscriber::EnvFilter;

use hush::config::{Startup, WienerFilter};
use hush::{Config, NoiseReducer, StreamConfig};

#[derive(Parser, Debug)]
#[command(about = "Remove stationary background noise from a WAV file")]
struct Args {
    /// Noisy input file.
    input: String,

    /// Where to write the denoised audio.
    output: String,

    /// Samples per frame.
    #[arg(long, default_value_t = 1024)]
    frame_size: usize,

    /// Number of Wiener filter taps.
    #[arg(long, default_value_t = 127)]
    taps: usize,

    /// Smoothing factor for the input statistics, in (0, 1].
    #[arg(long, default_value_t = 0.3)]
    learning_factor: f32,

    /// Frames passed through at the start of the file.
    #[arg(long, default_value_t = 0)]
    discard_frames: usize,

    /// Frames used to learn the background noise.
    #[arg(long, default_value_t = 5)]
    learn_noise_frames: usize,
}

/// Read all samples as `f32` in `[-1, 1]`, mixed down to mono.
fn read_mono(reader: WavReader<BufReader<File>>) -> Result<Vec<f32>> {
    let spec = reader.spec();
    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 * scale))
                .collect::<Result<_, _>>()?
        }
    };

    let channels = usize::from(spec.channels);
    Ok(interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let reader =
        WavReader::open(&args.input).with_context(|| format!("opening {}", args.input))?;
    let sample_rate = reader.spec().sample_rate;
    let samples = read_mono(reader)?;

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
    let stream_config = StreamConfig::new(sample_rate, args.frame_size);
    let mut reducer = NoiseReducer::builder()
        .config(config)
        .stream_config(stream_config)
        .build()?;

    let warmup = config.startup.warmup_frames() * args.frame_size;
    if samples.len() <= warmup {
        bail!(
            "{} has {} samples, need more than {warmup} to learn the noise",
            args.input,
            samples.len()
        );
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(&args.output, spec)?;

    // The last frame is zero-padded; only the real samples are written.
    let mut input_buf = vec![0.0f32; args.frame_size];
    let mut output_buf = vec![0.0f32; args.frame_size];
    for chunk in samples.chunks(args.frame_size) {
        input_buf[..chunk.len()].copy_from_slice(chunk);
        input_buf[chunk.len()..].fill(0.0);

        reducer.process_frame(&input_buf, &mut output_buf)?;

        for &s in &output_buf[..chunk.len()] {
            writer.write_sample(s)?;
        }
    }
    writer.finalize()?;

    let stats = reducer.statistics();
    println!(
        "Wrote {} ({} frames, {} filtered, {} solver failures)",
        args.output, stats.frames_processed, stats.frames_filtered, stats.solver_failures
    );
    if let Some(noise_power) = stats.noise_power {
        println!("Learned noise floor: {:.1} dBFS", 10.0 * noise_power.log10());
    }

    Ok(())
}
