//! Test-signal generation command.
//!
//! Renders a deterministic test signal through the configured filter so a
//! response can be inspected in any waveform viewer without needing input
//! material. An impulse through a linear configuration *is* the filter's
//! impulse response.

use super::FilterArgs;
use crate::wav::write_wav;
use clap::{Args, ValueEnum};
use saturado_core::StreamConfig;
use std::path::PathBuf;

/// Test signal shapes.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Unit impulse at sample 0.
    Impulse,
    /// Steady sine at `--sine-freq`.
    Sine,
    /// Exponential sine sweep, 20 Hz to Nyquist.
    Sweep,
}

/// Arguments for `saturado generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Output WAV file (32-bit float)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Signal shape to render
    #[arg(long, value_enum, default_value = "impulse")]
    signal: Signal,

    /// Signal duration in seconds
    #[arg(long, default_value_t = 1.0)]
    duration_secs: f64,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 48000)]
    sample_rate: u32,

    /// Channel count (all channels carry the same signal)
    #[arg(long, default_value_t = 1)]
    channels: usize,

    /// Peak amplitude of the generated signal
    #[arg(long, default_value_t = 0.8)]
    amplitude: f32,

    /// Sine frequency in Hz (signal = sine)
    #[arg(long, default_value_t = 1000.0)]
    sine_freq: f64,

    #[command(flatten)]
    filter: FilterArgs,

    /// Write the raw signal without running the filter
    #[arg(long)]
    dry: bool,
}

/// Run the `generate` command.
pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.sample_rate > 0, "sample rate must be positive");
    anyhow::ensure!(args.channels > 0, "channel count must be non-zero");
    anyhow::ensure!(args.duration_secs > 0.0, "duration must be positive");

    let sample_rate = f64::from(args.sample_rate);
    let frames = (args.duration_secs * sample_rate) as usize;
    let signal = render_signal(args.signal, frames, sample_rate, args.sine_freq, args.amplitude);
    tracing::debug!(?args.signal, frames, "signal rendered");

    let input: Vec<Vec<f32>> = (0..args.channels).map(|_| signal.clone()).collect();
    let mut output: Vec<Vec<f32>> = vec![vec![0.0; frames]; args.channels];

    let mut engine = args.filter.build_engine()?;
    engine.prepare(&StreamConfig::new(sample_rate, args.channels));

    let in_refs: Vec<&[f32]> = input.iter().map(Vec::as_slice).collect();
    let mut out_refs: Vec<&mut [f32]> = output.iter_mut().map(Vec::as_mut_slice).collect();
    engine.process_block(&in_refs, &mut out_refs, args.dry);

    write_wav(&args.output, &output, args.sample_rate)?;
    println!(
        "Wrote {} ({} frames, {} channel(s))",
        args.output.display(),
        frames,
        args.channels
    );
    Ok(())
}

fn render_signal(
    signal: Signal,
    frames: usize,
    sample_rate: f64,
    sine_freq: f64,
    amplitude: f32,
) -> Vec<f32> {
    match signal {
        Signal::Impulse => {
            let mut buf = vec![0.0; frames];
            if let Some(first) = buf.first_mut() {
                *first = amplitude;
            }
            buf
        }
        Signal::Sine => (0..frames)
            .map(|i| {
                let t = i as f64 / sample_rate;
                ((std::f64::consts::TAU * sine_freq * t).sin() as f32) * amplitude
            })
            .collect(),
        Signal::Sweep => {
            // Exponential sweep from 20 Hz to Nyquist over the duration.
            let f0 = 20.0;
            let f1 = sample_rate / 2.0;
            let duration = frames as f64 / sample_rate;
            let k = (f1 / f0).ln();
            (0..frames)
                .map(|i| {
                    let t = i as f64 / sample_rate;
                    let phase =
                        std::f64::consts::TAU * f0 * duration / k * ((k * t / duration).exp() - 1.0);
                    (phase.sin() as f32) * amplitude
                })
                .collect()
        }
    }
}
