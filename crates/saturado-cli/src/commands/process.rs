//! File-based filter rendering command.

use super::FilterArgs;
use crate::wav::{read_wav, write_wav};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use saturado_core::StreamConfig;
use std::path::PathBuf;

/// Arguments for `saturado process`.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file (32-bit float)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    #[command(flatten)]
    filter: FilterArgs,

    /// Processing block size in frames
    #[arg(long, default_value_t = 512)]
    block_size: usize,

    /// Copy input to output without running the filter
    #[arg(long)]
    bypass: bool,
}

/// Run the `process` command.
pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    println!("Reading {}...", args.input.display());
    let audio = read_wav(&args.input)?;
    let frames = audio.frames();
    let channels = audio.channels.len();

    println!(
        "  {} frames, {} channel(s), {} Hz, {:.2}s",
        frames,
        channels,
        audio.sample_rate,
        frames as f64 / f64::from(audio.sample_rate)
    );

    let mut engine = args.filter.build_engine()?;
    engine.prepare(&StreamConfig::new(f64::from(audio.sample_rate), channels));
    tracing::debug!(latency = engine.latency_samples(), "engine prepared");

    let pb = ProgressBar::new(frames as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("##-"),
    );

    let mut output: Vec<Vec<f32>> = audio
        .channels
        .iter()
        .map(|ch| vec![0.0; ch.len()])
        .collect();

    let block_size = args.block_size.max(1);
    let mut offset = 0;
    while offset < frames {
        let len = block_size.min(frames - offset);
        let in_block: Vec<&[f32]> = audio
            .channels
            .iter()
            .map(|ch| &ch[offset..offset + len])
            .collect();
        let mut out_block: Vec<&mut [f32]> = output
            .iter_mut()
            .map(|ch| &mut ch[offset..offset + len])
            .collect();

        engine.process_block(&in_block, &mut out_block, args.bypass);

        offset += len;
        pb.set_position(offset as u64);
    }
    pb.finish_and_clear();

    write_wav(&args.output, &output, audio.sample_rate)?;
    println!("Wrote {}", args.output.display());
    Ok(())
}
