//! Decimating Complex FIR Filter Driver
//!
//! Reads a raw interleaved Q.15 I/Q file, runs it through `engine::FirFilter`
//! configured from a TOML file (with CLI overrides), and writes the
//! filtered, decimated output to another raw file.

mod config;

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

use config::DcfirConfig;
use engine::FirFilter;
use interfaces::ArcSampleBuffer;

/// Decimating complex FIR filter driver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "dcfir.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Override the decimation factor from the config file
    #[arg(long)]
    decimation: Option<u32>,

    /// Override the input file path from the config file
    #[arg(long)]
    input_path: Option<String>,

    /// Override the output file path from the config file
    #[arg(long)]
    output_path: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_line_number(true)
        .init();

    info!("Starting dcfir");
    info!("Configuration file: {}", args.config);

    let mut cfg = DcfirConfig::from_toml_file(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config))?;

    if let Some(decimation) = args.decimation {
        cfg.decimation = decimation;
    }
    if let Some(input_path) = args.input_path {
        cfg.io.input_path = input_path;
    }
    if let Some(output_path) = args.output_path {
        cfg.io.output_path = output_path;
    }

    info!(
        n = cfg.taps.re.len(),
        decimation = cfg.decimation,
        derotate = cfg.derotate.is_some(),
        "filter configuration loaded"
    );

    let mut filter = FirFilter::new(
        &cfg.taps.re,
        &cfg.taps.im,
        cfg.decimation,
        cfg.derotate.map(Into::into),
    )
    .context("constructing filter")?;

    info!(input = cfg.io.input_path, "reading input samples");
    let input_bytes = fs::read(&cfg.io.input_path)
        .with_context(|| format!("reading input file {}", cfg.io.input_path))?;
    let input_samples = common::samples_from_le_bytes(&input_bytes)
        .context("input file length is not a whole number of interleaved i16 samples")?;

    let mut output_samples: Vec<(i16, i16)> = Vec::new();
    let chunk_samples = cfg.io.chunk_samples.max(1);
    let mut scratch = vec![0i16; chunk_samples * 2];

    for input_chunk in input_samples.chunks(chunk_samples) {
        let buf = Arc::new(ArcSampleBuffer::from_samples(input_chunk)?);
        filter.push(buf).context("pushing input chunk")?;

        loop {
            let generated = filter.process(&mut scratch).context("processing a chunk")?;
            if generated == 0 {
                break;
            }
            for i in 0..generated {
                output_samples.push((scratch[2 * i], scratch[2 * i + 1]));
            }
            if generated < scratch.len() / 2 {
                break;
            }
        }
    }

    debug!(
        input = input_samples.len(),
        output = output_samples.len(),
        "filtering complete"
    );

    let output_bytes = common::samples_to_le_bytes(&output_samples);
    fs::write(&cfg.io.output_path, &output_bytes)
        .with_context(|| format!("writing output file {}", cfg.io.output_path))?;

    info!(output = cfg.io.output_path, "wrote filtered samples");
    Ok(())
}
