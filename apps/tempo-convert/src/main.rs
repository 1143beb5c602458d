//! Offline converter from binary frame logs to CSV reports.
//!
//! Reads a log produced by the in-process writer and reconstructs the
//! per-frame, per-timer time series as a comma-separated table.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p tempo-convert -- path/to/frame_times.bin
//! cargo run -p tempo-convert            # reads ./frame_times.bin
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};

use anyhow::Context;
use tracing::info;

use tempo_log::LogReader;

/// Input path used when none is given.
const DEFAULT_INPUT: &str = "frame_times.bin";

/// Report file written to the current directory.
const OUTPUT_PATH: &str = "frame_times.csv";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let input_path = parse_args();

    // Open the input before touching the output so a bad path never
    // leaves a stale or empty report behind.
    let input = File::open(&input_path)
        .with_context(|| format!("cannot open log file `{input_path}`"))?;

    let output = File::create(OUTPUT_PATH)
        .with_context(|| format!("cannot create report file `{OUTPUT_PATH}`"))?;

    let summary = LogReader::new(BufReader::new(input))
        .decode_into(BufWriter::new(output))
        .with_context(|| format!("failed to decode `{input_path}`"))?;

    info!(
        frames = summary.frames,
        timers = summary.timers,
        corrupt_records = summary.corrupt_records,
        "wrote {OUTPUT_PATH}"
    );
    Ok(())
}

fn parse_args() -> String {
    let args: Vec<String> = std::env::args().collect();
    let mut input = DEFAULT_INPUT.to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" => {
                println!("Tempo log converter");
                println!();
                println!("Usage: tempo-convert [LOG_FILE]");
                println!();
                println!("Arguments:");
                println!("  LOG_FILE  Binary frame log to decode (default: {DEFAULT_INPUT})");
                println!();
                println!("Writes {OUTPUT_PATH} to the current directory.");
                std::process::exit(0);
            }
            arg => {
                input = arg.to_string();
            }
        }
        i += 1;
    }

    input
}
