//! Block-I/O benchmark over the page cache.
//!
//! Drives sequential or random block operations against one file through
//! the public cache surface and reports wall-clock timings per iteration.

mod workload;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use crate::workload::{run_workload, ByteRange};

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    run_workload(&args)
}

#[derive(Parser, Debug)]
#[command(name = "iobench")]
#[command(about = "Benchmark block I/O through the page cache", long_about = None)]
pub struct Args {
    /// Workload direction
    #[arg(long, value_enum)]
    pub rw: Mode,
    /// Bytes per block operation
    #[arg(long, default_value_t = 4096)]
    pub block_size: usize,
    /// Block operations per iteration
    #[arg(long, default_value_t = 1024)]
    pub block_count: usize,
    /// Target file
    #[arg(long)]
    pub file: PathBuf,
    /// Restrict I/O to a byte range, as START-END (0-0 means unset)
    #[arg(long, value_parser = ByteRange::parse)]
    pub range: Option<ByteRange>,
    /// Access order
    #[arg(long = "type", value_enum, default_value_t = Order::Sequence)]
    pub order: Order,
    /// Iterations of the whole block loop
    #[arg(long, default_value_t = 1)]
    pub repeat: usize,
    /// Attempt an OS cache bypass on open
    #[arg(long, value_enum, default_value_t = Toggle::On)]
    pub direct: Toggle,
    /// Seed for the random access order
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Read,
    Write,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Order {
    Sequence,
    Random,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}
