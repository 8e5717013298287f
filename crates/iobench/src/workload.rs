use std::fs;
use std::io::SeekFrom;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use common::CacheConfig;
use pagecache::{OpenOptions, PageCache};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Args, Mode, Order, Toggle};

/// Half-open byte range `[start, end)` within the target file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Parse the `START-END` form used by `--range`.
    pub fn parse(text: &str) -> Result<Self, String> {
        let (left, right) = text
            .split_once('-')
            .ok_or_else(|| "expected START-END".to_string())?;
        let start = left
            .parse()
            .map_err(|_| format!("invalid range start {left:?}"))?;
        let end = right
            .parse()
            .map_err(|_| format!("invalid range end {right:?}"))?;
        Ok(Self { start, end })
    }

    fn span(&self) -> u64 {
        self.end - self.start
    }
}

pub fn run_workload(args: &Args) -> Result<()> {
    if args.block_size == 0 {
        bail!("block_size must be > 0");
    }
    if args.block_count == 0 {
        bail!("block_count must be > 0");
    }
    if args.repeat == 0 {
        bail!("repeat must be > 0");
    }

    let file_len = match args.rw {
        Mode::Read => fs::metadata(&args.file)
            .with_context(|| format!("stat {}", args.file.display()))?
            .len(),
        Mode::Write => 0,
    };
    let range = effective_range(args, file_len);
    check_range(args, range, file_len)?;

    let config = CacheConfig::builder()
        .direct(args.direct == Toggle::On)
        .build();
    let mut cache = PageCache::new(config);
    let mut opts = OpenOptions::new();
    match args.rw {
        Mode::Read => opts.read(true),
        Mode::Write => opts.write(true).create(true),
    };
    let handle = cache
        .open(&args.file, &opts)
        .with_context(|| format!("open {}", args.file.display()))?;

    let mut buffer = vec![0u8; args.block_size];
    if args.rw == Mode::Write {
        for (i, byte) in buffer.iter_mut().enumerate() {
            *byte = b'A' + (i % 26) as u8;
        }
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let total_start = Instant::now();

    for rep in 0..args.repeat {
        let start = Instant::now();

        for index in 0..args.block_count {
            let offset = pick_offset(args.order, range, args.block_size, index, &mut rng);
            cache.seek(handle, SeekFrom::Start(offset))?;

            let done = match args.rw {
                Mode::Read => cache.read(handle, &mut buffer)?,
                Mode::Write => cache.write(handle, &buffer)?,
            };
            if done != args.block_size {
                bail!("short transfer at block {index}: {done} of {} bytes", args.block_size);
            }
        }

        println!(
            "Iteration {}: blocks={} size={} bytes time={:.6} s",
            rep + 1,
            args.block_count,
            args.block_size,
            start.elapsed().as_secs_f64()
        );
    }

    println!("Total time: {:.6} s", total_start.elapsed().as_secs_f64());

    if let Err(err) = cache.fsync(handle) {
        eprintln!("fsync failed: {err}");
    }
    cache.close(handle).context("close failed")?;
    Ok(())
}

/// Apply the range defaults: reads cover the whole file, writes cover
/// exactly the blocks about to be written. `0-0` counts as unset.
fn effective_range(args: &Args, file_len: u64) -> ByteRange {
    match args.range {
        Some(range) if range != (ByteRange { start: 0, end: 0 }) => range,
        _ => ByteRange {
            start: 0,
            end: match args.rw {
                Mode::Read => file_len,
                Mode::Write => (args.block_size * args.block_count) as u64,
            },
        },
    }
}

fn check_range(args: &Args, range: ByteRange, file_len: u64) -> Result<()> {
    if args.rw == Mode::Read && range.end > file_len {
        bail!("range exceeds file size for read mode");
    }
    if range.end <= range.start {
        bail!("invalid range");
    }
    if args.order == Order::Sequence
        && range.span() < (args.block_size * args.block_count) as u64
    {
        bail!("range is too small for sequential access");
    }
    Ok(())
}

/// Pick the file offset for one block operation.
///
/// Random order selects a block-aligned slot uniformly within the range;
/// sequential order advances one block per operation.
fn pick_offset(
    order: Order,
    range: ByteRange,
    block_size: usize,
    index: usize,
    rng: &mut StdRng,
) -> u64 {
    match order {
        Order::Random => {
            if range.span() < block_size as u64 {
                return range.start;
            }
            let slots = range.span() / block_size as u64;
            range.start + rng.gen_range(0..slots) * block_size as u64
        }
        Order::Sequence => range.start + (index * block_size) as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testsupport::prelude::*;

    fn args(rw: Mode, order: Order, file: std::path::PathBuf) -> Args {
        Args {
            rw,
            block_size: 64,
            block_count: 4,
            file,
            range: None,
            order,
            repeat: 1,
            direct: Toggle::Off,
            seed: 0,
        }
    }

    #[test]
    fn parses_ranges() {
        assert_eq!(
            ByteRange::parse("128-4096").unwrap(),
            ByteRange { start: 128, end: 4096 }
        );
        assert!(ByteRange::parse("128").is_err());
        assert!(ByteRange::parse("a-b").is_err());
    }

    #[test]
    fn random_offsets_stay_in_range() {
        let range = ByteRange { start: 128, end: 640 };
        let mut rng = StdRng::seed_from_u64(0);
        for index in 0..100 {
            let offset = pick_offset(Order::Random, range, 64, index, &mut rng);
            assert!(offset >= range.start);
            assert!(offset + 64 <= range.end);
            assert_eq!((offset - range.start) % 64, 0);
        }
    }

    #[test]
    fn sequential_range_must_cover_all_blocks() {
        let (_dir, path) = temp_file_with(&patterned(128));
        let mut small = args(Mode::Read, Order::Sequence, path);
        small.range = Some(ByteRange { start: 0, end: 128 });
        assert!(run_workload(&small).is_err());
    }

    #[test]
    fn write_then_read_round_trip() {
        let (_dir, path) = temp_path();
        run_workload(&args(Mode::Write, Order::Sequence, path.clone())).unwrap();
        assert_file_len(&path, 256);
        run_workload(&args(Mode::Read, Order::Sequence, path)).unwrap();
    }

    #[test]
    fn random_read_covers_the_range() {
        let (_dir, path) = temp_file_with(&patterned(512));
        run_workload(&args(Mode::Read, Order::Random, path)).unwrap();
    }
}
