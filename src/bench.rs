//! src/bench.rs
use crate::counter::{CountError, WordCounter};
use crate::input::read_text_or_empty;
use crate::master::{FanOutSummary, Launcher, Master};
use crate::render;
use crate::resources::{Who, resource_usage};
use anyhow::Context;
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Everything one benchmark run needs, after configuration and CLI flags
/// have been merged.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub files: Vec<PathBuf>,
    pub workers: NonZeroUsize,
    pub top_n: usize,
    pub report_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct FileComparison {
    pub path: PathBuf,
    pub single: Duration,
    pub parallel: Duration,
    pub distinct: usize,
    pub total: u64,
    pub matches: bool,
}

/// Times single-threaded against multi-threaded counting of one file. Each
/// timing includes reading the file.
#[tracing::instrument(name = "Compare strategies", skip(counter), fields(path = %path.display()))]
pub fn compare_file(counter: &WordCounter, path: &Path) -> Result<FileComparison, CountError> {
    let start = Instant::now();
    let single = counter.count(&read_text_or_empty(path));
    let single_elapsed = start.elapsed();

    let start = Instant::now();
    let parallel = counter.count_parallel(&read_text_or_empty(path))?;
    let parallel_elapsed = start.elapsed();

    let matches = single == parallel;
    if !matches {
        tracing::error!("Single and multi-threaded counts differ");
    }

    Ok(FileComparison {
        path: path.to_path_buf(),
        single: single_elapsed,
        parallel: parallel_elapsed,
        distinct: single.distinct(),
        total: single.total(),
        matches,
    })
}

#[derive(Debug)]
pub struct BenchOutcome {
    pub comparisons: Vec<FileComparison>,
    pub fan_out: FanOutSummary,
    pub fan_out_elapsed: Duration,
}

impl BenchOutcome {
    pub fn succeeded(&self) -> bool {
        self.comparisons.iter().all(|c| c.matches) && self.fan_out.failures().next().is_none()
    }
}

/// Runs the comparison phase for every file, then the fan-out phase with
/// `launcher`, writing results to `out` as they become available.
pub fn run<L: Launcher>(
    options: &RunOptions,
    launcher: L,
    out: &mut impl Write,
) -> Result<BenchOutcome, anyhow::Error> {
    let counter = WordCounter::new(options.workers);

    let mut comparisons = Vec::with_capacity(options.files.len());
    for path in &options.files {
        let comparison = compare_file(&counter, path)
            .with_context(|| format!("Failed to count {}", path.display()))?;
        render::write_comparison(out, &comparison).context("Failed to write results")?;
        comparisons.push(comparison);
    }
    out.flush().context("Failed to write results")?;

    let master = Master::new(launcher, options.top_n, options.report_timeout);
    let start = Instant::now();
    let fan_out = master
        .run(&options.files)
        .context("Failed to fan out workers")?;
    let fan_out_elapsed = start.elapsed();
    render::write_fan_out(out, &fan_out, fan_out_elapsed).context("Failed to write results")?;

    Ok(BenchOutcome {
        comparisons,
        fan_out,
        fan_out_elapsed,
    })
}

pub fn write_resource_usage(out: &mut impl Write) -> Result<(), anyhow::Error> {
    let own = resource_usage(Who::Process).context("Failed to read resource usage")?;
    render::write_resource_usage(out, "Resource Usage", &own)?;
    let children = resource_usage(Who::Children).context("Failed to read resource usage")?;
    render::write_resource_usage(out, "Resource Usage (workers)", &children)?;
    Ok(())
}
