//! src/render.rs
use crate::bench::FileComparison;
use crate::master::FanOutSummary;
use crate::report::Outcome;
use crate::resources::ResourceUsage;
use crate::top::TopEntry;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

pub fn write_comparison(out: &mut impl Write, cmp: &FileComparison) -> std::io::Result<()> {
    let path = cmp.path.display();
    writeln!(out, "Processing file: {path}")?;
    writeln!(out, "  Single-threaded time: {} seconds", cmp.single.as_secs_f64())?;
    writeln!(out, "  Multi-threaded time:  {} seconds", cmp.parallel.as_secs_f64())?;
    writeln!(
        out,
        "  Distinct words: {}, total words: {}",
        cmp.distinct, cmp.total
    )?;
    if cmp.matches {
        writeln!(out, "  Results match for file: {path}")
    } else {
        writeln!(out, "  Results mismatch for file: {path}")
    }
}

pub fn write_top_words(
    out: &mut impl Write,
    path: &Path,
    entries: &[TopEntry<'_>],
) -> std::io::Result<()> {
    writeln!(out, "\n  Most frequent words in file {}:", path.display())?;
    for entry in entries {
        writeln!(out, "    {:<15}: {}", entry.word, entry.count)?;
    }
    out.flush()
}

pub fn write_fan_out(
    out: &mut impl Write,
    summary: &FanOutSummary,
    elapsed: Duration,
) -> std::io::Result<()> {
    for report in summary.reports() {
        let path = report.path.display();
        match report.outcome {
            Outcome::Counted(count) => writeln!(out, "\n  Word count in file: {path}: {count}")?,
            Outcome::Failed => writeln!(out, "\n  Counting failed for file: {path}")?,
        }
        if report.exit_code != Some(0) {
            match report.exit_code {
                Some(code) => writeln!(out, "  Worker exited with code {code}")?,
                None => writeln!(out, "  Worker was terminated by a signal")?,
            }
        }
    }
    writeln!(out, "\nTotal word count across all files: {}", summary.total())?;
    writeln!(
        out,
        "\nElapsed time for multiprocessing + multithreading: {} seconds",
        elapsed.as_secs_f64()
    )
}

pub fn write_resource_usage(
    out: &mut impl Write,
    heading: &str,
    usage: &ResourceUsage,
) -> std::io::Result<()> {
    writeln!(out, "\n{heading}:")?;
    writeln!(out, "  CPU time used (user):    {} seconds", usage.user.as_secs_f64())?;
    writeln!(out, "  CPU time used (system):  {} seconds", usage.system.as_secs_f64())?;
    writeln!(out, "  Maximum memory usage:    {} kilobytes", usage.max_rss_kb)
}
