//! src/cli.rs
use crate::bench::RunOptions;
use crate::configuration::Settings;
use clap::{Args, Parser, Subcommand};
use std::num::NonZeroUsize;
use std::os::fd::RawFd;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Compares single-threaded, multi-threaded and multi-process word counting.
#[derive(Debug, Parser)]
#[command(name = "wordbench", version, args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub bench: BenchArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Counts one file and writes a single report to the report descriptor.
    #[command(hide = true)]
    Worker(WorkerArgs),
}

#[derive(Debug, Args)]
pub struct BenchArgs {
    /// Files to process, instead of the configured list.
    pub files: Vec<PathBuf>,

    /// Worker threads per counting run.
    #[arg(long)]
    pub workers: Option<NonZeroUsize>,

    /// How many of the most frequent words each worker prints.
    #[arg(long)]
    pub top_n: Option<usize>,

    /// How long to wait for every worker report, in seconds.
    #[arg(long)]
    pub report_timeout_secs: Option<u64>,
}

#[derive(Debug, Args)]
pub struct WorkerArgs {
    #[arg(long)]
    pub job: Uuid,

    #[arg(long)]
    pub slot: u32,

    #[arg(long)]
    pub workers: NonZeroUsize,

    #[arg(long)]
    pub top_n: usize,

    /// Inherited descriptor the report is written to.
    #[arg(long)]
    pub report_fd: RawFd,

    pub path: PathBuf,
}

impl BenchArgs {
    /// Flags win over settings.
    pub fn into_options(self, settings: Settings) -> RunOptions {
        let files = if self.files.is_empty() {
            settings.benchmark.files
        } else {
            self.files
        };
        RunOptions {
            files,
            workers: self.workers.unwrap_or(settings.engine.workers),
            top_n: self.top_n.unwrap_or(settings.benchmark.top_n),
            report_timeout: self
                .report_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or_else(|| settings.fanout.report_timeout()),
        }
    }
}
