//! src/main.rs
use anyhow::Context;
use clap::Parser;
use std::io::Write;
use wordbench::bench::{self, BenchOutcome};
use wordbench::cli::{Cli, Command, WorkerArgs};
use wordbench::configuration::get_configuration;
use wordbench::counter::WordCounter;
use wordbench::master::ProcessLauncher;
use wordbench::telemetry::init_tracing;
use wordbench::worker::{self, WorkerTask};

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    if let Some(Command::Worker(args)) = cli.command {
        std::process::exit(run_worker(args));
    }

    let settings = get_configuration().context("Failed to read configuration.")?;
    let options = cli.bench.into_options(settings);
    let launcher = ProcessLauncher::current_exe(options.workers)
        .context("Failed to locate the current executable")?;

    let outcome = {
        let mut stdout = std::io::stdout().lock();
        let outcome = bench::run(&options, launcher, &mut stdout)?;
        bench::write_resource_usage(&mut stdout)?;
        stdout.flush().context("Failed to write results")?;
        outcome
    };

    report_failures(&outcome);
    if !outcome.succeeded() {
        std::process::exit(1);
    }
    Ok(())
}

fn run_worker(args: WorkerArgs) -> i32 {
    let engine = WordCounter::new(args.workers);
    let task = WorkerTask {
        job_id: args.job,
        slot: args.slot,
        path: args.path,
        top_n: args.top_n,
    };

    let report_out = match worker::open_report_channel(args.report_fd) {
        Ok(channel) => channel,
        Err(e) => {
            tracing::error!(error = %e, fd = args.report_fd, "Failed to open the report channel");
            return 1;
        }
    };

    let mut stdout = std::io::stdout().lock();
    let exit = match worker::run(&engine, &task, report_out, &mut stdout) {
        Ok(exit) => exit.code(),
        Err(e) => {
            tracing::error!(error = ?e, "Failed to deliver report");
            1
        }
    };
    if let Err(e) = stdout.flush() {
        tracing::warn!(error = %e, "Failed to flush the most frequent words");
    }
    exit
}

fn report_failures(outcome: &BenchOutcome) {
    for cmp in outcome.comparisons.iter().filter(|c| !c.matches) {
        tracing::error!(path = %cmp.path.display(), "Counting strategies disagree");
    }
    for report in outcome.fan_out.failures() {
        tracing::error!(
            path = %report.path.display(),
            exit_code = ?report.exit_code,
            "Worker failed"
        );
    }
}
