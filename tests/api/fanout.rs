//! tests/api/fanout.rs
use crate::helpers::{setup, test_files};
use claims::assert_ok;
use std::num::NonZeroUsize;
use std::process::{Command, Stdio};
use std::time::Duration;
use uuid::Uuid;
use wordbench::master::{Master, ProcessLauncher};
use wordbench::report::{ChildReport, Outcome};

const BIN: &str = env!("CARGO_BIN_EXE_wordbench");

fn process_master() -> Master<ProcessLauncher> {
    let launcher = ProcessLauncher::new(BIN, NonZeroUsize::new(4).expect("non-zero"));
    Master::new(launcher, 10, Duration::from_secs(60))
}

#[test]
fn should_sum_distinct_counts_across_worker_processes() {
    setup();
    let summary = assert_ok!(process_master().run(&test_files(&[
        "five.txt",
        "seven.txt",
        "three.txt"
    ])));

    assert_eq!(summary.total(), 15);
    for (report, expected) in summary.reports().iter().zip([5, 7, 3]) {
        assert_eq!(report.outcome, Outcome::Counted(expected));
        assert_eq!(report.exit_code, Some(0));
    }
}

#[test]
fn should_keep_spawn_order_with_many_workers() {
    setup();
    let names: Vec<&str> = ["three.txt", "prose.txt", "five.txt", "seven.txt"]
        .into_iter()
        .cycle()
        .take(12)
        .collect();
    let summary = assert_ok!(process_master().run(&test_files(&names)));

    let counts: Vec<_> = summary.reports().iter().map(|r| r.distinct()).collect();
    assert_eq!(counts[0], Some(3));
    assert_eq!(counts[2], Some(5));
    assert_eq!(counts[3], Some(7));
    for chunk in counts.chunks(4) {
        assert_eq!(chunk, &counts[0..4]);
    }
    assert_eq!(summary.failures().count(), 0);
}

#[test]
fn should_write_a_single_report_from_the_worker_command() {
    setup();
    let job = Uuid::new_v4();
    // Report on stderr so it can be told apart from the listing on stdout.
    let output = Command::new(BIN)
        .args(["worker", "--job", job.to_string().as_str(), "--slot", "1"])
        .args(["--workers", "2", "--top-n", "3", "--report-fd", "2", "--"])
        .arg(&test_files(&["seven.txt"])[0])
        .env_remove("RUST_LOG")
        .stdin(Stdio::null())
        .output()
        .expect("Failed to run worker");

    assert!(output.status.success());
    assert_eq!(output.stderr.len(), wordbench::report::REPORT_LEN);
    let report = assert_ok!(ChildReport::read_from(output.stderr.as_slice()));
    assert_eq!(
        report,
        Some(ChildReport { job_id: job, slot: 1, outcome: Outcome::Counted(7) })
    );
    let listing = String::from_utf8_lossy(&output.stdout);
    assert!(listing.contains("Most frequent words in file"));
}

#[test]
fn should_fail_the_worker_command_without_a_report_channel() {
    let output = Command::new(BIN)
        .args(["worker", "--job", Uuid::new_v4().to_string().as_str(), "--slot", "0"])
        .args(["--workers", "2", "--top-n", "3", "--report-fd", "97", "--"])
        .arg(&test_files(&["seven.txt"])[0])
        .stdin(Stdio::null())
        .output()
        .expect("Failed to run worker");

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn should_print_each_workers_top_words_on_stdout() {
    let output = Command::new(BIN)
        .args(["--top-n", "2"])
        .args(&test_files(&["five.txt"]))
        .stdin(Stdio::null())
        .output()
        .expect("Failed to run benchmark");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Most frequent words in file"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("Most frequent words in file"));
}

#[test]
fn should_run_the_whole_benchmark_from_the_command_line() {
    let files = test_files(&["five.txt", "seven.txt", "three.txt", "missing.txt"]);
    let output = Command::new(BIN)
        .args(["--workers", "3", "--top-n", "2"])
        .args(&files)
        .stdin(Stdio::null())
        .output()
        .expect("Failed to run benchmark");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("Results match for file").count(), 4);
    assert!(stdout.contains("Total word count across all files: 15"));
    assert!(stdout.contains("Elapsed time for multiprocessing + multithreading:"));
    assert!(stdout.contains("Resource Usage:"));
}
