//! src/master.rs
use crate::counter::CountWords;
use crate::error::error_chain_fmt;
use crate::report::{ChildReport, Outcome, ReportError};
use crate::worker::{self, WorkerTask};
use std::io::PipeWriter;
use std::num::NonZeroUsize;
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use uuid::Uuid;

#[derive(thiserror::Error)]
pub enum MasterError {
    #[error("Failed to set up the report channel")]
    Channel(#[source] std::io::Error),
    #[error("Too many input files for one job: {0}")]
    TooManyFiles(usize),
    #[error("Failed to launch worker for {}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read from the report channel")]
    Read(#[source] ReportError),
    #[error("Received a report for another job: {0}")]
    ForeignJob(Uuid),
    #[error("Received a report for unknown slot {0}")]
    UnknownSlot(u32),
    #[error("Received a second report for slot {0}")]
    DuplicateSlot(u32),
    #[error("Timed out after {timeout:?} with {missing} report(s) outstanding")]
    Timeout { timeout: Duration, missing: usize },
    #[error("Report channel closed with {missing} report(s) outstanding")]
    MissingReports { missing: usize },
    #[error("Failed to wait for worker for {}", .path.display())]
    Wait {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl std::fmt::Debug for MasterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(f, self)
    }
}

/// Starts a worker for one task. The worker must write exactly one report to
/// `report_tx` and then exit.
pub trait Launcher {
    type Child: LaunchedChild;

    fn launch(&self, task: WorkerTask, report_tx: PipeWriter) -> std::io::Result<Self::Child>;
}

pub trait LaunchedChild {
    /// Blocks until the worker is gone. `None` when it did not exit normally.
    fn wait_exit(self) -> std::io::Result<Option<i32>>;

    fn terminate(&mut self);
}

/// Descriptor number the report channel is given in a worker process.
pub const REPORT_FD: RawFd = 3;

/// Runs every worker in its own OS process by re-executing `program` with the
/// internal `worker` command. The report channel is handed over as
/// descriptor [`REPORT_FD`]; stdout and stderr are inherited.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: PathBuf,
    workers: NonZeroUsize,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<PathBuf>, workers: NonZeroUsize) -> Self {
        Self {
            program: program.into(),
            workers,
        }
    }

    pub fn current_exe(workers: NonZeroUsize) -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?, workers))
    }
}

impl Launcher for ProcessLauncher {
    type Child = std::process::Child;

    fn launch(&self, task: WorkerTask, report_tx: PipeWriter) -> std::io::Result<Self::Child> {
        let mut command = Command::new(&self.program);
        command
            .arg("worker")
            .arg("--job")
            .arg(task.job_id.to_string())
            .arg("--slot")
            .arg(task.slot.to_string())
            .arg("--workers")
            .arg(self.workers.to_string())
            .arg("--top-n")
            .arg(task.top_n.to_string())
            .arg("--report-fd")
            .arg(REPORT_FD.to_string())
            .arg("--")
            .arg(&task.path)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let source = report_tx.as_raw_fd();
        // SAFETY: the hook only calls `dup2`/`fcntl`, which are
        // async-signal-safe, and `source` stays open until `spawn` returns.
        unsafe {
            command.pre_exec(move || inherit_as(source, REPORT_FD));
        }
        let child = command.spawn();
        drop(report_tx);
        child
    }
}

/// Makes `source` available as `target` across `exec`. Runs in the forked
/// child.
fn inherit_as(source: RawFd, target: RawFd) -> std::io::Result<()> {
    // `dup2` onto itself is a no-op that would leave close-on-exec set.
    let rc = if source == target {
        unsafe { libc::fcntl(target, libc::F_SETFD, 0) }
    } else {
        unsafe { libc::dup2(source, target) }
    };
    if rc == -1 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

impl LaunchedChild for std::process::Child {
    fn wait_exit(mut self) -> std::io::Result<Option<i32>> {
        Ok(self.wait()?.code())
    }

    fn terminate(&mut self) {
        if let Err(e) = self.kill() {
            tracing::warn!(error = %e, pid = self.id(), "Failed to kill worker");
        }
        if let Err(e) = self.wait() {
            tracing::warn!(error = %e, pid = self.id(), "Failed to reap killed worker");
        }
    }
}

/// Runs every worker on a thread of the current process, with the same
/// report protocol as `ProcessLauncher`.
#[derive(Debug, Clone)]
pub struct ThreadLauncher<E> {
    engine: E,
}

impl<E> ThreadLauncher<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }
}

impl<E> Launcher for ThreadLauncher<E>
where
    E: CountWords + Clone + Send + 'static,
{
    type Child = ThreadChild;

    fn launch(&self, task: WorkerTask, report_tx: PipeWriter) -> std::io::Result<Self::Child> {
        let engine = self.engine.clone();
        let handle = thread::Builder::new()
            .name(format!("worker-{}", task.slot))
            .spawn(move || {
                match worker::run(&engine, &task, report_tx, std::io::stdout()) {
                    Ok(exit) => exit.code(),
                    Err(e) => {
                        tracing::error!(error = ?e, "Worker could not deliver its report");
                        1
                    }
                }
            })?;
        Ok(ThreadChild { handle })
    }
}

#[derive(Debug)]
pub struct ThreadChild {
    handle: JoinHandle<i32>,
}

impl LaunchedChild for ThreadChild {
    fn wait_exit(self) -> std::io::Result<Option<i32>> {
        Ok(self.handle.join().ok())
    }

    // Threads cannot be killed.
    fn terminate(&mut self) {
        if !self.handle.is_finished() {
            tracing::warn!(
                thread = self.handle.thread().name(),
                "Worker thread is still running and is left detached"
            );
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: Outcome,
    pub exit_code: Option<i32>,
}

impl FileReport {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, Outcome::Counted(_)) && self.exit_code == Some(0)
    }

    pub fn distinct(&self) -> Option<u64> {
        match self.outcome {
            Outcome::Counted(count) => Some(count),
            Outcome::Failed => None,
        }
    }
}

/// Reports of one fan-out run, in spawn order.
#[derive(Debug, Clone)]
pub struct FanOutSummary {
    job_id: Uuid,
    reports: Vec<FileReport>,
}

impl FanOutSummary {
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn reports(&self) -> &[FileReport] {
        &self.reports
    }

    /// Sum of the distinct-word counts of every worker that counted.
    pub fn total(&self) -> u64 {
        self.reports.iter().filter_map(FileReport::distinct).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.reports.iter().filter(|r| !r.succeeded())
    }
}

/// Fans a list of files out to one worker each and collects their reports
/// over a single shared pipe.
#[derive(Debug)]
pub struct Master<L> {
    launcher: L,
    top_n: usize,
    report_timeout: Duration,
}

impl<L: Launcher> Master<L> {
    pub fn new(launcher: L, top_n: usize, report_timeout: Duration) -> Self {
        Self {
            launcher,
            top_n,
            report_timeout,
        }
    }

    #[tracing::instrument(name = "Fan out workers", skip_all, fields(files = files.len()))]
    pub fn run(&self, files: &[PathBuf]) -> Result<FanOutSummary, MasterError> {
        if u32::try_from(files.len()).is_err() {
            return Err(MasterError::TooManyFiles(files.len()));
        }
        let job_id = Uuid::new_v4();
        let (reader, writer) = std::io::pipe().map_err(MasterError::Channel)?;

        let mut children = Vec::with_capacity(files.len());
        for (slot, path) in (0u32..).zip(files) {
            let task = WorkerTask {
                job_id,
                slot,
                path: path.clone(),
                top_n: self.top_n,
            };
            let launched = writer
                .try_clone()
                .and_then(|report_tx| self.launcher.launch(task, report_tx));
            match launched {
                Ok(child) => {
                    tracing::debug!(slot, path = %path.display(), "Launched worker");
                    children.push(child);
                }
                Err(source) => {
                    terminate_all(&mut children);
                    return Err(MasterError::Spawn {
                        path: path.clone(),
                        source,
                    });
                }
            }
        }
        // Only the workers may hold a write end from here on, so the channel
        // hits EOF once the last of them is gone.
        drop(writer);

        let outcomes = match self.collect(job_id, reader, files.len()) {
            Ok(outcomes) => outcomes,
            Err(e) => {
                terminate_all(&mut children);
                return Err(e);
            }
        };

        let mut reports = Vec::with_capacity(files.len());
        for ((child, path), outcome) in children.into_iter().zip(files).zip(outcomes) {
            let exit_code = child.wait_exit().map_err(|source| MasterError::Wait {
                path: path.clone(),
                source,
            })?;
            if exit_code != Some(0) {
                tracing::warn!(path = %path.display(), ?exit_code, "Worker exited abnormally");
            }
            reports.push(FileReport {
                path: path.clone(),
                outcome,
                exit_code,
            });
        }

        Ok(FanOutSummary { job_id, reports })
    }

    /// Waits for one report per slot and returns the outcomes in slot order,
    /// whatever order they arrived in.
    fn collect(
        &self,
        job_id: Uuid,
        reader: std::io::PipeReader,
        expected: usize,
    ) -> Result<Vec<Outcome>, MasterError> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("report-reader".into())
            .spawn(move || {
                let mut reader = reader;
                loop {
                    let next = ChildReport::read_from(&mut reader);
                    let done = !matches!(next, Ok(Some(_)));
                    if tx.send(next).is_err() || done {
                        break;
                    }
                }
            })
            .map_err(MasterError::Channel)?;

        let mut slots: Vec<Option<Outcome>> = vec![None; expected];
        let mut missing = expected;
        let deadline = Instant::now() + self.report_timeout;
        while missing > 0 {
            let wait = deadline.saturating_duration_since(Instant::now());
            let report = match rx.recv_timeout(wait) {
                Ok(Ok(Some(report))) => report,
                Ok(Ok(None)) | Err(RecvTimeoutError::Disconnected) => {
                    return Err(MasterError::MissingReports { missing });
                }
                Ok(Err(e)) => return Err(MasterError::Read(e)),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(MasterError::Timeout {
                        timeout: self.report_timeout,
                        missing,
                    });
                }
            };

            if report.job_id != job_id {
                return Err(MasterError::ForeignJob(report.job_id));
            }
            let slot = slots
                .get_mut(report.slot as usize)
                .ok_or(MasterError::UnknownSlot(report.slot))?;
            if slot.is_some() {
                return Err(MasterError::DuplicateSlot(report.slot));
            }
            tracing::debug!(slot = report.slot, outcome = ?report.outcome, "Received report");
            *slot = Some(report.outcome);
            missing -= 1;
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

fn terminate_all<C: LaunchedChild>(children: &mut [C]) {
    for child in children.iter_mut() {
        child.terminate();
    }
}
