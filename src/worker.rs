//! src/worker.rs
use crate::counter::CountWords;
use crate::input::read_text_or_empty;
use crate::render::write_top_words;
use crate::report::{ChildReport, Outcome, ReportError};
use crate::top::top_words;
use std::fs::File;
use std::io::Write;
use std::os::fd::{BorrowedFd, RawFd};
use std::path::PathBuf;
use uuid::Uuid;

/// One file handed to one fan-out worker.
#[derive(Debug, Clone)]
pub struct WorkerTask {
    pub job_id: Uuid,
    pub slot: u32,
    pub path: PathBuf,
    pub top_n: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    Counted,
    Failed,
}

impl WorkerExit {
    pub fn code(self) -> i32 {
        match self {
            WorkerExit::Counted => 0,
            WorkerExit::Failed => 1,
        }
    }
}

impl WorkerTask {
    fn report(&self, outcome: Outcome) -> ChildReport {
        ChildReport {
            job_id: self.job_id,
            slot: self.slot,
            outcome,
        }
    }
}

/// Opens the report channel a worker process inherited as `fd`.
///
/// The returned file owns a duplicate, so `fd` itself is left alone.
pub fn open_report_channel(fd: RawFd) -> std::io::Result<File> {
    if unsafe { libc::fcntl(fd, libc::F_GETFD) } == -1 {
        return Err(std::io::Error::last_os_error());
    }
    // SAFETY: `fd` is open, checked above, and is never closed by this
    // process.
    let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
    Ok(File::from(borrowed.try_clone_to_owned()?))
}

/// Counts the task's file and writes exactly one report to `report_out`,
/// whether counting succeeded or not. The top words go to `listing_out`.
///
/// An unreadable file counts as empty. Only a failure to deliver the report
/// is returned as an error.
#[tracing::instrument(
    name = "Run worker",
    skip_all,
    fields(slot = task.slot, path = %task.path.display())
)]
pub fn run<E: CountWords>(
    engine: &E,
    task: &WorkerTask,
    mut report_out: impl Write,
    mut listing_out: impl Write,
) -> Result<WorkerExit, ReportError> {
    let text = read_text_or_empty(&task.path);

    match engine.count_words(&text) {
        Ok(counts) => {
            task.report(Outcome::Counted(counts.distinct() as u64))
                .write_to(&mut report_out)?;
            let top = top_words(&counts, task.top_n);
            if let Err(e) = write_top_words(&mut listing_out, &task.path, &top) {
                tracing::warn!(error = %e, "Failed to print the most frequent words");
            }
            Ok(WorkerExit::Counted)
        }
        Err(e) => {
            tracing::error!(error = ?e, "Counting failed");
            task.report(Outcome::Failed).write_to(&mut report_out)?;
            Ok(WorkerExit::Failed)
        }
    }
}
