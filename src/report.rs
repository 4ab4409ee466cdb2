//! src/report.rs
//!
//! The frame a child writes to the shared report channel. It is fixed width
//! and far below `PIPE_BUF`, so concurrent writers never interleave.
//!
//! Layout, little endian:
//!
//! | bytes  | field                     |
//! |--------|---------------------------|
//! | 0..16  | job id (UUID)             |
//! | 16..20 | slot (spawn index), `u32` |
//! | 20     | status, 0 counted 1 failed|
//! | 21..29 | distinct words, `u64`     |
use crate::error::error_chain_fmt;
use std::io::{Read, Write};
use uuid::Uuid;

pub const REPORT_LEN: usize = 29;

const STATUS_COUNTED: u8 = 0;
const STATUS_FAILED: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Counted(u64),
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildReport {
    pub job_id: Uuid,
    pub slot: u32,
    pub outcome: Outcome,
}

#[derive(thiserror::Error)]
pub enum ReportError {
    #[error("Unknown report status byte {0}")]
    UnknownStatus(u8),
    #[error("Failed reports must not carry a count, got {0}")]
    CountOnFailure(u64),
    #[error("Report channel I/O failed")]
    Io(#[from] std::io::Error),
}

impl std::fmt::Debug for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(f, self)
    }
}

impl ChildReport {
    pub fn encode(&self) -> [u8; REPORT_LEN] {
        let (status, count) = match self.outcome {
            Outcome::Counted(count) => (STATUS_COUNTED, count),
            Outcome::Failed => (STATUS_FAILED, 0),
        };
        let mut frame = [0u8; REPORT_LEN];
        frame[0..16].copy_from_slice(self.job_id.as_bytes());
        frame[16..20].copy_from_slice(&self.slot.to_le_bytes());
        frame[20] = status;
        frame[21..29].copy_from_slice(&count.to_le_bytes());
        frame
    }

    pub fn decode(frame: &[u8; REPORT_LEN]) -> Result<Self, ReportError> {
        let mut job_id = [0u8; 16];
        job_id.copy_from_slice(&frame[0..16]);
        let mut slot = [0u8; 4];
        slot.copy_from_slice(&frame[16..20]);
        let mut count = [0u8; 8];
        count.copy_from_slice(&frame[21..29]);
        let count = u64::from_le_bytes(count);

        let outcome = match frame[20] {
            STATUS_COUNTED => Outcome::Counted(count),
            STATUS_FAILED if count == 0 => Outcome::Failed,
            STATUS_FAILED => return Err(ReportError::CountOnFailure(count)),
            other => return Err(ReportError::UnknownStatus(other)),
        };

        Ok(Self {
            job_id: Uuid::from_bytes(job_id),
            slot: u32::from_le_bytes(slot),
            outcome,
        })
    }

    /// Writes the frame with a single `write_all` and flushes.
    pub fn write_to(&self, mut out: impl Write) -> Result<(), ReportError> {
        out.write_all(&self.encode())?;
        out.flush()?;
        Ok(())
    }

    /// Reads the next frame. `Ok(None)` means the channel reached EOF on a
    /// frame boundary.
    pub fn read_from(mut input: impl Read) -> Result<Option<Self>, ReportError> {
        let mut frame = [0u8; REPORT_LEN];
        let mut filled = 0;
        while filled < REPORT_LEN {
            match input.read(&mut frame[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        format!("Report truncated after {filled} bytes"),
                    )
                    .into());
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Self::decode(&frame).map(Some)
    }
}
