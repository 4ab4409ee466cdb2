//! src/resources.rs
use std::mem::MaybeUninit;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Who {
    Process,
    /// Terminated and reaped children of this process.
    Children,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceUsage {
    pub user: Duration,
    pub system: Duration,
    pub max_rss_kb: u64,
}

pub fn resource_usage(who: Who) -> std::io::Result<ResourceUsage> {
    let target = match who {
        Who::Process => libc::RUSAGE_SELF,
        Who::Children => libc::RUSAGE_CHILDREN,
    };
    let mut usage = MaybeUninit::<libc::rusage>::zeroed();
    // SAFETY: getrusage only writes into the struct behind the pointer.
    let rc = unsafe { libc::getrusage(target, usage.as_mut_ptr()) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error());
    }
    // SAFETY: zero-initialised and filled in by a successful getrusage.
    let usage = unsafe { usage.assume_init() };

    Ok(ResourceUsage {
        user: from_timeval(usage.ru_utime),
        system: from_timeval(usage.ru_stime),
        max_rss_kb: max_rss_kb(usage.ru_maxrss),
    })
}

fn from_timeval(tv: libc::timeval) -> Duration {
    Duration::from_secs(u64::try_from(tv.tv_sec).unwrap_or(0))
        + Duration::from_micros(u64::try_from(tv.tv_usec).unwrap_or(0))
}

// macOS reports bytes, everyone else kilobytes.
#[cfg(target_os = "macos")]
fn max_rss_kb(raw: libc::c_long) -> u64 {
    u64::try_from(raw).unwrap_or(0) / 1024
}

#[cfg(not(target_os = "macos"))]
fn max_rss_kb(raw: libc::c_long) -> u64 {
    u64::try_from(raw).unwrap_or(0)
}
