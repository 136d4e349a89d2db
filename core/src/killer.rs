//! Signalling server processes.
//!
//! - SIGTERM (15): graceful termination request
//! - SIGKILL (9): immediate forced termination

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Sends termination signals to processes by PID.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessKiller;

impl ProcessKiller {
    pub fn new() -> Self {
        Self
    }

    /// Ask a process to terminate with SIGTERM.
    pub fn terminate(&self, pid: u32) -> Result<()> {
        self.kill(pid, false)
    }

    /// Signal a process: SIGKILL when `force`, SIGTERM otherwise.
    pub fn kill(&self, pid: u32, force: bool) -> Result<()> {
        // 0 would signal our own process group
        if pid == 0 {
            return Err(Error::KillFailed {
                pid,
                reason: "refusing to signal pid 0".to_string(),
            });
        }

        debug!(pid = pid, force = force, "Sending signal to process");
        platform::send(pid, force).inspect_err(|e| warn!(pid = pid, error = %e, "Kill failed"))?;
        debug!(pid = pid, "Signal sent successfully");
        Ok(())
    }
}

#[cfg(unix)]
mod platform {
    use nix::errno::Errno;
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    use crate::error::{Error, Result};

    pub fn send(pid: u32, force: bool) -> Result<()> {
        let raw = i32::try_from(pid).map_err(|_| Error::KillFailed {
            pid,
            reason: "pid out of range".to_string(),
        })?;
        let signal = if force { Signal::SIGKILL } else { Signal::SIGTERM };

        kill(Pid::from_raw(raw), signal).map_err(|errno| Error::KillFailed {
            pid,
            reason: match errno {
                Errno::ESRCH => "no such process".to_string(),
                Errno::EPERM => "permission denied".to_string(),
                other => other.desc().to_string(),
            },
        })
    }
}

#[cfg(not(unix))]
mod platform {
    use crate::error::{Error, Result};

    pub fn send(_pid: u32, _force: bool) -> Result<()> {
        Err(Error::UnsupportedPlatform(
            "process signals require a Unix system".to_string(),
        ))
    }
}
