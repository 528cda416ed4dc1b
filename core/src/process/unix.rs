//! Unix detached spawn and signaling
//!
//! Spawned children are placed in their own session via `setsid()`, so
//! they have no controlling terminal and do not receive terminal signals
//! directed at the parent's session. The child inherits the parent's
//! working directory, environment, and stdin; stdout and stderr are
//! discarded — a detached process that wants persistent output must do
//! its own file-based logging.

// Allow unsafe code for this module since detachment requires libc::setsid() calls
#![allow(unsafe_code)]

use crate::{DetachError, Result};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, Stdio};
use tracing::{debug, error};

/// A freshly spawned detached child.
///
/// Holding the handle lets the spawning invocation contain a failed start
/// (kill and reap the child) or release it to run independently. Dropping
/// the handle is equivalent to releasing it.
#[derive(Debug)]
pub struct DetachedChild {
    pid: Pid,
    child: Child,
}

impl DetachedChild {
    /// Process ID of the spawned child
    pub fn pid(&self) -> i32 {
        self.pid.as_raw()
    }

    /// Forcibly terminate the child and reap it.
    ///
    /// Used when the registry write fails after a successful spawn: an
    /// untracked detached process is worse than a failed start.
    pub fn kill_and_reap(&mut self) -> Result<()> {
        self.child.kill().map_err(|e| {
            DetachError::Signal(format!("failed to kill process {}: {}", self.pid, e))
        })?;
        self.child.wait().map_err(|e| {
            DetachError::Signal(format!("failed to reap process {}: {}", self.pid, e))
        })?;
        debug!("killed and reaped process {}", self.pid);
        Ok(())
    }

    /// Give up the handle without waiting; the child keeps running and its
    /// lifecycle end is signaled only through the registry.
    pub fn release(self) {}
}

/// Spawn `program` with `args` as a detached process.
///
/// The child runs in a new session (`setsid()`), inherits the current
/// working directory, environment, and stdin, and has stdout/stderr
/// discarded.
pub fn spawn_detached(program: &str, args: &[String]) -> Result<DetachedChild> {
    debug!("spawning detached process: {} {:?}", program, args);

    let mut command = Command::new(program);
    command.args(args);
    command.stdout(Stdio::null());
    command.stderr(Stdio::null());

    // Safety: setsid() is async-signal-safe and appropriate for use in pre_exec
    unsafe {
        command.pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }

    let child = command.spawn().map_err(|e| {
        error!("failed to spawn '{}': {}", program, e);
        DetachError::Spawn(format!("failed to spawn '{}': {}", program, e))
    })?;

    let pid = Pid::from_raw(child.id() as i32);
    debug!("spawned detached process {}", pid);

    Ok(DetachedChild { pid, child })
}

/// Send SIGKILL to `pid`.
///
/// ESRCH is propagated as an error, not swallowed: a stop action must be
/// able to report that a registry record described a process that no
/// longer exists.
pub fn signal_kill(pid: i32) -> Result<()> {
    // kill(2) gives pid 0 and negative pids process-group/broadcast
    // semantics; a registry record can never legitimately name those.
    if pid <= 0 {
        return Err(DetachError::Signal(format!(
            "refusing to signal non-positive pid {}",
            pid
        )));
    }
    debug!("sending SIGKILL to process {}", pid);
    kill(Pid::from_raw(pid), Signal::SIGKILL).map_err(|e| {
        DetachError::Signal(format!("failed to signal process {}: {}", pid, e))
    })
}
