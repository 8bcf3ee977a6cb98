//! Job lock for reparse runs.
//!
//! Only one run may rewrite a database at a time. The lock lives next to the
//! database as `<database>.reparse.lock` and holds JSON naming the owning
//! process. Locks left behind by dead processes are treated as stale and
//! cleaned up on the next acquire.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Metadata stored in a lock file to identify the owning process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockInfo {
    pub pid: u32,
    pub started: String,
    /// Reparser name, or `"all"` for a full run
    pub task: String,
}

/// Returned by [`JobLock::acquire`] when a live process holds the lock.
#[derive(Debug, thiserror::Error)]
#[error("reparse already running (pid {}, task {}, started {})", .0.pid, .0.task, .0.started)]
pub struct LockHeld(pub LockInfo);

/// Get the lock file path for a given database.
pub fn lock_path_for(database: &Path) -> PathBuf {
    let mut lock = database.as_os_str().to_owned();
    lock.push(".reparse.lock");
    PathBuf::from(lock)
}

/// Read lock info if the lock file exists and the owning PID is still alive.
///
/// Returns `None` if the lock file is missing, malformed, or the PID is dead.
pub fn read_lock(database: &Path) -> Option<LockInfo> {
    let contents = fs::read_to_string(lock_path_for(database)).ok()?;
    live_owner(&contents)
}

fn live_owner(contents: &str) -> Option<LockInfo> {
    let info: LockInfo = serde_json::from_str(contents).ok()?;
    if !is_pid_alive(info.pid) {
        return None;
    }
    Some(info)
}

fn unknown_owner() -> LockInfo {
    LockInfo {
        pid: 0,
        started: String::new(),
        task: "unknown".to_string(),
    }
}

/// Remove the lock at `path` only if it still holds `expected`.
///
/// The file is first renamed to a per-process side path, so a lock another
/// process created after `expected` was read is never deleted: it is moved
/// back and `Ok(false)` is returned. `Ok(true)` means the path is now free.
fn remove_stale(path: &Path, expected: &str) -> std::io::Result<bool> {
    let mut side = path.as_os_str().to_owned();
    side.push(format!(".stale.{}", std::process::id()));
    let side = PathBuf::from(side);

    match fs::rename(path, &side) {
        Ok(()) => {}
        // Someone else already cleared it
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(e),
    }

    let moved = fs::read_to_string(&side).unwrap_or_default();
    if moved == expected {
        fs::remove_file(&side)?;
        return Ok(true);
    }

    // hard_link never overwrites, so a lock created in the meantime wins
    let restored = fs::hard_link(&side, path);
    fs::remove_file(&side)?;
    if let Err(e) = restored {
        if e.kind() != std::io::ErrorKind::AlreadyExists {
            return Err(e);
        }
    }
    Ok(false)
}

/// Held job lock. The lock file is removed on drop.
#[derive(Debug)]
pub struct JobLock {
    path: PathBuf,
    info: LockInfo,
}

impl JobLock {
    /// Take the job lock for `database`.
    ///
    /// Fails with [`LockHeld`] (inside the `anyhow::Error`) when another live
    /// process owns it. A stale lock file is removed first.
    pub fn acquire(database: &Path, task: &str) -> Result<Self> {
        let path = lock_path_for(database);

        if let Ok(contents) = fs::read_to_string(&path) {
            if let Some(owner) = live_owner(&contents) {
                return Err(LockHeld(owner).into());
            }
            warn!(path = %path.display(), "removing stale reparse lock");
            let removed = remove_stale(&path, &contents)
                .with_context(|| format!("Failed to remove stale lock: {}", path.display()))?;
            if !removed {
                let owner = read_lock(database).unwrap_or_else(unknown_owner);
                return Err(LockHeld(owner).into());
            }
        }

        let info = LockInfo {
            pid: std::process::id(),
            started: chrono::Utc::now().to_rfc3339(),
            task: task.to_string(),
        };
        let json = serde_json::to_string(&info).context("Failed to serialize lock info")?;

        // create_new so two racing processes cannot both win
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                let owner = read_lock(database).unwrap_or_else(unknown_owner);
                return Err(LockHeld(owner).into());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to create lock file: {}", path.display()))
            }
        };
        file.write_all(json.as_bytes())
            .with_context(|| format!("Failed to write lock file: {}", path.display()))?;

        debug!(path = %path.display(), task, "acquired reparse lock");
        Ok(Self { path, info })
    }

    pub fn info(&self) -> &LockInfo {
        &self.info
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for JobLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
        debug!(path = %self.path.display(), "released reparse lock");
    }
}

/// Check whether a process with the given PID is still running.
///
/// Uses `kill(pid, 0)` which checks for process existence without sending a signal.
/// Returns `true` if the process exists, even if owned by another user (EPERM).
#[cfg(unix)]
pub(crate) fn is_pid_alive(pid: u32) -> bool {
    if pid == 0 {
        return false;
    }
    // SAFETY: kill with signal 0 only checks process existence, no signal is sent.
    let ret = unsafe { libc::kill(pid as libc::pid_t, 0) };
    if ret == 0 {
        return true;
    }
    // EPERM means the process exists but belongs to another user
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
pub(crate) fn is_pid_alive(_pid: u32) -> bool {
    false
}
