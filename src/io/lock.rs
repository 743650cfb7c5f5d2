//! Single-instance lock file.
//!
//! The running scheduler holds an exclusive `flock` on
//! `$XDG_RUNTIME_DIR/duskmode.lock` and writes its PID into it. The
//! `reload` and `stop` commands read that PID to find the process to signal.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::constants::LOCK_FILE_NAME;
use crate::utils::{is_process_running, private_path};

/// Held for the lifetime of the scheduler; removes the file on drop.
#[derive(Debug)]
pub struct InstanceLock {
    file: File,
    path: PathBuf,
}

impl InstanceLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
        let _ = FileExt::unlock(&self.file);
    }
}

#[derive(Debug)]
pub enum LockOutcome {
    Acquired(InstanceLock),
    /// Another live scheduler holds the lock.
    Held { pid: u32 },
}

/// Lock file location, falling back to /tmp without a runtime dir.
pub fn lock_path() -> PathBuf {
    let runtime_dir = std::env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/tmp"));
    runtime_dir.join(LOCK_FILE_NAME)
}

pub fn acquire_lock() -> Result<LockOutcome> {
    acquire_lock_at(&lock_path())
}

/// Try to take the lock at `path`, reclaiming it once if its owner is gone.
pub fn acquire_lock_at(path: &Path) -> Result<LockOutcome> {
    if let Some(lock) = try_lock(path)? {
        return Ok(LockOutcome::Acquired(lock));
    }

    match read_pid(path) {
        Some(pid) if is_process_running(pid) => Ok(LockOutcome::Held { pid }),
        stale => {
            match stale {
                Some(pid) => log_warning!("Removing stale lock file (process {pid} is gone)"),
                None => log_warning!("Removing unreadable lock file {}", private_path(path)),
            }
            let _ = fs::remove_file(path);

            match try_lock(path)? {
                Some(lock) => Ok(LockOutcome::Acquired(lock)),
                None => Ok(LockOutcome::Held {
                    pid: read_pid(path).unwrap_or_default(),
                }),
            }
        }
    }
}

fn try_lock(path: &Path) -> Result<Option<InstanceLock>> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("Failed to open lock file {}", private_path(path)))?;

    if file.try_lock_exclusive().is_err() {
        return Ok(None);
    }

    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    writeln!(file, "{}", std::process::id())?;
    file.flush()?;

    Ok(Some(InstanceLock {
        file,
        path: path.to_path_buf(),
    }))
}

fn read_pid(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.lines().next()?.trim().parse().ok()
}

/// PID of the running scheduler, if there is one.
pub fn running_instance_pid() -> Option<u32> {
    running_instance_pid_at(&lock_path())
}

pub fn running_instance_pid_at(path: &Path) -> Option<u32> {
    read_pid(path).filter(|&pid| is_process_running(pid))
}
