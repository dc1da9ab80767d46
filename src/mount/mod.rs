//! MTP mount lifecycle: a temporary mount directory plus the background
//! FUSE process that serves the device filesystem into it.
//!
//! Both pieces are guards. Dropping them releases what they hold, so an
//! early `?` anywhere between acquire and release still unmounts the device
//! and removes the directory.

pub mod probe;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

pub use probe::{FsMountProbe, MountProbe, is_mount_point};

/// Temporary directory used as mount target.
///
/// Removal is never recursive: if the device is still attached the
/// directory is not empty and removal fails instead of touching device files.
#[derive(Debug)]
pub struct MountDir {
    path: PathBuf,
    removed: bool,
}

impl MountDir {
    pub fn create() -> AppResult<Self> {
        let path = tempfile::Builder::new()
            .prefix("waypoint-mtp-")
            .tempdir()?
            .keep();
        Ok(Self {
            path,
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the (now empty) directory, reporting failure to the caller.
    pub fn remove(mut self) -> AppResult<()> {
        self.removed = true;
        fs::remove_dir(&self.path)?;
        Ok(())
    }
}

impl Drop for MountDir {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = fs::remove_dir(&self.path) {
            error!(
                "Unable to remove mount directory. path=\"{}\" error=\"{}\"",
                self.path.display(),
                e
            );
        }
    }
}

/// Mount/unmount commands and polling budget.
#[derive(Debug, Clone)]
pub struct MountOptions {
    pub mount_cmd: Vec<String>,
    pub umount_cmd: Vec<String>,
    pub mount_attempts: u32,
    pub umount_attempts: u32,
    pub interval: Duration,
}

impl MountOptions {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            mount_cmd: cfg.mount_cmd.clone(),
            umount_cmd: cfg.umount_cmd.clone(),
            mount_attempts: cfg.mount_attempts,
            umount_attempts: cfg.umount_attempts,
            interval: cfg.poll_interval(),
        }
    }
}

/// How teardown ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Teardown {
    /// The path stopped being a mount point after `attempts` unmount requests.
    Unmounted { attempts: u32 },
    /// Still mounted after every attempt; waited for the mount process to exit.
    WaitedForMountProcess,
}

/// A running mount process whose mount point has been observed active.
pub struct MtpMount<P: MountProbe = FsMountProbe> {
    path: PathBuf,
    child: Option<Child>,
    opts: MountOptions,
    probe: P,
}

impl<P: MountProbe> MtpMount<P> {
    /// Start the mount command on `path` and block until the mount is active.
    ///
    /// Polls `mount_attempts` times, `interval` apart. On timeout the mount
    /// process is killed and reaped before `MountTimeout` is returned.
    pub fn acquire(path: &Path, opts: &MountOptions, probe: P) -> AppResult<Self> {
        let child = spawn_with_path(&opts.mount_cmd, path).map_err(|source| {
            AppError::MountSpawn {
                command: opts.mount_cmd.clone(),
                source,
            }
        })?;

        let mut mount = Self {
            path: path.to_path_buf(),
            child: Some(child),
            opts: opts.clone(),
            probe,
        };

        for _ in 0..opts.mount_attempts {
            if mount.probe.is_mounted(path) {
                info!("MTP mount active. path=\"{}\"", path.display());
                return Ok(mount);
            }
            info!("Waiting for MTP mount...");
            thread::sleep(opts.interval);
        }

        mount.abandon();
        Err(AppError::MountTimeout {
            path: path.to_path_buf(),
            attempts: opts.mount_attempts,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unmount the device and stop tracking the mount process.
    pub fn release(mut self) -> Teardown {
        self.teardown().unwrap_or(Teardown::Unmounted { attempts: 0 })
    }

    fn teardown(&mut self) -> Option<Teardown> {
        let mut child = self.child.take()?;

        for attempt in 1..=self.opts.umount_attempts {
            if let Err(e) = run_with_path(&self.opts.umount_cmd, &self.path) {
                error!("Unmount failed. attempt={} error=\"{}\"", attempt, e);
                thread::sleep(self.opts.interval);
                continue;
            }
            if !self.probe.is_mounted(&self.path) {
                info!("MTP unmounted. path=\"{}\"", self.path.display());
                // Reap the FUSE process if it already exited on its own.
                let _ = child.try_wait();
                return Some(Teardown::Unmounted { attempts: attempt });
            }
            info!("Waiting for MTP unmount...");
            thread::sleep(self.opts.interval);
        }

        warn!(
            "Still mounted after {} unmount attempts, waiting for the mount process to exit",
            self.opts.umount_attempts
        );
        if let Err(e) = child.wait() {
            error!("Unable to wait for mount process. error=\"{}\"", e);
        }
        Some(Teardown::WaitedForMountProcess)
    }

    fn abandon(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl<P: MountProbe> Drop for MtpMount<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Split a command list into program and fixed arguments, then append `path`.
fn command_with_path(cmd: &[String], path: &Path) -> io::Result<Command> {
    let (program, args) = cmd
        .split_first()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;
    let mut command = Command::new(program);
    command.args(args).arg(path);
    Ok(command)
}

fn spawn_with_path(cmd: &[String], path: &Path) -> io::Result<Child> {
    command_with_path(cmd, path)?.spawn()
}

fn run_with_path(cmd: &[String], path: &Path) -> io::Result<()> {
    let status = command_with_path(cmd, path)?.status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("command {:?} exited with {}", cmd, status)))
    }
}
