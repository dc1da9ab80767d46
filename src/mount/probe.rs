//! Mount point detection.

use std::path::Path;

/// Answers "is `path` currently a mount point?".
pub trait MountProbe {
    fn is_mounted(&self, path: &Path) -> bool;
}

/// Probe backed by the filesystem metadata of the path and its parent.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsMountProbe;

impl MountProbe for FsMountProbe {
    fn is_mounted(&self, path: &Path) -> bool {
        is_mount_point(path)
    }
}

impl<F> MountProbe for F
where
    F: Fn(&Path) -> bool,
{
    fn is_mounted(&self, path: &Path) -> bool {
        self(path)
    }
}

/// A directory is a mount point when it lives on a different device than
/// its parent, or when it is its own parent (`/`).
/// Symlinks and unreadable paths are never mount points.
#[cfg(unix)]
pub fn is_mount_point(path: &Path) -> bool {
    use std::fs;
    use std::os::unix::fs::MetadataExt;

    let Ok(meta) = fs::symlink_metadata(path) else {
        return false;
    };
    if meta.file_type().is_symlink() {
        return false;
    }
    let Ok(parent) = fs::symlink_metadata(path.join("..")) else {
        return false;
    };

    meta.dev() != parent.dev() || meta.ino() == parent.ino()
}

#[cfg(not(unix))]
pub fn is_mount_point(_path: &Path) -> bool {
    false
}
