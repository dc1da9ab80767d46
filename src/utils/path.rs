//! Path utilities: expand ~ in user-supplied paths, resolve device-relative paths.

use std::path::{Path, PathBuf};

pub fn expand_tilde(path: &str) -> PathBuf {
    if path.starts_with("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(path.trim_start_matches("~/"));
    }
    PathBuf::from(path)
}

/// Join a device-relative path onto the mount root.
/// A leading `/` is ignored so the result always stays under `root`.
pub fn under_root(root: &Path, relative: &str) -> PathBuf {
    root.join(relative.trim_start_matches('/'))
}
