//! Executable lookup
//!
//! A path containing a directory component must exist, and is made absolute
//! against the current directory so it still names the same file when the
//! child runs elsewhere.
//! A bare program name is searched for in each `PATH` entry, the way a shell
//! would find it.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Resolve an executable path against the current `PATH`
///
/// Returns `None` when the executable cannot be found.
pub fn resolve_executable(path: &Path) -> Option<PathBuf> {
    let search_path = std::env::var_os("PATH");
    resolve_executable_in(path, search_path.as_deref())
}

/// Resolve an executable path against an explicit search path
pub fn resolve_executable_in(path: &Path, search_path: Option<&OsStr>) -> Option<PathBuf> {
    if path.as_os_str().is_empty() {
        return None;
    }

    if is_bare_name(path) {
        let search_path = search_path?;
        return std::env::split_paths(search_path)
            .filter(|dir| !dir.as_os_str().is_empty())
            .flat_map(|dir| candidates(&dir, path))
            .find(|candidate| candidate.is_file());
    }

    if !path.exists() {
        return None;
    }
    std::path::absolute(path).ok()
}

fn is_bare_name(path: &Path) -> bool {
    !path.is_absolute() && path.components().count() == 1 && !path.starts_with(".")
}

#[cfg(not(windows))]
fn candidates(dir: &Path, name: &Path) -> Vec<PathBuf> {
    vec![dir.join(name)]
}

#[cfg(windows)]
fn candidates(dir: &Path, name: &Path) -> Vec<PathBuf> {
    let mut out = vec![dir.join(name)];
    if name.extension().is_none() {
        for ext in ["exe", "cmd", "bat"] {
            out.push(dir.join(name).with_extension(ext));
        }
    }
    out
}
