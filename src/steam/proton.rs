//! GE-Proton entries in compatibilitytools.d
//!
//! Presence check for a release and removal of previously installed versions.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;

use walkdir::WalkDir;

use crate::error::{PruneFailure, Result, UpdateError};
use crate::logging::{log_info, log_warning};

/// Name prefix every GE-Proton release directory carries
pub const GE_PROTON_PREFIX: &str = "GE-Proton";

/// An installed GE-Proton version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledEntry {
    /// Directory name (e.g., "GE-Proton9-20")
    pub name: String,
    pub path: PathBuf,
}

/// Whether `compat_tools_path/<name>` exists. Exact name match only.
#[must_use]
pub fn is_release_installed(name: &str, compat_tools_path: &Path) -> bool {
    compat_tools_path.join(name).exists()
}

/// Find every `GE-Proton*` entry directly inside `compat_tools_path`.
///
/// Sorted by name so output is stable. Entries that cannot be read are skipped.
pub fn find_installed_ge_protons(compat_tools_path: &Path) -> Vec<InstalledEntry> {
    let mut found: Vec<InstalledEntry> = WalkDir::new(compat_tools_path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            name.starts_with(GE_PROTON_PREFIX).then(|| InstalledEntry {
                name,
                path: entry.into_path(),
            })
        })
        .collect();

    found.sort_by(|a, b| a.name.cmp(&b.name));
    found
}

/// Delete every installed GE-Proton version except `keep`, one thread per entry.
///
/// `keep` is the staged archive: when staging happens inside `compatibilitytools.d`
/// it carries the prefix too and must survive. Its `.part` sibling is kept as well.
/// All deletions are attempted even if some fail; failures are reported together
/// as a single [`UpdateError::Prune`]. Returns the names that were removed.
pub fn prune_prior_versions(compat_tools_path: &Path, keep: &Path) -> Result<Vec<String>> {
    prune_with(compat_tools_path, keep, remove_entry)
}

pub(crate) fn prune_with<F>(compat_tools_path: &Path, keep: &Path, remove: F) -> Result<Vec<String>>
where
    F: Fn(&Path) -> io::Result<()> + Sync,
{
    let kept = protected_paths(keep);
    let entries: Vec<InstalledEntry> = find_installed_ge_protons(compat_tools_path)
        .into_iter()
        .filter(|entry| {
            let protected = kept.contains(&resolve(&entry.path));
            if protected {
                log_info(&format!("Keeping staged archive {}", entry.name));
            }
            !protected
        })
        .collect();
    if entries.is_empty() {
        log_info("No previous GE-Proton versions to remove");
        return Ok(Vec::new());
    }

    let remove = &remove;
    let results: Vec<(InstalledEntry, io::Result<()>)> = thread::scope(|scope| {
        let handles: Vec<_> = entries
            .into_iter()
            .map(|entry| {
                let path = entry.path.clone();
                (entry, scope.spawn(move || remove(&path)))
            })
            .collect();

        handles
            .into_iter()
            .map(|(entry, handle)| {
                let result = handle.join().unwrap_or_else(|_| {
                    Err(io::Error::other("deletion thread panicked"))
                });
                (entry, result)
            })
            .collect()
    });

    let mut removed = Vec::new();
    let mut failures = Vec::new();
    for (entry, result) in results {
        match result {
            Ok(()) => {
                log_info(&format!("Removed previous version {}", entry.name));
                removed.push(entry.name);
            }
            Err(e) => {
                log_warning(&format!("Failed to remove {}: {}", entry.path.display(), e));
                failures.push(PruneFailure {
                    path: entry.path,
                    reason: e.to_string(),
                });
            }
        }
    }

    if failures.is_empty() {
        Ok(removed)
    } else {
        Err(UpdateError::Prune(failures))
    }
}

/// `keep` and its `.part` download file, both resolved.
fn protected_paths(keep: &Path) -> [PathBuf; 2] {
    let mut part = keep.as_os_str().to_owned();
    part.push(".part");
    [resolve(keep), resolve(Path::new(&part))]
}

/// Canonical form of `path` with its final component left as is, so a symlink
/// entry is compared by its own location rather than its target.
fn resolve(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => fs::canonicalize(parent)
            .unwrap_or_else(|_| parent.to_path_buf())
            .join(name),
        _ => path.to_path_buf(),
    }
}

/// Remove a directory tree, or a plain file / symlink.
fn remove_entry(path: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
