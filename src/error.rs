//! Error types for the GE-Proton update pipeline.

use std::fmt;
use std::path::PathBuf;

/// Fatal failures of a single update run.
///
/// Every variant halts the pipeline; nothing is retried or repaired.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    /// The release index (or the asset descriptor behind it) could not be fetched or decoded.
    #[error("release index request to {url} failed: {reason}")]
    RemoteIndex { url: String, reason: String },

    /// The latest release carries no asset with the expected archive suffix.
    #[error("latest release {tag} has no asset ending in {suffix}")]
    NoMatchingAsset { tag: String, suffix: &'static str },

    /// The Steam root for the selected mode does not exist.
    #[error("a Steam folder was not found at the predicted location: {} (install Steam first)", .0.display())]
    InstallRootMissing(PathBuf),

    /// `compatibilitytools.d` was missing and could not be created.
    #[error("could not create {}: {source}", path.display())]
    CompatDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The archive or its checksum could not be downloaded or staged.
    #[error("download of {url} failed: {reason}")]
    Download { url: String, reason: String },

    /// The staged archive does not match the published SHA-512 digest.
    #[error("checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    /// One or more prior versions could not be removed.
    #[error("failed to remove prior versions: {}", format_prune_failures(.0))]
    Prune(Vec<PruneFailure>),

    /// The staged archive could not be unpacked into the compatibility-tools directory.
    #[error("extracting {} failed: {reason}", archive.display())]
    Extraction { archive: PathBuf, reason: String },
}

/// A single entry the pruner could not delete.
#[derive(Debug, Clone)]
pub struct PruneFailure {
    pub path: PathBuf,
    pub reason: String,
}

fn format_prune_failures(failures: &[PruneFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.path.display(), f.reason))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Non-fatal problem after a successful install (the staging file could not be removed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupWarning {
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for CleanupWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not delete downloaded archive {}: {}",
            self.path.display(),
            self.reason
        )
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, UpdateError>;
