//! Progress events for the update pipeline.
//!
//! The pipeline only emits events; rendering them (indicatif bars in the CLI,
//! nothing at all in tests) is up to the caller.

use std::path::PathBuf;

/// Progress events emitted while an update run moves through its phases.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// The Steam root was found and `compatibilitytools.d` is usable.
    TargetLocated { compat_tools_path: PathBuf },

    /// `compatibilitytools.d` was missing and has been created.
    CompatDirCreated { path: PathBuf },

    /// The release index named the newest release.
    ReleaseResolved { name: String },

    /// The newest release is already installed; nothing else will happen.
    AlreadyPresent { name: String },

    /// The archive download has started.
    DownloadStarted {
        filename: String,
        /// Total size in bytes, if the server reported it.
        total_bytes: Option<u64>,
    },

    /// Download progress update.
    DownloadProgress {
        bytes_downloaded: u64,
        total_bytes: Option<u64>,
    },

    /// The archive is fully staged on disk.
    DownloadFinished { path: PathBuf },

    /// The staged archive matched the published SHA-512 digest.
    Verified { filename: String },

    /// Prior versions were removed.
    Pruned { names: Vec<String> },

    /// Extraction into `compatibilitytools.d` has started.
    Extracting { name: String },

    /// The staged archive is being deleted.
    CleaningUp { path: PathBuf },
}

/// Callback type for receiving progress events.
pub type ProgressCallback<'a> = &'a dyn Fn(ProgressEvent);

/// A callback that drops every event.
pub fn silent(_event: ProgressEvent) {}
