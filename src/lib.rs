//! newest-ge - keeps the newest GE-Proton installed for Steam
//!
//! Library crate for the update pipeline, shared with the CLI binary.
//! Note: terminal rendering lives in the binary, not here.

pub mod config;
pub mod download;
pub mod error;
pub mod github;
pub mod installer;
pub mod logging;
pub mod paths;
pub mod progress;
pub mod steam;
pub mod updater;

pub use config::{InstallConfig, SteamMode};
pub use error::{CleanupWarning, UpdateError};
pub use progress::ProgressEvent;
pub use updater::{update_ge_proton, UpdateOutcome};
