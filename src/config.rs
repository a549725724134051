use std::path::{Path, PathBuf};

use crate::error::{Result, UpdateError};

/// Latest GE-Proton release on GitHub
pub const DEFAULT_RELEASE_URL: &str =
    "https://api.github.com/repos/GloriousEggroll/proton-ge-custom/releases/latest";

/// Overrides [`DEFAULT_RELEASE_URL`] when set (mirrors, testing)
pub const RELEASE_URL_ENV: &str = "NEWEST_GE_RELEASE_URL";

const USER_AGENT: &str = concat!("newest-ge/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Steam Mode
// ============================================================================

/// Which Steam client layout to install into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SteamMode {
    /// Distro package or Valve's installer (`~/.steam/root`)
    #[default]
    Native,
    /// Flathub `com.valvesoftware.Steam`
    Flatpak,
}

impl SteamMode {
    pub fn from_flatpak_flag(flatpak: bool) -> Self {
        if flatpak {
            SteamMode::Flatpak
        } else {
            SteamMode::Native
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SteamMode::Native => "Steam",
            SteamMode::Flatpak => "Steam (Flatpak)",
        }
    }
}

// ============================================================================
// Install Config
// ============================================================================

/// Everything one run needs to know, passed explicitly through the pipeline.
#[derive(Debug, Clone)]
pub struct InstallConfig {
    pub mode: SteamMode,
    /// Delete every installed `GE-Proton*` entry before extracting the new one
    pub remove_old: bool,
    pub home: PathBuf,
    /// Where the archive is downloaded to before extraction
    pub staging_dir: PathBuf,
    pub release_url: String,
    pub user_agent: String,
}

impl InstallConfig {
    pub fn new(mode: SteamMode, remove_old: bool, home: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            remove_old,
            home: home.into(),
            staging_dir: PathBuf::from("."),
            release_url: DEFAULT_RELEASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
        }
    }

    /// Build the config for a CLI run: home from the environment, staging in the
    /// working directory, release URL from [`RELEASE_URL_ENV`] if present.
    pub fn from_env(mode: SteamMode, remove_old: bool) -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            UpdateError::InstallRootMissing(crate::steam::root_path(Path::new("~"), mode))
        })?;
        let staging_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        let mut config = Self::new(mode, remove_old, home).with_staging_dir(staging_dir);
        if let Ok(url) = std::env::var(RELEASE_URL_ENV) {
            if !url.trim().is_empty() {
                config = config.with_release_url(url.trim());
            }
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_release_url(mut self, url: impl Into<String>) -> Self {
        self.release_url = url.into();
        self
    }
}
