//! Steam path detection
//!
//! Computes the Steam root for the selected client layout and makes sure
//! `compatibilitytools.d` exists below it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SteamMode;
use crate::error::{Result, UpdateError};
use crate::logging::{log_error, log_info};

/// Directory Steam scans for custom compatibility tools
pub const COMPAT_TOOLS_DIR: &str = "compatibilitytools.d";

/// Permission bits for a freshly created `compatibilitytools.d`
pub const COMPAT_TOOLS_MODE: u32 = 0o755;

/// Where one run installs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    pub root_path: PathBuf,
    pub compat_tools_path: PathBuf,
    /// Whether `compatibilitytools.d` had to be created on this run
    pub created_compat_dir: bool,
}

/// Steam root for the given mode. Pure path computation, no filesystem access.
#[must_use]
pub fn root_path(home: &Path, mode: SteamMode) -> PathBuf {
    match mode {
        SteamMode::Native => home.join(".steam/root"),
        SteamMode::Flatpak => home.join(".var/app/com.valvesoftware.Steam/data/Steam"),
    }
}

/// Locate the install target, creating `compatibilitytools.d` if needed.
///
/// Fails with [`UpdateError::InstallRootMissing`] when the Steam root does not exist;
/// nothing is created in that case.
pub fn locate_install_target(home: &Path, mode: SteamMode) -> Result<InstallTarget> {
    let root_path = root_path(home, mode);
    if !root_path.exists() {
        log_error(&format!(
            "{} root not found at {}",
            mode.display_name(),
            root_path.display()
        ));
        return Err(UpdateError::InstallRootMissing(root_path));
    }

    let compat_tools_path = root_path.join(COMPAT_TOOLS_DIR);
    let created_compat_dir = if compat_tools_path.exists() {
        false
    } else {
        create_compat_dir(&compat_tools_path)?;
        log_info(&format!(
            "{} was not found and has been created.",
            compat_tools_path.display()
        ));
        true
    };

    Ok(InstallTarget {
        root_path,
        compat_tools_path,
        created_compat_dir,
    })
}

/// Create the directory with exactly [`COMPAT_TOOLS_MODE`]; mkdir alone is subject to the umask.
fn create_compat_dir(path: &Path) -> Result<()> {
    let compat_err = |source| UpdateError::CompatDir {
        path: path.to_path_buf(),
        source,
    };

    fs::create_dir(path).map_err(compat_err)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(COMPAT_TOOLS_MODE))
            .map_err(compat_err)?;
    }
    Ok(())
}
