//! Unpacking a staged release into compatibilitytools.d

use flate2::read::GzDecoder;
use std::fs;
use std::path::{Path, PathBuf};
use tar::Archive;

use crate::error::{CleanupWarning, Result, UpdateError};
use crate::logging::{log_install, log_warning};

/// Extract the gzip tarball at `archive_path` into `compat_tools_path`.
///
/// The archive is expected to hold a single top-level directory named after the
/// release. If `release_name` is missing afterwards a warning is logged, but the
/// extraction still counts as successful. Returns the release's install path.
pub fn extract_release(
    archive_path: &Path,
    compat_tools_path: &Path,
    release_name: &str,
) -> Result<PathBuf> {
    let extraction_err = |reason: String| UpdateError::Extraction {
        archive: archive_path.to_path_buf(),
        reason,
    };

    let tar_gz = fs::File::open(archive_path).map_err(|e| extraction_err(e.to_string()))?;
    let mut archive = Archive::new(GzDecoder::new(tar_gz));
    archive.set_preserve_permissions(true);
    archive.set_overwrite(true);

    log_install(&format!(
        "Extracting {} into {}",
        archive_path.display(),
        compat_tools_path.display()
    ));
    archive
        .unpack(compat_tools_path)
        .map_err(|e| extraction_err(e.to_string()))?;

    let install_path = compat_tools_path.join(release_name);
    if install_path.is_dir() {
        log_install(&format!("{} extracted", release_name));
    } else {
        log_warning(&format!(
            "Archive did not contain a top-level {} directory",
            release_name
        ));
    }
    Ok(install_path)
}

/// Delete the staged archive. Failure is reported, never fatal.
pub fn remove_staged(archive_path: &Path) -> Option<CleanupWarning> {
    match fs::remove_file(archive_path) {
        Ok(()) => None,
        Err(e) => {
            let warning = CleanupWarning {
                path: archive_path.to_path_buf(),
                reason: e.to_string(),
            };
            log_warning(&warning.to_string());
            Some(warning)
        }
    }
}
