//! Keeps the newest GE-Proton installed
//!
//! Checks the latest GitHub release against `compatibilitytools.d` and, if it is
//! missing, downloads, verifies, optionally prunes older versions, and extracts it.

use std::path::{Path, PathBuf};

use crate::config::InstallConfig;
use crate::download::{stage_archive, verify_checksum};
use crate::error::{CleanupWarning, Result};
use crate::github::{ReleaseAsset, ReleaseClient};
use crate::installer::{extract_release, remove_staged};
use crate::logging::{log_error, log_info, log_install};
use crate::progress::{ProgressCallback, ProgressEvent};
use crate::steam::{is_release_installed, locate_install_target, prune_prior_versions};

/// Terminal result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The newest release was already installed; nothing was changed.
    AlreadyPresent {
        release: String,
        compat_tools_path: PathBuf,
    },
    /// The newest release was installed on this run.
    Installed {
        release: String,
        install_path: PathBuf,
        /// Prior versions removed before extraction
        pruned: Vec<String>,
        warnings: Vec<CleanupWarning>,
    },
}

impl UpdateOutcome {
    pub fn release(&self) -> &str {
        match self {
            UpdateOutcome::AlreadyPresent { release, .. } => release,
            UpdateOutcome::Installed { release, .. } => release,
        }
    }
}

/// Run the whole pipeline once.
///
/// Every step is sequential and the first failure is returned unchanged.
pub fn update_ge_proton(
    config: &InstallConfig,
    progress: ProgressCallback<'_>,
) -> Result<UpdateOutcome> {
    let result = run(config, progress);
    if let Err(e) = &result {
        log_error(&e.to_string());
    }
    result
}

fn run(config: &InstallConfig, progress: ProgressCallback<'_>) -> Result<UpdateOutcome> {
    log_info(&format!(
        "Checking {} (remove old versions: {})",
        config.mode.display_name(),
        config.remove_old
    ));

    // 1. Steam root + compatibilitytools.d
    let target = locate_install_target(&config.home, config.mode)?;
    if target.created_compat_dir {
        progress(ProgressEvent::CompatDirCreated {
            path: target.compat_tools_path.clone(),
        });
    }
    progress(ProgressEvent::TargetLocated {
        compat_tools_path: target.compat_tools_path.clone(),
    });

    // 2. What's latest
    let client = ReleaseClient::new(config);
    let asset = client.resolve_latest()?;
    progress(ProgressEvent::ReleaseResolved {
        name: asset.display_name.clone(),
    });

    // 3. Already installed?
    if is_release_installed(&asset.display_name, &target.compat_tools_path) {
        log_info(&format!(
            "{} is already in {}",
            asset.display_name,
            target.compat_tools_path.display()
        ));
        progress(ProgressEvent::AlreadyPresent {
            name: asset.display_name.clone(),
        });
        return Ok(UpdateOutcome::AlreadyPresent {
            release: asset.display_name,
            compat_tools_path: target.compat_tools_path,
        });
    }

    // 4. Download + verify
    let staged = stage_archive(
        client.agent(),
        client.user_agent(),
        &asset,
        &config.staging_dir,
        progress,
    )?;
    if verify_checksum(client.agent(), client.user_agent(), &asset, &staged)? {
        progress(ProgressEvent::Verified {
            filename: asset.staging_filename.clone(),
        });
    }

    // 5. Prune, 6. Extract + clean up
    if config.remove_old {
        prune_then_install(&asset, staged, &target.compat_tools_path, progress, prune_prior_versions)
    } else {
        install_staged(&asset, staged, &target.compat_tools_path, Vec::new(), progress)
    }
}

/// Remove prior versions (never the staged archive itself), then install.
///
/// A failed prune aborts before extraction and deletes the staged archive.
fn prune_then_install(
    asset: &ReleaseAsset,
    staged: PathBuf,
    compat_tools_path: &Path,
    progress: ProgressCallback<'_>,
    prune: impl FnOnce(&Path, &Path) -> Result<Vec<String>>,
) -> Result<UpdateOutcome> {
    let pruned = match prune(compat_tools_path, &staged) {
        Ok(removed) => removed,
        Err(e) => {
            let _ = remove_staged(&staged);
            return Err(e);
        }
    };
    progress(ProgressEvent::Pruned {
        names: pruned.clone(),
    });

    install_staged(asset, staged, compat_tools_path, pruned, progress)
}

fn install_staged(
    asset: &ReleaseAsset,
    staged: PathBuf,
    compat_tools_path: &Path,
    pruned: Vec<String>,
    progress: ProgressCallback<'_>,
) -> Result<UpdateOutcome> {
    progress(ProgressEvent::Extracting {
        name: asset.display_name.clone(),
    });
    let install_path = extract_release(&staged, compat_tools_path, &asset.display_name)?;

    progress(ProgressEvent::CleaningUp {
        path: staged.clone(),
    });
    let warnings: Vec<CleanupWarning> = remove_staged(&staged).into_iter().collect();

    log_install(&format!("{} was installed", asset.display_name));
    Ok(UpdateOutcome::Installed {
        release: asset.display_name.clone(),
        install_path,
        pruned,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::tests::release_tarball;
    use std::fs;

    fn asset(name: &str) -> ReleaseAsset {
        ReleaseAsset {
            display_name: name.to_string(),
            download_url: format!("https://dl.example/{}.tar.gz", name),
            staging_filename: format!("{}.tar.gz", name),
            checksum_url: None,
        }
    }

    #[test]
    fn test_install_staged_removes_archive() {
        let dir = tempfile::tempdir().unwrap();
        let compat = dir.path().join("compat");
        fs::create_dir_all(&compat).unwrap();
        let staged = dir.path().join("GE-Proton9-20.tar.gz");
        fs::write(&staged, release_tarball("GE-Proton9-20")).unwrap();

        let events = std::cell::RefCell::new(Vec::new());
        let record = |e: ProgressEvent| events.borrow_mut().push(e);
        let outcome = install_staged(&asset("GE-Proton9-20"), staged.clone(), &compat, vec![], &record)
            .unwrap();

        match outcome {
            UpdateOutcome::Installed { release, install_path, warnings, .. } => {
                assert_eq!(release, "GE-Proton9-20");
                assert!(install_path.join("proton").exists());
                assert!(warnings.is_empty());
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(!staged.exists());
        assert!(matches!(events.borrow()[0], ProgressEvent::Extracting { .. }));
    }

    #[test]
    fn test_root_missing_fails_before_network() {
        let home = tempfile::tempdir().unwrap();
        // Port 9 (discard) is never reached: the root check fails first.
        let config = InstallConfig::new(crate::config::SteamMode::Native, true, home.path())
            .with_release_url("http://127.0.0.1:9/latest")
            .with_staging_dir(home.path());

        let err = update_ge_proton(&config, &crate::progress::silent).unwrap_err();
        assert!(matches!(err, crate::error::UpdateError::InstallRootMissing(_)));
        assert_eq!(fs::read_dir(home.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_prune_spares_archive_staged_in_compat_dir() {
        let dir = tempfile::tempdir().unwrap();
        let compat = dir.path().join("compatibilitytools.d");
        fs::create_dir_all(compat.join("GE-Proton8-32")).unwrap();
        let staged = compat.join("GE-Proton9-20.tar.gz");
        fs::write(&staged, release_tarball("GE-Proton9-20")).unwrap();

        let outcome = prune_then_install(
            &asset("GE-Proton9-20"),
            staged.clone(),
            &compat,
            &crate::progress::silent,
            crate::steam::prune_prior_versions,
        )
        .unwrap();

        match outcome {
            UpdateOutcome::Installed { pruned, .. } => assert_eq!(pruned, vec!["GE-Proton8-32"]),
            other => panic!("unexpected outcome {:?}", other),
        }
        let names: Vec<_> = fs::read_dir(&compat)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["GE-Proton9-20"]);
    }

    #[test]
    fn test_failed_prune_skips_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let compat = dir.path().join("compat");
        for name in ["GE-Proton8-32", "GE-Proton9-1"] {
            fs::create_dir_all(compat.join(name)).unwrap();
        }
        let staged = dir.path().join("GE-Proton9-20.tar.gz");
        fs::write(&staged, release_tarball("GE-Proton9-20")).unwrap();

        let events = std::cell::RefCell::new(Vec::new());
        let record = |e: ProgressEvent| events.borrow_mut().push(e);
        let err = prune_then_install(&asset("GE-Proton9-20"), staged.clone(), &compat, &record, |compat, keep| {
            crate::steam::prune_with(compat, keep, |path| {
                if path.ends_with("GE-Proton8-32") {
                    Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "in use"))
                } else {
                    fs::remove_dir_all(path)
                }
            })
        })
        .unwrap_err();

        match err {
            crate::error::UpdateError::Prune(failures) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].path, compat.join("GE-Proton8-32"));
            }
            other => panic!("expected Prune, got {:?}", other),
        }
        assert!(compat.join("GE-Proton8-32").exists());
        assert!(!compat.join("GE-Proton9-1").exists());
        assert!(!compat.join("GE-Proton9-20").exists());
        assert!(!staged.exists());
        assert!(events.borrow().is_empty());
    }
}
