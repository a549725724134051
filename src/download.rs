//! Archive download and staging
//!
//! Streams the release archive to the staging directory, reporting progress,
//! and checks it against the published SHA-512 digest when one exists.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha512};

use crate::error::{Result, UpdateError};
use crate::github::{describe_ureq_error, ReleaseAsset};
use crate::logging::{log_download, log_warning};
use crate::progress::{ProgressCallback, ProgressEvent};

const CHUNK_SIZE: usize = 64 * 1024;

/// Download `asset` into `staging_dir` and return the staged file's path.
///
/// The body goes to `<file>.part` first and is renamed once complete, so the
/// staged path either holds the whole archive or does not exist.
pub fn stage_archive(
    agent: &ureq::Agent,
    user_agent: &str,
    asset: &ReleaseAsset,
    staging_dir: &Path,
    progress: ProgressCallback<'_>,
) -> Result<PathBuf> {
    let dest = staging_dir.join(&asset.staging_filename);
    let partial = staging_dir.join(format!("{}.part", asset.staging_filename));
    let download_err = |reason: String| UpdateError::Download {
        url: asset.download_url.clone(),
        reason,
    };

    log_download(&format!("Downloading {}", asset.download_url));

    let response = agent
        .get(&asset.download_url)
        .set("User-Agent", user_agent)
        .call()
        .map_err(|e| download_err(describe_ureq_error(e)))?;

    let total_bytes = response
        .header("Content-Length")
        .and_then(|s| s.parse::<u64>().ok());

    progress(ProgressEvent::DownloadStarted {
        filename: asset.staging_filename.clone(),
        total_bytes,
    });

    let written = write_body(response.into_reader(), &partial, total_bytes, progress);
    let downloaded = match written {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_file(&partial);
            return Err(download_err(e.to_string()));
        }
    };

    if let Some(total) = total_bytes {
        if downloaded != total {
            let _ = fs::remove_file(&partial);
            return Err(download_err(format!(
                "connection closed after {} of {} bytes",
                downloaded, total
            )));
        }
    }

    if let Err(e) = fs::rename(&partial, &dest) {
        let _ = fs::remove_file(&partial);
        return Err(download_err(format!(
            "could not move download into place at {}: {}",
            dest.display(),
            e
        )));
    }

    log_download(&format!("Saved {} bytes to {}", downloaded, dest.display()));
    progress(ProgressEvent::DownloadFinished { path: dest.clone() });

    Ok(dest)
}

fn write_body(
    mut reader: impl Read,
    path: &Path,
    total_bytes: Option<u64>,
    progress: ProgressCallback<'_>,
) -> std::io::Result<u64> {
    let mut file = fs::File::create(path)?;
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut downloaded: u64 = 0;

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        file.write_all(&buffer[..bytes_read])?;
        downloaded += bytes_read as u64;

        progress(ProgressEvent::DownloadProgress {
            bytes_downloaded: downloaded,
            total_bytes,
        });
    }

    file.flush()?;
    file.sync_all()?;
    Ok(downloaded)
}

// ============================================================================
// Checksum verification
// ============================================================================

/// Verify a staged archive against the release's `.sha512sum` asset.
///
/// Returns `Ok(false)` when the release publishes no checksum. On mismatch the
/// staged file is removed before the error is returned.
pub fn verify_checksum(
    agent: &ureq::Agent,
    user_agent: &str,
    asset: &ReleaseAsset,
    staged: &Path,
) -> Result<bool> {
    let Some(url) = asset.checksum_url.as_deref() else {
        log_warning(&format!(
            "No checksum published for {}, skipping verification",
            asset.display_name
        ));
        return Ok(false);
    };

    let body = agent
        .get(url)
        .set("User-Agent", user_agent)
        .call()
        .map_err(|e| UpdateError::Download {
            url: url.to_string(),
            reason: describe_ureq_error(e),
        })?
        .into_string()
        .map_err(|e| UpdateError::Download {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let expected = parse_checksum(&body).ok_or_else(|| UpdateError::Download {
        url: url.to_string(),
        reason: "checksum file is empty".to_string(),
    })?;

    let actual = sha512_file(staged).map_err(|e| UpdateError::Download {
        url: asset.download_url.clone(),
        reason: format!("could not read {}: {}", staged.display(), e),
    })?;

    if !expected.eq_ignore_ascii_case(&actual) {
        let _ = fs::remove_file(staged);
        return Err(UpdateError::ChecksumMismatch {
            file: asset.staging_filename.clone(),
            expected: expected.to_lowercase(),
            actual,
        });
    }

    log_download(&format!("Checksum verified for {}", asset.staging_filename));
    Ok(true)
}

/// First token of a `sha512sum` line (`<hex>  <filename>`).
pub fn parse_checksum(body: &str) -> Option<String> {
    body.split_whitespace().next().map(str::to_string)
}

/// Lowercase hex SHA-512 of a file.
pub fn sha512_file(path: &Path) -> std::io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha512::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
