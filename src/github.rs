//! Release index lookup (GitHub releases API)
//!
//! Resolving the newest GE-Proton archive takes two requests: the latest release
//! descriptor lists its assets by API URL, and a second request against the chosen
//! asset yields the direct `browser_download_url`.

use serde::Deserialize;
use std::time::Duration;

use crate::config::InstallConfig;
use crate::error::{Result, UpdateError};
use crate::logging::{log_info, log_warning};

/// Archive format GE-Proton ships its builds in
pub const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// Suffix of the digest file published next to each archive
pub const CHECKSUM_SUFFIX: &str = ".sha512sum";

/// GitHub release metadata
#[derive(Deserialize, Debug, Clone)]
pub struct GithubRelease {
    pub tag_name: String,
    pub assets: Vec<GithubAsset>,
}

/// GitHub release asset as listed in a release
#[derive(Deserialize, Debug, Clone)]
pub struct GithubAsset {
    pub name: String,
    /// API location of the asset descriptor
    pub url: String,
    pub browser_download_url: String,
}

/// Asset descriptor returned when following [`GithubAsset::url`]
#[derive(Deserialize, Debug, Clone)]
pub struct AssetDetails {
    pub name: String,
    pub browser_download_url: String,
}

/// The archive to install, as resolved for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    /// Release name, which is also the directory the archive unpacks to
    pub display_name: String,
    pub download_url: String,
    pub staging_filename: String,
    /// Direct location of `<display_name>.sha512sum`, when published
    pub checksum_url: Option<String>,
}

/// Strip the archive suffix (and anything after it) from an asset filename.
///
/// Returns `None` if the filename does not contain [`ARCHIVE_SUFFIX`].
pub fn release_name(filename: &str) -> Option<&str> {
    filename.find(ARCHIVE_SUFFIX).map(|idx| &filename[..idx])
}

/// Blocking client for the release index.
pub struct ReleaseClient {
    agent: ureq::Agent,
    release_url: String,
    user_agent: String,
}

impl ReleaseClient {
    pub fn new(config: &InstallConfig) -> Self {
        Self {
            agent: http_agent(),
            release_url: config.release_url.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    pub fn agent(&self) -> &ureq::Agent {
        &self.agent
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Resolve the newest release's archive.
    pub fn resolve_latest(&self) -> Result<ReleaseAsset> {
        let release = self.fetch_latest_release()?;
        log_info(&format!(
            "Latest release is {} ({} assets)",
            release.tag_name,
            release.assets.len()
        ));

        let asset = select_archive(&release)?;
        let details = self.fetch_asset_details(&asset.url)?;

        let display_name = release_name(&asset.name)
            .unwrap_or(&asset.name)
            .to_string();
        let checksum_name = format!("{}{}", display_name, CHECKSUM_SUFFIX);
        let checksum_url = release
            .assets
            .iter()
            .find(|a| a.name == checksum_name)
            .map(|a| a.browser_download_url.clone());

        Ok(ReleaseAsset {
            display_name,
            download_url: details.browser_download_url,
            staging_filename: asset.name.clone(),
            checksum_url,
        })
    }

    /// First lookup: the latest release descriptor.
    pub fn fetch_latest_release(&self) -> Result<GithubRelease> {
        self.get_json(&self.release_url)
    }

    /// Second lookup: the asset descriptor holding the direct download location.
    pub fn fetch_asset_details(&self, asset_api_url: &str) -> Result<AssetDetails> {
        self.get_json(asset_api_url)
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        let response = self
            .agent
            .get(url)
            .set("User-Agent", &self.user_agent)
            .set("Accept", "application/vnd.github+json")
            .call()
            .map_err(|e| UpdateError::RemoteIndex {
                url: url.to_string(),
                reason: describe_ureq_error(e),
            })?;

        response.into_json().map_err(|e| UpdateError::RemoteIndex {
            url: url.to_string(),
            reason: format!("unexpected response body: {}", e),
        })
    }
}

/// Pick the archive asset out of a release.
///
/// Assets whose file name or release name could not be used as a single path
/// component (empty, `.`/`..`, containing a separator) are skipped.
pub fn select_archive(release: &GithubRelease) -> Result<&GithubAsset> {
    release
        .assets
        .iter()
        .filter(|a| a.name.ends_with(ARCHIVE_SUFFIX))
        .find(|a| {
            let usable = is_plain_file_name(&a.name)
                && release_name(&a.name).is_some_and(is_plain_file_name);
            if !usable {
                log_warning(&format!("Ignoring asset with unusable name {:?}", a.name));
            }
            usable
        })
        .ok_or_else(|| UpdateError::NoMatchingAsset {
            tag: release.tag_name.clone(),
            suffix: ARCHIVE_SUFFIX,
        })
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

pub(crate) fn http_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(15))
        .timeout_read(Duration::from_secs(120))
        .build()
}

/// Turn a ureq failure into a one-line reason ("HTTP 404 Not Found", transport message).
pub(crate) fn describe_ureq_error(err: ureq::Error) -> String {
    match err {
        ureq::Error::Status(code, response) => {
            format!("unexpected response: HTTP {} {}", code, response.status_text())
        }
        ureq::Error::Transport(transport) => transport.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str) -> GithubAsset {
        GithubAsset {
            name: name.to_string(),
            url: format!("https://api.example/assets/{}", name),
            browser_download_url: format!("https://dl.example/{}", name),
        }
    }

    #[test]
    fn test_release_name_strips_suffix() {
        assert_eq!(release_name("GE-Proton9-20.tar.gz"), Some("GE-Proton9-20"));
        assert_eq!(release_name("Pkg-1.2.3.tar.gz"), Some("Pkg-1.2.3"));
        assert_eq!(release_name("GE-Proton9-20.sha512sum"), None);
    }

    #[test]
    fn test_select_archive_skips_checksum() {
        let release = GithubRelease {
            tag_name: "GE-Proton9-20".to_string(),
            assets: vec![asset("GE-Proton9-20.sha512sum"), asset("GE-Proton9-20.tar.gz")],
        };
        let selected = select_archive(&release).unwrap();
        assert_eq!(selected.name, "GE-Proton9-20.tar.gz");
    }

    #[test]
    fn test_select_archive_without_match() {
        let release = GithubRelease {
            tag_name: "GE-Proton9-20".to_string(),
            assets: vec![asset("GE-Proton9-20.sha512sum")],
        };
        match select_archive(&release) {
            Err(UpdateError::NoMatchingAsset { tag, suffix }) => {
                assert_eq!(tag, "GE-Proton9-20");
                assert_eq!(suffix, ".tar.gz");
            }
            other => panic!("expected NoMatchingAsset, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_release_json() {
        let json = r#"{
            "tag_name": "GE-Proton9-20",
            "name": "GE-Proton9-20",
            "assets": [
                {
                    "name": "GE-Proton9-20.tar.gz",
                    "url": "https://api.github.com/repos/x/y/releases/assets/1",
                    "browser_download_url": "https://github.com/x/y/releases/download/GE-Proton9-20/GE-Proton9-20.tar.gz",
                    "size": 1234
                }
            ]
        }"#;
        let release: GithubRelease = serde_json::from_str(json).unwrap();
        assert_eq!(release.assets.len(), 1);
        assert!(release.assets[0].url.ends_with("/assets/1"));
    }

    #[test]
    fn test_select_archive_rejects_unusable_names() {
        for bad in [".tar.gz", "..tar.gz", "../GE-Proton9-20.tar.gz", "sub/GE-Proton9-20.tar.gz"] {
            let release = GithubRelease {
                tag_name: "GE-Proton9-20".to_string(),
                assets: vec![asset(bad)],
            };
            assert!(
                matches!(select_archive(&release), Err(UpdateError::NoMatchingAsset { .. })),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_select_archive_skips_to_usable_name() {
        let release = GithubRelease {
            tag_name: "GE-Proton9-20".to_string(),
            assets: vec![asset(".tar.gz"), asset("GE-Proton9-20.tar.gz")],
        };
        assert_eq!(select_archive(&release).unwrap().name, "GE-Proton9-20.tar.gz");
    }
}
