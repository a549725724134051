#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::json;
use sha2::{Digest, Sha512};
use std::fs;
use std::path::{Path, PathBuf};
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Build a release tarball with a single `<name>/` top-level directory.
pub fn release_tarball(name: &str) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::fast());
    let mut builder = tar::Builder::new(encoder);

    for (file, body) in [
        ("proton", b"#!/usr/bin/env python3\n".as_slice()),
        ("compatibilitytool.vdf", b"\"compatibilitytools\" {}\n".as_slice()),
        ("files/bin/wine", b"ELF".as_slice()),
    ] {
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("{}/{}", name, file), body)
            .unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap()
}

pub fn sha512_hex(bytes: &[u8]) -> String {
    hex::encode(Sha512::digest(bytes))
}

/// What the mocked release index should serve.
pub struct MockRelease {
    pub name: String,
    pub archive: Vec<u8>,
    /// Contents of `<name>.sha512sum`; `None` means the asset is not published
    pub checksum: Option<String>,
    /// How many archive downloads the test expects
    pub expected_downloads: u64,
}

impl MockRelease {
    pub fn new(name: &str) -> Self {
        let archive = release_tarball(name);
        let checksum = Some(format!("{}  {}.tar.gz\n", sha512_hex(&archive), name));
        Self {
            name: name.to_string(),
            archive,
            checksum,
            expected_downloads: 1,
        }
    }

    pub fn expect_downloads(mut self, n: u64) -> Self {
        self.expected_downloads = n;
        self
    }

    pub fn without_checksum(mut self) -> Self {
        self.checksum = None;
        self
    }

    pub fn with_checksum(mut self, body: &str) -> Self {
        self.checksum = Some(body.to_string());
        self
    }

    pub async fn mount(self, server: &MockServer) {
        let uri = server.uri();
        let archive_file = format!("{}.tar.gz", self.name);
        let checksum_file = format!("{}.sha512sum", self.name);

        let mut assets = vec![json!({
            "name": archive_file,
            "url": format!("{}/assets/1", uri),
            "browser_download_url": format!("{}/unused/{}", uri, archive_file),
            "size": self.archive.len(),
        })];
        if self.checksum.is_some() {
            assets.insert(
                0,
                json!({
                    "name": checksum_file,
                    "url": format!("{}/assets/2", uri),
                    "browser_download_url": format!("{}/download/{}", uri, checksum_file),
                    "size": 160,
                }),
            );
        }

        Mock::given(method("GET"))
            .and(path("/releases/latest"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tag_name": self.name,
                "name": self.name,
                "assets": assets,
            })))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/assets/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": archive_file,
                "browser_download_url": format!("{}/download/{}", uri, archive_file),
            })))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/download/{}", archive_file)))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/octet-stream")
                    .set_body_bytes(self.archive),
            )
            .expect(self.expected_downloads)
            .mount(server)
            .await;

        if let Some(checksum) = self.checksum {
            Mock::given(method("GET"))
                .and(path(format!("/download/{}", checksum_file)))
                .respond_with(ResponseTemplate::new(200).set_body_string(checksum))
                .mount(server)
                .await;
        }
    }
}

pub fn latest_url(server: &MockServer) -> String {
    format!("{}/releases/latest", server.uri())
}

/// A fake home directory with a native Steam root (no compatibilitytools.d yet).
pub fn native_home() -> tempfile::TempDir {
    let home = tempfile::tempdir().unwrap();
    fs::create_dir_all(home.path().join(".steam/root")).unwrap();
    home
}

pub fn native_compat_dir(home: &Path) -> PathBuf {
    home.join(".steam/root/compatibilitytools.d")
}

/// Create `compat/<name>/proton` for each name.
pub fn install_fake(compat: &Path, names: &[&str]) {
    for name in names {
        fs::create_dir_all(compat.join(name)).unwrap();
        fs::write(compat.join(name).join("proton"), "old").unwrap();
    }
}

pub fn dir_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
