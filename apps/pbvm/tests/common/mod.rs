//! Shared helpers for pbvm integration tests.
//!
//! An `httpmock::MockServer` stands in for both the GitHub API and the
//! release download host. The `serve_*` functions build mock specs usable
//! with `mock` and `mock_async` alike.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use httpmock::prelude::*;
use httpmock::{Then, When};
use pbvm::toolchain::Platform;

/// Release tag used across tests.
pub const VERSION: &str = "v3.12.3";

/// Asset name for `version` that matches the running platform.
pub fn asset_name(version: &str) -> String {
    let platform = Platform::detect();
    let number = version.trim_start_matches('v');
    format!("protoc-{number}-{}-{}.zip", platform.os(), platform.arch())
}

/// Download path of the platform asset for `version`.
pub fn asset_path(version: &str) -> String {
    format!("/download/{version}/{}", asset_name(version))
}

/// API path of the release with tag `version`.
pub fn release_path(version: &str) -> String {
    format!("/repos/protocolbuffers/protobuf/releases/tags/{version}")
}

/// API path listing releases.
pub fn releases_path() -> String {
    "/repos/protocolbuffers/protobuf/releases".to_string()
}

/// Release JSON with a source archive and the platform asset for `version`.
pub fn release_json(server_url: &str, version: &str) -> String {
    serde_json::json!({
        "tag_name": version,
        "prerelease": false,
        "published_at": "2020-06-02T22:19:32Z",
        "assets": [
            {
                "name": format!("protobuf-all-{}.zip", version.trim_start_matches('v')),
                "browser_download_url": format!("{server_url}/download/{version}/protobuf-all.zip"),
            },
            {
                "name": asset_name(version),
                "browser_download_url": format!("{server_url}{}", asset_path(version)),
            }
        ]
    })
    .to_string()
}

/// Two releases, newest first, as returned by the listing endpoint.
pub const RELEASES_JSON: &str = r#"[
    {"tag_name": "v3.13.0-rc1", "prerelease": true, "published_at": "2020-07-14T10:00:00Z"},
    {"tag_name": "v3.12.3", "prerelease": false, "published_at": "2020-06-02T22:19:32Z"}
]"#;

/// Serves the release JSON for `version`, with asset URLs on `server_url`.
pub fn serve_release(server_url: &str, version: &str) -> impl FnOnce(When, Then) {
    let path = release_path(version);
    let body = release_json(server_url, version);
    move |when, then| {
        when.method(GET).path(path);
        then.status(200)
            .header("content-type", "application/json")
            .body(body);
    }
}

/// Answers the release lookup for `version` with 404.
pub fn serve_missing_release(version: &str) -> impl FnOnce(When, Then) {
    let path = release_path(version);
    move |when, then| {
        when.method(GET).path(path);
        then.status(404).body(r#"{"message":"Not Found"}"#);
    }
}

/// Serves the platform asset of `version` with the bytes of `archive`.
pub fn serve_asset(version: &str, archive: Vec<u8>) -> impl FnOnce(When, Then) {
    let path = asset_path(version);
    move |when, then| {
        when.method(GET).path(path);
        then.status(200).body(archive);
    }
}

/// Serves [`RELEASES_JSON`] for a listing of `count` releases.
pub fn serve_releases(count: usize) -> impl FnOnce(When, Then) {
    move |when, then| {
        when.method(GET)
            .path(releases_path())
            .query_param("per_page", count.to_string());
        then.status(200)
            .header("content-type", "application/json")
            .body(RELEASES_JSON);
    }
}

/// Builds a protoc-like archive.
///
/// `bin/protoc` is a shell script printing `protoc {version}` and exiting
/// with its first argument (default 0).
pub fn protoc_zip(version: &str) -> Vec<u8> {
    let script = format!("#!/bin/sh\necho \"protoc {version}\"\nexit ${{1:-0}}\n");
    zip_bytes(&[
        ("bin/protoc", script.as_bytes(), 0o755),
        (
            "include/google/protobuf/any.proto",
            b"syntax = \"proto3\";\n",
            0o644,
        ),
        ("readme.txt", b"Protocol Buffers\n", 0o644),
    ])
}

/// Builds an archive containing a path traversal entry.
pub fn traversal_zip() -> Vec<u8> {
    zip_bytes(&[
        ("bin/protoc", b"ok", 0o755),
        ("../../etc/passwd", b"root:x:0:0", 0o644),
    ])
}

/// Builds an in-memory ZIP from `(name, content, mode)` entries.
pub fn zip_bytes(files: &[(&str, &[u8], u32)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content, mode) in files {
        let options = zip::write::SimpleFileOptions::default().unix_permissions(*mode);
        zip.start_file(*name, options).expect("Should start file");
        zip.write_all(content).expect("Should write");
    }
    zip.finish().expect("Should finish").into_inner()
}
