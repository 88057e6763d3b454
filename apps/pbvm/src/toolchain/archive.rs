//! ZIP archive extraction.
//!
//! Release archives are extracted as-is: entry names map directly to paths
//! under the destination, and unix mode bits stored in the archive are
//! restored. An entry whose name would land outside the destination aborts
//! the whole extraction.

use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::errors::PbvmError;

/// Extracts a ZIP archive into `dest_dir`.
///
/// Creates the destination directory if it does not exist. Returns the
/// produced paths in archive order.
///
/// Entries already written stay on disk when extraction fails part-way;
/// callers extract into a staging directory they can discard.
///
/// # Errors
///
/// Returns an error if:
/// - The archive cannot be opened or is not a valid ZIP file
/// - An entry name is absolute or contains `..` ([`PbvmError::IllegalPath`])
/// - Directory or file creation fails
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>> {
    let file = std::fs::File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;

    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("Failed to read ZIP archive: {}", archive_path.display()))?;

    std::fs::create_dir_all(dest_dir)
        .with_context(|| format!("Failed to create directory: {}", dest_dir.display()))?;

    let mut produced = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("Failed to read archive entry {i}"))?;

        let relative_path = sanitize_entry_name(entry.name())?;
        let output_path = dest_dir.join(&relative_path);

        if entry.is_dir() {
            std::fs::create_dir_all(&output_path).with_context(|| {
                format!("Failed to create directory: {}", output_path.display())
            })?;
        } else {
            if let Some(parent) = output_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }

            let mut outfile = std::fs::File::create(&output_path)
                .with_context(|| format!("Failed to create file: {}", output_path.display()))?;

            std::io::copy(&mut entry, &mut outfile)
                .with_context(|| format!("Failed to extract: {}", output_path.display()))?;

            #[cfg(unix)]
            if let Some(mode) = entry.unix_mode() {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(
                    &output_path,
                    std::fs::Permissions::from_mode(mode & 0o7777),
                )
                .with_context(|| {
                    format!("Failed to set permissions on {}", output_path.display())
                })?;
            }
        }

        produced.push(output_path);
    }

    debug!(
        archive = %archive_path.display(),
        entries = produced.len(),
        "archive extracted"
    );
    Ok(produced)
}

/// Turns an archive entry name into a relative path that stays under the
/// destination.
///
/// Both `/` and `\` are treated as separators. `.` components are dropped.
///
/// # Errors
///
/// Returns [`PbvmError::IllegalPath`] for names that are empty, absolute,
/// carry a drive prefix, or contain `..`.
fn sanitize_entry_name(name: &str) -> Result<PathBuf> {
    let normalized = name.replace('\\', "/");
    let mut path = PathBuf::new();

    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(PbvmError::illegal_path(name).into());
            }
        }
    }

    // Drive letters only parse as prefixes on Windows.
    let has_drive = normalized.len() >= 2
        && normalized.as_bytes()[1] == b':'
        && normalized.as_bytes()[0].is_ascii_alphabetic();

    if path.as_os_str().is_empty() || has_drive {
        return Err(PbvmError::illegal_path(name).into());
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Creates a temporary test directory with a unique name.
    fn temp_test_dir(name: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("pbvm_test_{}_{}", name, rand::random::<u64>()));
        std::fs::create_dir_all(&dir).expect("Should create temp dir");
        dir
    }

    /// Writes a ZIP archive with the given `(name, content)` file entries.
    fn create_zip(archive_path: &Path, files: &[(&str, &[u8])]) {
        let file = std::fs::File::create(archive_path).expect("Should create file");
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();

        for (name, content) in files {
            zip.start_file(*name, options).expect("Should start file");
            zip.write_all(content).expect("Should write");
        }
        zip.finish().expect("Should finish");
    }

    fn illegal_path_of(err: &anyhow::Error) -> Option<&Path> {
        match err.downcast_ref::<PbvmError>() {
            Some(PbvmError::IllegalPath { path }) => Some(path),
            _ => None,
        }
    }

    #[test]
    fn extract_zip_preserves_structure() {
        let temp_dir = temp_test_dir("archive_preserve");
        let archive_path = temp_dir.join("protoc.zip");
        let dest_dir = temp_dir.join("output");

        create_zip(
            &archive_path,
            &[
                ("bin/protoc", b"binary content"),
                ("include/google/protobuf/any.proto", b"syntax = \"proto3\";"),
                ("readme.txt", b"readme"),
            ],
        );

        let produced = extract_zip(&archive_path, &dest_dir).expect("Should extract");

        assert_eq!(
            produced,
            vec![
                dest_dir.join("bin").join("protoc"),
                dest_dir
                    .join("include")
                    .join("google")
                    .join("protobuf")
                    .join("any.proto"),
                dest_dir.join("readme.txt"),
            ]
        );
        assert_eq!(
            std::fs::read(dest_dir.join("bin").join("protoc")).unwrap(),
            b"binary content"
        );

        let _ = std::fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn extract_zip_creates_directory_entries() {
        let temp_dir = temp_test_dir("archive_dirs");
        let archive_path = temp_dir.join("dirs.zip");
        let dest_dir = temp_dir.join("output");

        {
            let file = std::fs::File::create(&archive_path).expect("Should create file");
            let mut zip = zip::ZipWriter::new(file);
            let options = zip::write::SimpleFileOptions::default();
            zip.add_directory("include/", options)
                .expect("Should add directory");
            zip.finish().expect("Should finish");
        }

        let produced = extract_zip(&archive_path, &dest_dir).expect("Should extract");

        assert_eq!(produced, vec![dest_dir.join("include")]);
        assert!(dest_dir.join("include").is_dir());

        let _ = std::fs::remove_dir_all(&temp_dir);
    }

    #[cfg(unix)]
    #[test]
    fn extract_zip_restores_unix_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = temp_test_dir("archive_mode");
        let archive_path = temp_dir.join("mode.zip");
        let dest_dir = temp_dir.join("output");

        {
            let file = std::fs::File::create(&archive_path).expect("Should create file");
            let mut zip = zip::ZipWriter::new(file);
            let options = zip::write::SimpleFileOptions::default().unix_permissions(0o755);
            zip.start_file("bin/protoc", options)
                .expect("Should start file");
            zip.write_all(b"#!/bin/sh\n").expect("Should write");
            zip.finish().expect("Should finish");
        }

        extract_zip(&archive_path, &dest_dir).expect("Should extract");

        let mode = std::fs::metadata(dest_dir.join("bin").join("protoc"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);

        let _ = std::fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn extract_zip_rejects_parent_traversal() {
        let temp_dir = temp_test_dir("archive_traversal");
        let archive_path = temp_dir.join("evil.zip");
        let dest_dir = temp_dir.join("output");

        create_zip(&archive_path, &[("../../etc/passwd", b"root:x:0:0")]);

        let err = extract_zip(&archive_path, &dest_dir).expect_err("Should reject");

        assert_eq!(illegal_path_of(&err), Some(Path::new("../../etc/passwd")));
        assert!(err.to_string().contains("illegal file path"));
        assert!(!temp_dir.join("etc").exists());

        let _ = std::fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn extract_zip_empty_archive() {
        let temp_dir = temp_test_dir("archive_empty");
        let archive_path = temp_dir.join("empty.zip");
        let dest_dir = temp_dir.join("output");

        create_zip(&archive_path, &[]);

        let produced = extract_zip(&archive_path, &dest_dir).expect("Should extract");
        assert!(produced.is_empty());
        assert!(dest_dir.is_dir());

        let _ = std::fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn extract_zip_rejects_non_zip_file() {
        let temp_dir = temp_test_dir("archive_garbage");
        let archive_path = temp_dir.join("garbage.zip");
        std::fs::write(&archive_path, b"this is not a zip").unwrap();

        let err = extract_zip(&archive_path, &temp_dir.join("output")).expect_err("Should fail");
        assert!(err.to_string().contains("Failed to read ZIP archive"));

        let _ = std::fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn sanitize_accepts_relative_names() {
        assert_eq!(
            sanitize_entry_name("bin/protoc").unwrap(),
            PathBuf::from("bin").join("protoc")
        );
        assert_eq!(
            sanitize_entry_name("./include/x.proto").unwrap(),
            PathBuf::from("include").join("x.proto")
        );
        assert_eq!(
            sanitize_entry_name("include\\y.proto").unwrap(),
            PathBuf::from("include").join("y.proto")
        );
    }

    #[test]
    fn sanitize_rejects_escaping_names() {
        for name in [
            "../evil",
            "bin/../../evil",
            "/etc/passwd",
            "..\\evil",
            "C:/Windows/evil",
            "",
            ".",
        ] {
            let err = sanitize_entry_name(name).expect_err(name);
            assert!(illegal_path_of(&err).is_some(), "{name} should be illegal");
        }
    }
}
