//! HTTP download of release archives.
//!
//! The body is streamed to disk chunk by chunk, never held in memory as a
//! whole. It is written to `{dest}.part` first and renamed onto `dest` once
//! the stream completes, so an interrupted download never leaves a truncated
//! file under the cached name. Failed downloads are not retried.

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Minimum interval between progress updates in milliseconds.
const PROGRESS_INTERVAL_MS: u128 = 250;

/// Downloads `url` to `dest`.
///
/// Progress is printed to stderr when it is a terminal. With `timeout` set,
/// the whole request including the body must finish within it.
///
/// # Errors
///
/// Returns an error if:
/// - The request fails or times out
/// - The server returns a non-success status code
/// - The destination file cannot be created or written
pub async fn download_file(url: &str, dest: &Path, timeout: Option<Duration>) -> Result<()> {
    let part_path = part_path(dest);

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    debug!(%url, dest = %dest.display(), "downloading");
    if let Err(e) = stream_to_file(url, &part_path, timeout).await {
        let _ = tokio::fs::remove_file(&part_path).await;
        return Err(e);
    }

    tokio::fs::rename(&part_path, dest).await.with_context(|| {
        format!(
            "Failed to rename {} to {}",
            part_path.display(),
            dest.display()
        )
    })
}

/// Returns `{dest}.part`, keeping the original extension in the name.
fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

async fn stream_to_file(url: &str, dest: &Path, timeout: Option<Duration>) -> Result<()> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    let client = builder.build().context("Failed to create HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to connect to {url}"))?;

    if !response.status().is_success() {
        bail!("HTTP error {}: {url}", response.status());
    }

    let total_size = response.content_length().unwrap_or(0);
    let show_progress = std::io::stderr().is_terminal();

    let mut file = tokio::fs::File::create(dest)
        .await
        .with_context(|| format!("Failed to create file: {}", dest.display()))?;

    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;
    let start_time = Instant::now();
    let mut last_update = Instant::now();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.with_context(|| format!("Failed to read chunk from {url}"))?;
        file.write_all(&chunk)
            .await
            .with_context(|| format!("Failed to write to {}", dest.display()))?;
        downloaded += chunk.len() as u64;

        let now = Instant::now();
        if show_progress && now.duration_since(last_update).as_millis() >= PROGRESS_INTERVAL_MS {
            print_progress(downloaded, total_size, start_time.elapsed().as_secs_f64());
            last_update = now;
        }
    }

    file.flush()
        .await
        .with_context(|| format!("Failed to flush {}", dest.display()))?;

    if show_progress {
        print_progress(downloaded, total_size, start_time.elapsed().as_secs_f64());
        eprintln!();
    }
    debug!(bytes = downloaded, "download finished");

    Ok(())
}

/// Prints a single progress line to stderr, overwriting the previous one.
#[allow(clippy::cast_precision_loss)]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
fn print_progress(downloaded: u64, total: u64, elapsed_secs: f64) {
    let speed = if elapsed_secs > 0.0 {
        downloaded as f64 / elapsed_secs
    } else {
        0.0
    };
    let mut stderr = std::io::stderr().lock();
    if total > 0 {
        let percent = (downloaded as f64 / total as f64 * 100.0) as u8;
        let _ = write!(
            stderr,
            "\r{}/{} ({percent}%) {}     ",
            format_bytes(downloaded),
            format_bytes(total),
            format_speed(speed)
        );
    } else {
        let _ = write!(
            stderr,
            "\r{} {}     ",
            format_bytes(downloaded),
            format_speed(speed)
        );
    }
    let _ = stderr.flush();
}

/// Formats bytes into a human-readable string (KB, MB, GB).
fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    #[allow(clippy::cast_precision_loss)]
    let bytes_f = bytes as f64;

    if bytes_f >= GB {
        format!("{:.2} GB", bytes_f / GB)
    } else if bytes_f >= MB {
        format!("{:.2} MB", bytes_f / MB)
    } else if bytes_f >= KB {
        format!("{:.2} KB", bytes_f / KB)
    } else {
        format!("{bytes} B")
    }
}

/// Formats speed (bytes/sec) into a human-readable string.
fn format_speed(speed: f64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    if speed >= MB {
        format!("{:.2} MB/s", speed / MB)
    } else if speed >= KB {
        format!("{:.2} KB/s", speed / KB)
    } else {
        format!("{speed:.0} B/s")
    }
}
