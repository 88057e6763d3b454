//! GitHub releases API client.
//!
//! Releases of the compiler are published on GitHub. Two endpoints are used:
//!
//! - `GET {api}/repos/{owner}/{repo}/releases/tags/{tag}` for a single release
//! - `GET {api}/repos/{owner}/{repo}/releases?per_page={n}&page=1` for the latest releases
//!
//! Only the fields pbvm needs are deserialized:
//!
//! ```json
//! {
//!   "tag_name": "v3.12.3",
//!   "prerelease": false,
//!   "published_at": "2020-06-02T22:19:32Z",
//!   "assets": [
//!     {
//!       "name": "protoc-3.12.3-linux-x86_64.zip",
//!       "browser_download_url": "https://github.com/.../protoc-3.12.3-linux-x86_64.zip"
//!     }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::debug;

use super::date::format_rfc3339_date;
use crate::config::ReleaseSourceConfig;
use crate::errors::PbvmError;

/// Request timeout for API calls in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// User-Agent header for HTTP requests; GitHub rejects requests without one.
const USER_AGENT: &str = concat!("pbvm/", env!("CARGO_PKG_VERSION"));

/// A downloadable file attached to a release.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ReleaseAsset {
    /// File name, inspected for platform suitability.
    pub name: String,
    /// Direct download URL.
    pub browser_download_url: String,
}

/// A published release.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Release {
    /// Release tag, used verbatim as the version identifier.
    pub tag_name: String,
    /// Whether the release is marked as a pre-release.
    #[serde(default)]
    pub prerelease: bool,
    /// Publication timestamp in RFC 3339 format. Drafts have none.
    #[serde(default)]
    pub published_at: Option<String>,
    /// Files attached to the release.
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Returns the publication date as `YYYY.MM.DD`, or an empty string for
    /// unpublished releases.
    #[must_use]
    pub fn published_date(&self) -> String {
        self.published_at
            .as_deref()
            .map(format_rfc3339_date)
            .unwrap_or_default()
    }
}

/// Client for one GitHub repository's releases.
#[derive(Debug, Clone)]
pub struct ReleaseSource {
    client: reqwest::Client,
    base_url: String,
}

impl ReleaseSource {
    /// Creates a client for the configured repository.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the HTTP
    /// client cannot be built.
    pub fn new(config: &ReleaseSourceConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .context("GITHUB_TOKEN contains characters not allowed in a header")?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: format!(
                "{}/repos/{}/{}",
                config.api_url.trim_end_matches('/'),
                config.owner,
                config.repo
            ),
        })
    }

    /// Returns the URL of the release with the given tag.
    #[must_use]
    pub fn release_url(&self, tag: &str) -> String {
        format!("{}/releases/tags/{tag}", self.base_url)
    }

    /// Returns the URL listing the latest `count` releases.
    #[must_use]
    pub fn releases_url(&self, count: usize) -> String {
        format!("{}/releases?per_page={count}&page=1", self.base_url)
    }

    /// Fetches the release with the given tag.
    ///
    /// # Errors
    ///
    /// Returns [`PbvmError::ReleaseNotFound`] if the tag does not exist, or an
    /// error if the request fails or the response cannot be parsed.
    pub async fn fetch_release(&self, tag: &str) -> Result<Release> {
        let url = self.release_url(tag);
        debug!(%url, "fetching release");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch release from {url}"))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PbvmError::release_not_found(tag).into());
        }
        if !status.is_success() {
            return Err(handle_http_error(status, &url));
        }

        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response from {url}"))?;
        parse_release(&text).with_context(|| format!("Failed to parse release from {url}"))
    }

    /// Fetches the latest `count` releases, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn list_releases(&self, count: usize) -> Result<Vec<Release>> {
        let url = self.releases_url(count);
        debug!(%url, "listing releases");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch releases from {url}"))?;

        if !response.status().is_success() {
            return Err(handle_http_error(response.status(), &url));
        }

        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response from {url}"))?;
        parse_releases(&text).with_context(|| format!("Failed to parse releases from {url}"))
    }
}

fn parse_release(text: &str) -> Result<Release> {
    Ok(serde_json::from_str(text)?)
}

fn parse_releases(text: &str) -> Result<Vec<Release>> {
    Ok(serde_json::from_str(text)?)
}

/// Handles HTTP errors with user-friendly messages.
fn handle_http_error(status: reqwest::StatusCode, url: &str) -> anyhow::Error {
    match status.as_u16() {
        403 | 429 => anyhow::anyhow!(
            "GitHub API rate limit exceeded or access denied ({}): {url}. \
             Set GITHUB_TOKEN to raise the limit.",
            status.as_u16()
        ),
        code if code >= 500 => anyhow::anyhow!("Server error ({code}): {url}"),
        code => anyhow::anyhow!("HTTP error {code}: {url}"),
    }
}
