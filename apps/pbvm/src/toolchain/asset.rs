//! Release asset selection.

use tracing::debug;

use super::platform::Platform;
use super::release::ReleaseAsset;

/// Reports whether an asset name fits the given platform.
///
/// A suitable name starts with `prefix`, contains `-{os}-` and contains
/// `-{arch}.`, e.g. `protoc-3.12.3-linux-x86_64.zip`.
#[must_use]
pub fn is_suitable_asset(name: &str, prefix: &str, arch: &str, os: &str) -> bool {
    name.starts_with(prefix)
        && name.contains(&format!("-{os}-"))
        && name.contains(&format!("-{arch}."))
}

/// Returns the first asset suitable for `platform`, in release order.
#[must_use]
pub fn select_asset<'a>(
    assets: &'a [ReleaseAsset],
    prefix: &str,
    platform: &Platform,
) -> Option<&'a ReleaseAsset> {
    let found = assets
        .iter()
        .find(|asset| is_suitable_asset(&asset.name, prefix, platform.arch(), platform.os()));

    match found {
        Some(asset) => debug!(asset = %asset.name, %platform, "selected release asset"),
        None => debug!(count = assets.len(), %platform, "no release asset matches platform"),
    }
    found
}
