//! Asset resolution collaborator.
//!
//! The engine never stores or decodes assets. It only turns authored asset
//! ids into URLs through an `AssetResolver` supplied by the host.

use serde::{Deserialize, Serialize};

/// The category an asset is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Background,
    Character,
    Image,
    Music,
    SoundEffect,
    Voice,
    Movie,
}

/// Playback hints stored alongside an asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetMetadata {
    /// The asset is a video rather than a still image.
    pub is_video: bool,
    /// The asset should loop when played.
    #[serde(rename = "loop")]
    pub looping: bool,
}

/// Resolves authored asset references into playable URLs.
pub trait AssetResolver: Send + Sync {
    /// Returns the URL for an asset, or `None` for unknown or placeholder
    /// references.
    fn resolve(&self, asset_id: &str, kind: AssetKind) -> Option<String>;

    /// Returns the playback hints for an asset. Unknown assets report the
    /// default (still, non-looping).
    fn metadata(&self, asset_id: &str, kind: AssetKind) -> AssetMetadata;
}

/// Returns `true` for asset ids that authors use as "nothing selected".
#[must_use]
pub fn is_placeholder(asset_id: &str) -> bool {
    let trimmed = asset_id.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("placeholder")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_placeholder_recognises_blank_and_sentinel_ids() {
        assert!(is_placeholder(""));
        assert!(is_placeholder("   "));
        assert!(is_placeholder("None"));
        assert!(is_placeholder("PLACEHOLDER"));
        assert!(!is_placeholder("bg-forest"));
    }
}
