//! In-memory asset resolver.

use std::collections::HashMap;

use stagehand_core::assets::{AssetKind, AssetMetadata, AssetResolver, is_placeholder};

/// Resolves a fixed table of assets. Unknown and placeholder ids resolve to
/// `None`.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAssets {
    entries: HashMap<(String, AssetKind), (String, AssetMetadata)>,
}

impl InMemoryAssets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a still asset.
    #[must_use]
    pub fn with(self, asset_id: &str, kind: AssetKind, url: &str) -> Self {
        self.with_metadata(asset_id, kind, url, AssetMetadata::default())
    }

    /// Adds an asset with explicit metadata.
    #[must_use]
    pub fn with_metadata(
        mut self,
        asset_id: &str,
        kind: AssetKind,
        url: &str,
        metadata: AssetMetadata,
    ) -> Self {
        self.entries
            .insert((asset_id.to_owned(), kind), (url.to_owned(), metadata));
        self
    }
}

impl AssetResolver for InMemoryAssets {
    fn resolve(&self, asset_id: &str, kind: AssetKind) -> Option<String> {
        if is_placeholder(asset_id) {
            return None;
        }
        self.entries
            .get(&(asset_id.to_owned(), kind))
            .map(|(url, _)| url.clone())
    }

    fn metadata(&self, asset_id: &str, kind: AssetKind) -> AssetMetadata {
        self.entries
            .get(&(asset_id.to_owned(), kind))
            .map(|(_, metadata)| *metadata)
            .unwrap_or_default()
    }
}
