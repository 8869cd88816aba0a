//! Asset resolution from a project's manifest.

use std::collections::HashMap;

use stagehand_core::assets::{AssetKind, AssetMetadata, AssetResolver, is_placeholder};

use crate::domain::project::Project;

/// Resolves asset ids against the project's asset manifest, joining each
/// manifest path onto a base URL.
#[derive(Debug, Clone)]
pub struct ManifestAssetResolver {
    entries: HashMap<String, (AssetKind, String, AssetMetadata)>,
}

impl ManifestAssetResolver {
    /// Indexes `project`'s manifest. `base_url` may or may not end in `/`.
    #[must_use]
    pub fn new(project: &Project, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let entries = project
            .assets
            .iter()
            .map(|entry| {
                let path = entry.path.trim_start_matches('/');
                let url = if base.is_empty() {
                    format!("/{path}")
                } else {
                    format!("{base}/{path}")
                };
                (entry.id.clone(), (entry.kind, url, entry.metadata))
            })
            .collect();
        Self { entries }
    }

    fn lookup(&self, asset_id: &str, kind: AssetKind) -> Option<&(AssetKind, String, AssetMetadata)> {
        self.entries
            .get(asset_id)
            .filter(|(entry_kind, _, _)| *entry_kind == kind)
    }
}

impl AssetResolver for ManifestAssetResolver {
    fn resolve(&self, asset_id: &str, kind: AssetKind) -> Option<String> {
        if is_placeholder(asset_id) {
            return None;
        }
        self.lookup(asset_id, kind).map(|(_, url, _)| url.clone())
    }

    fn metadata(&self, asset_id: &str, kind: AssetKind) -> AssetMetadata {
        self.lookup(asset_id, kind)
            .map(|(_, _, metadata)| *metadata)
            .unwrap_or_default()
    }
}
