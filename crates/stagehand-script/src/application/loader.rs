//! Project parsing and content hashing.

use std::fmt::Write as _;
use std::path::Path;

use sha2::{Digest, Sha256};
use stagehand_core::error::EngineError;

use crate::domain::project::Project;

/// Serialization format of a project file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectFormat {
    Json,
    Yaml,
}

impl ProjectFormat {
    /// Picks the format from a file extension; anything but `.yaml`/`.yml`
    /// is read as JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// Parses a project document.
///
/// # Errors
///
/// Returns `EngineError::Infrastructure` if the document is malformed.
pub fn parse_project(source: &str, format: ProjectFormat) -> Result<Project, EngineError> {
    match format {
        ProjectFormat::Json => serde_json::from_str(source)
            .map_err(|e| EngineError::Infrastructure(format!("project parse failed: {e}"))),
        ProjectFormat::Yaml => serde_yaml::from_str(source)
            .map_err(|e| EngineError::Infrastructure(format!("project parse failed: {e}"))),
    }
}

/// SHA-256 of the project's canonical JSON form, hex encoded.
///
/// Two projects with the same content hash play back identically.
///
/// # Errors
///
/// Returns `EngineError::Infrastructure` if the project cannot be serialized.
pub fn content_hash(project: &Project) -> Result<String, EngineError> {
    let canonical = serde_json::to_vec(project)
        .map_err(|e| EngineError::Infrastructure(format!("project serialization failed: {e}")))?;
    let digest = Sha256::digest(&canonical);
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    Ok(hex)
}
