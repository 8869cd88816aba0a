//! Project repository abstraction.

use async_trait::async_trait;
use stagehand_core::error::EngineError;

use crate::domain::project::Project;

/// Source of the read-only project a host plays.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Loads the project snapshot.
    async fn load_project(&self) -> Result<Project, EngineError>;
}
