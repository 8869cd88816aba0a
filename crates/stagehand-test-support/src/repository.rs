//! `ProjectRepository` implementations for tests.

use async_trait::async_trait;
use stagehand_core::error::EngineError;
use stagehand_script::application::repository::ProjectRepository;
use stagehand_script::domain::project::Project;

/// A repository that hands out a clone of one project.
#[derive(Debug, Clone)]
pub struct InMemoryProjectRepository {
    project: Project,
}

impl InMemoryProjectRepository {
    #[must_use]
    pub fn new(project: Project) -> Self {
        Self { project }
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn load_project(&self) -> Result<Project, EngineError> {
        Ok(self.project.clone())
    }
}

/// A repository that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingProjectRepository;

#[async_trait]
impl ProjectRepository for FailingProjectRepository {
    async fn load_project(&self) -> Result<Project, EngineError> {
        Err(EngineError::Infrastructure("project file unreadable".into()))
    }
}
