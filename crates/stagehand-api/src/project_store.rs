//! Project loading: the file-backed repository and the startup check.

use std::path::PathBuf;

use async_trait::async_trait;
use stagehand_core::error::EngineError;
use stagehand_script::application::loader::{ProjectFormat, content_hash, parse_project};
use stagehand_script::application::repository::ProjectRepository;
use stagehand_script::application::validation::{Severity, ValidationReport, validate_project};
use stagehand_script::domain::project::Project;
use tracing::{error, info, warn};

/// Reads a JSON or YAML project file on every load.
#[derive(Debug, Clone)]
pub struct FileProjectRepository {
    path: PathBuf,
}

impl FileProjectRepository {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ProjectRepository for FileProjectRepository {
    async fn load_project(&self) -> Result<Project, EngineError> {
        let source = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            EngineError::Infrastructure(format!(
                "failed to read project file {}: {e}",
                self.path.display()
            ))
        })?;
        parse_project(&source, ProjectFormat::from_path(&self.path))
    }
}

/// Loads the project and logs every validation finding. Findings never
/// fail the load; the engine degrades around them at playback time.
///
/// # Errors
///
/// Returns the repository's error when the project cannot be loaded or
/// parsed.
pub async fn load_checked_project(
    repository: &dyn ProjectRepository,
) -> Result<(Project, ValidationReport), EngineError> {
    let project = repository.load_project().await?;
    let report = validate_project(&project);
    for issue in &report.issues {
        let scene_id = issue.scene_id.as_deref().unwrap_or("-");
        let command_id = issue.command_id.as_deref().unwrap_or("-");
        match issue.severity {
            Severity::Error => error!(scene_id, command_id, "{}", issue.message),
            Severity::Warning => warn!(scene_id, command_id, "{}", issue.message),
        }
    }
    info!(
        project_id = %project.id,
        scenes = project.scenes.len(),
        issues = report.issues.len(),
        content_hash = %content_hash(&project)?,
        "project loaded"
    );
    Ok((project, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_script::domain::scene::Scene;
    use stagehand_test_support::{FailingProjectRepository, InMemoryProjectRepository};
    use uuid::Uuid;

    const PROJECT_YAML: &str = "id: pilot\nname: Pilot\nstart_scene_id: intro\nscenes:\n  - id: intro\n    name: Intro\n    commands: []\n";

    #[tokio::test]
    async fn test_load_project_reads_yaml_file() {
        // Arrange
        let path = std::env::temp_dir().join(format!("stagehand-{}.yaml", Uuid::new_v4()));
        tokio::fs::write(&path, PROJECT_YAML).await.unwrap();
        let repo = FileProjectRepository::new(&path);

        // Act
        let project = repo.load_project().await;
        tokio::fs::remove_file(&path).await.unwrap();

        // Assert
        let project = project.unwrap();
        assert_eq!(project.id, "pilot");
        assert_eq!(project.scenes.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_infrastructure_error() {
        let repo = FileProjectRepository::new("/definitely/not/here.json");

        let result = repo.load_project().await;

        assert!(matches!(result, Err(EngineError::Infrastructure(_))));
    }

    #[tokio::test]
    async fn test_load_checked_project_reports_without_failing() {
        // Arrange
        let project = Project {
            id: "pilot".to_owned(),
            name: "Pilot".to_owned(),
            start_scene_id: "missing".to_owned(),
            scenes: vec![Scene::new("intro", "Intro", Vec::new())],
            characters: Vec::new(),
            variables: Vec::new(),
            screens: Vec::new(),
            assets: Vec::new(),
        };
        let repo = InMemoryProjectRepository::new(project);

        // Act
        let (loaded, report) = load_checked_project(&repo).await.unwrap();

        // Assert
        assert_eq!(loaded.id, "pilot");
        assert!(report.has_errors());
    }

    #[tokio::test]
    async fn test_load_checked_project_propagates_repository_error() {
        let result = load_checked_project(&FailingProjectRepository).await;

        assert!(matches!(result, Err(EngineError::Infrastructure(_))));
    }
}
