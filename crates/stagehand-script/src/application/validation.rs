//! Project validation.
//!
//! Validation never blocks playback: the engine degrades around authoring
//! mistakes. The report exists so hosts and authoring tools can surface
//! them early.

use std::collections::HashSet;

use serde::Serialize;

use crate::domain::command::{ChoiceTarget, CommandKind};
use crate::domain::project::Project;
use crate::domain::scene::{Scene, SceneIndex, StructureIssue};

/// How serious a validation finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Playback degrades (a command becomes a no-op).
    Warning,
    /// A structural invariant of the script model is broken.
    Error,
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub scene_id: Option<String>,
    pub command_id: Option<String>,
    pub message: String,
}

/// All findings for a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Whether any finding breaks a structural invariant.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    fn push(
        &mut self,
        severity: Severity,
        scene_id: Option<&str>,
        command_id: Option<&str>,
        message: String,
    ) {
        self.issues.push(ValidationIssue {
            severity,
            scene_id: scene_id.map(str::to_owned),
            command_id: command_id.map(str::to_owned),
            message,
        });
    }
}

/// Checks a project's structural invariants and cross references.
#[must_use]
pub fn validate_project(project: &Project) -> ValidationReport {
    let mut report = ValidationReport::default();

    if project.scene(&project.start_scene_id).is_none() {
        report.push(
            Severity::Error,
            None,
            None,
            format!("start scene '{}' does not exist", project.start_scene_id),
        );
    }

    let mut scene_ids = HashSet::new();
    for scene in &project.scenes {
        if !scene_ids.insert(scene.id.as_str()) {
            report.push(
                Severity::Error,
                Some(scene.id.as_str()),
                None,
                format!("duplicate scene id '{}'", scene.id),
            );
        }
        validate_scene(project, scene, &mut report);
    }

    let mut variable_ids = HashSet::new();
    for variable in &project.variables {
        if !variable_ids.insert(variable.id.as_str()) {
            report.push(
                Severity::Error,
                None,
                None,
                format!("duplicate variable id '{}'", variable.id),
            );
        }
    }

    report
}

fn validate_scene(project: &Project, scene: &Scene, report: &mut ValidationReport) {
    let scene_id = Some(scene.id.as_str());
    let index = SceneIndex::build(&scene.commands);

    let mut command_ids = HashSet::new();
    for command in &scene.commands {
        if !command_ids.insert(command.id.as_str()) {
            report.push(
                Severity::Error,
                scene_id,
                Some(command.id.as_str()),
                format!("duplicate command id '{}'", command.id),
            );
        }
    }

    for issue in index.issues() {
        let (position, message) = match issue {
            StructureIssue::DuplicateLabel { label_id, index } => {
                (*index, format!("duplicate label '{label_id}'"))
            }
            StructureIssue::UnclosedBranch { branch_id, index } => {
                (*index, format!("branch '{branch_id}' is never closed"))
            }
            StructureIssue::OrphanBranchEnd { branch_id, index } => {
                (*index, format!("branch end '{branch_id}' has no matching start"))
            }
            StructureIssue::InterleavedBranch { branch_id, index } => (
                *index,
                format!("branch '{branch_id}' interleaves with an enclosing branch"),
            ),
        };
        let command_id = scene.commands.get(position).map(|c| c.id.as_str());
        report.push(Severity::Error, scene_id, command_id, message);
    }

    for command in &scene.commands {
        let warn = |report: &mut ValidationReport, message: String| {
            report.push(Severity::Warning, scene_id, Some(command.id.as_str()), message);
        };
        match &command.kind {
            CommandKind::Jump(jump) if project.scene(&jump.scene_id).is_none() => {
                warn(report, format!("jump targets unknown scene '{}'", jump.scene_id));
            }
            CommandKind::JumpToLabel(jump) if index.label(&jump.label_id).is_none() => {
                warn(report, format!("jump targets unknown label '{}'", jump.label_id));
            }
            CommandKind::ShowCharacter(show) if project.character(&show.character_id).is_none() => {
                warn(report, format!("unknown character '{}'", show.character_id));
            }
            CommandKind::HideCharacter(hide) if project.character(&hide.character_id).is_none() => {
                warn(report, format!("unknown character '{}'", hide.character_id));
            }
            CommandKind::SetVariable(set) if project.variable(&set.variable_id).is_none() => {
                warn(report, format!("unknown variable '{}'", set.variable_id));
            }
            CommandKind::TextInput(input) if project.variable(&input.variable_id).is_none() => {
                warn(report, format!("unknown variable '{}'", input.variable_id));
            }
            CommandKind::ShowScreen(show) if project.screen(&show.screen_id).is_none() => {
                warn(report, format!("unknown screen '{}'", show.screen_id));
            }
            CommandKind::Choice(choice) => {
                for option in &choice.options {
                    match &option.target {
                        ChoiceTarget::Scene { scene_id } if project.scene(scene_id).is_none() => {
                            warn(
                                report,
                                format!("option '{}' targets unknown scene '{scene_id}'", option.id),
                            );
                        }
                        ChoiceTarget::Label { label_id } if index.label(label_id).is_none() => {
                            warn(
                                report,
                                format!("option '{}' targets unknown label '{label_id}'", option.id),
                            );
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
}
