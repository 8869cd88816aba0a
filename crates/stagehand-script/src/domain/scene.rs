//! Scenes and their precompiled navigation index.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::command::{Command, CommandKind};

/// An ordered, named command tape. The unit a `Jump` targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub commands: Vec<Command>,
}

impl Scene {
    /// Creates a scene from its commands.
    pub fn new(id: impl Into<String>, name: impl Into<String>, commands: Vec<Command>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            commands,
        }
    }
}

/// A structural problem found while indexing a command tape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureIssue {
    /// A label id appears more than once; the first occurrence wins.
    DuplicateLabel { label_id: String, index: usize },
    /// A `BranchStart` never finds its `BranchEnd`.
    UnclosedBranch { branch_id: String, index: usize },
    /// A `BranchEnd` has no open `BranchStart` with its id.
    OrphanBranchEnd { branch_id: String, index: usize },
    /// A `BranchEnd` closes a branch while another branch opened inside it
    /// is still open.
    InterleavedBranch { branch_id: String, index: usize },
}

/// Label positions and branch pairs of one command tape, computed once per
/// scene load so navigation never rescans the tape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneIndex {
    labels: HashMap<String, usize>,
    branch_ends: HashMap<usize, usize>,
    issues: Vec<StructureIssue>,
}

impl SceneIndex {
    /// Indexes a command tape.
    #[must_use]
    pub fn build(commands: &[Command]) -> Self {
        let mut index = Self::default();
        let mut open: Vec<(&str, usize)> = Vec::new();

        for (position, command) in commands.iter().enumerate() {
            match &command.kind {
                CommandKind::Label(label) => {
                    if index.labels.contains_key(&label.label_id) {
                        index.issues.push(StructureIssue::DuplicateLabel {
                            label_id: label.label_id.clone(),
                            index: position,
                        });
                    } else {
                        index.labels.insert(label.label_id.clone(), position);
                    }
                }
                CommandKind::BranchStart(marker) => {
                    open.push((marker.branch_id.as_str(), position));
                }
                CommandKind::BranchEnd(marker) => {
                    let Some(depth) = open
                        .iter()
                        .rposition(|(branch_id, _)| *branch_id == marker.branch_id)
                    else {
                        index.issues.push(StructureIssue::OrphanBranchEnd {
                            branch_id: marker.branch_id.clone(),
                            index: position,
                        });
                        continue;
                    };
                    for (inner_id, inner_start) in open.drain(depth + 1..) {
                        index.issues.push(StructureIssue::InterleavedBranch {
                            branch_id: inner_id.to_owned(),
                            index: inner_start,
                        });
                    }
                    if let Some((_, start)) = open.pop() {
                        index.branch_ends.insert(start, position);
                    }
                }
                _ => {}
            }
        }

        for (branch_id, start) in open {
            index.issues.push(StructureIssue::UnclosedBranch {
                branch_id: branch_id.to_owned(),
                index: start,
            });
        }

        index
    }

    /// Position of a label, if the scene defines it.
    #[must_use]
    pub fn label(&self, label_id: &str) -> Option<usize> {
        self.labels.get(label_id).copied()
    }

    /// Position of the `BranchEnd` matching the `BranchStart` at `start`.
    #[must_use]
    pub fn branch_end(&self, start: usize) -> Option<usize> {
        self.branch_ends.get(&start).copied()
    }

    /// Structural problems found while indexing.
    #[must_use]
    pub fn issues(&self) -> &[StructureIssue] {
        &self.issues
    }
}
