//! The authored project: scenes, characters, variables, screens and the
//! asset manifest.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stagehand_core::assets::{AssetKind, AssetMetadata};

use super::scene::Scene;
use super::value::{VariableType, VariableValue, Variables};

/// Read-only snapshot of everything a playback session plays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Scene playback starts from.
    pub start_scene_id: String,
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub variables: Vec<VariableDefinition>,
    #[serde(default)]
    pub screens: Vec<ScreenDefinition>,
    #[serde(default)]
    pub assets: Vec<AssetEntry>,
}

impl Project {
    /// Looks up a scene by id.
    #[must_use]
    pub fn scene(&self, scene_id: &str) -> Option<&Scene> {
        self.scenes.iter().find(|scene| scene.id == scene_id)
    }

    /// Looks up a character by id.
    #[must_use]
    pub fn character(&self, character_id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == character_id)
    }

    /// Looks up a variable definition by id.
    #[must_use]
    pub fn variable(&self, variable_id: &str) -> Option<&VariableDefinition> {
        self.variables.iter().find(|v| v.id == variable_id)
    }

    /// Looks up a screen definition by id.
    #[must_use]
    pub fn screen(&self, screen_id: &str) -> Option<&ScreenDefinition> {
        self.screens.iter().find(|s| s.id == screen_id)
    }

    /// Variable table at the start of a session: every declared variable at
    /// its default, coerced to its declared type.
    #[must_use]
    pub fn initial_variables(&self) -> Variables {
        self.variables
            .iter()
            .map(|definition| (definition.id.clone(), definition.initial_value()))
            .collect()
    }
}

/// A character and its layered art.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    /// Bottom of the image stack.
    #[serde(default)]
    pub base_asset_id: Option<String>,
    /// Layers above the base, bottom to top.
    #[serde(default)]
    pub layers: Vec<CharacterLayer>,
    #[serde(default)]
    pub expressions: Vec<Expression>,
    #[serde(default)]
    pub default_expression_id: Option<String>,
}

impl Character {
    /// Looks up an expression by id.
    #[must_use]
    pub fn expression(&self, expression_id: &str) -> Option<&Expression> {
        self.expressions.iter().find(|e| e.id == expression_id)
    }
}

/// One visual layer (eyes, mouth, outfit, ...) with its selectable assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterLayer {
    pub id: String,
    pub name: String,
    /// Selectable assets; a bound number variable picks one by index.
    #[serde(default)]
    pub asset_ids: Vec<String>,
}

/// A named pose: a static asset choice per layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub id: String,
    pub name: String,
    /// Replaces the character's base art when set.
    #[serde(default)]
    pub base_asset_id: Option<String>,
    /// Layer id → asset id.
    #[serde(default)]
    pub layers: BTreeMap<String, String>,
}

/// A declared project variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDefinition {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub variable_type: VariableType,
    #[serde(default)]
    pub default_value: Option<VariableValue>,
}

impl VariableDefinition {
    /// The value a session starts with.
    #[must_use]
    pub fn initial_value(&self) -> VariableValue {
        self.default_value.as_ref().map_or_else(
            || VariableValue::zero_of(self.variable_type),
            |value| value.coerce_to(self.variable_type),
        )
    }
}

/// A designed UI screen that `ShowScreen` can open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenDefinition {
    pub id: String,
    pub name: String,
}

/// An entry in the project's asset manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub id: String,
    pub kind: AssetKind,
    /// Path relative to the host's asset root.
    pub path: String,
    #[serde(flatten)]
    pub metadata: AssetMetadata,
}
