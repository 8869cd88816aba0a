//! Stagehand script model.
//!
//! The authored, read-only data a playback session consumes: projects,
//! scenes and their command tapes, characters, variables and asset
//! references. Also hosts project validation and loading.

pub mod application;
pub mod domain;
