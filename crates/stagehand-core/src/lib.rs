//! Stagehand core: shared abstractions.
//!
//! This crate defines the collaborator traits and error types that the
//! script model, the playback engine and its hosts all depend on. It
//! contains no playback logic and no infrastructure code.

pub mod assets;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod media;
pub mod rng;
