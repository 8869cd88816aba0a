//! Playback state, patches, events and navigation.

pub mod commands;
pub mod events;
pub mod navigation;
pub mod patch;
pub mod state;
