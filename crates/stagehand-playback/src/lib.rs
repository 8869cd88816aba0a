//! Stagehand playback: the scene script execution engine.
//!
//! Turns an authored command tape into live presentation state. The
//! [`application::dispatcher::Dispatcher`] owns the `PlaybackState`, steps
//! through commands, and suspends on input, timers and media until a resume
//! signal arrives.

pub mod application;
pub mod domain;
