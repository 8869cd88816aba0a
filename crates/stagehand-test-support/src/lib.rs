//! Shared test fakes and utilities for the Stagehand playback engine.

mod assets;
mod clock;
mod conditions;
mod media;
mod repository;
mod rng;

pub use assets::InMemoryAssets;
pub use clock::{FixedClock, ManualClock};
pub use conditions::FixedConditionEvaluator;
pub use media::{FailingPreloader, RecordingMediaHandle, RecordingPreloader, RecordingSoundEffects};
pub use repository::{FailingProjectRepository, InMemoryProjectRepository};
pub use rng::{MockRng, SequenceRng};
