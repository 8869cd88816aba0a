//! Project loading, validation and asset resolution.

pub mod assets;
pub mod loader;
pub mod repository;
pub mod validation;
