//! Script model types.

pub mod command;
pub mod conditions;
pub mod project;
pub mod scene;
pub mod value;
