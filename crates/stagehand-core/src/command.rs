//! Player command abstractions.
//!
//! Player commands are the external signals a host sends into a running
//! playback session: acknowledgements, choice picks, text submissions,
//! movie completion reports and so on.

use uuid::Uuid;

/// Trait that all player commands implement.
pub trait PlayerCommand: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> Uuid;

    /// The playback session the command targets.
    fn session_id(&self) -> Uuid;
}
