//! Command handlers, timing and the dispatcher.

pub mod audio;
pub mod command_handlers;
pub mod context;
pub mod dispatcher;
pub mod handlers;
pub mod outcome;
pub mod query_handlers;
pub mod timing;

#[cfg(test)]
pub(crate) mod testing;
