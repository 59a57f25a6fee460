//! Slot extraction plus the delegated action for each intent.

pub mod format;
pub mod tasks;

pub use tasks::{HandlerDeps, HandlerOutcome, TaskHandlers, APOLOGY};
