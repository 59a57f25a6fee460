pub mod config;
pub mod errors;
pub mod handlers;
pub mod intent;
pub mod logging;
pub mod memory;
pub mod pipeline;
pub mod retrieval;
pub mod services;
pub mod test_utils;

// Re-export the entry points for convenient access
pub use config::AppConfig;
pub use pipeline::{ConversationState, Pipeline, PipelineRuntime};
