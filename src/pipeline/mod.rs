//! Per-turn routing graph and its state.

pub mod graph;
pub mod speech;
pub mod state;

pub use graph::{Pipeline, PipelineRuntime, Stage};
pub use speech::SpeechStage;
pub use state::{ConversationState, StateDelta};
