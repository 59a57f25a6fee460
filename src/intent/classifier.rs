use std::sync::Arc;
use tracing::debug;

use crate::errors::ServiceError;
use crate::services::llm::{prompts, ChatMessage, TextGenerator};

use super::types::Intent;

/// One-shot generative classification into [`Intent`].
pub struct IntentClassifier {
    llm: Arc<dyn TextGenerator>,
}

impl IntentClassifier {
    pub fn new(llm: Arc<dyn TextGenerator>) -> Self {
        Self { llm }
    }

    /// Any model output maps to a label; only a failed call is an error.
    pub async fn classify(&self, query: &str) -> Result<Intent, ServiceError> {
        let raw = self.llm.complete(&[ChatMessage::user(prompts::classify(query))]).await?;
        let intent = Intent::parse_label(&raw);
        debug!(raw = %raw.trim(), %intent, "classified");
        Ok(intent)
    }
}
