use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::errors::HandlerError;
use crate::memory::FoodLog;
use crate::retrieval::KnowledgeAggregator;
use crate::services::llm::{prompts, ChatMessage, TextGenerator};
use crate::services::search::{GroceryIndex, PlacesIndex, WebSearch};

use super::format;

pub const APOLOGY: &str =
    "I apologize, but I'm having trouble retrieving that information right now. Could you rephrase?";

/// What a handler hands back to the pipeline. `response_text` is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerOutcome {
    pub response_text: String,
    pub error: Option<String>,
}

impl HandlerOutcome {
    fn ok(response_text: String) -> Self {
        Self { response_text, error: None }
    }

    fn from_result(task: &'static str, result: Result<String, HandlerError>) -> Self {
        match result {
            Ok(text) => Self::ok(text),
            Err(e) => {
                error!(task, "handler failed: {}", e);
                Self { response_text: APOLOGY.to_string(), error: Some(e.to_string()) }
            }
        }
    }
}

/// Collaborators every handler may need, injected once at construction.
#[derive(Clone)]
pub struct HandlerDeps {
    pub llm: Arc<dyn TextGenerator>,
    pub food_log: Arc<dyn FoodLog>,
    pub grocery: Arc<dyn GroceryIndex>,
    pub places: Arc<dyn PlacesIndex>,
    pub web: Arc<dyn WebSearch>,
    pub knowledge: Arc<KnowledgeAggregator>,
    pub location: String,
}

/// The four task handlers. Each extracts one slot with a generative call,
/// then delegates to its action.
pub struct TaskHandlers {
    deps: HandlerDeps,
}

impl TaskHandlers {
    pub fn new(deps: HandlerDeps) -> Self {
        Self { deps }
    }

    pub fn location(&self) -> &str {
        &self.deps.location
    }

    pub async fn process_log(&self, query: &str) -> HandlerOutcome {
        HandlerOutcome::from_result("log", self.log(query).await)
    }

    pub async fn process_shop(&self, query: &str) -> HandlerOutcome {
        HandlerOutcome::from_result("shop", self.shop(query).await)
    }

    pub async fn process_eat(&self, query: &str) -> HandlerOutcome {
        HandlerOutcome::from_result("eat", self.eat(query).await)
    }

    pub async fn process_ask(&self, query: &str) -> HandlerOutcome {
        HandlerOutcome::from_result("ask", self.ask(query).await)
    }

    /// Falls back to the whole query when the model returns nothing.
    async fn extract_slot(&self, prompt: String, query: &str) -> Result<String, HandlerError> {
        let raw = self.deps.llm.complete(&[ChatMessage::user(prompt)]).await?;
        let slot = raw.trim();
        Ok(if slot.is_empty() { query.trim().to_string() } else { slot.to_string() })
    }

    async fn log(&self, query: &str) -> Result<String, HandlerError> {
        let food = self.extract_slot(prompts::extract_food(query), query).await?;
        self.deps.food_log.log_food(&food, json!({ "source": "user_input" })).await?;
        info!(%food, "logged food");
        Ok(format::log_confirmation(&food))
    }

    async fn shop(&self, query: &str) -> Result<String, HandlerError> {
        let product = self.extract_slot(prompts::extract_product(query), query).await?;
        let location = &self.deps.location;

        let items = self.deps.grocery.search(&product, location).await.unwrap_or_else(|e| {
            warn!("grocery search failed: {}", e);
            Vec::new()
        });
        if !items.is_empty() {
            return Ok(format::shopping(&items));
        }

        // Nothing in the shopping index; try organic results.
        let fallback = format!("Buy {} supermarkets {}", product, location);
        let hits = self.deps.web.search(&fallback).await.unwrap_or_else(|e| {
            warn!("organic grocery search failed: {}", e);
            Vec::new()
        });
        Ok(format::organic(&hits))
    }

    async fn eat(&self, query: &str) -> Result<String, HandlerError> {
        let cuisine = self.extract_slot(prompts::extract_cuisine(query), query).await?;
        let location = &self.deps.location;
        let places = self.deps.places.search(&cuisine, location).await.unwrap_or_else(|e| {
            warn!("places search failed: {}", e);
            Vec::new()
        });
        Ok(format::places(&cuisine, location, &places))
    }

    async fn ask(&self, query: &str) -> Result<String, HandlerError> {
        // 1. Raw fact, tagged with its tier
        let answer = self.deps.knowledge.search(query).await?;
        let raw = answer.to_string();

        // 2. Persona rewrite
        let reply = self
            .deps
            .llm
            .complete(&[ChatMessage::user(prompts::persona_rewrite(query, &raw))])
            .await?;
        let reply = reply.trim();
        Ok(if reply.is_empty() { raw } else { reply.to_string() })
    }
}
