use std::sync::Arc;
use tracing::{error, info, warn};

use crate::errors::ServiceError;
use crate::memory::LearnedKnowledge;
use crate::services::llm::{prompts, ChatMessage, TextGenerator};
use crate::services::search::WebSearch;

use super::answer::{Answer, Provenance};

const CONTEXT_SOURCES: usize = 3;

/// Last retrieval tier: search the web, summarize, and write the summary
/// back into the learned-knowledge cache.
pub struct WebResearcher {
    search: Arc<dyn WebSearch>,
    llm: Arc<dyn TextGenerator>,
    knowledge: Arc<LearnedKnowledge>,
}

impl WebResearcher {
    pub fn new(search: Arc<dyn WebSearch>, llm: Arc<dyn TextGenerator>, knowledge: Arc<LearnedKnowledge>) -> Self {
        Self { search, llm, knowledge }
    }

    /// Cache id for a learned query, e.g. `learned_dragon_fruit`.
    pub fn slug(query: &str) -> String {
        format!("learned_{}", query.trim().to_lowercase().replace(' ', "_"))
    }

    /// Only a failing summarization call is an error; an empty or failed
    /// search yields a not-found answer.
    pub async fn learn_from_web(&self, query: &str) -> Result<Answer, ServiceError> {
        let search_query = format!("{} nutrition facts health benefits", query);
        let results = match self.search.search(&search_query).await {
            Ok(results) => results,
            Err(e) => {
                warn!("web search failed, treating as no results: {}", e);
                Vec::new()
            }
        };

        if results.is_empty() {
            info!(query, "web search found nothing");
            return Ok(Answer::new(format!("I couldn't find information on '{}'.", query), Provenance::Web));
        }

        let context: String = results
            .iter()
            .take(CONTEXT_SOURCES)
            .enumerate()
            .map(|(i, hit)| format!("Source {} ({}): {}\n", i + 1, hit.title, hit.snippet))
            .collect();

        let summary = self
            .llm
            .complete(&[ChatMessage::user(prompts::summarize_sources(query, &context))])
            .await?;

        let slug = Self::slug(query);
        match self.knowledge.learn(&summary, Some(&slug)).await {
            Ok(true) => info!(id = %slug, "learned new fact from web"),
            Ok(false) => info!(id = %slug, "fact already known, not rewritten"),
            Err(e) => error!(id = %slug, "failed to persist learned fact: {}", e),
        }

        Ok(Answer::new(summary, Provenance::Web))
    }
}
