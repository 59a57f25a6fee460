use std::sync::Arc;
use tracing::{debug, info};

use crate::errors::ServiceError;
use crate::memory::LearnedKnowledge;

use super::answer::{Answer, Provenance};
use super::dietary::DietaryIndex;
use super::web::WebResearcher;

/// Answers factual questions from the cheapest tier that has an
/// acceptable hit: reference tables, then learned knowledge, then the web.
pub struct KnowledgeAggregator {
    dietary: Arc<DietaryIndex>,
    knowledge: Arc<LearnedKnowledge>,
    web: WebResearcher,
}

impl KnowledgeAggregator {
    pub fn new(dietary: Arc<DietaryIndex>, knowledge: Arc<LearnedKnowledge>, web: WebResearcher) -> Self {
        Self { dietary, knowledge, web }
    }

    pub fn knowledge(&self) -> &Arc<LearnedKnowledge> {
        &self.knowledge
    }

    pub async fn search(&self, query: &str) -> Result<Answer, ServiceError> {
        let query = query.trim().to_lowercase();

        // 1. Reference tables. The top record must also name-match the query.
        if let Some(top) = self.dietary.search(&query, 1).into_iter().next() {
            let name = top.item.name.to_lowercase();
            if query.contains(&name) || name.contains(&query) {
                info!(tier = ?Provenance::DietaryGuidelines, record = %top.item.name, "answered");
                let body = format!("**{}**: {}", top.item.name, top.item.display_value());
                return Ok(Answer::new(body, Provenance::DietaryGuidelines));
            }
            debug!(record = %top.item.name, score = top.score, "dietary hit rejected");
        }

        // 2a. Exact structured entry.
        if let Some(food) = self.knowledge.structured_food(&query).await {
            info!(tier = ?Provenance::LearnedKnowledge, "answered from structured entry");
            return Ok(Answer::new(food.projection(&query), Provenance::LearnedKnowledge));
        }

        // 2b. Learned facts.
        if let Some(fact) = self.knowledge.search(&query, 1).await.into_iter().next() {
            info!(tier = ?Provenance::LearnedKnowledge, "answered from cache");
            return Ok(Answer::new(fact, Provenance::LearnedKnowledge));
        }

        // 3. Web.
        info!("cache miss, searching web");
        self.web.learn_from_web(&query).await
    }
}
