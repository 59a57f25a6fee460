//! In-memory collaborators for exercising the pipeline without network access.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::{MemoryError, ServiceError};
use crate::handlers::{HandlerDeps, TaskHandlers};
use crate::memory::{FoodLog, KnowledgeStore, LearnedKnowledge};
use crate::pipeline::Pipeline;
use crate::retrieval::{DietaryIndex, KnowledgeAggregator, WebResearcher};
use crate::services::llm::{ChatMessage, TextGenerator};
use crate::services::search::{GroceryIndex, Place, PlacesIndex, SearchHit, ShoppingItem, WebSearch};
use crate::services::voice::SpeechSynthesizer;

type Script = dyn Fn(&str) -> Result<String, ServiceError> + Send + Sync;

/// Answers each call by running a script over the last message's content.
pub struct ScriptedGenerator {
    script: Box<Script>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&str) -> Result<String, ServiceError> + Send + Sync + 'static,
    {
        Self { script: Box::new(script), prompts: Mutex::new(Vec::new()) }
    }

    /// Keyword-driven stand-in for a real model; see [`nutrition_script`].
    pub fn nutrition() -> Self {
        Self::new(|prompt| Ok(nutrition_script(prompt)))
    }

    pub fn failing() -> Self {
        Self::new(|_| Err(ServiceError::Unavailable { service: "scripted llm", reason: "offline".to_string() }))
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ServiceError> {
        let prompt = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }
        (self.script)(&prompt)
    }
}

fn between<'a>(text: &'a str, open: &str, close: char) -> &'a str {
    text.split_once(open)
        .and_then(|(_, rest)| rest.split(close).next())
        .unwrap_or_default()
}

fn last_word(text: &str) -> String {
    text.split_whitespace()
        .last()
        .unwrap_or_default()
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_string()
}

/// Classifies on keywords, extracts the last word as the slot, summarizes
/// by naming the query, and rewrites by echoing the found information.
pub fn nutrition_script(prompt: &str) -> String {
    if prompt.starts_with("Classify this query") {
        let query = between(prompt, "query: \"", '"').to_lowercase();
        let label = if query.contains(" ate ") || query.starts_with("add ") {
            "LOG"
        } else if query.contains("buy") {
            "SHOP"
        } else if query.contains("restaurant") {
            "EAT"
        } else {
            "ASK"
        };
        return label.to_string();
    }
    if prompt.starts_with("Extract the ") {
        return last_word(between(prompt, "from: '", '\''));
    }
    if prompt.starts_with("You are an expert Dietitian") {
        let query = between(prompt, "information about \"", '"');
        return format!("- {} is high in fiber and vitamin C.", query);
    }
    if prompt.starts_with("You are EatWise") {
        let found = between(prompt, "Found Information: \"", '"');
        return format!("Great question! {}", found);
    }
    String::new()
}

/// Returns fixed hits and counts how often it was asked.
#[derive(Default)]
pub struct CountingWebSearch {
    hits: Vec<SearchHit>,
    queries: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl CountingWebSearch {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self { hits, ..Self::default() }
    }

    pub fn with_titles(titles: &[&str]) -> Self {
        Self::new(
            titles
                .iter()
                .map(|t| SearchHit { title: t.to_string(), snippet: format!("About {}", t), link: None })
                .collect(),
        )
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl WebSearch for CountingWebSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }
        Ok(self.hits.clone())
    }
}

#[derive(Default)]
pub struct StaticGrocery(pub Vec<ShoppingItem>);

#[async_trait]
impl GroceryIndex for StaticGrocery {
    async fn search(&self, _product: &str, _location: &str) -> Result<Vec<ShoppingItem>, ServiceError> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
pub struct StaticPlaces(pub Vec<Place>);

#[async_trait]
impl PlacesIndex for StaticPlaces {
    async fn search(&self, _cuisine: &str, _location: &str) -> Result<Vec<Place>, ServiceError> {
        Ok(self.0.clone())
    }
}

/// Records submitted text. Optionally fails every call.
#[derive(Default)]
pub struct RecordingSynthesizer {
    fail: bool,
    texts: Mutex<Vec<String>>,
}

impl RecordingSynthesizer {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SpeechSynthesizer for RecordingSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Option<String>, ServiceError> {
        if let Ok(mut texts) = self.texts.lock() {
            texts.push(text.to_string());
        }
        if self.fail {
            return Err(ServiceError::Unavailable { service: "recording synthesizer", reason: "quota exceeded".to_string() });
        }
        Ok(Some("/static/audio/response_test.mp3".to_string()))
    }
}

#[derive(Default)]
pub struct MemoryFoodLog {
    entries: Mutex<Vec<(String, Value)>>,
}

impl MemoryFoodLog {
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl FoodLog for MemoryFoodLog {
    async fn log_food(&self, name: &str, metadata: Value) -> Result<(), MemoryError> {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((name.to_string(), metadata));
        }
        Ok(())
    }
}

/// One adult bracket with vitamins A, C and D plus iron.
pub fn sample_dietary_index() -> DietaryIndex {
    let mut index = DietaryIndex::default();
    let table = serde_json::json!({
        "19-64": {
            "male": { "vitamin_c_mg": 40, "vitamin_a_mcg": 700, "vitamin_d_mcg": 10, "iron_mg": 8.7 },
            "female": { "vitamin_c_mg": 40, "vitamin_a_mcg": 600, "vitamin_d_mcg": 10, "iron_mg": 14.8 }
        }
    });
    index.add_table("uk_dietary_reference", &table);
    index
}

/// Every collaborator of a test pipeline, kept around for assertions.
pub struct TestKit {
    pub llm: Arc<ScriptedGenerator>,
    pub web: Arc<CountingWebSearch>,
    pub grocery: Arc<StaticGrocery>,
    pub places: Arc<StaticPlaces>,
    pub synthesizer: Arc<RecordingSynthesizer>,
    pub food_log: Arc<MemoryFoodLog>,
    pub knowledge: Arc<LearnedKnowledge>,
    pub dietary: Arc<DietaryIndex>,
    pub location: String,
}

impl Default for TestKit {
    fn default() -> Self {
        Self {
            llm: Arc::new(ScriptedGenerator::nutrition()),
            web: Arc::new(CountingWebSearch::with_titles(&["Dragon fruit facts", "Pitaya guide"])),
            grocery: Arc::new(StaticGrocery::default()),
            places: Arc::new(StaticPlaces::default()),
            synthesizer: Arc::new(RecordingSynthesizer::default()),
            food_log: Arc::new(MemoryFoodLog::default()),
            knowledge: Arc::new(LearnedKnowledge::new(KnowledgeStore::ephemeral())),
            dietary: Arc::new(sample_dietary_index()),
            location: "London".to_string(),
        }
    }
}

impl TestKit {
    pub fn aggregator(&self) -> KnowledgeAggregator {
        let researcher = WebResearcher::new(self.web.clone(), self.llm.clone(), self.knowledge.clone());
        KnowledgeAggregator::new(self.dietary.clone(), self.knowledge.clone(), researcher)
    }

    pub fn handlers(&self) -> TaskHandlers {
        TaskHandlers::new(HandlerDeps {
            llm: self.llm.clone(),
            food_log: self.food_log.clone(),
            grocery: self.grocery.clone(),
            places: self.places.clone(),
            web: self.web.clone(),
            knowledge: Arc::new(self.aggregator()),
            location: self.location.clone(),
        })
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.llm.clone(), self.handlers(), self.synthesizer.clone())
    }
}
