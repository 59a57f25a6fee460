use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::PipelineError;
use crate::handlers::{HandlerDeps, HandlerOutcome, TaskHandlers};
use crate::intent::{Intent, IntentClassifier};
use crate::memory::{KnowledgeStore, LearnedKnowledge, UserProfileStore};
use crate::retrieval::{DietaryIndex, KnowledgeAggregator, WebResearcher};
use crate::services::llm::{OpenAiChatClient, TextGenerator};
use crate::services::search::SerperClient;
use crate::services::voice::{ElevenLabsVoice, SpeechSynthesizer};

use super::speech::SpeechStage;
use super::state::{ConversationState, StateDelta};

/// Nodes of the per-turn routing graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Route,
    Log,
    Shop,
    Eat,
    Ask,
    Speech,
    Done,
}

impl From<Intent> for Stage {
    fn from(intent: Intent) -> Self {
        match intent {
            Intent::Log => Stage::Log,
            Intent::Shop => Stage::Shop,
            Intent::Eat => Stage::Eat,
            Intent::Ask => Stage::Ask,
        }
    }
}

/// ROUTE -> {LOG, SHOP, EAT, ASK} -> SPEECH -> DONE, one pass per turn.
pub struct Pipeline {
    classifier: IntentClassifier,
    handlers: TaskHandlers,
    speech: SpeechStage,
}

impl Pipeline {
    pub fn new(llm: Arc<dyn TextGenerator>, handlers: TaskHandlers, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            classifier: IntentClassifier::new(llm),
            handlers,
            speech: SpeechStage::new(synthesizer),
        }
    }

    /// Wires the production collaborators from `config`. Store load
    /// failures degrade to empty views and are only logged.
    pub fn from_config(config: &AppConfig) -> Self {
        let llm: Arc<dyn TextGenerator> = Arc::new(OpenAiChatClient::from_config(config));
        let serper = Arc::new(SerperClient::from_config(config));
        let voice: Arc<dyn SpeechSynthesizer> = Arc::new(ElevenLabsVoice::from_config(config));

        let dietary = Arc::new(DietaryIndex::load_dir(&config.recommendations_dir));
        let knowledge = Arc::new(LearnedKnowledge::new(KnowledgeStore::open(config.knowledge_snapshot_path())));
        let profile = Arc::new(UserProfileStore::open(config.profile_path()));
        info!(reference_records = dietary.len(), "stores loaded");

        let researcher = WebResearcher::new(serper.clone(), llm.clone(), knowledge.clone());
        let aggregator = Arc::new(KnowledgeAggregator::new(dietary, knowledge, researcher));

        let handlers = TaskHandlers::new(HandlerDeps {
            llm: llm.clone(),
            food_log: profile,
            grocery: serper.clone(),
            places: serper.clone(),
            web: serper,
            knowledge: aggregator,
            location: config.location.clone(),
        });

        Self::new(llm, handlers, voice)
    }

    /// Runs one turn. Never fails: every recoverable problem ends up in
    /// the returned state's `error`.
    pub async fn invoke(&self, query: &str, voice_enabled: bool) -> ConversationState {
        let turn = Uuid::new_v4();
        let span = info_span!("turn", id = %turn);
        self.traverse(ConversationState::new(query, voice_enabled)).instrument(span).await
    }

    async fn traverse(&self, mut state: ConversationState) -> ConversationState {
        let mut stage = Stage::Route;
        loop {
            stage = match stage {
                Stage::Route => {
                    let classified = self.classifier.classify(state.query()).await;
                    let intent = match classified {
                        Ok(intent) => intent,
                        Err(e) => {
                            warn!("classification failed, defaulting to ASK: {}", e);
                            state.reduce(StateDelta::Diagnostic(format!("classification failed: {}", e)));
                            Intent::Ask
                        }
                    };
                    info!(%intent, "routed");
                    state.reduce(StateDelta::Routed(intent));
                    Stage::from(intent)
                }
                Stage::Log => {
                    let outcome = self.handlers.process_log(state.query()).await;
                    Self::apply(&mut state, outcome)
                }
                Stage::Shop => {
                    let outcome = self.handlers.process_shop(state.query()).await;
                    Self::apply(&mut state, outcome)
                }
                Stage::Eat => {
                    let outcome = self.handlers.process_eat(state.query()).await;
                    Self::apply(&mut state, outcome)
                }
                Stage::Ask => {
                    let outcome = self.handlers.process_ask(state.query()).await;
                    Self::apply(&mut state, outcome)
                }
                Stage::Speech => {
                    self.speech.run(&mut state).await;
                    Stage::Done
                }
                Stage::Done => return state,
            };
        }
    }

    fn apply(state: &mut ConversationState, outcome: HandlerOutcome) -> Stage {
        state.reduce(StateDelta::Responded(outcome.response_text));
        if let Some(e) = outcome.error {
            state.reduce(StateDelta::Diagnostic(e));
        }
        Stage::Speech
    }
}

/// Owns the pipeline once built. Invoking before `initialize` is the only
/// hard failure a caller can see.
#[derive(Default)]
pub struct PipelineRuntime {
    pipeline: OnceCell<Pipeline>,
}

impl PipelineRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(&self, pipeline: Pipeline) -> Result<(), PipelineError> {
        self.pipeline.set(pipeline).map_err(|_| PipelineError::AlreadyInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.pipeline.initialized()
    }

    pub async fn invoke(&self, query: &str, voice_enabled: bool) -> Result<ConversationState, PipelineError> {
        let pipeline = self.pipeline.get().ok_or(PipelineError::NotInitialized)?;
        Ok(pipeline.invoke(query, voice_enabled).await)
    }
}
