use thiserror::Error;

/// Failures of external collaborators (text generation, search, synthesis).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[error("{service} response could not be decoded: {reason}")]
    Decode { service: &'static str, reason: String },
    #[error("{0} is not configured (missing API key)")]
    MissingCredential(&'static str),
    #[error("{service} failed: {reason}")]
    Unavailable { service: &'static str, reason: String },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the persisted stores (knowledge cache, user profile).
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Hard faults of the pipeline entry point. Everything recoverable is
/// folded into `ConversationState::error` instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline has not been initialized")]
    NotInitialized,
    #[error("pipeline is already initialized")]
    AlreadyInitialized,
    #[error("configuration error: {0}")]
    Config(String),
}

/// Anything a task handler can fail on. Never leaves the handler; it is
/// rendered into the turn's diagnostic.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Memory(#[from] MemoryError),
}
