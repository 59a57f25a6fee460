use serde::Serialize;

use crate::intent::Intent;

/// Strict state delta. This is the only way a turn's state mutates.
#[derive(Debug, Clone)]
pub enum StateDelta {
    Routed(Intent),
    Responded(String),
    Spoken(String),
    Diagnostic(String),
}

/// Per-request state threaded through ROUTE -> handler -> SPEECH -> DONE.
/// Created for one turn and dropped after the response is returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationState {
    query: String,
    intent: Intent,
    response_text: String,
    audio_path: Option<String>,
    error: Option<String>,
    voice_enabled: bool,
}

impl ConversationState {
    pub fn new(query: impl Into<String>, voice_enabled: bool) -> Self {
        Self {
            query: query.into(),
            intent: Intent::default(),
            response_text: String::new(),
            audio_path: None,
            error: None,
            voice_enabled,
        }
    }

    pub fn reduce(&mut self, delta: StateDelta) {
        match delta {
            StateDelta::Routed(intent) => self.intent = intent,
            StateDelta::Responded(text) => self.response_text = text,
            StateDelta::Spoken(path) => self.audio_path = Some(path),
            // Several stages may report; keep them all.
            StateDelta::Diagnostic(msg) => {
                self.error = Some(match self.error.take() {
                    Some(prev) => format!("{}; {}", prev, msg),
                    None => msg,
                })
            }
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn response_text(&self) -> &str {
        &self.response_text
    }

    pub fn audio_path(&self) -> Option<&str> {
        self.audio_path.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn voice_enabled(&self) -> bool {
        self.voice_enabled
    }
}
