use std::sync::Arc;
use tracing::{debug, warn};

use crate::services::voice::SpeechSynthesizer;

use super::state::{ConversationState, StateDelta};

/// Upper bound on characters submitted for synthesis, marker included.
pub const MAX_SPOKEN_CHARS: usize = 1000;
pub const TRUNCATION_MARKER: &str = "...";

pub struct SpeechStage {
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl SpeechStage {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self { synthesizer }
    }

    /// Text to speak, or `None` when this turn stays silent.
    pub fn plan(response_text: &str, voice_enabled: bool) -> Option<String> {
        if !voice_enabled || response_text.is_empty() {
            return None;
        }
        let plain = response_text.replace("**", "").replace('*', "");
        if plain.chars().count() <= MAX_SPOKEN_CHARS {
            return Some(plain);
        }
        let keep = MAX_SPOKEN_CHARS - TRUNCATION_MARKER.len();
        let mut cut: String = plain.chars().take(keep).collect();
        cut.push_str(TRUNCATION_MARKER);
        Some(cut)
    }

    /// Never fails the turn; a synthesis error only lands in `error`.
    pub async fn run(&self, state: &mut ConversationState) {
        let Some(text) = Self::plan(state.response_text(), state.voice_enabled()) else {
            return;
        };
        match self.synthesizer.synthesize(&text).await {
            Ok(Some(path)) => {
                debug!(%path, "speech ready");
                state.reduce(StateDelta::Spoken(path));
            }
            Ok(None) => debug!("speech synthesis not configured"),
            Err(e) => {
                warn!("speech synthesis failed: {}", e);
                state.reduce(StateDelta::Diagnostic(format!("Voice failed: {}", e)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_when_disabled_or_empty() {
        assert_eq!(SpeechStage::plan("hello", false), None);
        assert_eq!(SpeechStage::plan("", true), None);
    }

    #[test]
    fn strips_emphasis() {
        assert_eq!(
            SpeechStage::plan("**Iron**: 8.7 mg *(Source: x)*", true).as_deref(),
            Some("Iron: 8.7 mg (Source: x)")
        );
    }

    #[test]
    fn long_text_is_cut_with_marker() {
        let text = "é".repeat(1500);
        let spoken = SpeechStage::plan(&text, true).unwrap_or_default();
        assert_eq!(spoken.chars().count(), MAX_SPOKEN_CHARS);
        assert!(spoken.ends_with(TRUNCATION_MARKER));

        let exact = "a".repeat(MAX_SPOKEN_CHARS);
        assert_eq!(SpeechStage::plan(&exact, true), Some(exact));
    }
}
