use serde::{Deserialize, Serialize};
use std::fmt;

/// Which tier produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    DietaryGuidelines,
    LearnedKnowledge,
    Web,
}

impl Provenance {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::DietaryGuidelines => "Official Dietary Guidelines",
            Self::LearnedKnowledge => "Learned Knowledge",
            Self::Web => "Learned from Web",
        }
    }

    fn footer(&self) -> String {
        match self {
            Self::Web => format!("*({})*", self.tag()),
            _ => format!("*(Source: {})*", self.tag()),
        }
    }
}

/// A factual answer and the single tier it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub body: String,
    pub provenance: Provenance,
}

impl Answer {
    pub fn new(body: impl Into<String>, provenance: Provenance) -> Self {
        Self { body: body.into(), provenance }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.body, self.provenance.footer())
    }
}
