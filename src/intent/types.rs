use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse category of a user query. Decides which handler runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Intent {
    /// User reports something they ate.
    Log,
    /// User wants to buy food.
    Shop,
    /// User wants a restaurant.
    Eat,
    /// Anything else, including greetings.
    #[default]
    Ask,
}

impl Intent {
    /// Labels in parse priority order.
    pub const PRIORITY: [Intent; 4] = [Intent::Log, Intent::Shop, Intent::Eat, Intent::Ask];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Log => "LOG",
            Self::Shop => "SHOP",
            Self::Eat => "EAT",
            Self::Ask => "ASK",
        }
    }

    /// First label (in priority order) contained in the upper-cased model
    /// output; `Ask` when none is.
    pub fn parse_label(raw: &str) -> Self {
        let upper = raw.trim().to_uppercase();
        Self::PRIORITY
            .into_iter()
            .find(|intent| upper.contains(intent.label()))
            .unwrap_or_default()
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_and_noisy_labels() {
        assert_eq!(Intent::parse_label("LOG"), Intent::Log);
        assert_eq!(Intent::parse_label(" shop\n"), Intent::Shop);
        assert_eq!(Intent::parse_label("Intent: \"EAT\"."), Intent::Eat);
        assert_eq!(Intent::parse_label("ask"), Intent::Ask);
    }

    #[test]
    fn priority_decides_between_labels() {
        assert_eq!(Intent::parse_label("SHOP or LOG"), Intent::Log);
        // "BLOG" still contains LOG
        assert_eq!(Intent::parse_label("blog"), Intent::Log);
    }

    #[test]
    fn unknown_output_defaults_to_ask() {
        for raw in ["CHAT", "", "hello there", "¯\\_(ツ)_/¯"] {
            assert_eq!(Intent::parse_label(raw), Intent::Ask, "{raw:?}");
        }
    }

    #[test]
    fn serializes_as_label() {
        assert_eq!(serde_json::to_string(&Intent::Eat).unwrap(), "\"EAT\"");
    }
}
