use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A learned natural-language fact and its stable identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnedFact {
    pub id: String,
    pub text: String,
}

/// One `(nutrient, amount, unit)` line of a structured food entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientAmount {
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

/// Directly keyed nutrition record for a named food.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredFood {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nutrients: Vec<NutrientAmount>,
}

impl StructuredFood {
    /// Text projection used for lexical search and as a cache answer.
    pub fn projection(&self, name: &str) -> String {
        let mut text = format!("Nutrition for {}: {}. ", name, self.description);
        for nutrient in &self.nutrients {
            text.push_str(&format!("{}: {}{}. ", nutrient.name, nutrient.amount, nutrient.unit));
        }
        text
    }
}

/// On-disk form of the knowledge cache. `documents` and `doc_ids` are
/// index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeSnapshot {
    #[serde(default)]
    pub documents: Vec<String>,
    #[serde(default)]
    pub doc_ids: Vec<String>,
    #[serde(default)]
    pub structured_data: BTreeMap<String, StructuredFood>,
}

/// One food-log line in the user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodLogEntry {
    /// ISO date, e.g. `2026-10-16`.
    pub date: String,
    /// RFC 3339 timestamp.
    pub timestamp: String,
    pub food: String,
    /// Stored under `nutrients`, the key other readers of the profile use.
    #[serde(default, rename = "nutrients", alias = "metadata")]
    pub metadata: serde_json::Value,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    #[serde(default)]
    pub favorites: Vec<String>,
    #[serde(default)]
    pub history: Vec<FoodLogEntry>,
    #[serde(default)]
    pub preferences: Vec<String>,
    /// Keys owned by other collaborators sharing the file (sessions, facts).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "User".to_string(),
            favorites: Vec::new(),
            history: Vec::new(),
            preferences: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }
}
