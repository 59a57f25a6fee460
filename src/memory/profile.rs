use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::errors::MemoryError;
use crate::memory::types::{FoodLogEntry, UserProfile};

/// Memory/log collaborator the LOG handler writes to.
#[async_trait]
pub trait FoodLog: Send + Sync {
    async fn log_food(&self, name: &str, metadata: serde_json::Value) -> Result<(), MemoryError>;
}

/// JSON-file user profile: food history and favorites.
#[derive(Debug)]
pub struct UserProfileStore {
    path: Option<PathBuf>,
    profile: Mutex<UserProfile>,
}

impl UserProfileStore {
    pub fn ephemeral() -> Self {
        Self { path: None, profile: Mutex::new(UserProfile::default()) }
    }

    /// Loads the profile at `path`; a missing or unreadable file yields the
    /// default profile.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let profile = if path.exists() {
            read_profile(&path).unwrap_or_else(|e| {
                error!(path = %path.display(), "error loading profile: {}", e);
                UserProfile::default()
            })
        } else {
            UserProfile::default()
        };
        Self { path: Some(path), profile: Mutex::new(profile) }
    }

    async fn persist(&self, profile: &UserProfile) -> Result<(), MemoryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, serde_json::to_string_pretty(profile)?).await?;
        Ok(())
    }

    pub async fn profile(&self) -> UserProfile {
        self.profile.lock().await.clone()
    }

    pub async fn log_on(&self, date: NaiveDate, name: &str, metadata: serde_json::Value) -> Result<(), MemoryError> {
        let mut profile = self.profile.lock().await;
        profile.history.push(FoodLogEntry {
            date: date.to_string(),
            timestamp: Local::now().to_rfc3339(),
            food: name.to_string(),
            metadata,
            extra: serde_json::Map::new(),
        });
        info!(food = name, "food logged");
        self.persist(&profile).await
    }

    pub async fn entries_on(&self, date: NaiveDate) -> Vec<FoodLogEntry> {
        let day = date.to_string();
        self.profile
            .lock()
            .await
            .history
            .iter()
            .filter(|entry| entry.date == day)
            .cloned()
            .collect()
    }

    pub async fn today_log(&self) -> Vec<FoodLogEntry> {
        self.entries_on(Local::now().date_naive()).await
    }

    /// Last `limit` entries, oldest first.
    pub async fn recent_history(&self, limit: usize) -> Vec<FoodLogEntry> {
        let profile = self.profile.lock().await;
        let start = profile.history.len().saturating_sub(limit);
        profile.history[start..].to_vec()
    }

    /// Returns false if the food was already a favorite.
    pub async fn add_favorite(&self, name: &str) -> Result<bool, MemoryError> {
        let mut profile = self.profile.lock().await;
        if profile.favorites.iter().any(|f| f == name) {
            return Ok(false);
        }
        profile.favorites.push(name.to_string());
        self.persist(&profile).await?;
        Ok(true)
    }

    pub async fn favorites(&self) -> Vec<String> {
        self.profile.lock().await.favorites.clone()
    }
}

fn read_profile(path: &Path) -> Result<UserProfile, MemoryError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[async_trait]
impl FoodLog for UserProfileStore {
    async fn log_food(&self, name: &str, metadata: serde_json::Value) -> Result<(), MemoryError> {
        self.log_on(Local::now().date_naive(), name, metadata).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn history_is_filtered_by_day() {
        let store = UserProfileStore::ephemeral();
        let monday = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2026, 10, 13).unwrap();
        store.log_on(monday, "oats", json!({})).await.unwrap();
        store.log_on(tuesday, "apple", json!({"source": "user_input"})).await.unwrap();
        store.log_on(tuesday, "kale", json!({})).await.unwrap();

        let foods: Vec<String> = store.entries_on(tuesday).await.into_iter().map(|e| e.food).collect();
        assert_eq!(foods, vec!["apple", "kale"]);
        assert_eq!(store.recent_history(1).await[0].food, "kale");
        assert_eq!(store.recent_history(10).await.len(), 3);
    }

    #[tokio::test]
    async fn favorites_are_deduplicated() {
        let store = UserProfileStore::ephemeral();
        assert!(store.add_favorite("salmon").await.unwrap());
        assert!(!store.add_favorite("salmon").await.unwrap());
        assert_eq!(store.favorites().await, vec!["salmon"]);
    }

    #[tokio::test]
    async fn profile_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_profile.json");
        {
            let store = UserProfileStore::open(&path);
            store.log_food("banana", json!({"source": "user_input"})).await.unwrap();
        }
        let reopened = UserProfileStore::open(&path);
        let profile = reopened.profile().await;
        assert_eq!(profile.history.len(), 1);
        assert_eq!(profile.history[0].food, "banana");
    }

    #[tokio::test]
    async fn shared_profile_keys_survive_a_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_profile.json");
        let existing = json!({
            "name": "Sam",
            "favorites": ["oats"],
            "history": [{
                "date": "2026-10-15",
                "timestamp": "2026-10-15T08:00:00",
                "food": "porridge",
                "nutrients": { "kcal": 150 }
            }],
            "preferences": ["Vegetarian"],
            "sessions": { "s1": { "id": "s1", "title": "New Chat", "messages": [] } },
            "facts": ["I am vegan"]
        });
        fs::write(&path, existing.to_string()).unwrap();

        let store = UserProfileStore::open(&path);
        store.log_food("apple", json!({"source": "user_input"})).await.unwrap();

        let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["name"], "Sam");
        assert_eq!(saved["sessions"], existing["sessions"]);
        assert_eq!(saved["facts"], json!(["I am vegan"]));
        assert_eq!(saved["history"][0]["nutrients"], json!({ "kcal": 150 }));
        assert_eq!(saved["history"][1]["food"], "apple");
        assert_eq!(saved["history"][1]["nutrients"], json!({"source": "user_input"}));
    }

    #[test]
    fn corrupt_profile_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_profile.json");
        fs::write(&path, "{not json").unwrap();
        let store = UserProfileStore::open(&path);
        let profile = store.profile.try_lock().unwrap().clone();
        assert_eq!(profile, UserProfile::default());
    }
}
