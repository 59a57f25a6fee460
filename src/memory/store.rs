use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tokio::task;
use tracing::{error, info, warn};

use crate::errors::MemoryError;
use crate::memory::seed::BOOTSTRAP_FACTS;
use crate::memory::types::{KnowledgeSnapshot, LearnedFact, StructuredFood};
use crate::retrieval::lexical;

/// Append-only collection of learned facts plus structured food entries,
/// persisted as one JSON snapshot.
///
/// Writers must call [`KnowledgeStore::save`] after appending; shared access
/// goes through [`LearnedKnowledge`], which serializes append + save.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeStore {
    path: Option<PathBuf>,
    documents: Vec<String>,
    doc_ids: Vec<String>,
    structured: BTreeMap<String, StructuredFood>,
}

impl KnowledgeStore {
    /// In-memory store with no snapshot and no bootstrap facts.
    pub fn ephemeral() -> Self {
        Self::default()
    }

    /// Opens the snapshot at `path`. A missing snapshot is seeded with the
    /// bootstrap facts and written immediately; an unreadable one degrades
    /// to an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = Self {
            path: Some(path.into()),
            ..Self::default()
        };

        let exists = store.path.as_deref().is_some_and(Path::exists);
        if exists {
            if let Err(e) = store.load() {
                error!("knowledge snapshot unreadable, starting empty: {}", e);
                store.clear();
            }
        } else {
            store.seed();
            if let Err(e) = store.save() {
                error!("failed to persist seeded knowledge: {}", e);
            }
        }
        store
    }

    fn seed(&mut self) {
        for (i, text) in BOOTSTRAP_FACTS.iter().enumerate() {
            self.add_knowledge(text, Some(&format!("knowledge_{}", i)));
        }
        info!(facts = self.documents.len(), "knowledge cache seeded");
    }

    fn clear(&mut self) {
        self.documents.clear();
        self.doc_ids.clear();
        self.structured.clear();
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.doc_ids.iter().any(|existing| existing == id)
    }

    pub fn facts(&self) -> impl Iterator<Item = LearnedFact> + '_ {
        self.doc_ids
            .iter()
            .zip(&self.documents)
            .map(|(id, text)| LearnedFact { id: id.clone(), text: text.clone() })
    }

    /// Appends a fact. Without an id the next free `knowledge_<n>` is used.
    /// Returns false when a fact with the same id already exists.
    pub fn add_knowledge(&mut self, text: &str, id: Option<&str>) -> bool {
        let id = match id {
            Some(id) if self.contains_id(id) => return false,
            Some(id) => id.to_string(),
            None => {
                let mut n = self.documents.len();
                while self.contains_id(&format!("knowledge_{}", n)) {
                    n += 1;
                }
                format!("knowledge_{}", n)
            }
        };
        self.documents.push(text.to_string());
        self.doc_ids.push(id);
        true
    }

    /// Stores a structured entry keyed by lower-cased name, appends its text
    /// projection and persists.
    pub fn add_structured_food(&mut self, name: &str, info: StructuredFood) -> Result<(), MemoryError> {
        self.insert_structured_food(name, info);
        self.save()
    }

    /// Same as [`Self::add_structured_food`] without persisting.
    pub fn insert_structured_food(&mut self, name: &str, info: StructuredFood) {
        let key = normalize_food_name(name);
        let projection = info.projection(name);
        self.structured.insert(key.clone(), info);
        self.add_knowledge(&projection, Some(&format!("food_{}", key.replace(' ', "_"))));
    }

    pub fn get_structured_food(&self, name: &str) -> Option<&StructuredFood> {
        self.structured.get(&normalize_food_name(name))
    }

    /// Top `n` facts by keyword overlap; only positive scores are returned.
    pub fn search(&self, query: &str, n: usize) -> Vec<String> {
        lexical::search(query, self.documents.iter().map(String::as_str), n)
            .into_iter()
            .map(|hit| hit.item.to_string())
            .collect()
    }

    pub fn snapshot(&self) -> KnowledgeSnapshot {
        KnowledgeSnapshot {
            documents: self.documents.clone(),
            doc_ids: self.doc_ids.clone(),
            structured_data: self.structured.clone(),
        }
    }

    /// Writes the whole store. Ephemeral stores are a no-op.
    pub fn save(&self) -> Result<(), MemoryError> {
        match &self.path {
            Some(path) => write_snapshot(path, &self.snapshot()),
            None => Ok(()),
        }
    }

    pub fn load(&mut self) -> Result<(), MemoryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !path.exists() {
            return Ok(());
        }
        let content = fs::read_to_string(path)?;
        let snapshot: KnowledgeSnapshot = serde_json::from_str(&content)?;
        if snapshot.documents.len() != snapshot.doc_ids.len() {
            warn!(
                documents = snapshot.documents.len(),
                ids = snapshot.doc_ids.len(),
                "knowledge snapshot misaligned, keeping the aligned prefix"
            );
        }
        let aligned = snapshot.documents.len().min(snapshot.doc_ids.len());
        self.documents = snapshot.documents.into_iter().take(aligned).collect();
        self.doc_ids = snapshot.doc_ids.into_iter().take(aligned).collect();
        self.structured = snapshot.structured_data;
        Ok(())
    }
}

fn write_snapshot(path: &Path, snapshot: &KnowledgeSnapshot) -> Result<(), MemoryError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    // Replaced atomically via rename.
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Writes the store off the runtime threads. Callers hold the store lock
/// across the await, so writes stay serialized.
async fn persist(store: &KnowledgeStore) -> Result<(), MemoryError> {
    let Some(path) = store.path().map(Path::to_path_buf) else {
        return Ok(());
    };
    let snapshot = store.snapshot();
    task::spawn_blocking(move || write_snapshot(&path, &snapshot))
        .await
        .map_err(|e| MemoryError::Io(io::Error::other(e)))?
}

pub fn normalize_food_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Shared handle over a [`KnowledgeStore`] with a single writer at a time.
#[derive(Debug)]
pub struct LearnedKnowledge {
    store: Mutex<KnowledgeStore>,
}

impl LearnedKnowledge {
    pub fn new(store: KnowledgeStore) -> Self {
        Self { store: Mutex::new(store) }
    }

    pub async fn search(&self, query: &str, n: usize) -> Vec<String> {
        self.store.lock().await.search(query, n)
    }

    pub async fn structured_food(&self, name: &str) -> Option<StructuredFood> {
        self.store.lock().await.get_structured_food(name).cloned()
    }

    /// Appends and persists under one lock. Returns false if `id` was
    /// already known (nothing written).
    pub async fn learn(&self, text: &str, id: Option<&str>) -> Result<bool, MemoryError> {
        let mut store = self.store.lock().await;
        if !store.add_knowledge(text, id) {
            return Ok(false);
        }
        persist(&store).await?;
        Ok(true)
    }

    pub async fn add_structured_food(&self, name: &str, info: StructuredFood) -> Result<(), MemoryError> {
        let mut store = self.store.lock().await;
        store.insert_structured_food(name, info);
        persist(&store).await
    }

    pub async fn contains_id(&self, id: &str) -> bool {
        self.store.lock().await.contains_id(id)
    }

    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    pub async fn snapshot(&self) -> KnowledgeSnapshot {
        self.store.lock().await.snapshot()
    }

    /// Numbered markdown list of the top three hits.
    pub async fn describe(&self, query: &str) -> String {
        let results = self.search(query, 3).await;
        if results.is_empty() {
            return "No relevant nutrition information found in the knowledge base.".to_string();
        }
        let mut response = "**Nutrition Knowledge:**\n\n".to_string();
        for (i, result) in results.iter().enumerate() {
            response.push_str(&format!("{}. {}\n\n", i + 1, result));
        }
        response
    }
}
