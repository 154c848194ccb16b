//! Corpus persistence for accepted events.
//!
//! A corpus is the set of previously accepted events for one source. The
//! file-backed store writes one JSON array per source per capture day under
//! the configured data directory.

use crate::domain::NormalizedEvent;
use crate::error::{AggregatorError, Result};
use crate::normalize::datetime::hk_offset;
use crate::sources::{SourceDescriptor, SourcePriority, SourceType};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// An accepted event with its source provenance and capture timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredEvent {
    #[serde(flatten)]
    pub event: NormalizedEvent,
    pub source_name: String,
    pub source_type: SourceType,
    pub source_priority: SourcePriority,
    pub scraped_at: String,
}

impl StoredEvent {
    /// Stamps an accepted event with the descriptor's provenance fields and
    /// the current Hong Kong local time.
    pub fn stamped(event: NormalizedEvent, descriptor: &SourceDescriptor) -> Self {
        Self {
            event,
            source_name: descriptor.name.clone(),
            source_type: descriptor.source_type,
            source_priority: descriptor.priority,
            scraped_at: Utc::now()
                .with_timezone(&hk_offset())
                .format("%Y-%m-%dT%H:%M:%S%:z")
                .to_string(),
        }
    }
}

/// Storage trait for per-source corpora.
#[async_trait]
pub trait CorpusStore: Send + Sync {
    /// Loads every stored event for the source, oldest capture file first.
    async fn load_corpus(&self, source_id: &str) -> Result<Vec<StoredEvent>>;

    /// Appends accepted events to the source's corpus.
    async fn append_events(&self, source_id: &str, events: &[StoredEvent]) -> Result<()>;
}

/// File-backed store writing `{source_id}_{YYYY-MM-DD}.json` arrays.
pub struct JsonFileStore {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn dated_path(&self, source_id: &str) -> PathBuf {
        let today = Utc::now().with_timezone(&hk_offset()).format("%Y-%m-%d");
        self.data_dir.join(format!("{source_id}_{today}.json"))
    }
}

#[async_trait]
impl CorpusStore for JsonFileStore {
    async fn load_corpus(&self, source_id: &str) -> Result<Vec<StoredEvent>> {
        let mut events = Vec::new();
        if !self.data_dir.exists() {
            debug!("Data directory {} does not exist yet", self.data_dir.display());
            return Ok(events);
        }

        let entries =
            std::fs::read_dir(&self.data_dir).map_err(|e| AggregatorError::CorpusLoad {
                path: self.data_dir.clone(),
                detail: e.to_string(),
            })?;

        let prefix = format!("{source_id}_");
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| AggregatorError::CorpusLoad {
                path: self.data_dir.clone(),
                detail: e.to_string(),
            })?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if name.starts_with(&prefix) && name.ends_with(".json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let contents =
                std::fs::read_to_string(&path).map_err(|e| AggregatorError::CorpusLoad {
                    path: path.clone(),
                    detail: e.to_string(),
                })?;
            let mut batch: Vec<StoredEvent> =
                serde_json::from_str(&contents).map_err(|e| AggregatorError::CorpusLoad {
                    path: path.clone(),
                    detail: e.to_string(),
                })?;
            events.append(&mut batch);
        }

        debug!("Loaded {} corpus events for {}", events.len(), source_id);
        Ok(events)
    }

    async fn append_events(&self, source_id: &str, events: &[StoredEvent]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        let _guard = self.write_lock.lock().unwrap();
        std::fs::create_dir_all(&self.data_dir)?;

        // Same-day batches merge into one file
        let path = self.dated_path(source_id);
        let mut batch: Vec<StoredEvent> = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Vec::new()
        };
        batch.extend_from_slice(events);

        let json = serde_json::to_string_pretty(&batch)?;
        std::fs::write(&path, json)?;

        debug!("Appended {} events to {}", events.len(), path.display());
        Ok(())
    }
}

/// In-memory store for development/testing.
pub struct InMemoryStore {
    corpora: Arc<Mutex<HashMap<String, Vec<StoredEvent>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            corpora: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CorpusStore for InMemoryStore {
    async fn load_corpus(&self, source_id: &str) -> Result<Vec<StoredEvent>> {
        let corpora = self.corpora.lock().unwrap();
        Ok(corpora.get(source_id).cloned().unwrap_or_default())
    }

    async fn append_events(&self, source_id: &str, events: &[StoredEvent]) -> Result<()> {
        let mut corpora = self.corpora.lock().unwrap();
        let corpus = corpora.entry(source_id.to_string()).or_default();
        corpus.extend_from_slice(events);

        debug!(
            "Appended {} events to in-memory corpus {}",
            events.len(),
            source_id
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceDescriptor;

    fn sample_event(name: &str) -> NormalizedEvent {
        NormalizedEvent {
            event_name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_file_store_round_trips_events() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let descriptor = SourceDescriptor::labour_dept();

        let batch = vec![
            StoredEvent::stamped(sample_event("青年招聘會"), &descriptor),
            StoredEvent::stamped(sample_event("行業招聘日"), &descriptor),
        ];
        store.append_events("labour_dept_hk", &batch).await.unwrap();

        let corpus = store.load_corpus("labour_dept_hk").await.unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus[0].event.event_name, "青年招聘會");
        assert_eq!(corpus[0].source_name, "Hong Kong Labour Department");
    }

    #[tokio::test]
    async fn test_file_store_merges_same_day_batches() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let descriptor = SourceDescriptor::labour_dept();

        let first = vec![StoredEvent::stamped(sample_event("青年招聘會"), &descriptor)];
        let second = vec![StoredEvent::stamped(sample_event("行業招聘日"), &descriptor)];
        store.append_events("labour_dept_hk", &first).await.unwrap();
        store.append_events("labour_dept_hk", &second).await.unwrap();

        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);

        let corpus = store.load_corpus("labour_dept_hk").await.unwrap();
        assert_eq!(corpus.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_appends_serialize() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::new(dir.path()));
        let descriptor = SourceDescriptor::labour_dept();

        let mut handles = Vec::new();
        for i in 0..4 {
            let store = store.clone();
            let batch = vec![StoredEvent::stamped(
                sample_event(&format!("批次{i}")),
                &descriptor,
            )];
            handles.push(tokio::spawn(async move {
                store.append_events("labour_dept_hk", &batch).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let corpus = store.load_corpus("labour_dept_hk").await.unwrap();
        assert_eq!(corpus.len(), 4);
    }

    #[tokio::test]
    async fn test_missing_data_dir_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("never_created"));

        let corpus = store.load_corpus("labour_dept_hk").await.unwrap();
        assert!(corpus.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_corpus_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("labour_dept_hk_2024-03-01.json"), "not json").unwrap();
        let store = JsonFileStore::new(dir.path());

        let err = store.load_corpus("labour_dept_hk").await.unwrap_err();
        assert!(err.to_string().contains("labour_dept_hk_2024-03-01.json"));
    }

    #[tokio::test]
    async fn test_sources_do_not_share_corpora() {
        let store = InMemoryStore::new();
        let descriptor = SourceDescriptor::hktdc();
        let batch = vec![StoredEvent::stamped(sample_event("Expo"), &descriptor)];
        store.append_events("hktdc", &batch).await.unwrap();

        assert_eq!(store.load_corpus("hktdc").await.unwrap().len(), 1);
        assert!(store.load_corpus("jobsdb_hk").await.unwrap().is_empty());
    }
}
