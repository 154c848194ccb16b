use crate::config::{Config, OnCorpusError};
use crate::dedup::{DuplicateResolver, Resolution};
use crate::error::Result;
use crate::normalize::Normalizer;
use crate::retry::RetryPolicy;
use crate::sources::SourceCollaborator;
use crate::storage::{CorpusStore, StoredEvent};
use metrics::{counter, histogram};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Result of a complete aggregation run for one source
#[derive(Debug, Serialize)]
pub struct SourceRunSummary {
    pub source_id: String,
    pub total_records: usize,
    pub accepted: usize,
    pub duplicates: usize,
    pub rejected: usize,
    pub errors: Vec<String>,
}

/// Collect, normalize, deduplicate, persist. One instance serves every
/// registered source; per-source state lives in the corpus files.
pub struct EventPipeline {
    normalizer: Normalizer,
    resolver: DuplicateResolver,
    retry: RetryPolicy,
    store: Arc<dyn CorpusStore>,
    on_corpus_error: OnCorpusError,
}

impl EventPipeline {
    pub fn new(store: Arc<dyn CorpusStore>, config: &Config) -> Self {
        Self {
            normalizer: Normalizer::new(),
            resolver: DuplicateResolver::new(
                config.dedup.similarity_threshold,
                config.dedup.max_day_gap,
            ),
            retry: RetryPolicy::from_config(&config.retry),
            store,
            on_corpus_error: config.aggregator.on_corpus_error,
        }
    }

    /// Run the complete pipeline for one source
    #[instrument(skip(self, source), fields(source_id = %source.descriptor().source_id))]
    pub async fn run_for_source(&self, source: &dyn SourceCollaborator) -> Result<SourceRunSummary> {
        let descriptor = source.descriptor().clone();
        let source_id = descriptor.source_id.clone();
        info!("🚀 Starting aggregation run for {}", source_id);
        println!("🚀 Starting aggregation run for {}", source_id);
        counter!("hkjf_pipeline_runs_total", "source" => source_id.clone()).increment(1);
        let t_run = std::time::Instant::now();

        // Step 1: Collect raw records
        let t_collect = std::time::Instant::now();
        let raw_records = self.retry.run("collect", || source.collect()).await?;
        histogram!("hkjf_collect_duration_seconds", "source" => source_id.clone())
            .record(t_collect.elapsed().as_secs_f64());
        info!("✅ Collected {} raw records", raw_records.len());
        println!("✅ Collected {} raw records", raw_records.len());
        histogram!("hkjf_raw_records_per_run", "source" => source_id.clone())
            .record(raw_records.len() as f64);

        // Step 2: Load the corpus snapshot. Every record in the batch
        // resolves against this same snapshot; the corpus only grows when
        // the accepted batch is appended at the end of the run.
        let mut errors = Vec::new();
        let corpus = match self.store.load_corpus(&source_id).await {
            Ok(corpus) => corpus,
            Err(e) => match self.on_corpus_error {
                OnCorpusError::Abort => {
                    error!("Corpus load failed for {}: {}", source_id, e);
                    return Err(e);
                }
                OnCorpusError::StartEmpty => {
                    warn!("Corpus load failed for {}, starting empty: {}", source_id, e);
                    errors.push(format!("corpus load failed, started empty: {e}"));
                    Vec::new()
                }
            },
        };

        // Step 3: Normalize and resolve each record
        let mut accepted = Vec::new();
        let mut duplicates = 0;
        let mut rejected = 0;

        for (i, record) in raw_records.iter().enumerate() {
            match self.normalizer.normalize(record, &descriptor) {
                Ok(event) => match self.resolver.resolve(&event, &corpus) {
                    Resolution::Duplicate { index, stage } => {
                        debug!(
                            "Record {} duplicates corpus entry {} via {:?} stage",
                            i, index, stage
                        );
                        duplicates += 1;
                    }
                    Resolution::Unique => {
                        accepted.push(StoredEvent::stamped(event, &descriptor));
                    }
                },
                Err(reason) => {
                    debug!("Record {} rejected: {:?}", i, reason);
                    rejected += 1;
                }
            }
        }

        // Step 4: Persist accepted events
        self.store.append_events(&source_id, &accepted).await?;
        info!("💾 Persisted {} accepted events", accepted.len());
        println!("💾 Persisted {} accepted events", accepted.len());

        counter!("hkjf_events_accepted_total", "source" => source_id.clone())
            .increment(accepted.len() as u64);
        counter!("hkjf_events_duplicate_total", "source" => source_id.clone())
            .increment(duplicates as u64);
        counter!("hkjf_events_rejected_total", "source" => source_id.clone())
            .increment(rejected as u64);
        histogram!("hkjf_pipeline_duration_seconds", "source" => source_id.clone())
            .record(t_run.elapsed().as_secs_f64());

        info!(
            "✅ Run complete for {}: {} accepted, {} duplicates, {} rejected",
            source_id,
            accepted.len(),
            duplicates,
            rejected
        );
        println!(
            "✅ Run complete for {}: {} accepted, {} duplicates, {} rejected",
            source_id,
            accepted.len(),
            duplicates,
            rejected
        );

        Ok(SourceRunSummary {
            source_id,
            total_records: raw_records.len(),
            accepted: accepted.len(),
            duplicates,
            rejected,
            errors,
        })
    }
}
