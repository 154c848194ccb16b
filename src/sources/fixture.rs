use super::{SourceCollaborator, SourceDescriptor};
use crate::domain::RawEventRecord;
use crate::error::{AggregatorError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Replays a captured batch of raw records from a JSON file.
///
/// The file holds a JSON array of record objects, the same shape a live
/// collector hands over. Capture files make pipeline runs reproducible and
/// keep the engine testable without network access.
pub struct FixtureSource {
    descriptor: SourceDescriptor,
    path: PathBuf,
}

impl FixtureSource {
    pub fn new<P: Into<PathBuf>>(descriptor: SourceDescriptor, path: P) -> Self {
        Self {
            descriptor,
            path: path.into(),
        }
    }
}

#[async_trait]
impl SourceCollaborator for FixtureSource {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    #[instrument(skip(self), fields(source_id = %self.descriptor.source_id))]
    async fn collect(&self) -> Result<Vec<RawEventRecord>> {
        let contents =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|e| AggregatorError::Source {
                    message: format!("failed to read {}: {e}", self.path.display()),
                })?;
        let records: Vec<RawEventRecord> = serde_json::from_str(&contents)?;

        info!(
            "Loaded {} raw records for {} from {}",
            records.len(),
            self.descriptor.source_id,
            self.path.display()
        );
        Ok(records)
    }
}
