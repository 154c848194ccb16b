//! Source descriptors and the collaborator interface.
//!
//! Each upstream source is described by a static [`SourceDescriptor`]
//! carrying its identity, trust tier, language, and date grammar hint. The
//! [`SourceCollaborator`] trait is the seam between collection and the
//! normalization pipeline.

pub mod fixture;

pub use fixture::FixtureSource;

use crate::constants::{HKTDC_ID, JOBSDB_ID, LABOUR_DEPT_ID};
use crate::domain::{Language, RawEventRecord};
use crate::error::Result;
use crate::normalize::DateGrammar;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Institutional category of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    Government,
    StatutoryBody,
    JobPortal,
}

/// Trust tier used when sources disagree about the same event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourcePriority {
    Primary,
    Secondary,
}

/// How often the source should be polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckFrequency {
    Daily,
    Weekly,
}

/// Static description of one upstream source.
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    pub source_id: String,
    pub name: String,
    pub base_url: String,
    pub source_type: SourceType,
    pub priority: SourcePriority,
    pub check_frequency: CheckFrequency,
    /// Expected listing language, used when a record gives no signal.
    pub language: Language,
    pub date_grammar: DateGrammar,
    /// Organizer applied when the listing names none.
    pub default_organizer: Option<String>,
}

impl SourceDescriptor {
    /// Labour Department interactive employment service job fairs.
    pub fn labour_dept() -> Self {
        Self {
            source_id: LABOUR_DEPT_ID.to_string(),
            name: "Hong Kong Labour Department".to_string(),
            base_url: "https://www2.jobs.gov.hk".to_string(),
            source_type: SourceType::Government,
            priority: SourcePriority::Primary,
            check_frequency: CheckFrequency::Daily,
            language: Language::ZhHk,
            date_grammar: DateGrammar::LabourDept,
            default_organizer: Some("香港勞工處".to_string()),
        }
    }

    /// HKTDC exhibitions, including the Education & Careers Expo.
    pub fn hktdc() -> Self {
        Self {
            source_id: HKTDC_ID.to_string(),
            name: "Hong Kong Trade Development Council".to_string(),
            base_url: "https://www.hktdc.com".to_string(),
            source_type: SourceType::StatutoryBody,
            priority: SourcePriority::Primary,
            check_frequency: CheckFrequency::Daily,
            language: Language::Both,
            date_grammar: DateGrammar::Generic,
            default_organizer: None,
        }
    }

    /// JobsDB recruitment day listings.
    pub fn jobsdb() -> Self {
        Self {
            source_id: JOBSDB_ID.to_string(),
            name: "JobsDB Hong Kong".to_string(),
            base_url: "https://hk.jobsdb.com".to_string(),
            source_type: SourceType::JobPortal,
            priority: SourcePriority::Primary,
            check_frequency: CheckFrequency::Daily,
            language: Language::Both,
            date_grammar: DateGrammar::Generic,
            default_organizer: Some("JobsDB Recruitment Day".to_string()),
        }
    }
}

/// A source that can deliver raw event records for normalization.
#[async_trait]
pub trait SourceCollaborator: Send + Sync {
    /// Static description of this source.
    fn descriptor(&self) -> &SourceDescriptor;

    /// Fetch the current batch of raw records.
    async fn collect(&self) -> Result<Vec<RawEventRecord>>;
}

/// Registered sources in execution order.
pub struct SourceRegistry {
    sources: Vec<Box<dyn SourceCollaborator>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn register(&mut self, source: Box<dyn SourceCollaborator>) {
        self.sources.push(source);
    }

    pub fn get(&self, source_id: &str) -> Option<&dyn SourceCollaborator> {
        self.sources
            .iter()
            .find(|source| source.descriptor().source_id == source_id)
            .map(|source| source.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn SourceCollaborator> {
        self.sources.iter().map(|source| source.as_ref())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
