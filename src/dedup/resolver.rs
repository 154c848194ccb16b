//! Two-stage duplicate resolution against a corpus snapshot.

use super::fingerprint::event_fingerprint;
use crate::domain::NormalizedEvent;
use crate::storage::StoredEvent;
use tracing::debug;

/// Which stage declared the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStage {
    Exact,
    Fuzzy,
}

/// Outcome of resolving one event against the corpus snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Unique,
    Duplicate { index: usize, stage: MatchStage },
}

impl Resolution {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Resolution::Duplicate { .. })
    }
}

/// Resolves new events against previously accepted ones. The corpus is a
/// read-only snapshot; resolution is an O(N) scan per event.
pub struct DuplicateResolver {
    threshold: f64,
    max_day_gap: i64,
}

impl DuplicateResolver {
    pub fn new(threshold: f64, max_day_gap: i64) -> Self {
        Self {
            threshold,
            max_day_gap,
        }
    }

    /// Stage 1 is exact fingerprint equality. Stage 2 is the fuzzy check:
    /// candidates more than `max_day_gap` calendar days away are skipped
    /// outright, then a prefix-alignment name similarity at or above the
    /// threshold together with an equal venue declares the duplicate.
    /// Events further apart than the gap never merge, however similar.
    pub fn resolve(&self, event: &NormalizedEvent, corpus: &[StoredEvent]) -> Resolution {
        for (index, stored) in corpus.iter().enumerate() {
            if corpus_fingerprint(stored) == event.fingerprint {
                debug!(
                    event = %event.event_name,
                    index,
                    "Exact fingerprint match in corpus"
                );
                return Resolution::Duplicate {
                    index,
                    stage: MatchStage::Exact,
                };
            }
        }

        let name = event.event_name.to_lowercase();
        let venue = lowered_venue(event);
        let day = event.start_date();

        for (index, stored) in corpus.iter().enumerate() {
            let candidate = &stored.event;
            if let (Some(a), Some(b)) = (day, candidate.start_date()) {
                if (a - b).num_days().abs() > self.max_day_gap {
                    continue;
                }
            }

            let candidate_name = candidate.event_name.to_lowercase();
            if name.is_empty() || candidate_name.is_empty() {
                continue;
            }

            let similarity = prefix_similarity(&name, &candidate_name);
            if similarity >= self.threshold && venue == lowered_venue(candidate) {
                debug!(
                    event = %event.event_name,
                    candidate = %candidate.event_name,
                    similarity,
                    index,
                    "Fuzzy match in corpus"
                );
                return Resolution::Duplicate {
                    index,
                    stage: MatchStage::Fuzzy,
                };
            }
        }

        Resolution::Unique
    }
}

impl Default for DuplicateResolver {
    fn default() -> Self {
        Self::new(0.85, 1)
    }
}

// Corpus entries written before fingerprints were stored compare by a
// freshly computed one.
fn corpus_fingerprint(stored: &StoredEvent) -> String {
    if stored.event.fingerprint.is_empty() {
        event_fingerprint(&stored.event)
    } else {
        stored.event.fingerprint.clone()
    }
}

fn lowered_venue(event: &NormalizedEvent) -> String {
    event.venue_name.as_deref().unwrap_or("").to_lowercase()
}

/// Fraction of position-aligned equal characters over the first
/// min(len(a), len(b)) characters of the two names. A cheap prefix
/// alignment, not an edit distance: names that differ early but match
/// later under-count.
fn prefix_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let shorter = a.len().min(b.len());
    if shorter == 0 {
        return 0.0;
    }
    let matching = a.iter().zip(b.iter()).filter(|(x, y)| x == y).count();
    matching as f64 / shorter as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NormalizedEvent;
    use crate::sources::SourceDescriptor;
    use crate::storage::StoredEvent;

    fn normalized(name: &str, start: Option<&str>, venue: Option<&str>) -> NormalizedEvent {
        let mut event = NormalizedEvent {
            event_name: name.to_string(),
            start_datetime: start.map(str::to_string),
            venue_name: venue.map(str::to_string),
            ..Default::default()
        };
        event.fingerprint = event_fingerprint(&event);
        event
    }

    fn corpus_of(events: Vec<NormalizedEvent>) -> Vec<StoredEvent> {
        let descriptor = SourceDescriptor::hktdc();
        events
            .into_iter()
            .map(|event| StoredEvent::stamped(event, &descriptor))
            .collect()
    }

    #[test]
    fn test_exact_stage_matches_by_fingerprint() {
        let corpus = corpus_of(vec![normalized(
            "Career Fair 2024",
            Some("2024-03-01"),
            Some("KITEC"),
        )]);
        let resolver = DuplicateResolver::default();

        // Identical identity up to letter case hits the exact stage
        let incoming = normalized("career fair 2024", Some("2024-03-01"), Some("kitec"));
        assert_eq!(
            resolver.resolve(&incoming, &corpus),
            Resolution::Duplicate {
                index: 0,
                stage: MatchStage::Exact
            }
        );
    }

    #[test]
    fn test_fuzzy_stage_needs_similarity_and_venue() {
        let corpus = corpus_of(vec![normalized(
            "青年就業博覽會二零二四",
            Some("2024-03-01"),
            Some("九龍灣國際展貿中心"),
        )]);
        let resolver = DuplicateResolver::default();

        // One trailing character differs; same venue, one day later
        let close = normalized(
            "青年就業博覽會二零二五",
            Some("2024-03-02"),
            Some("九龍灣國際展貿中心"),
        );
        assert_eq!(
            resolver.resolve(&close, &corpus),
            Resolution::Duplicate {
                index: 0,
                stage: MatchStage::Fuzzy
            }
        );

        // Same name but a different venue stays unique
        let elsewhere = normalized(
            "青年就業博覽會二零二四",
            Some("2024-03-02"),
            Some("香港會議展覽中心"),
        );
        assert_eq!(resolver.resolve(&elsewhere, &corpus), Resolution::Unique);
    }

    #[test]
    fn test_day_gap_blocks_merging() {
        let corpus = corpus_of(vec![normalized(
            "Career Fair 2024",
            Some("2024-03-01"),
            Some("KITEC"),
        )]);
        let resolver = DuplicateResolver::default();

        // Four days later: never merged, even with an identical name and
        // venue
        let later = normalized("Career Fair 2024", Some("2024-03-05"), Some("KITEC"));
        assert_eq!(resolver.resolve(&later, &corpus), Resolution::Unique);
    }

    #[test]
    fn test_prefix_metric_undercounts_reordered_names() {
        let corpus = corpus_of(vec![normalized(
            "Career Fair 2024",
            Some("2024-03-01"),
            Some("KITEC"),
        )]);
        let resolver = DuplicateResolver::default();

        // Same words, different order: prefix alignment scores this low
        let reordered = normalized("2024 Career Fair", Some("2024-03-01"), Some("KITEC"));
        assert_eq!(resolver.resolve(&reordered, &corpus), Resolution::Unique);
    }

    #[test]
    fn test_legacy_entries_without_fingerprint_still_match() {
        let mut legacy = normalized("Career Fair 2024", Some("2024-03-01"), Some("KITEC"));
        legacy.fingerprint = String::new();
        let corpus = corpus_of(vec![legacy]);
        let resolver = DuplicateResolver::default();

        let incoming = normalized("Career Fair 2024", Some("2024-03-01"), Some("KITEC"));
        assert_eq!(
            resolver.resolve(&incoming, &corpus),
            Resolution::Duplicate {
                index: 0,
                stage: MatchStage::Exact
            }
        );
    }

    #[test]
    fn test_undated_events_compare_by_name_and_venue() {
        let corpus = corpus_of(vec![normalized("Career Fair 2024", None, Some("KITEC"))]);
        let resolver = DuplicateResolver::default();

        // Missing dates skip the day-gap gate rather than blocking
        let undated = normalized("Career Fair 2024!", None, Some("KITEC"));
        assert!(resolver.resolve(&undated, &corpus).is_duplicate());
    }

    #[test]
    fn test_empty_corpus_is_always_unique() {
        let resolver = DuplicateResolver::default();
        let event = normalized("Career Fair 2024", Some("2024-03-01"), Some("KITEC"));
        assert_eq!(resolver.resolve(&event, &[]), Resolution::Unique);
    }
}
