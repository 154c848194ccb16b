//! Identity fingerprints for normalized events.

use crate::domain::NormalizedEvent;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Derives the stable identity fingerprint for an event.
///
/// The identity slots are the lower-cased event name, start datetime,
/// venue name and organizer name, joined with `|`; absent slots join as
/// empty strings. The joined key is hashed with SHA-256 and the digest
/// folded into a name-based UUID, so equal identities always render the
/// same compact string.
pub fn event_fingerprint(event: &NormalizedEvent) -> String {
    let key = [
        Some(event.event_name.as_str()),
        event.start_datetime.as_deref(),
        event.venue_name.as_deref(),
        event.organizer_name.as_deref(),
    ]
    .map(|slot| slot.unwrap_or("").to_lowercase())
    .join("|");

    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let digest = hex::encode(hasher.finalize());

    Uuid::new_v5(&Uuid::NAMESPACE_DNS, digest.as_bytes()).to_string()
}
