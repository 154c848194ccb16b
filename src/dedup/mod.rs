pub mod fingerprint;
pub mod resolver;

pub use fingerprint::event_fingerprint;
pub use resolver::{DuplicateResolver, MatchStage, Resolution};
