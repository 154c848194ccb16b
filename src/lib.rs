pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod retry;
pub mod storage;

// Domain data shapes shared across layers
pub mod domain;

pub mod dedup;
pub mod normalize;
pub mod sources;
