//! Error taxonomy. Nothing here crosses the §6-style public functions as a
//! panic; callers either get a `Result` or a `bool` plus a log line.

use std::path::PathBuf;

/// Rejected configuration. The previous configuration stays in force.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("base value must be positive and finite (got {0})")]
    BaseValue(f64),
    #[error("stage table needs at least one band")]
    NoBands,
    #[error("band {index}: start must be >= 1 and end >= start (got {start}..={end})")]
    BandRange { index: usize, start: u32, end: u32 },
    #[error("band {index}: multiplier must be positive and finite (got {multiplier})")]
    Multiplier { index: usize, multiplier: f64 },
    #[error("max stage must be >= 1")]
    MaxStage,
    #[error("invalid {0}: must be positive and finite")]
    Emission(&'static str),
    #[error("config file io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Persistence failure. Callers decide whether to log, retry or surface it;
/// the engine and session log and keep going.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt record under {key:?}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
