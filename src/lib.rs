//! Gasmon - two-station gas telemetry link
//!
//! A producer station publishes six-channel environmental snapshots over a
//! self-healing TCP stream; a consumer station parses them defensively and
//! forwards validated records to a downstream sink. The wire format is a
//! single labeled text line per snapshot (see [`streaming::wire`]).

pub mod config;
pub mod error;
pub mod sensors;
pub mod shared;
pub mod sink;
pub mod streaming;
pub mod types;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
pub use shared::{ShutdownFlag, SnapshotCell};
pub use types::SensorSnapshot;
