//! Telemetry streaming: the producer loop, the consumer loop, and the wire
//! codec they share.

pub mod publisher;
pub mod subscriber;
pub mod wire;

pub use publisher::TelemetryPublisher;
pub use subscriber::{RetryPolicy, TelemetrySubscriber};
