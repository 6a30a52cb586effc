//! Telemetry subscriber for the consumer station.
//!
//! Maintains the illusion of a continuously available feed despite an
//! unreliable link: connect, read and validate records, forward them
//! downstream, and on any transport fault tear everything down and start
//! over after a fixed delay.
//!
//! # Connection Lifecycle
//!
//! ```text
//! Connecting ──ok──> Established ──error/close──> Closing
//!     ^  └─fail: retry delay┘                        │
//!     └───────────── reconnect delay ────────────────┘
//! ```
//!
//! Two failure classes are kept strictly apart:
//!
//! - **Transport faults** (connect failure, read error, peer close) end the
//!   Established phase and trigger a full teardown + reconnect.
//! - **Application faults** (a line that fails validation) are logged and
//!   the single line discarded; the connection stays up.
//!
//! Reads use a short timeout so the shutdown flag is polled even while the
//! producer is silent.

use crate::error::Result;
use crate::shared::{ShutdownFlag, SnapshotCell};
use crate::sink::TelemetrySink;
use crate::streaming::wire;
use std::io::{BufRead, BufReader, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

/// Legacy request token sent once after connecting. The producer ignores
/// it, but older station firmware expects it on the wire.
const HANDSHAKE_TOKEN: &str = "GET_SENSOR_DATA";

/// Read timeout so the loop can check the shutdown flag while blocked
const READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Fixed-delay retry policy for connection attempts.
///
/// Production runs unbounded: the producer is a fixed, eventually-available
/// peer, so the consumer retries forever. Tests bound the attempt count so
/// loops terminate without real time passing.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Delay between failed connection attempts
    pub delay: Duration,
    /// Give up after this many attempts; `None` retries forever
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Retry forever with a fixed delay
    pub const fn unbounded(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    /// Stop after `max_attempts` attempts
    pub const fn bounded(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts: Some(max_attempts),
        }
    }

    fn exhausted(&self, attempts: u32) -> bool {
        matches!(self.max_attempts, Some(limit) if attempts >= limit)
    }
}

/// Telemetry client that feeds validated snapshots to a downstream sink
pub struct TelemetrySubscriber {
    server_address: String,
    retry: RetryPolicy,
    reconnect_delay: Duration,
    poll_interval: Duration,
    sink: Box<dyn TelemetrySink>,
    latest: SnapshotCell,
}

impl TelemetrySubscriber {
    pub fn new(
        server_address: impl Into<String>,
        retry: RetryPolicy,
        reconnect_delay: Duration,
        poll_interval: Duration,
        sink: Box<dyn TelemetrySink>,
        latest: SnapshotCell,
    ) -> Self {
        Self {
            server_address: server_address.into(),
            retry,
            reconnect_delay,
            poll_interval,
            sink,
            latest,
        }
    }

    /// Run the connect/read/reconnect cycle until shutdown is requested
    /// (or, under a bounded policy, the attempt limit is reached).
    pub fn run(&mut self, shutdown: &ShutdownFlag) -> Result<()> {
        let mut attempts: u32 = 0;

        while !shutdown.is_stopped() {
            if self.retry.exhausted(attempts) {
                log::warn!("giving up after {attempts} connection attempts");
                break;
            }
            attempts += 1;

            let stream = match TcpStream::connect(&self.server_address) {
                Ok(stream) => stream,
                Err(e) => {
                    log::warn!("connect to {} failed: {e}", self.server_address);
                    shutdown.sleep_while_running(self.retry.delay);
                    continue;
                }
            };
            log::info!("connected to producer at {}", self.server_address);

            match self.established(&stream, shutdown) {
                Ok(()) => log::info!("connection closed by producer"),
                Err(e) => log::warn!("connection lost: {e}"),
            }

            // Closing: release the stream unconditionally, even if the peer
            // already half-closed it.
            let _ = stream.shutdown(Shutdown::Both);
            shutdown.sleep_while_running(self.reconnect_delay);
        }

        log::info!("telemetry subscriber stopped");
        Ok(())
    }

    /// Established phase: handshake once, then read records until the
    /// transport fails or closes.
    ///
    /// Returns `Ok(())` on graceful close or shutdown, `Err` on a transport
    /// fault; the caller tears down and reconnects either way.
    fn established(&mut self, stream: &TcpStream, shutdown: &ShutdownFlag) -> Result<()> {
        stream.set_read_timeout(Some(READ_TIMEOUT))?;

        // Fire-and-forget: no acknowledgment is expected or waited for.
        let mut writer = stream;
        writer.write_all(HANDSHAKE_TOKEN.as_bytes())?;

        let mut reader = BufReader::new(stream.try_clone()?);
        let mut line = String::new();

        loop {
            if shutdown.is_stopped() {
                return Ok(());
            }
            match reader.read_line(&mut line) {
                Ok(0) => return Ok(()),
                Ok(_) => {
                    self.handle_record(&line);
                    line.clear();
                    // Cooperative pacing matched to the producer's publish
                    // cadence; there is no backpressure signal.
                    shutdown.sleep_while_running(self.poll_interval);
                }
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    // Timed out waiting for the next record; any partial
                    // line stays in `line` and completes on a later read.
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Validate one inbound line and forward it downstream.
    ///
    /// A malformed line is an application-level fault: log, discard, keep
    /// the connection and the previously accepted snapshot untouched.
    fn handle_record(&mut self, line: &str) {
        match wire::parse(line) {
            Ok(snapshot) => {
                self.latest.store(snapshot);
                if let Err(e) = self.sink.forward(line.trim_end()) {
                    log::warn!("downstream sink write failed: {e}");
                }
            }
            Err(e) => log::warn!("discarding inbound record: {e}"),
        }
    }
}
