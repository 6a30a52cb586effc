//! Telemetry publisher for the producer station.
//!
//! Owns the listening socket and publishes the latest snapshot to a single
//! connected peer on a fixed cadence, forever, surviving any number of
//! connection failures.
//!
//! # Connection Lifecycle
//!
//! ```text
//! 1. Bind listener (fatal on failure - startup precondition)
//! 2. Poll for a connection (non-blocking accept)
//! 3. Serve the peer: encode + write the latest snapshot every interval
//! 4. On write failure, shut the socket down and return to 2
//! ```
//!
//! Peers are served serially on the loop's own thread, so at most one
//! connection is ever established; a second connection attempt waits in the
//! OS backlog until the first teardown completes. Accept failures other
//! than `WouldBlock` are logged and retried after a delay rather than
//! terminating the loop.

use crate::error::{Error, Result};
use crate::shared::{ShutdownFlag, SnapshotCell};
use crate::streaming::wire;
use std::io::Write;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

/// How often the accept loop polls for a pending connection
const ACCEPT_POLL: Duration = Duration::from_millis(10);

/// Telemetry server publishing snapshots to one peer at a time
pub struct TelemetryPublisher {
    listener: TcpListener,
    publish_interval: Duration,
    accept_retry: Duration,
}

impl TelemetryPublisher {
    /// Bind the telemetry listener.
    ///
    /// An unavailable port is an operator-visible misconfiguration; the
    /// error propagates so startup halts.
    pub fn bind(
        bind_address: &str,
        publish_interval: Duration,
        accept_retry: Duration,
    ) -> Result<Self> {
        let listener = TcpListener::bind(bind_address)
            .map_err(|e| Error::Other(format!("failed to bind to {bind_address}: {e}")))?;
        listener.set_nonblocking(true)?;
        log::info!("telemetry listener bound to {bind_address}");

        Ok(Self {
            listener,
            publish_interval,
            accept_retry,
        })
    }

    /// Address the listener actually bound to (port 0 resolves here)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the accept loop until shutdown is requested.
    pub fn run(&self, snapshot: &SnapshotCell, shutdown: &ShutdownFlag) -> Result<()> {
        while !shutdown.is_stopped() {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    log::info!("peer connected: {peer}");
                    match self.serve_peer(stream, snapshot, shutdown) {
                        Ok(()) => log::info!("peer session ended: {peer}"),
                        Err(e) => log::warn!("peer {peer} dropped: {e}"),
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    shutdown.sleep_while_running(ACCEPT_POLL);
                }
                Err(e) => {
                    log::error!("accept failed: {e}");
                    shutdown.sleep_while_running(self.accept_retry);
                }
            }
        }

        log::info!("telemetry publisher stopped");
        Ok(())
    }

    /// Publish to one peer until the stream fails or shutdown is requested.
    ///
    /// The peer's handshake token, if any, is never read; this side only
    /// writes.
    fn serve_peer(
        &self,
        stream: TcpStream,
        snapshot: &SnapshotCell,
        shutdown: &ShutdownFlag,
    ) -> Result<()> {
        // The stream inherits non-blocking mode from the listener on some
        // platforms; publishing wants plain blocking writes.
        stream.set_nonblocking(false)?;

        let result = self.publish_loop(&stream, snapshot, shutdown);
        let _ = stream.shutdown(Shutdown::Both);
        result
    }

    fn publish_loop(
        &self,
        mut stream: &TcpStream,
        snapshot: &SnapshotCell,
        shutdown: &ShutdownFlag,
    ) -> Result<()> {
        while !shutdown.is_stopped() {
            let mut record = wire::encode(&snapshot.load());
            record.push('\n');
            stream.write_all(record.as_bytes())?;
            stream.flush()?;
            log::debug!("published: {}", record.trim_end());

            shutdown.sleep_while_running(self.publish_interval);
        }
        Ok(())
    }
}
