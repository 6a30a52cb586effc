//! Downstream sinks for validated telemetry records.
//!
//! Write-only and fire-and-forget: the consumer pushes each validated
//! record out and never waits for an acknowledgment.

use crate::error::Result;
use parking_lot::Mutex;
use serialport::{DataBits, FlowControl, Parity, StopBits};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

/// Receives each validated record as an opaque formatted line
pub trait TelemetrySink: Send {
    fn forward(&mut self, record: &str) -> Result<()>;
}

/// Forwards records over a serial port (UART bridge to the local display)
pub struct SerialSink {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialSink {
    /// Open the downstream serial port at 8N1
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_millis(100))
            .open()?;

        log::info!("opened downstream serial port {path} at {baud_rate} baud");
        Ok(Self { port })
    }
}

impl TelemetrySink for SerialSink {
    fn forward(&mut self, record: &str) -> Result<()> {
        self.port.write_all(record.as_bytes())?;
        self.port.write_all(b"\n")?;
        Ok(())
    }
}

// SerialSink is Send since it owns the port
unsafe impl Send for SerialSink {}

/// Prints records to stdout for local display
pub struct StdoutSink;

impl TelemetrySink for StdoutSink {
    fn forward(&mut self, record: &str) -> Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{record}")?;
        Ok(())
    }
}

/// In-memory sink for tests; clones share the same record buffer
#[derive(Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records forwarded so far
    pub fn records(&self) -> Vec<String> {
        self.records.lock().clone()
    }
}

impl TelemetrySink for MemorySink {
    fn forward(&mut self, record: &str) -> Result<()> {
        self.records.lock().push(record.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_shares_records_across_clones() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        writer.forward("Temp:0.00").unwrap();
        writer.forward("Temp:1.00").unwrap();
        assert_eq!(sink.records(), vec!["Temp:0.00", "Temp:1.00"]);
    }
}
