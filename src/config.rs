//! Configuration for the gasmon stations
//!
//! Loads configuration from a TOML file. One file describes both roles; a
//! station only reads the sections relevant to the role it was started with.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub station: StationConfig,
    pub producer: ProducerConfig,
    pub consumer: ConsumerConfig,
    pub sensors: SensorsConfig,
    pub logging: LoggingConfig,
}

/// Role-independent station settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StationConfig {
    /// Unit the producer publishes temperature in.
    ///
    /// The wire format is unit-agnostic; conversion happens once, at
    /// acquisition time.
    pub temperature_unit: TemperatureUnit,
}

/// Temperature unit carried in the published snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Convert a Celsius reading into this unit
    pub fn from_celsius(self, celsius: f32) -> f32 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }
}

/// Producer station (telemetry server) settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProducerConfig {
    /// TCP bind address for the telemetry listener
    ///
    /// Examples:
    /// - `0.0.0.0:3333` - Bind to all interfaces on port 3333
    /// - `127.0.0.1:3333` - Localhost only
    pub bind_address: String,
    /// Fixed cadence between snapshot publishes, milliseconds
    pub publish_interval_ms: u64,
    /// Delay before retrying after a failed accept, milliseconds
    pub accept_retry_ms: u64,
}

impl ProducerConfig {
    pub fn publish_interval(&self) -> Duration {
        Duration::from_millis(self.publish_interval_ms)
    }

    pub fn accept_retry(&self) -> Duration {
        Duration::from_millis(self.accept_retry_ms)
    }
}

/// Consumer station (telemetry client) settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsumerConfig {
    /// Network address of the producer station
    pub server_address: String,
    /// Delay between failed connection attempts, milliseconds
    pub connect_retry_ms: u64,
    /// Delay before reconnecting after an established connection drops,
    /// milliseconds
    pub reconnect_delay_ms: u64,
    /// Cooperative pacing between inbound reads; matches the producer's
    /// publish cadence, milliseconds
    pub poll_interval_ms: u64,
    /// Downstream sink for validated records: `stdout` or a serial device
    /// path (e.g. `/dev/ttyUSB0`)
    pub sink: String,
    /// Baud rate when the sink is a serial device
    pub serial_baud: u32,
}

impl ConsumerConfig {
    pub fn connect_retry(&self) -> Duration {
        Duration::from_millis(self.connect_retry_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Producer-side sensor acquisition settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SensorsConfig {
    /// CSV file backing the simulated analog gas sensors
    pub gas_csv_path: String,
    /// Acquisition cadence, milliseconds
    pub poll_interval_ms: u64,
    /// Fixed climate stand-in: ambient temperature, Celsius
    pub temperature_c: f32,
    /// Fixed climate stand-in: relative humidity, percent
    pub humidity: f32,
}

impl SensorsConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl AppConfig {
    /// Load configuration from TOML file
    ///
    /// # Example
    /// ```no_run
    /// use gasmon::config::AppConfig;
    ///
    /// let config = AppConfig::from_file("gasmon.toml")?;
    /// # Ok::<(), gasmon::Error>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Default configuration for the two-station field deployment
    ///
    /// Producer on port 3333 behind the sensor station's access point,
    /// five-second cadences everywhere, Fahrenheit on the wire. Production
    /// deployments should use a proper TOML configuration file.
    pub fn field_defaults() -> Self {
        Self {
            station: StationConfig {
                temperature_unit: TemperatureUnit::Fahrenheit,
            },
            producer: ProducerConfig {
                bind_address: "0.0.0.0:3333".to_string(),
                publish_interval_ms: 5000,
                accept_retry_ms: 1000,
            },
            consumer: ConsumerConfig {
                server_address: "192.168.4.1:3333".to_string(),
                connect_retry_ms: 1000,
                reconnect_delay_ms: 5000,
                poll_interval_ms: 5000,
                sink: "stdout".to_string(),
                serial_baud: 115_200,
            },
            sensors: SensorsConfig {
                gas_csv_path: "/var/lib/gasmon/sensor_data.csv".to_string(),
                poll_interval_ms: 5000,
                temperature_c: 21.5,
                humidity: 55.0,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::field_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::field_defaults();
        assert_eq!(config.producer.bind_address, "0.0.0.0:3333");
        assert_eq!(config.producer.publish_interval_ms, 5000);
        assert_eq!(config.consumer.server_address, "192.168.4.1:3333");
        assert_eq!(config.consumer.sink, "stdout");
        assert_eq!(config.station.temperature_unit, TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn test_toml_serialization() {
        let config = AppConfig::field_defaults();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        // Should contain all sections
        assert!(toml_string.contains("[station]"));
        assert!(toml_string.contains("[producer]"));
        assert!(toml_string.contains("[consumer]"));
        assert!(toml_string.contains("[sensors]"));
        assert!(toml_string.contains("[logging]"));

        // Should contain key values
        assert!(toml_string.contains("bind_address = \"0.0.0.0:3333\""));
        assert!(toml_string.contains("temperature_unit = \"fahrenheit\""));
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_content = r#"
[station]
temperature_unit = "celsius"

[producer]
bind_address = "127.0.0.1:4444"
publish_interval_ms = 1000
accept_retry_ms = 500

[consumer]
server_address = "127.0.0.1:4444"
connect_retry_ms = 250
reconnect_delay_ms = 1000
poll_interval_ms = 1000
sink = "/dev/ttyUSB0"
serial_baud = 9600

[sensors]
gas_csv_path = "/tmp/sensor_data.csv"
poll_interval_ms = 1000
temperature_c = 18.0
humidity = 40.0

[logging]
level = "debug"
"#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.station.temperature_unit, TemperatureUnit::Celsius);
        assert_eq!(config.producer.bind_address, "127.0.0.1:4444");
        assert_eq!(config.consumer.sink, "/dev/ttyUSB0");
        assert_eq!(config.consumer.serial_baud, 9600);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_unit_conversion() {
        assert_eq!(TemperatureUnit::Celsius.from_celsius(21.5), 21.5);
        assert_eq!(TemperatureUnit::Fahrenheit.from_celsius(0.0), 32.0);
        assert_eq!(TemperatureUnit::Fahrenheit.from_celsius(100.0), 212.0);
    }

    #[test]
    fn test_duration_helpers() {
        let config = AppConfig::field_defaults();
        assert_eq!(config.producer.publish_interval(), Duration::from_secs(5));
        assert_eq!(config.consumer.connect_retry(), Duration::from_secs(1));
        assert_eq!(config.sensors.poll_interval(), Duration::from_secs(5));
    }
}
