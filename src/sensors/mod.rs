//! Sensor acquisition for the producer station.
//!
//! One acquisition thread owns all sensor reads and is the single writer of
//! the producer's snapshot cell. The publish loop only ever copies the
//! latest value out; the two never share mutable state directly.

mod gas_csv;

pub use gas_csv::{CsvGasSource, GasReading};

use crate::config::TemperatureUnit;
use crate::error::Result;
use crate::shared::{ShutdownFlag, SnapshotCell};
use crate::types::SensorSnapshot;
use std::time::Duration;

/// Temperature/humidity source.
///
/// Seam for the climate sensor hardware (an I2C hygrometer in the original
/// deployment). Readings are Celsius; unit conversion happens in the
/// acquisition loop.
pub trait ClimateSource: Send {
    fn temperature_c(&mut self) -> Result<f32>;
    fn humidity(&mut self) -> Result<f32>;
}

/// Deterministic climate stand-in returning configured constants
pub struct FixedClimate {
    temperature_c: f32,
    humidity: f32,
}

impl FixedClimate {
    pub fn new(temperature_c: f32, humidity: f32) -> Self {
        Self {
            temperature_c,
            humidity,
        }
    }
}

impl ClimateSource for FixedClimate {
    fn temperature_c(&mut self) -> Result<f32> {
        Ok(self.temperature_c)
    }

    fn humidity(&mut self) -> Result<f32> {
        Ok(self.humidity)
    }
}

/// Acquisition loop: poll both sources on a fixed cadence and store a full
/// snapshot each cycle.
///
/// A failed read keeps the channel's last-known value, so the published
/// snapshot is always fully populated; before the first successful cycle
/// every channel is zero.
pub fn run_acquisition(
    cell: SnapshotCell,
    mut climate: Box<dyn ClimateSource>,
    mut gas: CsvGasSource,
    unit: TemperatureUnit,
    interval: Duration,
    shutdown: ShutdownFlag,
) {
    log::info!("sensor acquisition started (poll interval {interval:?})");
    let mut snapshot = SensorSnapshot::default();

    while !shutdown.is_stopped() {
        match climate.temperature_c() {
            Ok(celsius) => snapshot.temperature = unit.from_celsius(celsius),
            Err(e) => log::warn!("temperature read failed, keeping last value: {e}"),
        }
        match climate.humidity() {
            Ok(value) => snapshot.humidity = value,
            Err(e) => log::warn!("humidity read failed, keeping last value: {e}"),
        }
        match gas.next_reading() {
            Ok(reading) => {
                snapshot.ammonia = reading.ammonia;
                snapshot.hydrogen_sulfide = reading.hydrogen_sulfide;
                snapshot.carbon_dioxide = reading.carbon_dioxide;
                snapshot.methane = reading.methane;
            }
            Err(e) => log::warn!("gas reading failed, keeping last values: {e}"),
        }

        cell.store(snapshot);
        log::trace!("acquired snapshot: {snapshot:?}");

        shutdown.sleep_while_running(interval);
    }

    log::info!("sensor acquisition stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn acquisition_populates_cell_with_converted_units() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            b"Sensor_Type,Ammonia_ppm,Methane_ppm,CO2_ppm,H2S_ppm\n\
              MQ-137 Ammonia,5.0,10.0,300.0,0.5\n",
        )
        .unwrap();
        file.flush().unwrap();

        let cell = SnapshotCell::new();
        let shutdown = ShutdownFlag::new();
        let gas = CsvGasSource::open(file.path()).unwrap();
        let climate = Box::new(FixedClimate::new(20.0, 45.0));

        let thread_cell = cell.clone();
        let thread_shutdown = shutdown.clone();
        let handle = std::thread::spawn(move || {
            run_acquisition(
                thread_cell,
                climate,
                gas,
                TemperatureUnit::Fahrenheit,
                Duration::from_millis(5),
                thread_shutdown,
            )
        });

        std::thread::sleep(Duration::from_millis(50));
        shutdown.request_stop();
        handle.join().unwrap();

        let snapshot = cell.load();
        assert_eq!(snapshot.temperature, 68.0);
        assert_eq!(snapshot.humidity, 45.0);
        assert_eq!(snapshot.ammonia, 5.0);
        assert_eq!(snapshot.methane, 10.0);
        assert_eq!(snapshot.carbon_dioxide, 300.0);
        assert_eq!(snapshot.hydrogen_sulfide, 0.5);
    }
}
