//! Gasmon station entry point.
//!
//! One binary runs either station role:
//!
//! ```text
//! gasmon producer [--config /etc/gasmon.toml]
//! gasmon consumer [--config /etc/gasmon.toml]
//! ```

use gasmon::config::AppConfig;
use gasmon::error::{Error, Result};
use gasmon::sensors::{self, ClimateSource, CsvGasSource, FixedClimate};
use gasmon::shared::{ShutdownFlag, SnapshotCell};
use gasmon::sink::{SerialSink, StdoutSink, TelemetrySink};
use gasmon::streaming::{RetryPolicy, TelemetryPublisher, TelemetrySubscriber};
use std::env;
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Producer,
    Consumer,
}

/// Parse role and config path from command line arguments.
///
/// Supports:
/// - `gasmon <role>` (role positional, default config path)
/// - `gasmon <role> --config <path>` (flag-based)
/// - `gasmon <role> -c <path>` (short flag)
///
/// Defaults to `/etc/gasmon.toml` if no path is specified.
fn parse_args() -> Option<(Role, String)> {
    let args: Vec<String> = env::args().collect();

    let mut role = None;
    let mut config_path = "/etc/gasmon.toml".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" if i + 1 < args.len() => {
                config_path = args[i + 1].clone();
                i += 2;
            }
            "producer" if role.is_none() => {
                role = Some(Role::Producer);
                i += 1;
            }
            "consumer" if role.is_none() => {
                role = Some(Role::Consumer);
                i += 1;
            }
            _ => return None,
        }
    }

    role.map(|role| (role, config_path))
}

fn main() -> Result<()> {
    let Some((role, config_path)) = parse_args() else {
        eprintln!("usage: gasmon <producer|consumer> [--config <path>]");
        std::process::exit(2);
    };

    let config = AppConfig::from_file(&config_path)?;

    // RUST_LOG overrides the configured default level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.logging.level),
    )
    .init();

    log::info!("gasmon v{} starting as {role:?}", env!("CARGO_PKG_VERSION"));
    log::info!("using config: {config_path}");

    let shutdown = ShutdownFlag::new();
    let handler_flag = shutdown.clone();
    ctrlc::set_handler(move || {
        log::info!("received shutdown signal");
        handler_flag.request_stop();
    })
    .map_err(|e| Error::Other(format!("failed to set signal handler: {e}")))?;

    match role {
        Role::Producer => run_producer(config, shutdown),
        Role::Consumer => run_consumer(config, shutdown),
    }
}

/// Producer: acquisition thread feeding the snapshot cell, publish loop on
/// the main thread. A bind failure propagates and halts startup.
fn run_producer(config: AppConfig, shutdown: ShutdownFlag) -> Result<()> {
    let cell = SnapshotCell::new();

    let gas = CsvGasSource::open(&config.sensors.gas_csv_path)?;
    let climate: Box<dyn ClimateSource> = Box::new(FixedClimate::new(
        config.sensors.temperature_c,
        config.sensors.humidity,
    ));
    let unit = config.station.temperature_unit;
    let poll_interval = config.sensors.poll_interval();

    let acquisition_cell = cell.clone();
    let acquisition_shutdown = shutdown.clone();
    thread::Builder::new()
        .name("sensor-acquisition".to_string())
        .spawn(move || {
            sensors::run_acquisition(
                acquisition_cell,
                climate,
                gas,
                unit,
                poll_interval,
                acquisition_shutdown,
            )
        })?;

    let publisher = TelemetryPublisher::bind(
        &config.producer.bind_address,
        config.producer.publish_interval(),
        config.producer.accept_retry(),
    )?;
    publisher.run(&cell, &shutdown)
}

/// Consumer: connect/read/forward loop on the main thread.
fn run_consumer(config: AppConfig, shutdown: ShutdownFlag) -> Result<()> {
    let sink: Box<dyn TelemetrySink> = match config.consumer.sink.as_str() {
        "stdout" => Box::new(StdoutSink),
        path => Box::new(SerialSink::open(path, config.consumer.serial_baud)?),
    };

    let mut subscriber = TelemetrySubscriber::new(
        config.consumer.server_address.clone(),
        RetryPolicy::unbounded(config.consumer.connect_retry()),
        config.consumer.reconnect_delay(),
        config.consumer.poll_interval(),
        sink,
        SnapshotCell::new(),
    );
    subscriber.run(&shutdown)
}
