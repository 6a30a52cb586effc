//! Simulated analog gas sensors backed by a CSV file.
//!
//! The deployment records gas readings into a CSV generated offline; this
//! source replays it cyclically, one row per poll, as if four analog
//! sensors were being sampled. Row layout matches the generator:
//!
//! ```text
//! Sensor_Type,Ammonia_ppm,Methane_ppm,CO2_ppm,H2S_ppm,<one-hot flags...>
//! ```
//!
//! The leading sensor-type column and any trailing flag columns are
//! ignored; only the four concentration columns feed the snapshot.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// One row of simulated gas concentrations, ppm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasReading {
    pub ammonia: f32,
    pub methane: f32,
    pub carbon_dioxide: f32,
    pub hydrogen_sulfide: f32,
}

/// Cyclic reader over the simulated sensor CSV
pub struct CsvGasSource {
    reader: BufReader<File>,
    path: PathBuf,
}

impl CsvGasSource {
    /// Open the CSV and position past its header line
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        let mut source = Self {
            reader: BufReader::new(file),
            path: path.as_ref().to_path_buf(),
        };
        source.skip_header()?;
        log::info!("reading simulated gas data from {}", source.path.display());
        Ok(source)
    }

    /// Next row of readings, rewinding at end of file.
    ///
    /// Malformed rows are logged and skipped; a file with no parseable data
    /// rows at all is an error rather than a spin.
    pub fn next_reading(&mut self) -> Result<GasReading> {
        let mut wrapped = false;
        let mut line = String::new();

        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                if wrapped {
                    return Err(Error::Other(format!(
                        "no usable data rows in {}",
                        self.path.display()
                    )));
                }
                log::debug!("gas CSV exhausted, rewinding");
                self.rewind()?;
                wrapped = true;
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }
            match parse_row(&line) {
                Some(reading) => return Ok(reading),
                None => log::warn!("skipping malformed gas CSV row: {}", line.trim_end()),
            }
        }
    }

    fn rewind(&mut self) -> Result<()> {
        self.reader.seek(SeekFrom::Start(0))?;
        self.skip_header()
    }

    fn skip_header(&mut self) -> Result<()> {
        let mut header = String::new();
        self.reader.read_line(&mut header)?;
        Ok(())
    }
}

fn parse_row(line: &str) -> Option<GasReading> {
    let mut columns = line.trim().split(',');
    let _sensor_type = columns.next()?;
    let ammonia = columns.next()?.trim().parse().ok()?;
    let methane = columns.next()?.trim().parse().ok()?;
    let carbon_dioxide = columns.next()?.trim().parse().ok()?;
    let hydrogen_sulfide = columns.next()?.trim().parse().ok()?;
    Some(GasReading {
        ammonia,
        methane,
        carbon_dioxide,
        hydrogen_sulfide,
    })
}
