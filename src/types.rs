//! Core data types shared by both stations.

use serde::{Deserialize, Serialize};

/// One full reading of all six sensor channels at a single instant.
///
/// Snapshots are small `Copy` values: every layer works on its own copy and
/// no shared mutable snapshot ever crosses a loop boundary. All channels
/// default to zero until the first acquisition cycle completes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Temperature in the station's configured unit (see `[station]` config)
    pub temperature: f32,
    /// Relative humidity, percent
    pub humidity: f32,
    /// NH3 concentration, ppm
    pub ammonia: f32,
    /// H2S concentration, ppm
    pub hydrogen_sulfide: f32,
    /// CO2 concentration, ppm
    pub carbon_dioxide: f32,
    /// CH4 concentration, ppm
    pub methane: f32,
}
