//! Configuration for the pipeline simulator.
//!
//! This module defines the parameters that dimension the simulated machine:
//! 1. **Defaults:** Baseline machine constants (result buses, FU mix, fetch width).
//! 2. **Structure:** `SimConfig`, deserializable from JSON with per-field defaults.
//! 3. **Derived values:** Scheduling-queue capacity computed from the FU mix.

use serde::Deserialize;

/// Number of functional-unit types the machine models.
pub const NUM_FU_TYPES: usize = 3;

/// Number of architectural registers tracked by the register status table.
pub const NUM_REGISTERS: usize = 128;

/// Default configuration constants for the simulator.
///
/// These values define the baseline machine when not explicitly overridden
/// on the command line or in a JSON configuration file.
mod defaults {
    /// Default number of result buses (broadcasts per cycle).
    pub const RESULT_BUSES: usize = 8;

    /// Default number of functional units of each type.
    pub const FU_COUNTS: [usize; super::NUM_FU_TYPES] = [1, 2, 3];

    /// Default number of instructions fetched per cycle.
    pub const FETCH_RATE: usize = 4;
}

/// Simulator configuration.
///
/// # Examples
///
/// Deserializing from a partial JSON object; omitted fields take defaults:
///
/// ```
/// use procsim_core::config::SimConfig;
///
/// let json = r#"{ "result_buses": 2, "fetch_rate": 1 }"#;
/// let config: SimConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.result_buses, 2);
/// assert_eq!(config.fu_counts, [1, 2, 3]);
/// assert_eq!(config.fetch_rate, 1);
/// assert!(!config.trace_stages);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SimConfig {
    /// Number of result buses; caps broadcasts (and hence retirements) per cycle.
    #[serde(default = "SimConfig::default_result_buses")]
    pub result_buses: usize,

    /// Number of functional units of each type.
    #[serde(default = "SimConfig::default_fu_counts")]
    pub fu_counts: [usize; NUM_FU_TYPES],

    /// Instructions fetched per cycle.
    #[serde(default = "SimConfig::default_fetch_rate")]
    pub fetch_rate: usize,

    /// Print one stderr line per stage transition per instruction.
    #[serde(default)]
    pub trace_stages: bool,
}

impl SimConfig {
    /// Returns the default result-bus count.
    fn default_result_buses() -> usize {
        defaults::RESULT_BUSES
    }

    /// Returns the default functional-unit mix.
    fn default_fu_counts() -> [usize; NUM_FU_TYPES] {
        defaults::FU_COUNTS
    }

    /// Returns the default fetch width.
    fn default_fetch_rate() -> usize {
        defaults::FETCH_RATE
    }

    /// Scheduling-queue capacity: twice the total functional-unit count.
    pub fn scheduling_queue_capacity(&self) -> usize {
        2 * self.fu_counts.iter().sum::<usize>()
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            result_buses: defaults::RESULT_BUSES,
            fu_counts: defaults::FU_COUNTS,
            fetch_rate: defaults::FETCH_RATE,
            trace_stages: false,
        }
    }
}
