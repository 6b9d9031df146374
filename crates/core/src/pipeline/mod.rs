//! Pipeline engine: stages, scheduling structures, and the cycle driver.
//!
//! Leaves first:
//! 1. **`station`** — reservation stations and the tags that key them.
//! 2. **`regfile`** — register status table for register renaming.
//! 3. **`scoreboard`** — per-FU-type occupancy tracking.
//! 4. **`cdb`** — the common-data-bus pool that bounds broadcasts per cycle.
//! 5. **`simulator`** — the per-cycle two-phase driver tying the stages together.

/// Common-data-bus descriptor pool.
pub mod cdb;
/// Register status table (architectural register -> pending producer).
pub mod regfile;
/// Functional-unit occupancy scoreboard.
pub mod scoreboard;
/// Pipeline driver and per-instruction cycle log.
pub mod simulator;
/// Reservation stations, lifecycle states, and tags.
pub mod station;

pub use simulator::{Simulator, StageCycles};
pub use station::Tag;
