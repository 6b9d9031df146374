//! Register status table for register renaming.
//!
//! Maps each architectural register to the tag of its latest in-flight
//! producer, or `None` if the value is architecturally ready. Dispatch reads
//! this table to capture source dependencies and overwrites it for
//! destinations; the broadcast pass flips a register back to ready only when
//! the broadcasting tag is still the register's named producer.

use crate::config::NUM_REGISTERS;
use crate::pipeline::station::Tag;

/// Register status table: architectural register -> pending producer tag.
pub struct RegisterStatus {
    slots: [Option<Tag>; NUM_REGISTERS],
}

impl Default for RegisterStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterStatus {
    /// Creates a table with every register ready (no pending writers).
    pub fn new() -> Self {
        Self {
            slots: [None; NUM_REGISTERS],
        }
    }

    /// Marks `reg` as pending on the given producer tag.
    pub fn set_producer(&mut self, reg: usize, tag: Tag) {
        self.slots[reg] = Some(tag);
    }

    /// Returns the pending producer of `reg`, or `None` if it is ready.
    pub fn producer(&self, reg: usize) -> Option<Tag> {
        self.slots[reg]
    }

    /// Clears a register's pending producer, but ONLY if the current tag
    /// matches. This prevents a broadcasting instruction from clearing a tag
    /// set by a newer writer of the same register (WAW handling).
    pub fn clear_if_match(&mut self, reg: usize, tag: Tag) {
        if self.slots[reg] == Some(tag) {
            self.slots[reg] = None;
        }
    }
}
