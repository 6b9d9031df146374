//! Common-data-bus descriptor pool.
//!
//! A fixed pool of broadcast slots. The pool size caps how many completed
//! instructions can publish their (tag, destination register) per cycle;
//! the broadcast pass clears the whole pool before pairing it with the
//! waiting-to-broadcast list, so a busy descriptor always refers to an
//! instruction completed in the current cycle.

use crate::pipeline::station::Tag;

/// One result broadcast: the producing tag and its destination register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Broadcast {
    /// Tag of the broadcasting instruction.
    pub tag: Tag,
    /// Destination register the result retires into.
    pub dest_reg: i32,
}

/// Fixed-size pool of result-bus descriptors; `None` marks an idle bus.
pub struct CdbPool {
    buses: Vec<Option<Broadcast>>,
}

impl CdbPool {
    /// Creates a pool of `size` idle buses.
    pub fn new(size: usize) -> Self {
        Self {
            buses: vec![None; size],
        }
    }

    /// Number of buses in the pool.
    pub fn capacity(&self) -> usize {
        self.buses.len()
    }

    /// Idles every bus; called at the start of each broadcast pass.
    pub fn clear(&mut self) {
        self.buses.fill(None);
    }

    /// Publishes a broadcast on bus `index`.
    pub fn publish(&mut self, index: usize, tag: Tag, dest_reg: i32) {
        self.buses[index] = Some(Broadcast { tag, dest_reg });
    }

    /// Busy descriptors, in bus order.
    pub fn broadcasts(&self) -> impl Iterator<Item = Broadcast> + '_ {
        self.buses.iter().filter_map(|bus| *bus)
    }
}
