//! Reservation stations and the tags that key them.
//!
//! A reservation station buffers one instruction from dispatch through
//! retirement, tracking source readiness and its position in the
//! DISPATCHED -> SCHEDULED -> EXECUTED -> COMPLETED lifecycle.

/// Unique, monotonically increasing identifier assigned to an instruction at
/// fetch. Tags double as the scheduling-queue key and the program-order index;
/// they are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tag(pub u32);

/// Lifecycle state of a reservation station.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Status {
    /// Inserted into the scheduling queue; sources may still be pending.
    #[default]
    Dispatched,
    /// Granted a functional-unit slot (fired); executes next cycle.
    Scheduled,
    /// Processed by its functional unit; awaiting a result bus.
    Executed,
    /// Broadcast complete; removed by state update in a later cycle.
    Completed,
}

/// A scheduling-queue entry.
#[derive(Clone, Debug)]
pub struct ReservationStation {
    /// Operation class as decoded (-1 is an alias for type 1; see `fu_type`).
    pub op_class: i32,
    /// Pending producer per source; `None` means the operand is ready.
    pub src_pending: [Option<Tag>; 2],
    /// Destination register; negative means none.
    pub dest_reg: i32,
    /// The producing instruction's tag; also this entry's queue key.
    pub tag: Tag,
    /// Current lifecycle state.
    pub status: Status,
    /// Cycle of the most recent status transition.
    pub stamp: u64,
}

impl ReservationStation {
    /// True when both sources are ready.
    pub fn ready(&self) -> bool {
        self.src_pending.iter().all(|p| p.is_none())
    }

    /// Functional-unit type, folding the -1 alias onto type 1.
    pub fn fu_type(&self) -> usize {
        if self.op_class < 0 {
            1
        } else {
            self.op_class as usize
        }
    }

    /// Wakes any source waiting on `tag`.
    pub fn forward(&mut self, tag: Tag) {
        for pending in &mut self.src_pending {
            if *pending == Some(tag) {
                *pending = None;
            }
        }
    }
}
