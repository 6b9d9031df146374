//! Functional-unit occupancy scoreboard.
//!
//! One fixed-length slot vector per functional-unit type. A slot is either
//! free or holds the tag of the instruction currently occupying that unit;
//! a tag occupies at most one slot, from fire until its result broadcasts.

use crate::config::NUM_FU_TYPES;
use crate::pipeline::station::Tag;

/// Per-FU-type slot table.
pub struct Scoreboard {
    units: [Vec<Option<Tag>>; NUM_FU_TYPES],
}

impl Scoreboard {
    /// Creates a scoreboard with `fu_counts[t]` free slots for each type `t`.
    pub fn new(fu_counts: [usize; NUM_FU_TYPES]) -> Self {
        Self {
            units: fu_counts.map(|count| vec![None; count]),
        }
    }

    /// Claims the first free slot of `fu_type` for `tag`.
    /// Returns false when every slot of that type is busy.
    pub fn try_assign(&mut self, fu_type: usize, tag: Tag) -> bool {
        match self.units[fu_type].iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(tag);
                true
            }
            None => false,
        }
    }

    /// Frees the slot of `fu_type` holding `tag`, if any.
    pub fn release(&mut self, fu_type: usize, tag: Tag) {
        if let Some(slot) = self.units[fu_type]
            .iter_mut()
            .find(|slot| **slot == Some(tag))
        {
            *slot = None;
        }
    }

    /// Tags occupying slots of `fu_type`, in slot order.
    pub fn occupants(&self, fu_type: usize) -> impl Iterator<Item = Tag> + '_ {
        self.units[fu_type].iter().filter_map(|slot| *slot)
    }

    /// Number of slots configured for `fu_type`.
    pub fn slot_count(&self, fu_type: usize) -> usize {
        self.units[fu_type].len()
    }
}
