use super::types::{RoomDistribution, RoomSlot};

/// Creates one empty slot per room, grouped by size in distribution order.
pub fn build_slots<'a>(distribution: &RoomDistribution) -> Vec<RoomSlot<'a>> {
    let mut slots = Vec::with_capacity(distribution.total_rooms());
    for &(size, count) in distribution.tiers() {
        slots.extend((0..count).map(|_| RoomSlot::new(size)));
    }
    slots
}

/// Round-robin probe over the rooms.
///
/// Starting at `*cursor`, visits at most `slots.len()` rooms, wrapping around
/// and advancing the cursor after every probe. Returns the first room with a
/// spare bed, or `None` when every room is full.
pub fn next_open_slot(slots: &[RoomSlot<'_>], cursor: &mut usize) -> Option<usize> {
    let total = slots.len();
    for _ in 0..total {
        let index = *cursor % total;
        *cursor += 1;
        if slots[index].has_space() {
            return Some(index);
        }
    }
    None
}

pub fn remaining_capacity(slots: &[RoomSlot<'_>]) -> usize {
    slots
        .iter()
        .map(|slot| slot.capacity - slot.occupants.len())
        .sum()
}
