use alloc::vec;
use alloc::vec::Vec;

use crate::capacity::Capacity;
use crate::error::invariant_violation;

/// The occupant of an [`Slot::Occupied`] slot: a cached hash and the position
/// of its entry in the entry store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Resident {
    pub(crate) hash: u64,
    pub(crate) index: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Slot {
    /// Never occupied since the last rebuild or clear. Ends a probe.
    #[default]
    Empty,
    /// Occupied, then erased. Probes continue past it.
    Tombstone,
    Occupied(Resident),
}

/// A probe sequence ran past `max_probe` before finding a home for some
/// entry. The probe table no longer references every entry and must be
/// rebuilt.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ProbeOverflow;

/// A successful lookup: where the slot is, and which entry it names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Found {
    pub(crate) slot: usize,
    pub(crate) index: usize,
}

/// Open-addressed slots probed linearly with Robin Hood displacement.
///
/// The slot array has `table_size + max_probe` entries. Since every home is
/// below `table_size`, the whole probe window `home..=home + max_probe` is
/// always in bounds and no sequence wraps.
#[derive(Clone)]
pub(crate) struct ProbeTable {
    slots: Vec<Slot>,
    capacity: Capacity,
    tombstones: usize,
}

impl ProbeTable {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            capacity: Capacity::EMPTY,
            tombstones: 0,
        }
    }

    /// Builds a table for `capacity` holding one resident per hash, where the
    /// `i`th hash belongs to entry `i`.
    pub(crate) fn build(
        capacity: Capacity,
        hashes: impl Iterator<Item = u64>,
    ) -> Result<Self, ProbeOverflow> {
        let mut table = Self {
            slots: vec![Slot::Empty; capacity.total_slots()],
            capacity,
            tombstones: 0,
        };
        for (index, hash) in hashes.enumerate() {
            table.insert_slot(hash, index)?;
        }
        Ok(table)
    }

    #[inline(always)]
    pub(crate) fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Slot positions a probe for `hash` may visit.
    #[inline(always)]
    fn window(&self, hash: u64) -> core::ops::RangeInclusive<usize> {
        let home = self.capacity.home(hash);
        home..=home + self.capacity.max_probe()
    }

    /// Places `(hash, index)` using Robin Hood displacement.
    ///
    /// The carried resident takes any empty or tombstoned slot. An occupied
    /// slot is taken over only when its resident sits strictly closer to home
    /// than the carried one has probed; the evicted resident is carried on
    /// from there.
    pub(crate) fn insert_slot(&mut self, hash: u64, index: usize) -> Result<(), ProbeOverflow> {
        if self.slots.is_empty() {
            return Err(ProbeOverflow);
        }

        let capacity = self.capacity;
        let mut carried = Slot::Occupied(Resident { hash, index });
        let mut position = capacity.home(hash);
        let mut probe_count = 0;

        loop {
            if probe_count > capacity.max_probe() {
                return Err(ProbeOverflow);
            }

            let slot = &mut self.slots[position];
            match *slot {
                Slot::Empty => {
                    *slot = carried;
                    return Ok(());
                }
                Slot::Tombstone => {
                    *slot = carried;
                    self.tombstones -= 1;
                    return Ok(());
                }
                Slot::Occupied(resident) => {
                    let resident_distance = position - capacity.home(resident.hash);
                    if resident_distance < probe_count {
                        carried = core::mem::replace(slot, carried);
                        probe_count = resident_distance;
                    }
                }
            }

            position += 1;
            probe_count += 1;
        }
    }

    /// Finds the slot whose cached hash equals `hash` and whose entry
    /// satisfies `eq`.
    pub(crate) fn find(&self, hash: u64, mut eq: impl FnMut(usize) -> bool) -> Option<Found> {
        if self.slots.is_empty() {
            return None;
        }

        for slot in self.window(hash) {
            match self.slots[slot] {
                Slot::Empty => return None,
                Slot::Tombstone => {}
                Slot::Occupied(resident) => {
                    if resident.hash == hash && eq(resident.index) {
                        return Some(Found {
                            slot,
                            index: resident.index,
                        });
                    }
                }
            }
        }

        None
    }

    /// Finds the first slot whose cached hash equals `hash`, without checking
    /// the key.
    pub(crate) fn find_fast(&self, hash: u64) -> Option<Found> {
        self.find(hash, |_| true)
    }

    /// Marks an occupied slot as erased.
    pub(crate) fn set_tombstone(&mut self, slot: usize) {
        debug_assert!(matches!(self.slots[slot], Slot::Occupied(_)));
        self.slots[slot] = Slot::Tombstone;
        self.tombstones += 1;
    }

    /// Re-links the resident for the entry that moved from `from` to `to`.
    pub(crate) fn repoint(&mut self, hash: u64, from: usize, to: usize) {
        let window = self.window(hash);
        let target = Slot::Occupied(Resident { hash, index: from });
        match self.slots[window.clone()].iter_mut().find(|slot| **slot == target) {
            Some(slot) => *slot = Slot::Occupied(Resident { hash, index: to }),
            None => invariant_violation(format_args!(
                "no slot in {window:?} references moved entry {from}"
            )),
        }
    }

    /// Empties every slot, keeping the allocation.
    pub(crate) fn clear(&mut self) {
        self.slots.fill(Slot::Empty);
        self.tombstones = 0;
    }

    #[inline]
    pub(crate) fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Distance from home of each occupied slot, in slot order.
    pub(crate) fn displacements(&self) -> impl Iterator<Item = usize> + '_ {
        let capacity = self.capacity;
        self.slots
            .iter()
            .enumerate()
            .filter_map(move |(position, slot)| match slot {
                Slot::Occupied(resident) => Some(position - capacity.home(resident.hash)),
                _ => None,
            })
    }

    /// Checks every structural property of the table against the cached
    /// hashes of the entry store.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self, hashes: &[u64]) {
        let capacity = self.capacity;
        assert_eq!(self.slots.len(), capacity.total_slots());
        assert!(hashes.len() <= capacity.max_len());

        let mut seen = vec![false; hashes.len()];
        let mut tombstones = 0;
        for (position, slot) in self.slots.iter().enumerate() {
            match *slot {
                Slot::Empty => {}
                Slot::Tombstone => tombstones += 1,
                Slot::Occupied(resident) => {
                    assert!(resident.index < hashes.len(), "dangling index at {position}");
                    assert_eq!(resident.hash, hashes[resident.index]);
                    assert!(!seen[resident.index], "entry {} referenced twice", resident.index);
                    seen[resident.index] = true;

                    let home = capacity.home(resident.hash);
                    assert!(position >= home);
                    assert!(position - home <= capacity.max_probe());
                    assert!(
                        self.slots[home..position]
                            .iter()
                            .all(|slot| *slot != Slot::Empty),
                        "empty slot between home {home} and resident at {position}"
                    );
                }
            }
        }
        assert!(seen.iter().all(|&s| s), "entry without a slot");
        assert_eq!(tombstones, self.tombstones);
    }
}
