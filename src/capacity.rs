use crate::cfg::target_load_factor;
use crate::error::Error;

/// Home-slot counts a probe table may use, in ascending order.
///
/// Primes keep `hash % table_size` well spread even for hashes with weak low
/// bits. Each size is roughly double the previous one.
const TABLE_SIZES: [usize; 26] = [
    29,
    59,
    127,
    257,
    521,
    1_049,
    2_099,
    4_201,
    8_419,
    16_843,
    33_703,
    67_409,
    134_837,
    269_683,
    539_389,
    1_078_787,
    2_157_587,
    4_315_183,
    8_630_387,
    17_260_781,
    34_521_589,
    69_043_189,
    138_086_407,
    276_172_823,
    552_345_671,
    1_104_691_373,
];

/// How many sizes reactive growth may advance beyond the size the table was
/// last sized for. A hash function that still overflows the probe bound after
/// this many doublings is clustering keys, and more memory will not fix it.
const MAX_SURPLUS_GROWTH: usize = 4;

#[inline(always)]
fn max_probe_length(table_size: usize) -> usize {
    table_size.ilog2() as usize
}

/// The largest number of entries any table can hold.
#[inline]
pub(crate) fn max_size() -> usize {
    target_load_factor(TABLE_SIZES[TABLE_SIZES.len() - 1])
}

/// A probe table geometry: the number of home slots and the probe bound that
/// goes with it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Capacity {
    table_size: usize,
    max_probe: usize,
}

impl Capacity {
    /// The geometry of a table that has never allocated.
    pub(crate) const EMPTY: Capacity = Capacity {
        table_size: 0,
        max_probe: 0,
    };

    fn from_rank(rank: usize) -> Option<Self> {
        TABLE_SIZES.get(rank).map(|&table_size| Capacity {
            table_size,
            max_probe: max_probe_length(table_size),
        })
    }

    /// The smallest geometry whose load factor admits `len` entries.
    pub(crate) fn for_len(len: usize) -> Result<Self, Error> {
        if len == 0 {
            return Ok(Self::EMPTY);
        }

        TABLE_SIZES
            .iter()
            .position(|&size| target_load_factor(size) >= len)
            .and_then(Self::from_rank)
            .ok_or(Error::CapacityExceeded {
                requested: len,
                max_size: max_size(),
            })
    }

    /// Number of sizes at or below this one.
    #[inline]
    fn rank(self) -> usize {
        TABLE_SIZES.partition_point(|&size| size <= self.table_size)
    }

    /// The next larger geometry, if there is one.
    pub(crate) fn next(self) -> Option<Self> {
        Self::from_rank(self.rank())
    }

    /// The geometry to rebuild into after a probe sequence overflowed at this
    /// size while holding `len` entries.
    ///
    /// Surplus growth is counted from `planned`, the size last chosen by the
    /// load factor or an explicit reservation, or from the size `len` needs if
    /// that is larger. Returns `None` once [`MAX_SURPLUS_GROWTH`] sizes past
    /// that point are used up, or when there is no larger size.
    pub(crate) fn grow_past_overflow(self, planned: Capacity, len: usize) -> Option<Self> {
        let required = Self::for_len(len).ok()?;
        let origin = planned.rank().max(required.rank());
        if self.rank().saturating_sub(origin) >= MAX_SURPLUS_GROWTH {
            return None;
        }
        self.next()
    }

    #[inline(always)]
    pub(crate) fn home(self, hash: u64) -> usize {
        debug_assert!(self.table_size != 0);
        (hash % self.table_size as u64) as usize
    }

    #[inline(always)]
    pub(crate) fn table_size(self) -> usize {
        self.table_size
    }

    #[inline(always)]
    pub(crate) fn max_probe(self) -> usize {
        self.max_probe
    }

    /// Entries admitted before the load factor forces growth.
    #[inline(always)]
    pub(crate) fn max_len(self) -> usize {
        target_load_factor(self.table_size)
    }

    /// Physical slot count: the home slots plus `max_probe` slack slots so no
    /// probe sequence ever wraps.
    #[inline(always)]
    pub(crate) fn total_slots(self) -> usize {
        if self.table_size == 0 {
            0
        } else {
            self.table_size + self.max_probe
        }
    }
}
