use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::slice;

use crate::capacity;
use crate::capacity::Capacity;
use crate::cfg;
use crate::cfg::debug;
use crate::cfg::trace;
use crate::entries::Bucket;
use crate::entries::EntryStore;
use crate::error::Error;
use crate::error::invariant_violation;
use crate::probe_table::Found;
use crate::probe_table::ProbeTable;

#[cold]
#[inline(never)]
#[track_caller]
fn capacity_exceeded(error: Error) -> ! {
    panic!("{error}")
}

/// Debug statistics for probe table analysis.
///
/// Available with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of entries currently in the table
    pub populated: usize,
    /// Maximum number of entries before the load factor forces a resize
    pub capacity: usize,
    /// Number of home slots (the modulus applied to hashes)
    pub table_size: usize,
    /// Total number of slots allocated, including probe slack
    pub total_slots: usize,
    /// Number of erased slots that probes must still walk past
    pub tombstones: usize,
    /// The configured probe bound for this table size
    pub max_probe_length: usize,
    /// The largest distance from home of any entry
    pub longest_probe: usize,
    /// Mean distance from home across all entries
    pub mean_probe: f64,
    /// Load factor (populated / table_size)
    pub load_factor: f64,
    /// Slot utilization (populated / total_slots)
    pub slot_utilization: f64,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Probe Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% of {} home slots)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0,
            self.table_size
        );
        println!(
            "Slot Usage: {}/{} ({:.2}% utilization, {} tombstones)",
            self.populated,
            self.total_slots,
            self.slot_utilization * 100.0,
            self.tombstones
        );
        println!(
            "Probe Length: mean {:.3}, longest {} (bound {})",
            self.mean_probe, self.longest_probe, self.max_probe_length
        );
    }
}

/// A hash table using Robin Hood linear probing over a dense entry store.
///
/// `HashTable<K, V>` keeps every key-value pair in one gap-free array, in the
/// order the pairs were inserted, and a separate array of probe slots that
/// map hashes to positions in it. Like other raw tables, it does not hash
/// anything itself: every operation takes the `u64` hash of the key, and
/// lookups take an equality predicate.
///
/// The same hash must always be supplied for equal keys. Probing starts at
/// `hash % table_size()` and never looks more than [`max_probe_length`] slots
/// past that point.
///
/// ## Performance Characteristics
///
/// - **Memory**: a 24-byte slot per home slot plus `K`, `V` and a u64 hash
///   per entry.
/// - **Iteration**: a linear walk over the dense entries, with no empty
///   buckets to skip.
///
/// [`max_probe_length`]: HashTable::max_probe_length
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use robin_hash::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table = HashTable::with_capacity(100);
/// let hash = hash_id(123);
///
/// table
///     .insert(hash, 123u64, "Alice".to_string(), |&id| id == 123)
///     .unwrap();
/// assert_eq!(
///     table.find(hash, |&id| id == 123).map(|(_, name)| name.as_str()),
///     Some("Alice")
/// );
/// ```
#[derive(Clone)]
pub struct HashTable<K, V> {
    entries: EntryStore<K, V>,
    probes: ProbeTable,
    /// Geometry last chosen by the load factor or an explicit reservation.
    /// Reactive growth is bounded relative to it.
    planned: Capacity,
}

impl<K, V> Debug for HashTable<K, V>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashTable")
            .field("entries", &self.entries.as_slice())
            .field("populated", &self.len())
            .field("capacity", &self.capacity())
            .field("table_size", &self.table_size())
            .field("max_probe_length", &self.max_probe_length())
            .field("tombstones", &self.probes.tombstones())
            .finish()
    }
}

impl<K, V> Default for HashTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> HashTable<K, V> {
    /// Creates an empty table. No memory is allocated until the first
    /// insertion.
    pub const fn new() -> Self {
        Self {
            entries: EntryStore::new(),
            probes: ProbeTable::new(),
            planned: Capacity::EMPTY,
        }
    }

    /// Creates a table that can hold at least `capacity` entries without
    /// resizing.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`max_size`](HashTable::max_size).
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<u64, String> = HashTable::with_capacity(100);
    /// assert!(table.capacity() >= 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        match Self::try_with_capacity(capacity) {
            Ok(table) => table,
            Err(error) => capacity_exceeded(error),
        }
    }

    /// Creates a table that can hold at least `capacity` entries without
    /// resizing, or reports [`Error::CapacityExceeded`].
    pub fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        let geometry = Capacity::for_len(capacity)?;
        let probes = match ProbeTable::build(geometry, core::iter::empty()) {
            Ok(probes) => probes,
            Err(_) => invariant_violation(format_args!("an empty probe table overflowed")),
        };

        Ok(Self {
            entries: EntryStore::with_capacity(geometry.max_len()),
            probes,
            planned: geometry,
        })
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table contains no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of entries the table can hold before it needs to
    /// resize.
    ///
    /// This is `table_size() * max_load_factor()`, rounded down.
    pub fn capacity(&self) -> usize {
        self.probes.capacity().max_len()
    }

    /// Returns the largest number of entries any table can hold.
    ///
    /// This is an entry count, the load factor applied to the largest table
    /// size, and so the largest value [`capacity`](HashTable::capacity) can
    /// reach. It is not a slot count.
    pub fn max_size(&self) -> usize {
        capacity::max_size()
    }

    /// Returns the number of home slots. Hashes are reduced modulo this value.
    pub fn table_size(&self) -> usize {
        self.probes.capacity().table_size()
    }

    /// Returns the furthest any entry may sit from its home slot at the
    /// current table size.
    pub fn max_probe_length(&self) -> usize {
        self.probes.capacity().max_probe()
    }

    /// Returns the configured ratio of entries to home slots at which the
    /// table grows.
    pub fn max_load_factor(&self) -> f32 {
        cfg::max_load_factor()
    }

    /// Returns an iterator over the entries in storage order.
    ///
    /// Storage order is insertion order until the first removal. Removing an
    /// entry moves the last entry into its place.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.entries.as_slice().iter(),
        }
    }

    /// Returns an iterator over the entries in storage order, with mutable
    /// values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.entries.as_mut_slice().iter_mut(),
        }
    }

    /// Returns an iterator that removes and yields every entry in storage
    /// order.
    ///
    /// The table is empty once `drain` returns, even if the iterator is not
    /// consumed. Allocated capacity is kept.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        self.probes.clear();
        Drain {
            inner: self.entries.drain(),
        }
    }

    /// Removes all entries, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.probes.clear();
    }

    /// Returns the entry at `index` in storage order.
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        self.entries.get(index).map(Bucket::refs)
    }

    /// Returns the entry at `index` in storage order, with a mutable value.
    pub fn get_index_mut(&mut self, index: usize) -> Option<(&K, &mut V)> {
        self.entries.get_mut(index).map(Bucket::ref_mut)
    }

    /// Reserves capacity for at least `additional` more entries.
    ///
    /// The request is counted on top of the current length, as with
    /// `Vec::reserve`: after the call, `capacity() >= len() + additional`.
    /// Does nothing if the capacity already covers that total.
    ///
    /// # Panics
    ///
    /// Panics if the new size would exceed [`max_size`](HashTable::max_size).
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64, u64> = HashTable::new();
    /// table.reserve(50);
    /// assert!(table.capacity() >= 50);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        if let Err(error) = self.try_reserve(additional) {
            capacity_exceeded(error);
        }
    }

    /// Reserves capacity for at least `additional` more entries, or reports
    /// [`Error::CapacityExceeded`] and leaves the table unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::Error;
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64, u64> = HashTable::new();
    /// assert!(table.try_reserve(1_000).is_ok());
    /// assert!(matches!(
    ///     table.try_reserve(usize::MAX),
    ///     Err(Error::CapacityExceeded { .. })
    /// ));
    /// assert!(table.capacity() >= 1_000);
    /// ```
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        let required = self
            .len()
            .checked_add(additional)
            .ok_or(Error::CapacityExceeded {
                requested: usize::MAX,
                max_size: capacity::max_size(),
            })?;
        self.grow_for(required)
    }

    /// Shrinks the table to the smallest size that holds its current entries.
    ///
    /// An empty table releases all of its memory.
    pub fn shrink_to_fit(&mut self) {
        if self.is_empty() {
            debug!(table_size = self.table_size(), "releasing table storage");
            *self = Self::new();
            return;
        }

        if let Ok(capacity) = Capacity::for_len(self.len()) {
            if capacity.table_size() < self.table_size() {
                debug!(
                    old_table_size = self.table_size(),
                    new_table_size = capacity.table_size(),
                    "shrinking probe table"
                );
                self.planned = capacity;
                self.rebuild(capacity);
            }
        }
        self.entries.shrink_to_fit();
    }

    /// Inserts a new entry, failing if an equal key is already present.
    ///
    /// On success, returns a mutable reference to the inserted value. If `eq`
    /// matches an existing entry with the same hash, nothing is modified and
    /// [`Error::KeyAlreadyExists`] carries the position of that entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use robin_hash::Error;
    /// # use robin_hash::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = HashTable::new();
    /// let hash = hash_str("key");
    ///
    /// *table.insert(hash, "key", 1, |k| *k == "key").unwrap() += 1;
    /// assert_eq!(
    ///     table.insert(hash, "key", 5, |k| *k == "key"),
    ///     Err(Error::KeyAlreadyExists { index: 0 })
    /// );
    /// assert_eq!(table.find(hash, |k| *k == "key"), Some((&"key", &2)));
    /// ```
    pub fn insert(
        &mut self,
        hash: u64,
        key: K,
        value: V,
        eq: impl Fn(&K) -> bool,
    ) -> Result<&mut V, Error> {
        if let Some(found) = self.lookup(hash, eq) {
            return Err(Error::KeyAlreadyExists { index: found.index });
        }

        self.grow_for(self.len() + 1)?;
        let index = self.push_unique(hash, key, value);
        Ok(&mut self.entries.as_mut_slice()[index].value)
    }

    /// Inserts an entry, or overwrites the value of the entry matching `eq`.
    ///
    /// An overwrite leaves the stored key and the probe table untouched and
    /// returns the old value.
    ///
    /// # Panics
    ///
    /// Panics if inserting a new entry would exceed
    /// [`max_size`](HashTable::max_size).
    pub fn insert_or_assign(
        &mut self,
        hash: u64,
        key: K,
        value: V,
        eq: impl Fn(&K) -> bool,
    ) -> Option<V> {
        match self.entry(hash, eq) {
            Entry::Occupied(mut entry) => Some(entry.insert(value)),
            Entry::Vacant(entry) => {
                entry.insert(key, value);
                None
            }
        }
    }

    /// Finds the entry with the given hash whose key satisfies `eq`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use robin_hash::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_u64(n: u64) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     n.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = HashTable::new();
    /// table.insert(hash_u64(7), 7u64, "seven", |&k| k == 7).unwrap();
    ///
    /// assert_eq!(table.find(hash_u64(7), |&k| k == 7), Some((&7, &"seven")));
    /// assert_eq!(table.find(hash_u64(8), |&k| k == 8), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&K) -> bool) -> Option<(&K, &V)> {
        let found = self.lookup(hash, eq)?;
        self.get_index(found.index)
    }

    /// Finds the entry with the given hash whose key satisfies `eq`, with a
    /// mutable value.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&K) -> bool) -> Option<(&K, &mut V)> {
        let found = self.lookup(hash, eq)?;
        self.get_index_mut(found.index)
    }

    /// Returns the storage position of the entry matching `eq`.
    pub fn find_index(&self, hash: u64, eq: impl Fn(&K) -> bool) -> Option<usize> {
        self.lookup(hash, eq).map(|found| found.index)
    }

    /// Finds the first entry whose cached hash equals `hash`, without
    /// comparing keys.
    ///
    /// This skips the key comparison entirely. The price is that if two
    /// distinct keys produce the same 64-bit hash, the entry returned may
    /// belong to the other key, and a lookup for an absent key may return an
    /// entry for a present one. Only use it when that trade is acceptable.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.insert(99, "first", 1, |k| *k == "first").unwrap();
    /// table.insert(99, "second", 2, |k| *k == "second").unwrap();
    ///
    /// // Same hash, different keys: the fast path cannot tell them apart.
    /// assert_eq!(table.find_fast(99), Some((&"first", &1)));
    /// assert_eq!(table.find(99, |k| *k == "second"), Some((&"second", &2)));
    /// ```
    pub fn find_fast(&self, hash: u64) -> Option<(&K, &V)> {
        let found = self.probes.find_fast(hash)?;
        self.get_index(found.index)
    }

    /// Mutable counterpart of [`find_fast`](HashTable::find_fast), with the
    /// same caveat about colliding hashes.
    pub fn find_fast_mut(&mut self, hash: u64) -> Option<(&K, &mut V)> {
        let found = self.probes.find_fast(hash)?;
        self.get_index_mut(found.index)
    }

    /// Removes and returns the entry matching `eq`.
    ///
    /// The last entry in storage order moves into the removed entry's
    /// position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.insert(1, 'a', "alpha", |&k| k == 'a').unwrap();
    /// table.insert(2, 'b', "beta", |&k| k == 'b').unwrap();
    /// table.insert(3, 'c', "gamma", |&k| k == 'c').unwrap();
    ///
    /// assert_eq!(table.remove(1, |&k| k == 'a'), Some(('a', "alpha")));
    /// assert_eq!(table.remove(1, |&k| k == 'a'), None);
    ///
    /// let order: Vec<char> = table.iter().map(|(k, _)| *k).collect();
    /// assert_eq!(order, ['c', 'b']);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&K) -> bool) -> Option<(K, V)> {
        let found = self.lookup(hash, eq)?;
        Some(self.remove_found(found))
    }

    /// Removes the entry matching `eq`, returning whether one was found.
    pub fn erase(&mut self, hash: u64, eq: impl Fn(&K) -> bool) -> bool {
        self.remove(hash, eq).is_some()
    }

    /// Keeps only the entries for which `keep` returns `true`.
    ///
    /// Unlike [`remove`](HashTable::remove), the surviving entries keep their
    /// relative order. The probe table is rebuilt if anything was removed.
    pub fn retain(&mut self, keep: impl FnMut(&K, &mut V) -> bool) {
        let before = self.len();
        self.entries.retain(keep);
        if self.len() != before {
            self.rebuild(self.probes.capacity());
        }
    }

    /// Gets the entry for the given hash and equality predicate, for in-place
    /// insertion or modification.
    ///
    /// # Panics
    ///
    /// Panics if the entry is vacant and the table is already holding
    /// [`max_size`](HashTable::max_size) entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::Entry;
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    ///
    /// match table.entry(42, |&k: &u32| k == 42) {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert(42, "answer");
    ///     }
    ///     Entry::Occupied(_) => unreachable!(),
    /// }
    ///
    /// *table.entry(42, |&k| k == 42).or_insert(42, "ignored") = "updated";
    /// assert_eq!(table.find(42, |&k| k == 42), Some((&42, &"updated")));
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&K) -> bool) -> Entry<'_, K, V> {
        match self.try_entry(hash, eq) {
            Ok(entry) => entry,
            Err(error) => capacity_exceeded(error),
        }
    }

    /// Gets the entry for the given hash and equality predicate, reporting
    /// [`Error::CapacityExceeded`] if the entry is vacant and there is no room
    /// for another one.
    pub fn try_entry(
        &mut self,
        hash: u64,
        eq: impl Fn(&K) -> bool,
    ) -> Result<Entry<'_, K, V>, Error> {
        match self.lookup(hash, eq) {
            Some(found) => Ok(Entry::Occupied(OccupiedEntry { table: self, found })),
            None => {
                self.grow_for(self.len() + 1)?;
                Ok(Entry::Vacant(VacantEntry { table: self, hash }))
            }
        }
    }

    #[inline]
    fn lookup(&self, hash: u64, eq: impl Fn(&K) -> bool) -> Option<Found> {
        let entries = &self.entries;
        self.probes.find(hash, |index| eq(entries.key(index)))
    }

    /// Makes room for `required` entries without violating the load factor.
    fn grow_for(&mut self, required: usize) -> Result<(), Error> {
        if required <= self.capacity() {
            return Ok(());
        }

        let capacity = Capacity::for_len(required)?;
        self.entries.reserve(required - self.len());
        self.planned = capacity;
        self.rebuild(capacity);
        Ok(())
    }

    /// Replaces the probe table with one of at least `capacity`, re-inserting
    /// every entry from the entry store.
    ///
    /// A rebuild that overflows the probe bound retries at the next size.
    #[cold]
    fn rebuild(&mut self, mut capacity: Capacity) {
        loop {
            match ProbeTable::build(capacity, self.entries.hashes()) {
                Ok(probes) => {
                    debug!(
                        old_table_size = self.table_size(),
                        new_table_size = capacity.table_size(),
                        max_probe_length = capacity.max_probe(),
                        entries = self.len(),
                        "rebuilt probe table"
                    );
                    self.probes = probes;
                    return;
                }
                Err(_) => {
                    trace!(
                        table_size = capacity.table_size(),
                        entries = self.len(),
                        "probe bound overflowed during rebuild"
                    );
                    capacity = self.grow_past_overflow(capacity);
                }
            }
        }
    }

    fn grow_past_overflow(&self, capacity: Capacity) -> Capacity {
        match capacity.grow_past_overflow(self.planned, self.len()) {
            Some(next) => next,
            None => invariant_violation(format_args!(
                "{} entries overflow the probe bound at table size {} with no growth \
                 left past the planned size {}; the hash function is clustering keys",
                self.len(),
                capacity.table_size(),
                self.planned.table_size()
            )),
        }
    }

    /// Appends an entry whose key is known to be absent and links it into the
    /// probe table. Room for one more entry must already be reserved.
    fn push_unique(&mut self, hash: u64, key: K, value: V) -> usize {
        debug_assert!(self.len() < self.capacity());

        let index = self.entries.push(hash, key, value);
        if self.probes.insert_slot(hash, index).is_err() {
            let capacity = self.probes.capacity();
            trace!(
                table_size = capacity.table_size(),
                max_probe_length = capacity.max_probe(),
                "probe bound overflowed on insert, growing"
            );
            let next = self.grow_past_overflow(capacity);
            self.rebuild(next);
        }
        index
    }

    /// Unlinks and removes a located entry, re-linking the entry that moves
    /// into its storage position.
    fn remove_found(&mut self, found: Found) -> (K, V) {
        self.probes.set_tombstone(found.slot);
        let (bucket, moved_from) = self.entries.swap_remove(found.index);
        if let Some(from) = moved_from {
            self.probes
                .repoint(self.entries.hash(found.index), from, found.index);
        }
        bucket.key_value()
    }

    /// Computes a histogram of probe lengths for the current table state.
    ///
    /// Index `d` counts the entries sitting `d` slots past their home. The
    /// histogram has `max_probe_length() + 1` bins.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> Vec<usize> {
        let mut hist = vec![0usize; self.max_probe_length() + 1];
        for distance in self.probes.displacements() {
            hist[distance] += 1;
        }
        hist
    }

    /// Returns detailed utilization statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let total_slots = self.probes.capacity().total_slots();
        let (longest_probe, probe_sum) = self
            .probes
            .displacements()
            .fold((0, 0), |(longest, sum), d| (longest.max(d), sum + d));

        DebugStats {
            populated: self.len(),
            capacity: self.capacity(),
            table_size: self.table_size(),
            total_slots,
            tombstones: self.probes.tombstones(),
            max_probe_length: self.max_probe_length(),
            longest_probe,
            mean_probe: if self.is_empty() {
                0.0
            } else {
                probe_sum as f64 / self.len() as f64
            },
            load_factor: if self.table_size() == 0 {
                0.0
            } else {
                self.len() as f64 / self.table_size() as f64
            },
            slot_utilization: if total_slots == 0 {
                0.0
            } else {
                self.len() as f64 / total_slots as f64
            },
        }
    }

    /// Pretty-prints the probe-length histogram horizontally using stdout.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_probe_histogram(&self) {
        let hist = self.probe_histogram();
        let max = hist.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!("probe histogram ({} entries):", self.len());
        for (distance, &count) in hist.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{distance:>2} | {} ({count})", "█".repeat(width));
        }
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let hashes: Vec<u64> = self.entries.hashes().collect();
        self.probes.assert_consistent(&hashes);
    }

    #[cfg(test)]
    pub(crate) fn cached_hashes(&self) -> impl Iterator<Item = (&K, u64)> + '_ {
        self.entries
            .as_slice()
            .iter()
            .map(|bucket| (&bucket.key, bucket.hash))
    }
}

impl<K, V> Extend<(u64, K, V)> for HashTable<K, V>
where
    K: Eq,
{
    /// Inserts `(hash, key, value)` triples, assigning over equal keys.
    fn extend<T: IntoIterator<Item = (u64, K, V)>>(&mut self, iter: T) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for (hash, key, value) in iter {
            match self.entry(hash, |k| *k == key) {
                Entry::Occupied(mut entry) => {
                    entry.insert(value);
                }
                Entry::Vacant(entry) => {
                    entry.insert(key, value);
                }
            }
        }
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, K, V> {
    /// A vacant entry - the key is not present in the table
    Vacant(VacantEntry<'a, K, V>),
    /// An occupied entry - the key is present in the table
    Occupied(OccupiedEntry<'a, K, V>),
}

impl<'a, K, V> Entry<'a, K, V> {
    /// Inserts `key` and `default` if the entry is vacant and returns a
    /// mutable reference to the value.
    pub fn or_insert(self, key: K, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(key, default),
        }
    }

    /// Inserts `key` and a value computed from a closure if the entry is
    /// vacant and returns a mutable reference to the value.
    pub fn or_insert_with(self, key: K, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(key, default()),
        }
    }

    /// Applies `f` to an occupied entry's value and returns it. A vacant
    /// entry is left alone and `None` is returned.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Option<&'a mut V> {
        match self {
            Entry::Occupied(entry) => {
                let value = entry.into_mut();
                f(value);
                Some(value)
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Inserts `key` and the default value if the entry is vacant and returns
    /// a mutable reference to the value.
    pub fn or_default(self, key: K) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(key, Default::default)
    }
}

/// A view into a vacant entry in the hash table.
///
/// Room for the new entry has already been reserved when this is handed out.
pub struct VacantEntry<'a, K, V> {
    table: &'a mut HashTable<K, V>,
    hash: u64,
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    /// The hash this entry was looked up with.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Inserts the entry and returns a mutable reference to its value.
    ///
    /// `key` must be the key the lookup was made for: it is stored under the
    /// hash the entry was created with.
    ///
    /// # Panics
    ///
    /// Panics if the key's probe sequence cannot be placed at any reasonable
    /// table size, which means the hash function is defective.
    pub fn insert(self, key: K, value: V) -> &'a mut V {
        let index = self.table.push_unique(self.hash, key, value);
        &mut self.table.entries.as_mut_slice()[index].value
    }
}

/// A view into an occupied entry in the hash table.
pub struct OccupiedEntry<'a, K, V> {
    table: &'a mut HashTable<K, V>,
    found: Found,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    fn bucket(&self) -> &Bucket<K, V> {
        &self.table.entries.as_slice()[self.found.index]
    }

    fn bucket_mut(&mut self) -> &mut Bucket<K, V> {
        &mut self.table.entries.as_mut_slice()[self.found.index]
    }

    /// The entry's position in storage order.
    pub fn index(&self) -> usize {
        self.found.index
    }

    /// Gets a reference to the stored key.
    pub fn key(&self) -> &K {
        &self.bucket().key
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.bucket().value
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.bucket_mut().value
    }

    /// Converts the entry into a mutable reference to the value with the
    /// lifetime of the table borrow.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.table.entries.as_mut_slice()[self.found.index].value
    }

    /// Replaces the value in place and returns the old one.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }

    /// Removes the entry from the table and returns the value.
    pub fn remove(self) -> V {
        self.remove_entry().1
    }

    /// Removes the entry from the table and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        self.table.remove_found(self.found)
    }
}

/// An iterator over the entries of a [`HashTable`], in storage order.
///
/// This struct is created by the [`iter`] method on [`HashTable`].
///
/// [`iter`]: HashTable::iter
pub struct Iter<'a, K, V> {
    inner: slice::Iter<'a, Bucket<K, V>>,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Bucket::refs)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(Bucket::refs)
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// A mutable iterator over the entries of a [`HashTable`], in storage order.
pub struct IterMut<'a, K, V> {
    inner: slice::IterMut<'a, Bucket<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Bucket::ref_mut)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(Bucket::ref_mut)
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// A draining iterator over the entries of a [`HashTable`].
///
/// This struct is created by the [`drain`] method on [`HashTable`].
///
/// [`drain`]: HashTable::drain
pub struct Drain<'a, K, V> {
    inner: vec::Drain<'a, Bucket<K, V>>,
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Bucket::key_value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Drain<'_, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(Bucket::key_value)
    }
}

impl<K, V> ExactSizeIterator for Drain<'_, K, V> {}
impl<K, V> FusedIterator for Drain<'_, K, V> {}

/// An owning iterator over the entries of a [`HashTable`], in storage order.
pub struct IntoIter<K, V> {
    inner: vec::IntoIter<Bucket<K, V>>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Bucket::key_value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(Bucket::key_value)
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K, V> IntoIterator for HashTable<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.entries.into_vec().into_iter(),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a HashTable<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut HashTable<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
