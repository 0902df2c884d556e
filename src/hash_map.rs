use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;
use core::ops::Index;

use crate::DefaultHashBuilder;
use crate::error::Error;
use crate::hash_table;
pub use crate::hash_table::Drain;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;
pub use crate::hash_table::IntoIter;
pub use crate::hash_table::Iter;
pub use crate::hash_table::IterMut;

/// A hash map built on the Robin Hood [`HashTable`].
///
/// `HashMap<K, V, S>` stores key-value pairs where keys implement `Hash + Eq`
/// and uses a configurable hasher builder `S` to hash keys. Entries live in a
/// dense array in insertion order, so iteration visits them in the order they
/// were added until the first removal. Removing an entry moves the most
/// recently stored entry into its position.
///
/// # Performance Characteristics
///
/// - **Memory**: one 24-byte probe slot per home slot, plus the size of
///   `(K, V)` and a u64 hash per entry
/// - **Lookup**: at most `max_probe_length() + 1` slots are ever examined
#[derive(Clone)]
pub struct HashMap<K, V, S = DefaultHashBuilder> {
    table: HashTable<K, V>,
    hash_builder: S,
}

impl<K, V, S> Debug for HashMap<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.table.iter()).finish()
    }
}

impl<K, V, S> HashMap<K, V, S> {
    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of elements the map can hold before it needs to
    /// resize.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the largest number of elements any map can hold.
    ///
    /// This counts elements, not slots: it is the load factor applied to the
    /// largest table size, the ceiling for [`capacity`](HashMap::capacity).
    pub fn max_size(&self) -> usize {
        self.table.max_size()
    }

    /// Returns the number of home slots in the probe table.
    pub fn table_size(&self) -> usize {
        self.table.table_size()
    }

    /// Returns the furthest any entry may sit from its home slot at the
    /// current table size.
    pub fn max_probe_length(&self) -> usize {
        self.table.max_probe_length()
    }

    /// Returns the ratio of entries to home slots at which the map grows.
    pub fn max_load_factor(&self) -> f32 {
        self.table.max_load_factor()
    }

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Removes all elements from the map.
    ///
    /// This operation preserves the map's allocated capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// #
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_hasher(RandomState::new());
    /// map.insert(1, "a").unwrap();
    /// let capacity = map.capacity();
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), capacity);
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Returns the key-value pair at `index` in iteration order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// #
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_hasher(RandomState::new());
    /// map.insert("first", 1).unwrap();
    /// map.insert("second", 2).unwrap();
    ///
    /// assert_eq!(map.get_index(1), Some((&"second", &2)));
    /// assert_eq!(map.get_index(2), None);
    /// ```
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        self.table.get_index(index)
    }

    /// Returns an iterator over the key-value pairs in storage order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// #
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_hasher(RandomState::new());
    /// map.insert(3, "c").unwrap();
    /// map.insert(1, "a").unwrap();
    /// map.insert(2, "b").unwrap();
    ///
    /// let pairs: Vec<_> = map.iter().collect();
    /// assert_eq!(pairs, [(&3, &"c"), (&1, &"a"), (&2, &"b")]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.table.iter()
    }

    /// Returns an iterator over the key-value pairs in storage order, with
    /// mutable references to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.table.iter_mut()
    }

    /// Returns an iterator over the keys in storage order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values in storage order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values in storage
    /// order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// #
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_hasher(RandomState::new());
    /// map.insert("a", 1).unwrap();
    /// map.insert("b", 2).unwrap();
    ///
    /// for value in map.values_mut() {
    ///     *value *= 10;
    /// }
    /// assert_eq!(map.values().copied().collect::<Vec<_>>(), [10, 20]);
    /// ```
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Clears the map, returning all key-value pairs as an iterator.
    ///
    /// The map is empty once this returns, even if the iterator is dropped
    /// before it is exhausted. Allocated capacity is kept.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        self.table.drain()
    }

    /// Keeps only the elements for which `keep` returns `true`.
    ///
    /// Surviving elements keep their relative order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// #
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_hasher(RandomState::new());
    /// for i in 0..8 {
    ///     map.insert(i, i * 10).unwrap();
    /// }
    /// map.retain(|&k, _| k % 2 == 0);
    /// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [0, 2, 4, 6]);
    /// ```
    pub fn retain(&mut self, keep: impl FnMut(&K, &mut V) -> bool) {
        self.table.retain(keep);
    }

    /// Shrinks the map to the smallest table that holds its current
    /// elements. An empty map releases all of its memory.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// #
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_capacity_and_hasher(100, RandomState::new());
    /// map.insert(1, "one").unwrap();
    /// map.insert(2, "two").unwrap();
    /// assert!(map.capacity() >= 100);
    ///
    /// map.shrink_to_fit();
    /// assert!(map.capacity() >= 2);
    /// assert!(map.capacity() < 100);
    /// assert_eq!(map.get(&2), Some(&"two"));
    /// ```
    pub fn shrink_to_fit(&mut self) {
        self.table.shrink_to_fit();
    }

    /// Reserves capacity for at least `additional` more elements.
    ///
    /// `additional` is counted on top of [`len`](HashMap::len), so afterwards
    /// `capacity() >= len() + additional`. A map that already has that much
    /// room is left alone.
    ///
    /// # Panics
    ///
    /// Panics if the new size would exceed [`max_size`](HashMap::max_size).
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Reserves capacity for at least `additional` more elements, reporting
    /// [`Error::CapacityExceeded`] instead of panicking.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.table.try_reserve(additional)
    }

    /// Computes a histogram of probe lengths for the current map state.
    #[cfg(feature = "stats")]
    pub fn probe_histogram(&self) -> alloc::vec::Vec<usize> {
        self.table.probe_histogram()
    }

    /// Returns detailed utilization statistics for debugging.
    #[cfg(feature = "stats")]
    pub fn debug_stats(&self) -> hash_table::DebugStats {
        self.table.debug_stats()
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a new hash map with the given hasher builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::new(),
            hash_builder,
        }
    }

    /// Creates a new hash map that holds at least `capacity` elements without
    /// resizing, using the given hasher builder.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds the largest supported table.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
            hash_builder,
        }
    }

    /// Inserts a key-value pair that is not yet in the map.
    ///
    /// Returns a mutable reference to the inserted value. If the key is
    /// already present the map is left untouched and
    /// [`Error::KeyAlreadyExists`] reports where the existing entry is. Use
    /// [`insert_or_assign`](HashMap::insert_or_assign) to overwrite instead.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// #
    /// # use robin_hash::Error;
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_hasher(RandomState::new());
    /// assert_eq!(map.insert(37, "a"), Ok(&mut "a"));
    /// assert_eq!(map.insert(37, "b"), Err(Error::KeyAlreadyExists { index: 0 }));
    /// assert_eq!(map.get(&37), Some(&"a"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Result<&mut V, Error> {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.try_entry(hash, |k| *k == key)? {
            TableEntry::Occupied(entry) => Err(Error::KeyAlreadyExists {
                index: entry.index(),
            }),
            TableEntry::Vacant(entry) => Ok(entry.insert(key, value)),
        }
    }

    /// Inserts a key-value pair, overwriting the value if the key is already
    /// present.
    ///
    /// On overwrite the stored key is kept and the old value is returned.
    ///
    /// # Panics
    ///
    /// Panics if inserting a new key would exceed
    /// [`max_size`](HashMap::max_size).
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// #
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_hasher(RandomState::new());
    /// assert_eq!(map.insert_or_assign(37, "a"), None);
    /// assert_eq!(map.insert_or_assign(37, "b"), Some("a"));
    /// assert_eq!(map.get(&37), Some(&"b"));
    /// ```
    pub fn insert_or_assign(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |k| *k == key) {
            TableEntry::Occupied(mut entry) => Some(entry.insert(value)),
            TableEntry::Vacant(entry) => {
                entry.insert(key, value);
                None
            }
        }
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// #
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_hasher(RandomState::new());
    /// map.insert("one".to_string(), 1).unwrap();
    /// assert_eq!(map.get("one"), Some(&1));
    /// assert_eq!(map.get("two"), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the stored key and its value.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.find(hash, |k| k.borrow() == key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// #
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_hasher(RandomState::new());
    /// map.insert(1, "a").unwrap();
    /// if let Some(x) = map.get_mut(&1) {
    ///     *x = "b";
    /// }
    /// assert_eq!(map.get(&1), Some(&"b"));
    /// ```
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find_mut(hash, |k| k.borrow() == key)
            .map(|(_, v)| v)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).is_some()
    }

    /// Returns the position of the key in iteration order.
    pub fn get_index_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.find_index(hash, |k| k.borrow() == key)
    }

    /// Looks up a value by hash alone, without comparing keys.
    ///
    /// This returns the first entry whose cached 64-bit hash equals the hash
    /// of `key`. If a different key with the same full hash is stored, its
    /// value may be returned instead, including when `key` itself is absent.
    /// Prefer [`get`](HashMap::get) unless the hasher makes full collisions
    /// acceptable.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// #
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_hasher(RandomState::new());
    /// map.insert(7u64, "seven").unwrap();
    /// assert_eq!(map.find_fast(&7), Some(&"seven"));
    /// ```
    pub fn find_fast<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.find_fast(hash).map(|(_, v)| v)
    }

    /// Mutable counterpart of [`find_fast`](HashMap::find_fast), with the
    /// same caveat about colliding hashes.
    pub fn find_fast_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.find_fast_mut(hash).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning whether it was present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// #
    /// # use robin_hash::HashMap;
    /// #
    /// let mut map = HashMap::with_hasher(RandomState::new());
    /// map.insert(1, "a").unwrap();
    /// assert!(map.erase(&1));
    /// assert!(!map.erase(&1));
    /// ```
    pub fn erase<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).is_some()
    }

    /// Removes a key from the map, returning the value at the key if the key
    /// was previously in the map.
    ///
    /// The last element in iteration order takes the removed element's
    /// position.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value if the
    /// key was previously in the map.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.remove(hash, |k| k.borrow() == key)
    }

    /// Checks the probe table against the entry store, and every cached hash
    /// against the hasher.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        self.table.assert_consistent();
        for (key, hash) in self.table.cached_hashes() {
            assert_eq!(hash, self.hash_builder.hash_one(key));
        }
    }

    /// Gets the given key's corresponding entry in the map for in-place
    /// manipulation.
    ///
    /// # Panics
    ///
    /// Panics if the key is absent and the map already holds
    /// [`max_size`](HashMap::max_size) elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::hash::RandomState;
    /// #
    /// # use robin_hash::HashMap;
    /// #
    /// let mut counts = HashMap::with_hasher(RandomState::new());
    /// for word in ["a", "b", "a", "c", "a"] {
    ///     *counts.entry(word).or_insert(0) += 1;
    /// }
    /// assert_eq!(counts.get("a"), Some(&3));
    /// assert_eq!(counts.get("b"), Some(&1));
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |k| *k == key) {
            TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
            TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
        }
    }

    /// Gets the given key's corresponding entry, reporting
    /// [`Error::CapacityExceeded`] if the key is absent and there is no room
    /// for it.
    pub fn try_entry(&mut self, key: K) -> Result<Entry<'_, K, V>, Error> {
        let hash = self.hash_builder.hash_one(&key);
        Ok(match self.table.try_entry(hash, |k| *k == key)? {
            TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
            TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
        })
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates a new hash map using the default hasher builder.
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates a new hash map with the specified capacity using the default
    /// hasher builder.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<K, V, S> Default for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> PartialEq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    /// Maps are equal when they hold the same key-value pairs, in any order.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|theirs| *v == *theirs))
    }
}

impl<K, V, S> Eq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, Q, V, S> Index<&Q> for HashMap<K, V, S>
where
    K: Hash + Eq + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present.
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key not present in map"),
        }
    }
}

impl<K, V, S> Extend<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Inserts every pair, overwriting the values of keys already present.
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        let iter = iter.into_iter();
        // Keys may already be present. Reserve the whole lower bound only
        // when the map is empty, otherwise half of it.
        let additional = if self.is_empty() {
            iter.size_hint().0
        } else {
            iter.size_hint().0.div_ceil(2)
        };
        self.reserve(additional);
        for (key, value) in iter {
            self.insert_or_assign(key, value);
        }
    }
}

impl<'a, K, V, S> Extend<(&'a K, &'a V)> for HashMap<K, V, S>
where
    K: Hash + Eq + Copy,
    V: Copy,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        self.extend(iter.into_iter().map(|(&k, &v)| (k, v)));
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V, S> IntoIterator for HashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.table.into_iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut HashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashMap`].
///
/// [`entry`]: HashMap::entry
pub enum Entry<'a, K, V> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V>),
}

impl<'a, K, V> Entry<'a, K, V> {
    /// Inserts a default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V> Entry<'a, K, V>
where
    V: Default,
{
    /// Inserts the default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, K, V> {
    entry: hash_table::VacantEntry<'a, K, V>,
    key: K,
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    /// Gets a reference to the key that would be used when inserting a value.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Take ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value into the map and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        self.entry.insert(self.key, value)
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V> {
    entry: hash_table::OccupiedEntry<'a, K, V>,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        self.entry.key()
    }

    /// The entry's position in iteration order.
    pub fn index(&self) -> usize {
        self.entry.index()
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        self.entry.get()
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        self.entry.get_mut()
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        self.entry.into_mut()
    }

    /// Inserts a value into the entry and returns the old value.
    pub fn insert(&mut self, value: V) -> V {
        self.entry.insert(value)
    }

    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.entry.remove()
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        self.entry.remove_entry()
    }
}

/// An iterator over the keys of a `HashMap`.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of a `HashMap`.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

/// A mutable iterator over the values of a `HashMap`.
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::hash::BuildHasher;
    use core::hash::Hasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k1: rng.try_next_u64().unwrap_or(0),
                k2: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    /// Hashes every key to the same value.
    #[derive(Clone, Default)]
    struct CollidingHashBuilder;

    struct CollidingHasher;

    impl Hasher for CollidingHasher {
        fn finish(&self) -> u64 {
            0x5EED
        }

        fn write(&mut self, _bytes: &[u8]) {}
    }

    impl BuildHasher for CollidingHashBuilder {
        type Hasher = CollidingHasher;

        fn build_hasher(&self) -> Self::Hasher {
            CollidingHasher
        }
    }

    #[test]
    fn test_new_and_with_hasher() {
        let map: HashMap<i32, String, SipHashBuilder> = HashMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.capacity(), 0);

        let map2 = HashMap::<i32, String, _>::with_hasher(SipHashBuilder::default());
        assert!(map2.is_empty());
        assert_eq!(map2.len(), 0);
    }

    #[test]
    fn test_with_capacity() {
        let map: HashMap<i32, String, SipHashBuilder> = HashMap::with_capacity(100);
        assert!(map.capacity() >= 100);
        assert!(map.is_empty());

        let map2 =
            HashMap::<i32, String, _>::with_capacity_and_hasher(200, SipHashBuilder::default());
        assert!(map2.capacity() >= 200);
        assert!(map2.is_empty());
    }

    #[test]
    fn test_insert_and_get() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        assert_eq!(*map.insert(1, "hello".to_string()).unwrap(), "hello");
        assert_eq!(map.len(), 1);
        assert!(!map.is_empty());

        assert_eq!(map.get(&1), Some(&"hello".to_string()));
        assert_eq!(map.get(&2), None);

        assert_eq!(
            map.insert(1, "world".to_string()),
            Err(Error::KeyAlreadyExists { index: 0 })
        );
        assert_eq!(map.get(&1), Some(&"hello".to_string()));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn duplicate_insert_reports_position() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..10 {
            map.insert(i, i).unwrap();
        }
        let table_size = map.table_size();

        assert_eq!(map.insert(6, 60), Err(Error::KeyAlreadyExists { index: 6 }));
        assert_eq!(map.get(&6), Some(&6));
        assert_eq!(map.len(), 10);
        assert_eq!(map.table_size(), table_size);
    }

    #[test]
    fn test_insert_or_assign() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        assert_eq!(map.insert_or_assign("k".to_string(), 1), None);
        assert_eq!(map.insert_or_assign("k".to_string(), 2), Some(1));
        assert_eq!(map.get("k"), Some(&2));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_get_mut() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, 10).unwrap();

        if let Some(value) = map.get_mut(&1) {
            *value = 20;
        }
        assert_eq!(map.get(&1), Some(&20));
        assert_eq!(map.get_mut(&2), None);
    }

    #[test]
    fn test_contains_key() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "value").unwrap();

        assert!(map.contains_key(&1));
        assert!(!map.contains_key(&2));
    }

    #[test]
    fn test_borrowed_lookups() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert("owned".to_string(), 1).unwrap();

        assert_eq!(map.get("owned"), Some(&1));
        assert_eq!(
            map.get_key_value("owned"),
            Some((&"owned".to_string(), &1))
        );
        assert_eq!(map.get_index_of("owned"), Some(0));
        assert_eq!(map.find_fast("owned"), Some(&1));
        assert_eq!(map["owned"], 1);
        assert!(map.erase("owned"));
        assert!(map.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "one".to_string()).unwrap();
        map.insert(2, "two".to_string()).unwrap();

        assert_eq!(map.remove(&1), Some("one".to_string()));
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key(&1));
        assert!(map.contains_key(&2));

        assert_eq!(map.remove(&1), None);
    }

    #[test]
    fn test_remove_entry() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "one".to_string()).unwrap();

        assert_eq!(map.remove_entry(&1), Some((1, "one".to_string())));
        assert!(map.is_empty());
        assert_eq!(map.remove_entry(&1), None);
    }

    #[test]
    fn erase_then_lookup_reports_absence() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..1000 {
            map.insert(i, i).unwrap();
        }
        for i in 0..1000 {
            assert!(map.erase(&i));
            assert_eq!(map.get(&i), None);
            assert_eq!(map.find_fast(&i), None);
            map.table.assert_consistent();
        }
        assert!(map.is_empty());
        assert!(!map.erase(&0));
    }

    #[test]
    fn remove_moves_last_entry_into_hole() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for c in ['a', 'b', 'c', 'd'] {
            map.insert(c, c as u32).unwrap();
        }

        assert!(map.erase(&'a'));
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), ['d', 'b', 'c']);
        assert_eq!(map.get_index_of(&'d'), Some(0));
        assert_eq!(map.get(&'d'), Some(&('d' as u32)));
        map.table.assert_consistent();
    }

    #[test]
    fn test_clear() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "one".to_string()).unwrap();
        map.insert(2, "two".to_string()).unwrap();
        let capacity = map.capacity();

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.capacity(), capacity);
        assert_eq!(map.get(&1), None);
        assert_eq!(map.find_fast(&2), None);
    }

    #[test]
    fn test_reserve() {
        let mut map: HashMap<i32, String, SipHashBuilder> = HashMap::new();
        map.reserve(100);
        assert!(map.capacity() >= 100);

        let table_size = map.table_size();
        map.reserve(10);
        assert_eq!(map.table_size(), table_size);
        assert!(matches!(
            map.try_reserve(usize::MAX),
            Err(Error::CapacityExceeded { .. })
        ));
        assert_eq!(map.table_size(), table_size);
    }

    #[test]
    fn test_reserve_counts_on_top_of_len() {
        let mut map: HashMap<u32, (), SipHashBuilder> = HashMap::new();
        map.reserve(10);
        let capacity = map.capacity();
        for i in 0..capacity as u32 {
            map.insert(i, ()).unwrap();
        }

        // A total that the capacity already covers would be a no-op; an
        // additional count past the current length is not.
        map.reserve(1);
        assert!(map.capacity() >= capacity + 1);
    }

    #[test]
    fn test_max_size_counts_entries() {
        let map: HashMap<u32, (), SipHashBuilder> = HashMap::new();
        let max_size = map.max_size();
        assert!(max_size < 1_104_691_373);
        assert_eq!(
            max_size,
            (1_104_691_373f64 * map.max_load_factor() as f64) as usize
        );
    }

    #[test]
    fn load_factor_is_respected() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..5_000u32 {
            map.insert(i, ()).unwrap();
            assert!(map.len() <= map.capacity());
            assert_eq!(
                map.capacity(),
                (map.table_size() as f64 * map.max_load_factor() as f64) as usize
            );
        }
    }

    #[test]
    fn test_entry_api() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        *map.entry("key".to_string()).or_insert(0) += 1;
        assert_eq!(map.get("key"), Some(&1));

        *map.entry("key".to_string()).or_insert(0) += 1;
        assert_eq!(map.get("key"), Some(&2));

        let value = map
            .entry("other".to_string())
            .or_insert_with(|| 42);
        assert_eq!(*value, 42);

        map.entry("key".to_string()).and_modify(|v| *v *= 10);
        assert_eq!(map.get("key"), Some(&20));

        map.entry("missing".to_string()).and_modify(|v| *v = 0);
        assert!(!map.contains_key("missing"));
    }

    #[test]
    fn test_entry_or_default() {
        let mut map: HashMap<String, Vec<i32>, _> = HashMap::with_hasher(SipHashBuilder::default());

        map.entry("key".to_string()).or_default().push(1);
        map.entry("key".to_string()).or_default().push(2);

        assert_eq!(map.get("key"), Some(&vec![1, 2]));
    }

    #[test]
    fn test_occupied_entry() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "one".to_string()).unwrap();
        map.insert(2, "two".to_string()).unwrap();

        match map.entry(2) {
            Entry::Occupied(mut entry) => {
                assert_eq!(entry.key(), &2);
                assert_eq!(entry.index(), 1);
                assert_eq!(entry.get(), "two");

                entry.get_mut().push('!');
                assert_eq!(entry.insert("TWO".to_string()), "two!");
                assert_eq!(entry.remove(), "TWO");
            }
            Entry::Vacant(_) => panic!("Expected occupied entry"),
        }

        assert_eq!(map.len(), 1);
        assert!(!map.contains_key(&2));
    }

    #[test]
    fn test_vacant_entry() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        match map.entry(1) {
            Entry::Vacant(entry) => {
                assert_eq!(entry.key(), &1);
                let value = entry.insert("hello".to_string());
                assert_eq!(value, "hello");
            }
            Entry::Occupied(_) => panic!("Expected vacant entry"),
        }

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&"hello".to_string()));

        match map.try_entry(2).unwrap() {
            Entry::Vacant(entry) => assert_eq!(entry.into_key(), 2),
            Entry::Occupied(_) => panic!("Expected vacant entry"),
        }
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_iterators() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "one".to_string()).unwrap();
        map.insert(2, "two".to_string()).unwrap();
        map.insert(3, "three".to_string()).unwrap();

        let pairs: Vec<(i32, String)> = map.iter().map(|(k, v)| (*k, v.clone())).collect();
        assert_eq!(
            pairs,
            [
                (1, "one".to_string()),
                (2, "two".to_string()),
                (3, "three".to_string())
            ]
        );

        assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 2, 3]);
        assert_eq!(map.keys().len(), 3);
        assert_eq!(map.values().rev().next(), Some(&"three".to_string()));

        for value in map.values_mut() {
            value.make_ascii_uppercase();
        }
        for (_, value) in &mut map {
            value.push('.');
        }
        let values: Vec<&str> = (&map).into_iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(values, ["ONE.", "TWO.", "THREE."]);

        let owned: Vec<(i32, String)> = map.into_iter().collect();
        assert_eq!(owned[2], (3, "THREE.".to_string()));
    }

    #[test]
    fn test_drain() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "one".to_string()).unwrap();
        map.insert(2, "two".to_string()).unwrap();
        map.insert(3, "three".to_string()).unwrap();

        let drained: std::collections::HashMap<i32, String> = map.drain().collect();
        assert_eq!(drained.len(), 3);
        assert!(map.is_empty());

        assert_eq!(drained.get(&1), Some(&"one".to_string()));
        assert_eq!(drained.get(&2), Some(&"two".to_string()));
        assert_eq!(drained.get(&3), Some(&"three".to_string()));

        map.insert(4, "four".to_string()).unwrap();
        assert_eq!(map.get(&4), Some(&"four".to_string()));
    }

    #[test]
    fn test_multiple_insertions() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        for i in 0..100 {
            map.insert(i, format!("value_{i}")).unwrap();
        }

        assert_eq!(map.len(), 100);

        for i in 0..100 {
            assert_eq!(map.get(&i), Some(&format!("value_{i}")));
        }
    }

    #[test]
    fn test_growth_across_sizes() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        let initial = map.capacity();

        for i in 0..10_000 {
            map.insert(i, i * 2).unwrap();
        }
        assert!(map.capacity() > initial);
        assert_eq!(map.len(), 10_000);
        map.table.assert_consistent();

        for i in 0..10_000 {
            assert_eq!(map.get(&i), Some(&(i * 2)));
        }

        for i in (0..10_000).step_by(2) {
            assert_eq!(map.remove(&i), Some(i * 2));
        }
        assert_eq!(map.len(), 5_000);
        map.table.assert_consistent();

        for i in (1..10_000).step_by(2) {
            assert_eq!(map.get(&i), Some(&(i * 2)));
        }
    }

    #[test]
    fn cached_hashes_match_hasher() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..200u64 {
            map.insert(i, ()).unwrap();
        }
        for i in (0..200u64).step_by(3) {
            map.erase(&i);
        }
        map.assert_consistent();
    }

    #[test]
    fn fast_and_verified_lookup_under_full_collision() {
        let mut map = HashMap::with_hasher(CollidingHashBuilder);
        map.insert("x", 1).unwrap();
        map.insert("y", 2).unwrap();

        // Every key shares one hash, so the fast path stops at "x", the
        // first resident of the probe window.
        assert_eq!(map.find_fast(&"y"), Some(&1));
        assert!(map.find_fast(&"absent").is_some());

        assert_eq!(map.get(&"x"), Some(&1));
        assert_eq!(map.get(&"y"), Some(&2));
        assert_eq!(map.get(&"absent"), None);

        if let Some(value) = map.find_fast_mut(&"x") {
            *value += 100;
        }
        assert_eq!(map.values().sum::<i32>(), 103);
    }

    #[test]
    fn colliding_keys_remain_distinct() {
        let mut map = HashMap::with_hasher(CollidingHashBuilder);
        for i in 0..6 {
            map.insert(i, i * 3).unwrap();
        }
        map.table.assert_consistent();
        for i in 0..6 {
            assert_eq!(map.get(&i), Some(&(i * 3)));
        }

        assert!(map.erase(&2));
        assert_eq!(map.get(&2), None);
        for i in [0, 1, 3, 4, 5] {
            assert_eq!(map.get(&i), Some(&(i * 3)));
        }
        map.table.assert_consistent();
    }

    #[test]
    fn test_string_keys() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        map.insert("hello".to_string(), 1).unwrap();
        map.insert("world".to_string(), 2).unwrap();
        map.insert("rust".to_string(), 3).unwrap();

        assert_eq!(map.get("hello"), Some(&1));
        assert_eq!(map.get("world"), Some(&2));
        assert_eq!(map.get("rust"), Some(&3));
        assert_eq!(map.get("missing"), None);
    }

    #[test]
    fn test_default_trait() {
        let map: HashMap<i32, String, SipHashBuilder> = HashMap::default();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn test_equality_ignores_order() {
        let builder = SipHashBuilder::default();
        let mut forward = HashMap::with_hasher(builder.clone());
        let mut backward = HashMap::with_hasher(builder);
        for i in 0..20 {
            forward.insert(i, i).unwrap();
            backward.insert(19 - i, 19 - i).unwrap();
        }
        assert_eq!(forward, backward);

        backward.insert_or_assign(5, 500);
        assert_ne!(forward, backward);
        backward.erase(&5);
        assert_ne!(forward, backward);
    }

    #[test]
    fn test_extend_and_from_iter() {
        let mut map: HashMap<&str, i32, SipHashBuilder> =
            [("a", 1), ("b", 2)].into_iter().collect();
        map.extend([("b", 20), ("c", 3)]);
        map.extend([(&"d", &4)]);

        assert_eq!(map.len(), 4);
        assert_eq!(map["b"], 20);
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), ["a", "b", "c", "d"]);
    }

    #[test]
    #[should_panic(expected = "key not present in map")]
    fn index_panics_on_missing_key() {
        let map: HashMap<i32, i32, SipHashBuilder> = HashMap::new();
        let _ = map[&1];
    }

    #[test]
    fn test_debug_and_clone() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "a").unwrap();
        map.insert(2, "b").unwrap();

        assert_eq!(format!("{map:?}"), r#"{1: "a", 2: "b"}"#);

        let cloned = map.clone();
        map.insert_or_assign(1, "changed");
        assert_eq!(cloned.get(&1), Some(&"a"));
        assert_eq!(cloned.hasher().k1, map.hasher().k1);
    }

    #[test]
    fn test_shrink_to_fit() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..2_000 {
            map.insert(i, i).unwrap();
        }
        map.retain(|&k, _| k < 5);
        map.shrink_to_fit();

        assert!(map.capacity() >= 5);
        assert!(map.capacity() < 2_000);
        for i in 0..5 {
            assert_eq!(map.get(&i), Some(&i));
        }
        map.table.assert_consistent();

        map.clear();
        map.shrink_to_fit();
        assert_eq!(map.capacity(), 0);
        map.insert(9, 9).unwrap();
        assert_eq!(map.get(&9), Some(&9));
    }

    #[test]
    fn test_complex_values() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        let vec1 = vec![1, 2, 3];
        let vec2 = vec![4, 5, 6];

        map.insert("first".to_string(), vec1.clone()).unwrap();
        map.insert("second".to_string(), vec2.clone()).unwrap();

        assert_eq!(map.get("first"), Some(&vec1));
        assert_eq!(map.get("second"), Some(&vec2));

        if let Some(v) = map.get_mut("first") {
            v.push(4);
        }

        assert_eq!(map.get("first"), Some(&vec![1, 2, 3, 4]));
    }
}
