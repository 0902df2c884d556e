use alloc::vec;
use alloc::vec::Vec;

/// One stored entry: the key, its value, and the key's hash.
///
/// The hash is kept so the probe table can be rebuilt, and moved entries
/// re-linked, without calling back into the hasher.
#[derive(Clone, Debug)]
pub(crate) struct Bucket<K, V> {
    pub(crate) hash: u64,
    pub(crate) key: K,
    pub(crate) value: V,
}

impl<K, V> Bucket<K, V> {
    #[inline]
    pub(crate) fn refs(&self) -> (&K, &V) {
        (&self.key, &self.value)
    }

    #[inline]
    pub(crate) fn ref_mut(&mut self) -> (&K, &mut V) {
        (&self.key, &mut self.value)
    }

    #[inline]
    pub(crate) fn key_value(self) -> (K, V) {
        (self.key, self.value)
    }
}

/// Dense, gap-free storage for every live entry.
///
/// Entries are appended in insertion order. Removal swaps the last entry into
/// the hole, so positions stay in `0..len` at all times.
#[derive(Clone)]
pub(crate) struct EntryStore<K, V> {
    buckets: Vec<Bucket<K, V>>,
}

impl<K, V> EntryStore<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            buckets: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Appends an entry and returns its position.
    #[inline]
    pub(crate) fn push(&mut self, hash: u64, key: K, value: V) -> usize {
        let index = self.buckets.len();
        self.buckets.push(Bucket { hash, key, value });
        index
    }

    /// Removes the entry at `index` in O(1).
    ///
    /// The last entry is moved into the vacated position. When that happens
    /// its former position is returned alongside the removed bucket so the
    /// caller can re-link the one slot that pointed at it.
    pub(crate) fn swap_remove(&mut self, index: usize) -> (Bucket<K, V>, Option<usize>) {
        let last = self.buckets.len() - 1;
        let removed = self.buckets.swap_remove(index);
        let moved_from = (index != last).then_some(last);
        (removed, moved_from)
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> Option<&Bucket<K, V>> {
        self.buckets.get(index)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Bucket<K, V>> {
        self.buckets.get_mut(index)
    }

    /// Key at `index`. The probe table only hands out indices below `len`.
    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.buckets[index].key
    }

    #[inline]
    pub(crate) fn hash(&self, index: usize) -> u64 {
        self.buckets[index].hash
    }

    /// Cached hashes in storage order; position `i` belongs to entry `i`.
    pub(crate) fn hashes(&self) -> impl Iterator<Item = u64> + '_ {
        self.buckets.iter().map(|bucket| bucket.hash)
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.buckets.reserve(additional);
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.buckets.shrink_to_fit();
    }

    pub(crate) fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Keeps the entries for which `keep` returns `true`, preserving their
    /// relative order.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&K, &mut V) -> bool) {
        self.buckets
            .retain_mut(|bucket| keep(&bucket.key, &mut bucket.value));
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[Bucket<K, V>] {
        &self.buckets
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [Bucket<K, V>] {
        &mut self.buckets
    }

    pub(crate) fn drain(&mut self) -> vec::Drain<'_, Bucket<K, V>> {
        self.buckets.drain(..)
    }

    pub(crate) fn into_vec(self) -> Vec<Bucket<K, V>> {
        self.buckets
    }
}
