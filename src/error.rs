use core::fmt;

use thiserror::Error;

/// Errors reported by fallible table and map operations.
///
/// A missing key is never an error: lookups and removals report it as `None`
/// or `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// An insertion found an equal key already present. Nothing was
    /// modified; `index` is the position of the existing entry in iteration
    /// order.
    #[error("key already present at entry index {index}")]
    KeyAlreadyExists {
        /// Position of the existing entry in the dense entry store.
        index: usize,
    },
    /// The requested number of entries does not fit in the largest supported
    /// table. Nothing was modified.
    #[error("requested room for {requested} entries, but the largest table holds {max_size}")]
    CapacityExceeded {
        /// The total number of entries that was requested.
        requested: usize,
        /// The largest number of entries any table can hold.
        max_size: usize,
    },
}

/// Reports a broken structural invariant.
///
/// This is reached only when the supplied hash function clusters keys so
/// badly that no table size can bound their probe lengths, or when the probe
/// table and entry store disagree. Neither state is recoverable.
#[cold]
#[inline(never)]
#[track_caller]
pub(crate) fn invariant_violation(args: fmt::Arguments<'_>) -> ! {
    panic!("robin hood table invariant violated: {args}")
}
