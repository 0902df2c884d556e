#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod capacity;
mod cfg;
mod entries;
mod probe_table;

/// Error values reported by fallible table and map operations.
pub mod error;

/// A HashMap implementation using Robin Hood linear probing.
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a standard key-value map interface with configurable hashers.
pub mod hash_map;

/// The raw Robin Hood table, addressed by caller-supplied hashes and equality
/// predicates.
pub mod hash_table;

#[cfg(test)]
mod hash_map_proptest;

pub use error::Error;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_table::HashTable;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// Default hasher builder for [`HashMap`].
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else {
        /// Placeholder for the default hasher builder when the `foldhash`
        /// feature is disabled. It has no values, so a hasher must be supplied
        /// through [`HashMap::with_hasher`].
        #[derive(Clone, Copy, Debug)]
        pub enum DefaultHashBuilder {}
    }
}
