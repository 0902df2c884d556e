#![cfg(test)]

// Property tests for HashMap kept inside the crate so they can check the
// probe table against the entry store after every operation.

use std::collections::HashMap as StdHashMap;
use std::hash::BuildHasher;
use std::hash::Hasher;
use std::vec::Vec;

use proptest::prelude::*;
use siphasher::sip::SipHasher;

use crate::error::Error;
use crate::hash_map::HashMap;

#[derive(Clone, Default)]
struct SipHashBuilder;

impl BuildHasher for SipHashBuilder {
    type Hasher = SipHasher;

    fn build_hasher(&self) -> Self::Hasher {
        SipHasher::new_with_keys(0x0706_0504_0302_0100, 0x0F0E_0D0C_0B0A_0908)
    }
}

/// Gives each pair of adjacent keys `2n` and `2n + 1` the same full hash, so
/// every lookup has to fall back on key comparison.
#[derive(Clone, Default)]
struct PairedHashBuilder;

struct PairedHasher(u64);

impl Hasher for PairedHasher {
    fn finish(&self) -> u64 {
        (self.0 / 2).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = self.0.rotate_left(8) ^ u64::from(b);
        }
    }

    fn write_u64(&mut self, n: u64) {
        self.0 = n;
    }
}

impl BuildHasher for PairedHashBuilder {
    type Hasher = PairedHasher;

    fn build_hasher(&self) -> Self::Hasher {
        PairedHasher(0)
    }
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u64, i32),
    InsertOrAssign(u64, i32),
    Erase(u64),
    Get(u64),
    Entry(u64, i32),
    Retain(u64),
    Reserve(usize),
    ShrinkToFit,
    Clear,
}

fn arb_op() -> impl Strategy<Value = Op> {
    let key = 0u64..200;
    prop_oneof![
        6 => (key.clone(), any::<i32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        3 => (key.clone(), any::<i32>()).prop_map(|(k, v)| Op::InsertOrAssign(k, v)),
        4 => key.clone().prop_map(Op::Erase),
        3 => key.clone().prop_map(Op::Get),
        2 => (key, any::<i32>()).prop_map(|(k, v)| Op::Entry(k, v)),
        1 => (2u64..5).prop_map(Op::Retain),
        1 => (0usize..300).prop_map(Op::Reserve),
        1 => Just(Op::ShrinkToFit),
        1 => Just(Op::Clear),
    ]
}

fn check_structure<S: BuildHasher>(
    sut: &HashMap<u64, i32, S>,
    model: &StdHashMap<u64, i32>,
) -> Result<(), TestCaseError> {
    sut.assert_consistent();
    prop_assert_eq!(sut.len(), model.len());
    prop_assert!(sut.len() <= sut.capacity());
    prop_assert_eq!(
        sut.capacity(),
        (sut.table_size() as f64 * sut.max_load_factor() as f64) as usize
    );
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap.
// - `insert` fails exactly when the key is live, reporting its position.
// - `insert_or_assign` returns the previous value.
// - `erase` removes exactly the live keys, and they stay gone.
// - After every operation the load factor holds, every slot is within the
//   probe bound of its home, and every entry has exactly one slot.
fn run_state_machine<S: BuildHasher>(
    mut sut: HashMap<u64, i32, S>,
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: StdHashMap<u64, i32> = StdHashMap::new();

    for op in ops {
        match op {
            Op::Insert(k, v) => match sut.insert(k, v) {
                Ok(stored) => {
                    prop_assert_eq!(*stored, v);
                    prop_assert!(model.insert(k, v).is_none(), "insert must fail on duplicate");
                }
                Err(Error::KeyAlreadyExists { index }) => {
                    prop_assert!(model.contains_key(&k));
                    prop_assert_eq!(sut.get_index(index).map(|(key, _)| *key), Some(k));
                }
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            },
            Op::InsertOrAssign(k, v) => {
                prop_assert_eq!(sut.insert_or_assign(k, v), model.insert(k, v));
            }
            Op::Erase(k) => {
                prop_assert_eq!(sut.erase(&k), model.remove(&k).is_some());
                prop_assert_eq!(sut.get(&k), None);
            }
            Op::Get(k) => {
                prop_assert_eq!(sut.get(&k), model.get(&k));
                prop_assert_eq!(sut.contains_key(&k), model.contains_key(&k));
            }
            Op::Entry(k, v) => {
                let ours = *sut
                    .entry(k)
                    .and_modify(|x| *x = x.wrapping_add(1))
                    .or_insert(v);
                let theirs = *model
                    .entry(k)
                    .and_modify(|x| *x = x.wrapping_add(1))
                    .or_insert(v);
                prop_assert_eq!(ours, theirs);
            }
            Op::Retain(m) => {
                sut.retain(|k, _| k % m != 0);
                model.retain(|k, _| k % m != 0);
            }
            Op::Reserve(n) => {
                sut.reserve(n);
                prop_assert!(sut.capacity() >= sut.len() + n);
            }
            Op::ShrinkToFit => sut.shrink_to_fit(),
            Op::Clear => {
                sut.clear();
                model.clear();
            }
        }
        check_structure(&sut, &model)?;
    }

    for (k, v) in &model {
        prop_assert_eq!(sut.get(k), Some(v));
    }
    let mut ours: Vec<(u64, i32)> = sut.iter().map(|(k, v)| (*k, *v)).collect();
    let mut theirs: Vec<(u64, i32)> = model.into_iter().collect();
    ours.sort_unstable();
    theirs.sort_unstable();
    prop_assert_eq!(ours, theirs);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_state_machine(ops in proptest::collection::vec(arb_op(), 1..200)) {
        run_state_machine(HashMap::with_hasher(SipHashBuilder), ops)?;
    }

    #[test]
    fn prop_state_machine_with_shared_hashes(ops in proptest::collection::vec(arb_op(), 1..200)) {
        run_state_machine(HashMap::with_hasher(PairedHashBuilder), ops)?;
    }

    // Property: without removals, iteration order is first-insertion order.
    #[test]
    fn prop_iteration_follows_insertion(keys in proptest::collection::vec(any::<u32>(), 0..300)) {
        let mut sut: HashMap<u32, usize, SipHashBuilder> = HashMap::new();
        let mut expected = Vec::new();
        for (i, k) in keys.into_iter().enumerate() {
            if sut.insert(k, i).is_ok() {
                expected.push((k, i));
            }
        }
        let ours: Vec<(u32, usize)> = sut.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(ours, expected);
    }

    // Property: each removal moves only the last entry, into the hole.
    #[test]
    fn prop_removal_swaps_last_into_hole(
        len in 1usize..100,
        picks in proptest::collection::vec(any::<prop::sample::Index>(), 1..50),
    ) {
        let mut sut: HashMap<usize, usize, SipHashBuilder> = HashMap::new();
        let mut order: Vec<usize> = (0..len).collect();
        for k in 0..len {
            sut.insert(k, k).unwrap();
        }

        for pick in picks {
            if order.is_empty() {
                break;
            }
            let position = pick.index(order.len());
            let key = order.swap_remove(position);
            prop_assert_eq!(sut.get_index_of(&key), Some(position));
            prop_assert!(sut.erase(&key));
            let ours: Vec<usize> = sut.keys().copied().collect();
            prop_assert_eq!(&ours, &order);
        }
        sut.assert_consistent();
    }
}
