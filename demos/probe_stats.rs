use std::hash::BuildHasher;

use clap::Parser;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use robin_hash::HashTable;
use robin_hash::hash_table::Entry;
use siphasher::sip::SipHasher;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    /// Percentage of entries to erase after filling, to show tombstone build-up.
    #[arg(short = 'e', long = "erase_percent", default_value_t = 0)]
    erase_percent: u8,
}

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

fn main() {
    let args = Args::parse();

    let mut rng = OsRng;
    let hasher = SipHashBuilder {
        k1: rng.try_next_u64().unwrap_or(0),
        k2: rng.try_next_u64().unwrap_or(0),
    };

    println!(
        "Creating HashTable with target capacity: {}",
        args.target_capacity
    );

    let mut table: HashTable<u64, u64> = match HashTable::try_with_capacity(args.target_capacity)
    {
        Ok(table) => table,
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    };

    println!(
        "Actual capacity: {} ({} home slots, probe bound {})",
        table.capacity(),
        table.table_size(),
        table.max_probe_length()
    );
    println!("Filling table with u64 keys...");

    let num_values = table.capacity() as u64;
    for key in 0..num_values {
        let hash = hasher.hash_one(key);
        match table.entry(hash, |&k| k == key) {
            Entry::Vacant(entry) => {
                entry.insert(key, key * 2);
            }
            Entry::Occupied(_) => {
                panic!("Key already exists in table: {key}");
            }
        }
    }

    println!("Inserted {} entries into table", table.len());
    println!(
        "Final load factor: {:.2}% of home slots",
        (table.len() as f64 / table.table_size() as f64) * 100.0
    );

    if args.erase_percent > 0 {
        let mut keys: Vec<u64> = (0..num_values).collect();
        keys.shuffle(&mut SmallRng::from_os_rng());
        let erase_count = keys.len() * usize::from(args.erase_percent.min(100)) / 100;
        for &key in &keys[..erase_count] {
            table.erase(hasher.hash_one(key), |&k| k == key);
        }
        println!("Erased {erase_count} entries");
    }

    table.print_probe_histogram();
    table.debug_stats().print();
}
