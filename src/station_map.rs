use crate::aggregate::StationAggregate;
use hashbrown::HashMap;
use std::hash::{BuildHasher, Hasher};

// (2^64) / \phi
const MAGIC_CONST: u64 = 0x9E3779B97F4A7C15;

/// Multiplicative hasher folding the key 8 bytes at a time. Station names
/// are short, so most keys hash in one or two words.
#[derive(Clone, Copy, Default, Debug)]
pub struct StationHasher {
    hash: u64,
}

impl StationHasher {
    #[inline(always)]
    fn mix(&mut self, word: u64) {
        let hash = (self.hash ^ word).wrapping_mul(MAGIC_CONST);
        self.hash = hash ^ (hash >> 35);
    }

    #[inline(always)]
    fn prefix(bytes: &[u8]) -> u64 {
        let mut word = [0u8; 8];
        word[..bytes.len()].copy_from_slice(bytes);
        u64::from_le_bytes(word)
    }
}

impl Hasher for StationHasher {
    #[inline(always)]
    fn write(&mut self, bytes: &[u8]) {
        let mut words = bytes.chunks_exact(8);
        for word in &mut words {
            self.mix(Self::prefix(word));
        }

        let tail = words.remainder();
        if !tail.is_empty() {
            self.mix(Self::prefix(tail));
        }
    }

    #[inline(always)]
    fn write_usize(&mut self, len: usize) {
        self.mix(len as u64);
    }

    #[inline(always)]
    fn finish(&self) -> u64 {
        self.hash
    }
}

#[derive(Clone, Copy, Default, Debug)]
pub struct BuildStationHasher;

impl BuildHasher for BuildStationHasher {
    type Hasher = StationHasher;

    #[inline(always)]
    fn build_hasher(&self) -> StationHasher {
        StationHasher::default()
    }
}

/// Station name → aggregate. Used both for the per-chunk partial maps built
/// by workers and for the global map owned by the reducer.
#[derive(Clone, Debug, Default)]
pub struct StationMap {
    stations: HashMap<Vec<u8>, StationAggregate, BuildStationHasher>,
}

impl StationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stations: HashMap::with_capacity_and_hasher(capacity, BuildStationHasher),
        }
    }

    /// Adds one reading for `name`, creating the aggregate on first sight.
    #[inline(always)]
    pub fn record(&mut self, name: &[u8], temp: i64) {
        match self.stations.get_mut(name) {
            Some(station) => station.record(temp),
            None => {
                self.stations.insert(name.to_vec(), StationAggregate::new(temp));
            }
        }
    }

    /// Combines `aggregate` into the entry for `name`.
    pub fn merge_station(&mut self, name: Vec<u8>, aggregate: &StationAggregate) {
        self.stations
            .entry(name)
            .and_modify(|station| station.combine(aggregate))
            .or_insert(*aggregate);
    }

    /// Moves every entry of `other` into `self`.
    pub fn merge(&mut self, other: StationMap) {
        if self.stations.is_empty() {
            self.stations = other.stations;
            return;
        }

        for (name, aggregate) in other.stations {
            self.merge_station(name, &aggregate);
        }
    }

    pub fn get(&self, name: &[u8]) -> Option<&StationAggregate> {
        self.stations.get(name)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Entries in map order, which is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &StationAggregate)> {
        self.stations.iter().map(|(name, agg)| (name.as_slice(), agg))
    }

    /// Entries ordered bytewise by station name.
    pub fn sorted(&self) -> Vec<(&[u8], &StationAggregate)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by_key(|(name, _)| *name);
        entries
    }
}

impl PartialEq for StationMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, agg)| other.get(name) == Some(agg))
    }
}

impl Eq for StationMap {}
