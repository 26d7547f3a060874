// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Prefix table indexed by prefix length.
//!
//! Entries are kept in one hash map per prefix length on the 128-bit axis, keyed by the masked
//! network. Matching an address masks it once per registered length and probes the map of that
//! length, so a lookup costs at most one probe per length in use (129 at most), whatever the
//! number of entries.

use crate::axis::{AXIS_LENGTHS, AxisAddr, AxisPrefix};
use crate::cidr::Cidr;
use crate::prefix::{IpAddr, Prefix};
use crate::table::{PrefixTable, PrefixTableError, TableConfig};
use ahash::RandomState;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Entries of a single prefix length, keyed by network
type Level<V> = HashMap<u128, V, RandomState>;

#[derive(Debug, Clone)]
pub struct MapPrefixTable<V> {
    config: TableConfig,
    /// One slot per axis length; `Some` iff the length is registered
    levels: [Option<Level<V>>; AXIS_LENGTHS],
    /// Registered lengths, strictly descending
    lengths: Vec<u8>,
    entries: usize,
}

impl<V> Default for MapPrefixTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MapPrefixTable<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TableConfig::default())
    }

    #[must_use]
    pub fn with_config(config: TableConfig) -> Self {
        Self {
            config,
            levels: std::array::from_fn(|_| None),
            lengths: Vec::new(),
            entries: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// The axis lengths in use, longest first. IPv4 lengths are offset by 96.
    #[must_use]
    pub fn lengths(&self) -> &[u8] {
        &self.lengths
    }

    /// Insert or overwrite the entry for a prefix. Returns the value it replaces, if any.
    pub fn insert(&mut self, prefix: Prefix, value: V) -> Option<V> {
        self.insert_axis(AxisPrefix::from(prefix), value)
    }

    /// Remove the entry for a prefix, if present.
    pub fn remove(&mut self, prefix: &Prefix) -> Option<V> {
        self.remove_axis(AxisPrefix::from(prefix))
    }

    /// This function gets the prefix, with exact match, it does not do LPM
    #[must_use]
    pub fn get(&self, prefix: &Prefix) -> Option<&V> {
        self.get_axis(AxisPrefix::from(prefix))
    }

    /// Mutable access to the value of a prefix, exact match only
    pub fn get_mut(&mut self, prefix: &Prefix) -> Option<&mut V> {
        let prefix = AxisPrefix::from(prefix);
        self.levels[usize::from(prefix.len())]
            .as_mut()?
            .get_mut(&prefix.network())
    }

    /// All the entries, longest prefix length first. Entries of the same length come in no
    /// particular order.
    pub fn iter(&self) -> impl Iterator<Item = (Prefix, &V)> {
        self.lengths.iter().flat_map(move |&len| {
            self.levels[usize::from(len)]
                .iter()
                .flat_map(move |level| {
                    level
                        .iter()
                        .map(move |(network, value)| {
                            (AxisPrefix::new(*network, len).to_prefix(), value)
                        })
                })
        })
    }

    /// Drop all the entries and forget all the lengths in use
    pub fn clear(&mut self) {
        self.levels = std::array::from_fn(|_| None);
        self.lengths.clear();
        self.entries = 0;
        debug!("Cleared prefix table");
    }

    /// The map of a length, allocating it and registering the length on first use
    fn level_or_create(&mut self, len: u8) -> &mut Level<V> {
        let Self {
            config,
            levels,
            lengths,
            ..
        } = self;
        levels[usize::from(len)].get_or_insert_with(|| {
            let pos = lengths.partition_point(|&l| l > len);
            lengths.insert(pos, len);
            debug!("Registered prefix length {len}");
            Level::with_capacity_and_hasher(config.level_capacity, RandomState::with_seed(0))
        })
    }

    fn insert_axis(&mut self, prefix: AxisPrefix, value: V) -> Option<V> {
        let previous = self
            .level_or_create(prefix.len())
            .insert(prefix.network(), value);
        if previous.is_none() {
            self.entries += 1;
        }
        trace!(
            "Set {} (replaced: {})",
            prefix.to_prefix(),
            previous.is_some()
        );
        previous
    }

    fn remove_axis(&mut self, prefix: AxisPrefix) -> Option<V> {
        let len = prefix.len();
        let slot = &mut self.levels[usize::from(len)];
        let level = slot.as_mut()?;
        let Some(removed) = level.remove(&prefix.network()) else {
            trace!("Nothing to delete for {}", prefix.to_prefix());
            return None;
        };
        if self.config.prune_empty_lengths && level.is_empty() {
            *slot = None;
            self.lengths.retain(|&l| l != len);
            debug!("Pruned prefix length {len}");
        }
        self.entries -= 1;
        trace!("Deleted {}", prefix.to_prefix());
        Some(removed)
    }

    fn get_axis(&self, prefix: AxisPrefix) -> Option<&V> {
        self.levels[usize::from(prefix.len())]
            .as_ref()?
            .get(&prefix.network())
    }

    /// Look the address up in the map of a single length
    fn probe(&self, addr: AxisAddr, len: u8) -> Option<(Prefix, &V)> {
        let network = addr.network(len);
        self.levels[usize::from(len)]
            .as_ref()?
            .get(&network)
            .map(|value| (AxisPrefix::new(network, len).to_prefix(), value))
    }

    /// Registered lengths an address of the family of `addr` can match, longest first
    fn candidate_lengths(&self, addr: AxisAddr) -> impl DoubleEndedIterator<Item = u8> {
        let min_len = addr.min_len();
        // lengths is sorted descending: the candidates are a prefix of it
        let end = self.lengths.partition_point(|&l| l >= min_len);
        self.lengths[..end].iter().copied()
    }
}

impl<V> PrefixTable for MapPrefixTable<V> {
    type Value = V;

    fn set(&mut self, prefix: Cidr, value: V) -> Result<Option<V>, PrefixTableError> {
        let axis = prefix
            .to_axis()
            .inspect_err(|e| debug!("Refusing to set {prefix}: {e}"))?;
        Ok(self.insert_axis(axis, value))
    }

    fn delete(&mut self, prefix: Cidr) -> Result<Option<V>, PrefixTableError> {
        let axis = prefix
            .to_axis()
            .inspect_err(|e| debug!("Refusing to delete {prefix}: {e}"))?;
        Ok(self.remove_axis(axis))
    }

    fn match_all(&self, addr: IpAddr) -> Vec<(Prefix, &V)> {
        let addr = AxisAddr::from(addr);
        self.candidate_lengths(addr)
            .filter_map(|len| self.probe(addr, len))
            .collect()
    }

    fn match_lpm(&self, addr: IpAddr) -> Option<(Prefix, &V)> {
        let addr = AxisAddr::from(addr);
        self.candidate_lengths(addr)
            .find_map(|len| self.probe(addr, len))
    }

    fn match_spm(&self, addr: IpAddr) -> Option<(Prefix, &V)> {
        let addr = AxisAddr::from(addr);
        self.candidate_lengths(addr)
            .rev()
            .find_map(|len| self.probe(addr, len))
    }

    fn match_exact(&self, prefix: Cidr) -> Result<Option<&V>, PrefixTableError> {
        Ok(self.get_axis(prefix.to_axis()?))
    }

    fn len(&self) -> usize {
        self.entries
    }
}

impl<V> FromIterator<(Prefix, V)> for MapPrefixTable<V> {
    fn from_iter<I: IntoIterator<Item = (Prefix, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<V> Extend<(Prefix, V)> for MapPrefixTable<V> {
    fn extend<I: IntoIterator<Item = (Prefix, V)>>(&mut self, iter: I) {
        for (prefix, value) in iter {
            self.insert(prefix, value);
        }
    }
}
