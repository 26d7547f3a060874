// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use serde::{Deserialize, Serialize};

/// Tunables of a [`MapPrefixTable`](crate::table::MapPrefixTable)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableConfig {
    /// Forget a prefix length as soon as its last entry is deleted. When unset, a length stays
    /// registered once used, and lookups keep probing it.
    pub prune_empty_lengths: bool,

    /// Initial capacity of the map allocated for a prefix length on first use
    pub level_capacity: usize,
}

impl TableConfig {
    #[must_use]
    pub fn with_prune_empty_lengths(mut self, prune: bool) -> Self {
        self.prune_empty_lengths = prune;
        self
    }

    #[must_use]
    pub fn with_level_capacity(mut self, capacity: usize) -> Self {
        self.level_capacity = capacity;
        self
    }
}
