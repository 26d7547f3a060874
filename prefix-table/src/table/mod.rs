// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Prefix tables: map IP prefixes of both families to values and match addresses against them.

use crate::cidr::Cidr;
use crate::prefix::{IpAddr, Prefix};
use thiserror::Error;

mod config;
pub use config::TableConfig;

mod map;
pub use map::MapPrefixTable;

/// Errors of the operations that take a network from the caller
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PrefixTableError {
    #[error("Mask {0} is non-canonical")]
    NonCanonicalMask(IpAddr),
}

/// The capabilities of a prefix table, independent of how it stores its entries.
///
/// Matching never crosses address families: an IPv4 prefix never matches an IPv6 address and
/// vice versa, default routes (`0.0.0.0/0`, `::/0`) included. IPv4-mapped IPv6 addresses and
/// prefixes (`::ffff:0:0/96` and longer) are the IPv4 addresses and prefixes they map.
///
/// The trait is object safe, so that callers may hold a `Box<dyn PrefixTable<Value = V>>` and not
/// care about the storage.
pub trait PrefixTable {
    type Value;

    /// Insert or overwrite the entry for a network. Returns the value it replaces, if any.
    ///
    /// # Errors
    ///
    /// Fails with [`PrefixTableError::NonCanonicalMask`] if the mask of the network is not
    /// canonical. The table is left untouched.
    fn set(
        &mut self,
        prefix: Cidr,
        value: Self::Value,
    ) -> Result<Option<Self::Value>, PrefixTableError>;

    /// Remove the entry for a network. Removing a network that was never set is not an error.
    ///
    /// # Errors
    ///
    /// Fails with [`PrefixTableError::NonCanonicalMask`] if the mask of the network is not
    /// canonical. The table is left untouched.
    fn delete(&mut self, prefix: Cidr) -> Result<Option<Self::Value>, PrefixTableError>;

    /// All the entries whose prefix contains the address, longest prefix first
    fn match_all(&self, addr: IpAddr) -> Vec<(Prefix, &Self::Value)>;

    /// The entry with the longest prefix containing the address
    fn match_lpm(&self, addr: IpAddr) -> Option<(Prefix, &Self::Value)>;

    /// The entry with the shortest prefix containing the address
    fn match_spm(&self, addr: IpAddr) -> Option<(Prefix, &Self::Value)>;

    /// This function gets the network, with exact match, it does not do LPM
    ///
    /// # Errors
    ///
    /// Fails with [`PrefixTableError::NonCanonicalMask`] if the mask of the network is not
    /// canonical.
    fn match_exact(&self, prefix: Cidr) -> Result<Option<&Self::Value>, PrefixTableError>;

    /// Number of entries stored
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
