// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! A library to store IPv4 and IPv6 prefixes in a single table and match addresses against them:
//! longest prefix match (LPM), shortest prefix match (SPM), all matches, and exact match.

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::similar_names)]

pub mod axis;
pub mod cidr;
pub mod prefix;
pub mod table;

pub use cidr::Cidr;
pub use prefix::{Prefix, PrefixError};
pub use table::{MapPrefixTable, PrefixTable, PrefixTableError, TableConfig};
