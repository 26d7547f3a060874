// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Networks as callers hand them over: an address and a mask.
//!
//! Unlike [`Prefix`], a [`Cidr`] is not guaranteed to be canonical. Its address may have host
//! bits set and its mask may be any bit pattern of the right width. Tables normalize it onto the
//! 128-bit axis and reject masks that are not a contiguous run of ones.

use crate::axis::{AxisPrefix, V4_AXIS_OFFSET};
use crate::prefix::{IpAddr, Ipv4Addr, Ipv4Prefix, Ipv6Addr, Ipv6Prefix, Prefix};
use crate::prefix::{PrefixError, Representable};
use crate::table::PrefixTableError;
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cidr {
    addr: IpAddr,
    mask: IpAddr,
}

/// Length of a mask made of `bits` bits, if its ones are contiguous and leading.
fn canonical_len(ones: u32, trailing_zeros: u32, bits: u32) -> Option<u8> {
    if ones + trailing_zeros == bits {
        u8::try_from(ones).ok()
    } else {
        None
    }
}

impl Cidr {
    /// Build a network from an address and a mask of the same family.
    ///
    /// # Errors
    ///
    /// Fails if the address and the mask are of distinct IP families.
    pub fn new(addr: IpAddr, mask: IpAddr) -> Result<Self, PrefixError> {
        if addr.is_ipv4() != mask.is_ipv4() {
            return Err(PrefixError::FamilyMismatch { addr, mask });
        }
        Ok(Self { addr, mask })
    }

    /// Build a network from an address and a prefix length.
    ///
    /// # Errors
    ///
    /// Fails if the length exceeds the maximum length for the address family.
    pub fn with_len(addr: IpAddr, len: u8) -> Result<Self, PrefixError> {
        let mask = match addr {
            IpAddr::V4(_) => {
                let net = Ipv4Net::new(Ipv4Addr::UNSPECIFIED, len)
                    .map_err(|_| PrefixError::InvalidLength(len))?;
                IpAddr::V4(net.netmask())
            }
            IpAddr::V6(_) => {
                let net = Ipv6Net::new(Ipv6Addr::UNSPECIFIED, len)
                    .map_err(|_| PrefixError::InvalidLength(len))?;
                IpAddr::V6(net.netmask())
            }
        };
        Ok(Self { addr, mask })
    }

    #[must_use]
    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    #[must_use]
    pub fn mask(&self) -> IpAddr {
        self.mask
    }

    /// The prefix length of the mask in its own family, or `None` if the mask is not canonical.
    #[must_use]
    pub fn prefix_len(&self) -> Option<u8> {
        match self.mask {
            IpAddr::V4(m) => {
                let m = m.to_bits();
                canonical_len(m.leading_ones(), m.trailing_zeros(), u32::BITS)
            }
            IpAddr::V6(m) => {
                let m = m.to_bits();
                canonical_len(m.leading_ones(), m.trailing_zeros(), u128::BITS)
            }
        }
    }

    /// Place the network on the 128-bit axis, masking its address to the prefix length.
    ///
    /// # Errors
    ///
    /// Fails with [`PrefixTableError::NonCanonicalMask`] if the mask is not canonical.
    pub fn to_axis(&self) -> Result<AxisPrefix, PrefixTableError> {
        let len = self
            .prefix_len()
            .ok_or(PrefixTableError::NonCanonicalMask(self.mask))?;
        let len = match self.mask {
            IpAddr::V4(_) => len + V4_AXIS_OFFSET,
            IpAddr::V6(_) => len,
        };
        let addr = match self.addr {
            IpAddr::V4(a) => a.to_axis(),
            IpAddr::V6(a) => a.to_axis(),
        };
        Ok(AxisPrefix::new(addr, len))
    }

    /// The canonical prefix for this network, if its mask is canonical
    #[must_use]
    pub fn to_prefix(&self) -> Option<Prefix> {
        let len = self.prefix_len()?;
        Some(match self.addr {
            IpAddr::V4(a) => Prefix::IPV4(Ipv4Prefix::from(Ipv4Net::new(a, len).ok()?)),
            IpAddr::V6(a) => Prefix::IPV6(Ipv6Prefix::from(Ipv6Net::new(a, len).ok()?)),
        })
    }
}

impl From<Ipv4Net> for Cidr {
    fn from(net: Ipv4Net) -> Self {
        Self {
            addr: IpAddr::V4(net.addr()),
            mask: IpAddr::V4(net.netmask()),
        }
    }
}

impl From<Ipv6Net> for Cidr {
    fn from(net: Ipv6Net) -> Self {
        Self {
            addr: IpAddr::V6(net.addr()),
            mask: IpAddr::V6(net.netmask()),
        }
    }
}

impl From<IpNet> for Cidr {
    fn from(net: IpNet) -> Self {
        match net {
            IpNet::V4(n) => n.into(),
            IpNet::V6(n) => n.into(),
        }
    }
}

impl From<Prefix> for Cidr {
    fn from(prefix: Prefix) -> Self {
        IpNet::from(prefix).into()
    }
}

impl FromStr for Cidr {
    type Err = PrefixError;

    /// Parse `addr/len`. Host bits are kept as given.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IpNet::from_str(s)
            .map(Cidr::from)
            .map_err(|_| PrefixError::Invalid(s.to_string()))
    }
}

impl Display for Cidr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.prefix_len() {
            Some(len) => write!(f, "{}/{len}", self.addr),
            None => write!(f, "{}/{}", self.addr, self.mask),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::AxisAddr;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_canonical_masks() {
        for len in 0..=32 {
            let cidr = Cidr::with_len(ip("10.0.0.0"), len).unwrap();
            assert_eq!(cidr.prefix_len(), Some(len));
            assert_eq!(cidr.to_axis().unwrap().len(), len + 96);
        }
        for len in 0..=128 {
            let cidr = Cidr::with_len(ip("2001:db8::"), len).unwrap();
            assert_eq!(cidr.prefix_len(), Some(len));
            assert_eq!(cidr.to_axis().unwrap().len(), len);
        }
    }

    #[test]
    fn test_non_canonical_masks() {
        let cidr = Cidr::new(ip("10.0.0.0"), ip("255.0.255.0")).unwrap();
        assert_eq!(cidr.prefix_len(), None);
        assert_eq!(
            cidr.to_axis(),
            Err(PrefixTableError::NonCanonicalMask(ip("255.0.255.0")))
        );
        assert_eq!(cidr.to_prefix(), None);
        assert_eq!(cidr.to_string(), "10.0.0.0/255.0.255.0");

        let cidr = Cidr::new(ip("::"), ip("::1")).unwrap();
        assert!(cidr.to_axis().is_err());
        let cidr = Cidr::new(ip("::"), ip("ffff::ffff")).unwrap();
        assert!(cidr.to_axis().is_err());
    }

    #[test]
    fn test_family_mismatch() {
        let err = Cidr::new(ip("10.0.0.0"), ip("ffff::")).unwrap_err();
        assert_eq!(
            err,
            PrefixError::FamilyMismatch {
                addr: ip("10.0.0.0"),
                mask: ip("ffff::")
            }
        );
        assert!(Cidr::new(ip("::"), ip("255.0.0.0")).is_err());
    }

    #[test]
    fn test_invalid_lengths() {
        assert_eq!(
            Cidr::with_len(ip("10.0.0.0"), 33),
            Err(PrefixError::InvalidLength(33))
        );
        assert_eq!(
            Cidr::with_len(ip("::"), 129),
            Err(PrefixError::InvalidLength(129))
        );
    }

    #[test]
    fn test_host_bits_are_masked() {
        let loose: Cidr = "1.2.3.4/24".parse().unwrap();
        let tight: Cidr = "1.2.3.0/24".parse().unwrap();
        assert_ne!(loose, tight);
        assert_eq!(loose.to_axis(), tight.to_axis());
        assert_eq!(loose.to_prefix(), Some(Prefix::from("1.2.3.0/24")));
        assert_eq!(loose.to_string(), "1.2.3.4/24");
    }

    #[test]
    fn test_axis_placement() {
        let v4: Cidr = "1.2.3.0/24".parse().unwrap();
        let axis = v4.to_axis().unwrap();
        assert_eq!(axis.network(), AxisAddr::from(ip("1.2.3.0")).bits());
        assert!(axis.is_v4());

        let v6: Cidr = "::/0".parse().unwrap();
        let axis = v6.to_axis().unwrap();
        assert_eq!((axis.len(), axis.network()), (0, 0));
        assert!(!axis.is_v4());
    }

    #[test]
    fn test_conversions() {
        let prefix = Prefix::from("192.168.0.0/16");
        let cidr = Cidr::from(prefix);
        assert_eq!(cidr.addr(), ip("192.168.0.0"));
        assert_eq!(cidr.mask(), ip("255.255.0.0"));
        assert_eq!(cidr.to_prefix(), Some(prefix));
        assert_eq!(cidr.to_axis(), Ok(AxisPrefix::from(prefix)));
        assert!("garbage".parse::<Cidr>().is_err());
    }
}
