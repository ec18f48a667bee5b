use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::net::IpAddr;

/// AFI -- Address Family Identifier
///
/// <https://www.iana.org/assignments/address-family-numbers/address-family-numbers.xhtml>
#[derive(Debug, PartialEq, TryFromPrimitive, IntoPrimitive, Clone, Copy, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum Afi {
    Ipv4 = 1,
    Ipv6 = 2,
    /// L2VPN, used by EVPN NLRI (SAFI 70) - RFC 7432 / RFC 4761
    L2vpn = 25,
    /// BGP-LS, used by link-state NLRI (SAFI 71/72) - RFC 7752
    BgpLs = 16388,
}

impl From<IpAddr> for Afi {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Afi::Ipv4,
            IpAddr::V6(_) => Afi::Ipv6,
        }
    }
}

/// SAFI -- Subsequent Address Family Identifier
///
/// <https://www.iana.org/assignments/safi-namespace/safi-namespace.xhtml>
#[derive(Debug, PartialEq, TryFromPrimitive, IntoPrimitive, Clone, Copy, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Safi {
    Unicast = 1,
    Multicast = 2,
    UnicastMulticast = 3,
    /// Labeled unicast - RFC 8277
    Labeled = 4,
    /// EVPN - RFC 7432
    Evpn = 70,
    /// BGP-LS - RFC 7752
    BgpLs = 71,
    /// BGP-LS VPN - RFC 7752
    BgpLsVpn = 72,
    /// MPLS-labeled VPN (L3VPN) - RFC 4364
    MplsVpn = 128,
    /// Multicast VPN - RFC 6514
    MulticastVpn = 129,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_afi_from_ip() {
        assert_eq!(Afi::from(IpAddr::from([1, 2, 3, 4])), Afi::Ipv4);
        assert_eq!(Afi::from(IpAddr::from([0u16; 8])), Afi::Ipv6);
    }

    #[test]
    fn test_safi_roundtrip() {
        assert_eq!(Safi::try_from(128u8).unwrap(), Safi::MplsVpn);
        assert_eq!(u8::from(Safi::Evpn), 70);
    }
}
