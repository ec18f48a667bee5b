//! NLRI shapes for the labeled/VPN/EVPN address families (RFC 8277, RFC 4364, RFC 7432).
//!
//! These sit alongside [`NetworkPrefix`] rather than replacing it: the existing unicast/
//! multicast path continues to produce plain `NetworkPrefix` lists, while `Nlri::detail`
//! carries the richer per-family structure for the address families that need it.
use crate::models::bgp::linkstate::LinkStateNlri;
use crate::models::NetworkPrefix;

/// SAFI 4 (RFC 8277): one or more MPLS labels stacked in front of an otherwise ordinary prefix.
#[derive(Debug, PartialEq, Clone, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LabeledNlri {
    pub labels: Vec<u32>,
    pub prefix: NetworkPrefix,
}

/// SAFI 128 (RFC 4364): a route distinguisher plus label stack in front of a prefix.
#[derive(Debug, PartialEq, Clone, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VpnNlri {
    pub route_distinguisher: String,
    pub labels: Vec<u32>,
    pub prefix: NetworkPrefix,
}

/// SAFI 70 (RFC 7432) route-type-specific payloads (§4.B.2).
#[derive(Debug, PartialEq, Clone, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EvpnRoute {
    /// Type 1: Ethernet Auto-Discovery.
    EthernetAutoDiscovery {
        route_distinguisher: String,
        esi: Vec<u8>,
        ethernet_tag_id: u32,
        label: u32,
    },
    /// Type 2: MAC/IP Advertisement.
    MacIpAdvertisement {
        route_distinguisher: String,
        esi: Vec<u8>,
        ethernet_tag_id: u32,
        mac_address: [u8; 6],
        ip_address: Option<std::net::IpAddr>,
        label1: u32,
        label2: Option<u32>,
    },
    /// Type 3: Inclusive Multicast Ethernet Tag.
    InclusiveMulticastEthernetTag {
        route_distinguisher: String,
        ethernet_tag_id: u32,
        originating_router_ip: std::net::IpAddr,
    },
    /// Type 4: Ethernet Segment.
    EthernetSegment {
        route_distinguisher: String,
        esi: Vec<u8>,
        originating_router_ip: std::net::IpAddr,
    },
    /// Route types this crate doesn't decode further; passed through verbatim per the
    /// unknown-type-code policy used for TLVs and capabilities.
    Unknown { route_type: u8, bytes: Vec<u8> },
}

/// Per-address-family extra structure attached to an [`Nlri`](super::Nlri) beyond the plain
/// `prefixes` list.
#[derive(Debug, PartialEq, Clone, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NlriDetail {
    #[default]
    None,
    Labeled(Vec<LabeledNlri>),
    Vpn(Vec<VpnNlri>),
    Evpn(Vec<EvpnRoute>),
    /// AFI 16388 / SAFI 71 (RFC 7752, §4.B.1): node, link, and prefix topology NLRI.
    LinkState(Vec<LinkStateNlri>),
}
