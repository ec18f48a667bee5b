/*!
Deterministic identifiers for collector/router/peer/path-attribute/RIB/link-state entities.

Every hash is MD5 over the entity's canonical fields, in the order fixed by each `hash_*`
function below. This is a stability contract, not a security one: MD5 is used so that hashes
match legacy consumers of the event stream, not because it resists collision attacks.
*/
use std::fmt::{Display, Formatter};
use std::net::IpAddr;

use crate::models::Asn;

/// A 128-bit entity identifier, rendered as 32 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HashId(pub [u8; 16]);

impl HashId {
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl Display for HashId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

fn digest(fields: &[&[u8]]) -> HashId {
    let mut ctx = md5::Context::new();
    for field in fields {
        ctx.consume(field);
    }
    HashId(ctx.compute().0)
}

/// `collector.hash_id = H(admin_id)`.
pub fn hash_collector(admin_id: &str) -> HashId {
    digest(&[admin_id.as_bytes()])
}

/// `router.hash_id = H(ip_addr, collector.hash_id)`.
pub fn hash_router(ip_addr: IpAddr, collector_hash: &HashId) -> HashId {
    let ip_bytes = match ip_addr {
        IpAddr::V4(v4) => v4.octets().to_vec(),
        IpAddr::V6(v6) => v6.octets().to_vec(),
    };
    digest(&[&ip_bytes, &collector_hash.0])
}

/// `peer.hash_id = H(router.hash_id, peer_rd, peer_addr)`.
///
/// `peer_bgp_id` is deliberately excluded: at least one vendor zeroes it on re-advertisement,
/// and including it would make the hash flap across BGP resets.
pub fn hash_peer(router_hash: &HashId, peer_rd: &str, peer_addr: IpAddr) -> HashId {
    let ip_bytes = match peer_addr {
        IpAddr::V4(v4) => v4.octets().to_vec(),
        IpAddr::V6(v6) => v6.octets().to_vec(),
    };
    digest(&[&router_hash.0, peer_rd.as_bytes(), &ip_bytes])
}

/// Fields making up a `PathAttributes` record, in hash order.
pub struct PathAttrFields<'a> {
    pub as_path: &'a str,
    pub next_hop: &'a str,
    pub aggregator: &'a str,
    pub origin: &'a str,
    pub med: u32,
    pub local_pref: u32,
    pub communities: &'a str,
    pub ext_communities: &'a str,
}

/// `path_attrs.hash_id = H(as_path, next_hop, aggregator, origin, med, local_pref, communities, ext_communities, peer.hash_id)`.
pub fn hash_path_attrs(fields: &PathAttrFields, peer_hash: &HashId) -> HashId {
    digest(&[
        fields.as_path.as_bytes(),
        fields.next_hop.as_bytes(),
        fields.aggregator.as_bytes(),
        fields.origin.as_bytes(),
        &fields.med.to_be_bytes(),
        &fields.local_pref.to_be_bytes(),
        fields.communities.as_bytes(),
        fields.ext_communities.as_bytes(),
        &peer_hash.0,
    ])
}

/// `rib_entry.hash_id = H(prefix, prefix_len, peer.hash_id, path_id?, labels-present-flag)`.
///
/// `labels_present` is a presence flag, not the label value: withdrawals carry no label, so
/// using presence rather than value keeps the withdrawal's hash equal to the advertisement's.
pub fn hash_rib_entry(
    prefix: &[u8],
    prefix_len: u8,
    peer_hash: &HashId,
    path_id: Option<u32>,
    labels_present: bool,
) -> HashId {
    let path_id_bytes = path_id.unwrap_or(0).to_be_bytes();
    digest(&[
        prefix,
        &[prefix_len],
        &peer_hash.0,
        &path_id_bytes,
        &[labels_present as u8],
    ])
}

/// `ls_node.hash_id = H(igp_router_id, bgp_ls_id, asn, ospf_area, peer.hash_id)`.
pub fn hash_ls_node(
    igp_router_id: &str,
    bgp_ls_id: u32,
    asn: Asn,
    ospf_area: &str,
    peer_hash: &HashId,
) -> HashId {
    digest(&[
        igp_router_id.as_bytes(),
        &bgp_ls_id.to_be_bytes(),
        &asn.to_u32().to_be_bytes(),
        ospf_area.as_bytes(),
        &peer_hash.0,
    ])
}

/// Fields making up an `LsLink` record's identity, in hash order.
///
/// There is no upstream precedent for a dedicated link hash: the legacy collector this crate's
/// wire format descends from only hashes node descriptors, and link/prefix rows just reuse the
/// node's hash. Topic partitioning and downstream joins need a stable per-link key distinct from
/// either endpoint's node hash, so this hashes the endpoint node hashes plus the link's own
/// descriptors (see DESIGN.md for the full rationale).
pub struct LsLinkFields<'a> {
    pub local_node_hash: &'a HashId,
    pub remote_node_hash: &'a HashId,
    pub link_local_id: u32,
    pub link_remote_id: u32,
    pub ipv4_interface_addr: &'a str,
    pub ipv4_neighbor_addr: &'a str,
    pub ipv6_interface_addr: &'a str,
    pub ipv6_neighbor_addr: &'a str,
}

/// `ls_link.hash_id = H(local_node.hash_id, remote_node.hash_id, link_local_id, link_remote_id,
/// ipv4_interface_addr, ipv4_neighbor_addr, ipv6_interface_addr, ipv6_neighbor_addr, peer.hash_id)`.
pub fn hash_ls_link(fields: &LsLinkFields, peer_hash: &HashId) -> HashId {
    digest(&[
        &fields.local_node_hash.0,
        &fields.remote_node_hash.0,
        &fields.link_local_id.to_be_bytes(),
        &fields.link_remote_id.to_be_bytes(),
        fields.ipv4_interface_addr.as_bytes(),
        fields.ipv4_neighbor_addr.as_bytes(),
        fields.ipv6_interface_addr.as_bytes(),
        fields.ipv6_neighbor_addr.as_bytes(),
        &peer_hash.0,
    ])
}

/// `ls_prefix.hash_id = H(ls_node.hash_id, prefix, prefix_len, multi_topology_id, peer.hash_id)`.
///
/// Same rationale as [`hash_ls_link`]: keyed off the owning node's hash plus the prefix's own
/// descriptors, since the legacy format has no separate prefix hash to follow.
pub fn hash_ls_prefix(
    ls_node_hash: &HashId,
    prefix: &[u8],
    prefix_len: u8,
    multi_topology_id: u16,
    peer_hash: &HashId,
) -> HashId {
    digest(&[
        &ls_node_hash.0,
        prefix,
        &[prefix_len],
        &multi_topology_id.to_be_bytes(),
        &peer_hash.0,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_collector_hash_stable() {
        let a = hash_collector("rtr1.example.net");
        let b = hash_collector("rtr1.example.net");
        assert_eq!(a, b);
        assert_eq!(a.to_hex().len(), 32);
    }

    #[test]
    fn test_router_hash_depends_on_collector() {
        let c1 = hash_collector("collector-a");
        let c2 = hash_collector("collector-b");
        let ip = IpAddr::from_str("10.0.0.1").unwrap();
        assert_ne!(hash_router(ip, &c1), hash_router(ip, &c2));
    }

    #[test]
    fn test_peer_hash_ignores_bgp_id() {
        let router_hash = hash_collector("router-only-input");
        let ip = IpAddr::from_str("192.0.2.1").unwrap();
        // peer_bgp_id isn't a parameter at all, so two peers differing only in that
        // field necessarily produce the same hash_peer call and result.
        let a = hash_peer(&router_hash, "0:100:1", ip);
        let b = hash_peer(&router_hash, "0:100:1", ip);
        assert_eq!(a, b);
    }

    #[test]
    fn test_rib_entry_hash_stable_across_withdrawal() {
        let peer_hash = hash_collector("peer-stand-in");
        let prefix = [192, 168, 5, 0];
        let advertised = hash_rib_entry(&prefix, 24, &peer_hash, None, false);
        let withdrawn = hash_rib_entry(&prefix, 24, &peer_hash, None, false);
        assert_eq!(advertised, withdrawn);
    }

    #[test]
    fn test_ls_link_hash_stable_and_direction_sensitive() {
        let peer_hash = hash_collector("peer-for-ls-link");
        let local = hash_ls_node("10.0.0.1", 0, Asn::new_32bit(65001), "0", &peer_hash);
        let remote = hash_ls_node("10.0.0.2", 0, Asn::new_32bit(65002), "0", &peer_hash);

        let fields = LsLinkFields {
            local_node_hash: &local,
            remote_node_hash: &remote,
            link_local_id: 1,
            link_remote_id: 2,
            ipv4_interface_addr: "192.168.1.1",
            ipv4_neighbor_addr: "192.168.1.2",
            ipv6_interface_addr: "",
            ipv6_neighbor_addr: "",
        };
        let a = hash_ls_link(&fields, &peer_hash);
        let b = hash_ls_link(&fields, &peer_hash);
        assert_eq!(a, b);

        let reversed_fields = LsLinkFields {
            local_node_hash: &remote,
            remote_node_hash: &local,
            link_local_id: 2,
            link_remote_id: 1,
            ipv4_interface_addr: "192.168.1.2",
            ipv4_neighbor_addr: "192.168.1.1",
            ipv6_interface_addr: "",
            ipv6_neighbor_addr: "",
        };
        let reversed = hash_ls_link(&reversed_fields, &peer_hash);
        assert_ne!(a, reversed);
    }

    #[test]
    fn test_ls_prefix_hash_stable() {
        let peer_hash = hash_collector("peer-for-ls-prefix");
        let node_hash = hash_ls_node("10.0.0.1", 0, Asn::new_32bit(65001), "0", &peer_hash);
        let prefix = [10, 1, 0, 0];
        let a = hash_ls_prefix(&node_hash, &prefix, 24, 0, &peer_hash);
        let b = hash_ls_prefix(&node_hash, &prefix, 24, 0, &peer_hash);
        assert_eq!(a, b);
    }
}
