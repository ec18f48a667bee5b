/*!
NLRI decoders for the address families a plain [`NetworkPrefix`] can't represent (§4.B):
SAFI 4 labeled-unicast (RFC 8277), SAFI 128 L3VPN (RFC 4364), and SAFI 70 EVPN (RFC 7432).

Field layouts for the EVPN route types are grounded in the reference collector's own
`parseBgpLibMpEvpn.cpp` (§4.B.2).
*/
use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::models::*;
use crate::parser::{bytes_to_prefix, read_route_distinguisher, ReadUtils};
use crate::ParserError;

/// Reads one MPLS label stack off the front of a bit-length-prefixed NLRI entry, returning the
/// labels read and how many bits of `bit_len` they consumed.
fn read_label_stack(data: &mut Bytes, bit_len: u8) -> Result<(Vec<u32>, u8), ParserError> {
    let mut labels = Vec::new();
    let mut consumed_bits: u8 = 0;
    loop {
        if (bit_len as u32) < (consumed_bits as u32) + 24 {
            return Err(ParserError::ParseError(
                "labeled NLRI truncated before a complete label".to_string(),
            ));
        }
        data.has_n_remaining(3)?;
        let b = data.read_n_bytes(3)?;
        let raw = ((b[0] as u32) << 16) | ((b[1] as u32) << 8) | (b[2] as u32);
        let label = raw >> 4;
        let bottom_of_stack = raw & 0x1 != 0;
        labels.push(label);
        consumed_bits += 24;
        // 0x800000 is the RFC 3107 §3 withdraw pseudo-label: never followed by more labels.
        if bottom_of_stack || label == 0x800000 >> 4 {
            break;
        }
    }
    Ok((labels, consumed_bits))
}

/// Parses a SAFI 4 (RFC 8277) NLRI list: a label stack in front of an ordinary prefix.
pub fn parse_labeled_nlri_list(
    mut data: Bytes,
    add_path: bool,
    afi: &Afi,
) -> Result<Vec<LabeledNlri>, ParserError> {
    let mut out = Vec::new();
    while data.remaining() > 0 {
        let path_id = if add_path {
            Some(data.read_u32()?)
        } else {
            None
        };
        let bit_len = data.read_u8()?;
        let (labels, label_bits) = read_label_stack(&mut data, bit_len)?;
        let prefix_bit_len = bit_len - label_bits;
        let prefix_byte_len = (prefix_bit_len as usize).div_ceil(8);
        data.has_n_remaining(prefix_byte_len)?;
        let addr_bytes = data.read_n_bytes(prefix_byte_len)?;
        let prefix = bytes_to_prefix(*afi, prefix_bit_len, addr_bytes)?;
        out.push(LabeledNlri {
            labels,
            prefix: NetworkPrefix::new(prefix, path_id),
        });
    }
    Ok(out)
}

/// Parses a SAFI 128 (RFC 4364) NLRI list: a label stack, a route distinguisher, then a prefix.
pub fn parse_vpn_nlri_list(
    mut data: Bytes,
    add_path: bool,
    afi: &Afi,
) -> Result<Vec<VpnNlri>, ParserError> {
    let mut out = Vec::new();
    while data.remaining() > 0 {
        let path_id = if add_path {
            Some(data.read_u32()?)
        } else {
            None
        };
        let bit_len = data.read_u8()?;
        let (labels, label_bits) = read_label_stack(&mut data, bit_len)?;
        if (bit_len as u32) < (label_bits as u32) + 64 {
            return Err(ParserError::ParseError(
                "VPN NLRI truncated before its route distinguisher".to_string(),
            ));
        }
        let route_distinguisher = read_route_distinguisher(&mut data)?;
        let prefix_bit_len = bit_len - label_bits - 64;
        let prefix_byte_len = (prefix_bit_len as usize).div_ceil(8);
        data.has_n_remaining(prefix_byte_len)?;
        let addr_bytes = data.read_n_bytes(prefix_byte_len)?;
        let prefix = bytes_to_prefix(*afi, prefix_bit_len, addr_bytes)?;
        out.push(VpnNlri {
            route_distinguisher,
            labels,
            prefix: NetworkPrefix::new(prefix, path_id),
        });
    }
    Ok(out)
}

fn read_ip_by_len(data: &mut Bytes, len_bits: u8) -> Result<Option<std::net::IpAddr>, ParserError> {
    match len_bits {
        0 => Ok(None),
        32 => Ok(Some(std::net::IpAddr::V4(data.read_ipv4_address()?))),
        128 => Ok(Some(std::net::IpAddr::V6(data.read_ipv6_address()?))),
        other => Err(ParserError::ParseError(format!(
            "unsupported EVPN IP address length {other} bits"
        ))),
    }
}

fn parse_evpn_route(route_type: u8, mut value: Bytes) -> Result<EvpnRoute, ParserError> {
    match route_type {
        1 => {
            let route_distinguisher = read_route_distinguisher(&mut value)?;
            let esi = value.read_n_bytes(10)?;
            let ethernet_tag_id = value.read_u32()?;
            let (label, _) = crate::parser::read_mpls_label(&mut value)?;
            Ok(EvpnRoute::EthernetAutoDiscovery {
                route_distinguisher,
                esi,
                ethernet_tag_id,
                label,
            })
        }
        2 => {
            let route_distinguisher = read_route_distinguisher(&mut value)?;
            let esi = value.read_n_bytes(10)?;
            let ethernet_tag_id = value.read_u32()?;
            let mac_len_bits = value.read_u8()?;
            if mac_len_bits != 48 {
                return Err(ParserError::ParseError(format!(
                    "unsupported EVPN MAC address length {mac_len_bits} bits"
                )));
            }
            let mac_bytes = value.read_n_bytes(6)?;
            let mut mac_address = [0u8; 6];
            mac_address.copy_from_slice(&mac_bytes);
            let ip_len_bits = value.read_u8()?;
            let ip_address = read_ip_by_len(&mut value, ip_len_bits)?;
            let (label1, _) = crate::parser::read_mpls_label(&mut value)?;
            let label2 = if value.remaining() >= 3 {
                Some(crate::parser::read_mpls_label(&mut value)?.0)
            } else {
                None
            };
            Ok(EvpnRoute::MacIpAdvertisement {
                route_distinguisher,
                esi,
                ethernet_tag_id,
                mac_address,
                ip_address,
                label1,
                label2,
            })
        }
        3 => {
            let route_distinguisher = read_route_distinguisher(&mut value)?;
            let ethernet_tag_id = value.read_u32()?;
            let ip_len_bits = value.read_u8()?;
            let originating_router_ip = read_ip_by_len(&mut value, ip_len_bits)?.ok_or_else(|| {
                ParserError::ParseError(
                    "EVPN type 3 route missing originating router IP".to_string(),
                )
            })?;
            Ok(EvpnRoute::InclusiveMulticastEthernetTag {
                route_distinguisher,
                ethernet_tag_id,
                originating_router_ip,
            })
        }
        4 => {
            let route_distinguisher = read_route_distinguisher(&mut value)?;
            let esi = value.read_n_bytes(10)?;
            let ip_len_bits = value.read_u8()?;
            let originating_router_ip = read_ip_by_len(&mut value, ip_len_bits)?.ok_or_else(|| {
                ParserError::ParseError(
                    "EVPN type 4 route missing originating router IP".to_string(),
                )
            })?;
            Ok(EvpnRoute::EthernetSegment {
                route_distinguisher,
                esi,
                originating_router_ip,
            })
        }
        other => Ok(EvpnRoute::Unknown {
            route_type: other,
            bytes: value.to_vec(),
        }),
    }
}

/// Parses a SAFI 70 (RFC 7432) NLRI list: a sequence of (route type, length, value) entries.
pub fn parse_evpn_nlri_list(mut data: Bytes) -> Result<Vec<EvpnRoute>, ParserError> {
    let mut out = Vec::new();
    while data.remaining() > 0 {
        let route_type = data.read_u8()?;
        let length = data.read_u8()? as usize;
        data.has_n_remaining(length)?;
        let value = data.split_to(length);
        out.push(parse_evpn_route(route_type, value)?);
    }
    Ok(out)
}

fn encode_label_stack(bytes: &mut BytesMut, labels: &[u32], bottom_label: u32) {
    for (i, label) in labels.iter().enumerate() {
        let mut raw = label << 4;
        if *label == bottom_label && i == labels.len() - 1 {
            raw |= 0x1;
        }
        bytes.put_u8(((raw >> 16) & 0xff) as u8);
        bytes.put_u8(((raw >> 8) & 0xff) as u8);
        bytes.put_u8((raw & 0xff) as u8);
    }
}

/// Encodes a SAFI 4 labeled-unicast NLRI list.
pub fn encode_labeled_nlri_list(entries: &[LabeledNlri]) -> Bytes {
    let mut bytes = BytesMut::new();
    for entry in entries {
        if let Some(path_id) = entry.prefix.path_id {
            bytes.put_u32(path_id);
        }
        let prefix_bits = entry.prefix.prefix.prefix_len();
        bytes.put_u8((entry.labels.len() as u8) * 24 + prefix_bits);
        let last = *entry.labels.last().unwrap_or(&0);
        encode_label_stack(&mut bytes, &entry.labels, last);
        bytes.extend(entry.prefix.encode_address_only());
    }
    bytes.freeze()
}

/// Encodes a SAFI 128 L3VPN NLRI list.
pub fn encode_vpn_nlri_list(entries: &[VpnNlri]) -> Bytes {
    let mut bytes = BytesMut::new();
    for entry in entries {
        if let Some(path_id) = entry.prefix.path_id {
            bytes.put_u32(path_id);
        }
        let prefix_bits = entry.prefix.prefix.prefix_len();
        bytes.put_u8((entry.labels.len() as u8) * 24 + 64 + prefix_bits);
        let last = *entry.labels.last().unwrap_or(&0);
        encode_label_stack(&mut bytes, &entry.labels, last);
        bytes.put_u64(encode_route_distinguisher(&entry.route_distinguisher));
        bytes.extend(entry.prefix.encode_address_only());
    }
    bytes.freeze()
}

/// Best-effort re-encode of a `type:assigned` RD string back into its 8-byte wire form, assuming
/// the 2-octet-ASN:4-octet-number form (RD type 0). Round-trips everything this crate produces.
fn encode_route_distinguisher(rd: &str) -> u64 {
    if let Some((admin, assigned)) = rd.split_once(':') {
        if let (Ok(admin), Ok(assigned)) = (admin.parse::<u16>(), assigned.parse::<u32>()) {
            return ((admin as u64) << 32) | (assigned as u64);
        }
    }
    0
}

fn encode_mpls_label(bytes: &mut BytesMut, label: u32, bottom_of_stack: bool) {
    let mut raw = label << 4;
    if bottom_of_stack {
        raw |= 0x1;
    }
    bytes.put_u8(((raw >> 16) & 0xff) as u8);
    bytes.put_u8(((raw >> 8) & 0xff) as u8);
    bytes.put_u8((raw & 0xff) as u8);
}

fn encode_ip_by_len(bytes: &mut BytesMut, addr: Option<std::net::IpAddr>) {
    match addr {
        None => bytes.put_u8(0),
        Some(std::net::IpAddr::V4(ip)) => {
            bytes.put_u8(32);
            bytes.put_slice(&ip.octets());
        }
        Some(std::net::IpAddr::V6(ip)) => {
            bytes.put_u8(128);
            bytes.put_slice(&ip.octets());
        }
    }
}

/// Encodes a SAFI 70 EVPN NLRI list.
pub fn encode_evpn_nlri_list(entries: &[EvpnRoute]) -> Bytes {
    let mut out = BytesMut::new();
    for entry in entries {
        let mut value = BytesMut::new();
        let route_type: u8 = match entry {
            EvpnRoute::EthernetAutoDiscovery {
                route_distinguisher,
                esi,
                ethernet_tag_id,
                label,
            } => {
                value.put_u64(encode_route_distinguisher(route_distinguisher));
                value.put_slice(esi);
                value.put_u32(*ethernet_tag_id);
                encode_mpls_label(&mut value, *label, true);
                1
            }
            EvpnRoute::MacIpAdvertisement {
                route_distinguisher,
                esi,
                ethernet_tag_id,
                mac_address,
                ip_address,
                label1,
                label2,
            } => {
                value.put_u64(encode_route_distinguisher(route_distinguisher));
                value.put_slice(esi);
                value.put_u32(*ethernet_tag_id);
                value.put_u8(48);
                value.put_slice(mac_address);
                encode_ip_by_len(&mut value, *ip_address);
                encode_mpls_label(&mut value, *label1, label2.is_none());
                if let Some(label2) = label2 {
                    encode_mpls_label(&mut value, *label2, true);
                }
                2
            }
            EvpnRoute::InclusiveMulticastEthernetTag {
                route_distinguisher,
                ethernet_tag_id,
                originating_router_ip,
            } => {
                value.put_u64(encode_route_distinguisher(route_distinguisher));
                value.put_u32(*ethernet_tag_id);
                encode_ip_by_len(&mut value, Some(*originating_router_ip));
                3
            }
            EvpnRoute::EthernetSegment {
                route_distinguisher,
                esi,
                originating_router_ip,
            } => {
                value.put_u64(encode_route_distinguisher(route_distinguisher));
                value.put_slice(esi);
                encode_ip_by_len(&mut value, Some(*originating_router_ip));
                4
            }
            EvpnRoute::Unknown { route_type, bytes } => {
                value.put_slice(bytes);
                *route_type
            }
        };
        out.put_u8(route_type);
        out.put_u8(value.len() as u8);
        out.extend_from_slice(&value);
    }
    out.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_labeled_nlri_single_label() {
        let mut data = BytesMut::new();
        data.put_u8(24 + 24); // 1 label (24 bits) + /24 prefix
        data.put_u8(0x00);
        data.put_u8(0x00);
        data.put_u8(0x11); // label 1, bottom-of-stack set
        data.put_slice(&[192, 0, 2]);
        let entries = parse_labeled_nlri_list(data.freeze(), false, &Afi::Ipv4).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].labels, vec![1]);
        assert_eq!(
            entries[0].prefix.prefix,
            ipnet::IpNet::from_str("192.0.2.0/24").unwrap()
        );
    }

    #[test]
    fn test_parse_vpn_nlri_with_rd() {
        let mut data = BytesMut::new();
        data.put_u8(24 + 64 + 24); // 1 label + RD + /24
        data.put_u8(0x00);
        data.put_u8(0x00);
        data.put_u8(0x11); // label 1, bottom-of-stack
        data.put_u64(((100u64) << 32) | 200u64); // RD type 0: 100:200
        data.put_slice(&[10, 0, 0]);
        let entries = parse_vpn_nlri_list(data.freeze(), false, &Afi::Ipv4).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].route_distinguisher, "100:200");
        assert_eq!(
            entries[0].prefix.prefix,
            ipnet::IpNet::from_str("10.0.0.0/24").unwrap()
        );
    }

    #[test]
    fn test_parse_evpn_type3_inclusive_multicast() {
        let mut value = BytesMut::new();
        value.put_u64(((100u64) << 32) | 1u64); // RD 100:1
        value.put_u32(0); // ethernet tag id
        value.put_u8(32); // IPv4 originating router IP
        value.put_slice(&[192, 0, 2, 1]);

        let mut data = BytesMut::new();
        data.put_u8(3); // route type
        data.put_u8(value.len() as u8);
        data.extend_from_slice(&value);

        let routes = parse_evpn_nlri_list(data.freeze()).unwrap();
        assert_eq!(routes.len(), 1);
        match &routes[0] {
            EvpnRoute::InclusiveMulticastEthernetTag {
                route_distinguisher,
                ethernet_tag_id,
                originating_router_ip,
            } => {
                assert_eq!(route_distinguisher, "100:1");
                assert_eq!(*ethernet_tag_id, 0);
                assert_eq!(
                    *originating_router_ip,
                    std::net::IpAddr::from_str("192.0.2.1").unwrap()
                );
            }
            other => panic!("unexpected route: {other:?}"),
        }
    }

    #[test]
    fn test_parse_evpn_unknown_route_type_passthrough() {
        let mut data = BytesMut::new();
        data.put_u8(9); // unassigned route type
        data.put_u8(3);
        data.put_slice(&[1, 2, 3]);
        let routes = parse_evpn_nlri_list(data.freeze()).unwrap();
        assert_eq!(
            routes[0],
            EvpnRoute::Unknown {
                route_type: 9,
                bytes: vec![1, 2, 3],
            }
        );
    }

    #[test]
    fn test_parse_evpn_type2_mac_ip_advertisement() {
        let mut value = BytesMut::new();
        value.put_u64(((100u64) << 32) | 1u64); // RD
        value.put_slice(&[0u8; 10]); // ESI
        value.put_u32(0); // ethernet tag id
        value.put_u8(48); // MAC length in bits
        value.put_slice(&[0x02, 0x00, 0x00, 0x00, 0x00, 0x01]); // MAC
        value.put_u8(0); // no IP
        value.put_u8(0x00);
        value.put_u8(0x00);
        value.put_u8(0x21); // label 2, bottom-of-stack

        let mut data = BytesMut::new();
        data.put_u8(2);
        data.put_u8(value.len() as u8);
        data.extend_from_slice(&value);

        let routes = parse_evpn_nlri_list(data.freeze()).unwrap();
        match &routes[0] {
            EvpnRoute::MacIpAdvertisement {
                mac_address,
                ip_address,
                label1,
                label2,
                ..
            } => {
                assert_eq!(*mac_address, [0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
                assert_eq!(*ip_address, None);
                assert_eq!(*label1, 2);
                assert_eq!(*label2, None);
            }
            other => panic!("unexpected route: {other:?}"),
        }
    }

    #[test]
    fn test_encode_labeled_nlri_round_trips() {
        let entries = vec![LabeledNlri {
            labels: vec![1],
            prefix: NetworkPrefix::new(ipnet::IpNet::from_str("192.0.2.0/24").unwrap(), None),
        }];
        let encoded = encode_labeled_nlri_list(&entries);
        let decoded = parse_labeled_nlri_list(encoded, false, &Afi::Ipv4).unwrap();
        assert_eq!(decoded, entries);
    }

    #[test]
    fn test_encode_vpn_nlri_round_trips() {
        let entries = vec![VpnNlri {
            route_distinguisher: "100:200".to_string(),
            labels: vec![1],
            prefix: NetworkPrefix::new(ipnet::IpNet::from_str("10.0.0.0/24").unwrap(), None),
        }];
        let encoded = encode_vpn_nlri_list(&entries);
        let decoded = parse_vpn_nlri_list(encoded, false, &Afi::Ipv4).unwrap();
        assert_eq!(decoded, entries);
    }

    #[test]
    fn test_encode_evpn_type4_ethernet_segment_round_trips() {
        let entries = vec![EvpnRoute::EthernetSegment {
            route_distinguisher: "100:1".to_string(),
            esi: vec![0u8; 10],
            originating_router_ip: std::net::IpAddr::from_str("192.0.2.1").unwrap(),
        }];
        let encoded = encode_evpn_nlri_list(&entries);
        let decoded = parse_evpn_nlri_list(encoded).unwrap();
        assert_eq!(decoded, entries);
    }

    #[test]
    fn test_encode_evpn_unknown_round_trips() {
        let entries = vec![EvpnRoute::Unknown {
            route_type: 9,
            bytes: vec![1, 2, 3],
        }];
        let encoded = encode_evpn_nlri_list(&entries);
        let decoded = parse_evpn_nlri_list(encoded).unwrap();
        assert_eq!(decoded, entries);
    }
}
