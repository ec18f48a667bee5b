//! BGP Link-State attribute and NLRI parsing - RFC 7752 + draft-ietf-idr-bgp-ls-segment-routing-ext

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::error::ParserError;
use crate::models::*;
use crate::parser::ReadUtils;

/// Parse BGP Link-State attribute (type 29)
pub fn parse_link_state_attribute(mut data: Bytes) -> Result<AttributeValue, ParserError> {
    let mut attr = LinkStateAttribute::new();

    while data.remaining() >= 4 {
        let tlv_type = data.get_u16();
        let tlv_length = data.get_u16();

        if data.remaining() < tlv_length as usize {
            return Err(ParserError::TruncatedMsg(format!(
                "Expected {} bytes for TLV, but only {} remaining",
                tlv_length,
                data.remaining()
            )));
        }

        let tlv_data = data.read_n_bytes(tlv_length as usize)?;

        // Parse based on TLV type
        match tlv_type {
            // Node Attribute TLVs (1024-1039)
            1024..=1039 => {
                let node_attr_type =
                    NodeAttributeType::try_from(tlv_type).unwrap_or(NodeAttributeType::Reserved);
                if node_attr_type == NodeAttributeType::Reserved {
                    attr.add_unknown_attribute(Tlv::new(tlv_type, tlv_data.to_vec()));
                } else {
                    attr.add_node_attribute(node_attr_type, tlv_data.to_vec());
                }
            }
            // Link Attribute TLVs (1088-1103)
            1088..=1103 => {
                let link_attr_type =
                    LinkAttributeType::try_from(tlv_type).unwrap_or(LinkAttributeType::Reserved);
                if link_attr_type == LinkAttributeType::Reserved {
                    attr.add_unknown_attribute(Tlv::new(tlv_type, tlv_data.to_vec()));
                } else {
                    attr.add_link_attribute(link_attr_type, tlv_data.to_vec());
                }
            }
            // Link Attribute TLVs (1114-1120, 1122) - RFC 8571, RFC 9294
            1114..=1120 | 1122 => {
                let link_attr_type =
                    LinkAttributeType::try_from(tlv_type).unwrap_or(LinkAttributeType::Reserved);
                if link_attr_type == LinkAttributeType::Reserved {
                    attr.add_unknown_attribute(Tlv::new(tlv_type, tlv_data.to_vec()));
                } else {
                    attr.add_link_attribute(link_attr_type, tlv_data.to_vec());
                }
            }
            // Link Attribute TLVs (1172) - RFC 9085
            1172 => {
                let link_attr_type =
                    LinkAttributeType::try_from(tlv_type).unwrap_or(LinkAttributeType::Reserved);
                if link_attr_type == LinkAttributeType::Reserved {
                    attr.add_unknown_attribute(Tlv::new(tlv_type, tlv_data.to_vec()));
                } else {
                    attr.add_link_attribute(link_attr_type, tlv_data.to_vec());
                }
            }
            // Prefix Attribute TLVs (1152-1163, 1170-1171, 1174)
            1152..=1163 | 1170..=1171 | 1174 => {
                let prefix_attr_type = PrefixAttributeType::try_from(tlv_type)
                    .unwrap_or(PrefixAttributeType::Reserved);
                if prefix_attr_type == PrefixAttributeType::Reserved {
                    attr.add_unknown_attribute(Tlv::new(tlv_type, tlv_data.to_vec()));
                } else {
                    attr.add_prefix_attribute(prefix_attr_type, tlv_data.to_vec());
                }
            }
            // Unknown/Reserved TLVs
            _ => {
                attr.add_unknown_attribute(Tlv::new(tlv_type, tlv_data.to_vec()));
            }
        }
    }

    Ok(AttributeValue::LinkState(attr))
}

/// Parses a BGP-LS NLRI list (§4.B.1): a stream of {type(2), length(2), protocol-id(1),
/// routing-universe-id(8), descriptor sub-TLVs} entries, one per node/link/prefix.
pub fn parse_link_state_nlri_list(mut data: Bytes) -> Result<Vec<LinkStateNlri>, ParserError> {
    let mut out = Vec::new();
    while data.remaining() >= 4 {
        let nlri_type = data.read_u16()?;
        let nlri_len = data.read_u16()? as usize;
        data.has_n_remaining(nlri_len)?;
        let nlri_data = data.read_n_bytes(nlri_len)?;
        out.push(parse_single_link_state_nlri(nlri_type, nlri_data.into())?);
    }
    Ok(out)
}

fn parse_single_link_state_nlri(
    nlri_type: u16,
    mut data: Bytes,
) -> Result<LinkStateNlri, ParserError> {
    let nlri_type = NlriType::from(nlri_type);
    data.has_n_remaining(9)?;
    let protocol_id = ProtocolId::from(data.read_u8()?);
    let identifier = data.read_u64()?;

    let (local_node_descriptors, remote_node_descriptors, link_descriptors, prefix_descriptors) =
        match nlri_type {
            NlriType::Link => {
                let local_desc = parse_node_descriptor_tlv(&mut data, NodeDescriptorType::LocalDescriptor)?;
                let remote_desc =
                    parse_node_descriptor_tlv(&mut data, NodeDescriptorType::RemoteDescriptor)?;
                let link_desc = parse_link_descriptors(&mut data)?;
                (local_desc, Some(remote_desc), Some(link_desc), None)
            }
            NlriType::Ipv4TopologyPrefix | NlriType::Ipv6TopologyPrefix => {
                let local_desc = parse_node_descriptor_tlv(&mut data, NodeDescriptorType::LocalDescriptor)?;
                let prefix_desc = parse_prefix_descriptors(&mut data)?;
                (local_desc, None, None, Some(prefix_desc))
            }
            _ => {
                let local_desc = parse_node_descriptor_tlv(&mut data, NodeDescriptorType::LocalDescriptor)?;
                (local_desc, None, None, None)
            }
        };

    Ok(LinkStateNlri {
        nlri_type,
        protocol_id,
        identifier,
        local_node_descriptors,
        remote_node_descriptors,
        link_descriptors,
        prefix_descriptors,
    })
}

/// Reads one Local/Remote Node Descriptor container TLV (type 256/257, §4.B.1) and parses the
/// AS/BGP-LS-ID/OSPF-area/IGP-router-id/BGP-router-id sub-TLVs nested in its value.
fn parse_node_descriptor_tlv(
    data: &mut Bytes,
    expected: NodeDescriptorType,
) -> Result<NodeDescriptor, ParserError> {
    let mut node_desc = NodeDescriptor::default();

    data.has_n_remaining(4)?;
    let tlv_type = data.read_u16()?;
    let tlv_len = data.read_u16()? as usize;
    data.has_n_remaining(tlv_len)?;
    let mut desc_data: Bytes = data.read_n_bytes(tlv_len)?.into();

    if NodeDescriptorType::from(tlv_type) != expected {
        log::warn!(
            "bgp-ls: expected node descriptor type {:?}, got {}",
            expected,
            tlv_type
        );
    }

    while desc_data.remaining() >= 4 {
        let sub_type = desc_data.read_u16()?;
        let sub_len = desc_data.read_u16()? as usize;
        desc_data.has_n_remaining(sub_len)?;
        let sub_data = desc_data.read_n_bytes(sub_len)?;

        match NodeDescriptorType::from(sub_type) {
            NodeDescriptorType::AutonomousSystem if sub_len == 4 => {
                node_desc.autonomous_system = Some(u32::from_be_bytes(sub_data[..4].try_into().unwrap()));
            }
            NodeDescriptorType::BgpLsIdentifier if sub_len == 4 => {
                node_desc.bgp_ls_identifier = Some(u32::from_be_bytes(sub_data[..4].try_into().unwrap()));
            }
            NodeDescriptorType::OspfAreaId if sub_len == 4 => {
                node_desc.ospf_area_id = Some(u32::from_be_bytes(sub_data[..4].try_into().unwrap()));
            }
            NodeDescriptorType::IgpRouterId => {
                node_desc.igp_router_id = Some(sub_data.to_vec());
            }
            NodeDescriptorType::BgpRouterId if sub_len == 4 => {
                node_desc.bgp_router_id = Some(Ipv4Addr::new(
                    sub_data[0],
                    sub_data[1],
                    sub_data[2],
                    sub_data[3],
                ));
            }
            _ => node_desc
                .unknown_tlvs
                .push(Tlv::new(sub_type, sub_data.to_vec())),
        }
    }

    Ok(node_desc)
}

/// Parses the flat Link Descriptor sub-TLV stream (types 258-263) that follows the two node
/// descriptors in a Link NLRI — these sit directly in the NLRI body, not in a wrapping TLV.
fn parse_link_descriptors(data: &mut Bytes) -> Result<LinkDescriptor, ParserError> {
    let mut link_desc = LinkDescriptor::default();
    while data.remaining() >= 4 {
        let sub_type = data.read_u16()?;
        let sub_len = data.read_u16()? as usize;
        data.has_n_remaining(sub_len)?;
        let sub_data = data.read_n_bytes(sub_len)?;

        match LinkDescriptorType::from(sub_type) {
            LinkDescriptorType::LinkLocalRemoteIdentifiers if sub_len == 8 => {
                let local_id = u32::from_be_bytes(sub_data[0..4].try_into().unwrap());
                let remote_id = u32::from_be_bytes(sub_data[4..8].try_into().unwrap());
                link_desc.link_local_remote_identifiers = Some((local_id, remote_id));
            }
            LinkDescriptorType::Ipv4InterfaceAddress if sub_len == 4 => {
                link_desc.ipv4_interface_address =
                    Some(Ipv4Addr::new(sub_data[0], sub_data[1], sub_data[2], sub_data[3]));
            }
            LinkDescriptorType::Ipv4NeighborAddress if sub_len == 4 => {
                link_desc.ipv4_neighbor_address =
                    Some(Ipv4Addr::new(sub_data[0], sub_data[1], sub_data[2], sub_data[3]));
            }
            LinkDescriptorType::Ipv6InterfaceAddress if sub_len == 16 => {
                let mut bytes = [0u8; 16];
                bytes.copy_from_slice(&sub_data[..16]);
                link_desc.ipv6_interface_address = Some(Ipv6Addr::from(bytes));
            }
            LinkDescriptorType::Ipv6NeighborAddress if sub_len == 16 => {
                let mut bytes = [0u8; 16];
                bytes.copy_from_slice(&sub_data[..16]);
                link_desc.ipv6_neighbor_address = Some(Ipv6Addr::from(bytes));
            }
            LinkDescriptorType::MultiTopologyId if sub_len >= 2 => {
                link_desc.multi_topology_id = Some(u16::from_be_bytes([sub_data[0], sub_data[1]]));
            }
            _ => link_desc
                .unknown_tlvs
                .push(Tlv::new(sub_type, sub_data.to_vec())),
        }
    }
    Ok(link_desc)
}

/// Parses the flat Prefix Descriptor sub-TLV stream (types 263-265) that follows the node
/// descriptor in a Prefix NLRI. Type 263 here means multi-topology ID, not the link descriptor
/// meaning of the same code — the enclosing NLRI type disambiguates.
fn parse_prefix_descriptors(data: &mut Bytes) -> Result<PrefixDescriptor, ParserError> {
    let mut prefix_desc = PrefixDescriptor::default();
    while data.remaining() >= 4 {
        let sub_type = data.read_u16()?;
        let sub_len = data.read_u16()? as usize;
        data.has_n_remaining(sub_len)?;
        let sub_data = data.read_n_bytes(sub_len)?;

        match PrefixDescriptorType::from(sub_type) {
            PrefixDescriptorType::MultiTopologyId if sub_len >= 2 => {
                prefix_desc.multi_topology_id = Some(u16::from_be_bytes([sub_data[0], sub_data[1]]));
            }
            PrefixDescriptorType::OspfRouteType if !sub_data.is_empty() => {
                prefix_desc.ospf_route_type = Some(sub_data[0]);
            }
            PrefixDescriptorType::IpReachabilityInformation => {
                prefix_desc.ip_reachability_information = parse_ip_reachability(&sub_data).ok();
            }
            _ => prefix_desc
                .unknown_tlvs
                .push(Tlv::new(sub_type, sub_data.to_vec())),
        }
    }
    Ok(prefix_desc)
}

/// IP Reachability Information sub-TLV (§4.B.1): a 1-byte prefix length followed by
/// `ceil(len/8)` address bytes. Length alone distinguishes IPv4 from IPv6.
fn parse_ip_reachability(data: &[u8]) -> Result<NetworkPrefix, ParserError> {
    if data.is_empty() {
        return Err(ParserError::TruncatedMsg(
            "empty IP reachability sub-TLV".to_string(),
        ));
    }
    let prefix_len = data[0];
    let addr_bytes = &data[1..];
    let needed = (prefix_len as usize).div_ceil(8);
    if addr_bytes.len() < needed {
        return Err(ParserError::TruncatedMsg(format!(
            "expected {needed} bytes for prefix, got {}",
            addr_bytes.len()
        )));
    }
    if prefix_len <= 32 {
        let mut bytes = [0u8; 4];
        bytes[..needed].copy_from_slice(&addr_bytes[..needed]);
        let net = ipnet::Ipv4Net::new(Ipv4Addr::from(bytes), prefix_len)
            .map_err(|_| ParserError::ParseError("invalid BGP-LS IPv4 prefix".to_string()))?;
        Ok(NetworkPrefix::new(ipnet::IpNet::V4(net), None))
    } else {
        let mut bytes = [0u8; 16];
        bytes[..needed].copy_from_slice(&addr_bytes[..needed]);
        let net = ipnet::Ipv6Net::new(Ipv6Addr::from(bytes), prefix_len)
            .map_err(|_| ParserError::ParseError("invalid BGP-LS IPv6 prefix".to_string()))?;
        Ok(NetworkPrefix::new(ipnet::IpNet::V6(net), None))
    }
}

fn encode_node_descriptor_tlv(bytes: &mut BytesMut, tlv_type: NodeDescriptorType, desc: &NodeDescriptor) {
    let mut value = BytesMut::new();
    if let Some(asn) = desc.autonomous_system {
        value.put_u16(NodeDescriptorType::AutonomousSystem.into());
        value.put_u16(4);
        value.put_u32(asn);
    }
    if let Some(id) = desc.bgp_ls_identifier {
        value.put_u16(NodeDescriptorType::BgpLsIdentifier.into());
        value.put_u16(4);
        value.put_u32(id);
    }
    if let Some(area) = desc.ospf_area_id {
        value.put_u16(NodeDescriptorType::OspfAreaId.into());
        value.put_u16(4);
        value.put_u32(area);
    }
    if let Some(igp_id) = &desc.igp_router_id {
        value.put_u16(NodeDescriptorType::IgpRouterId.into());
        value.put_u16(igp_id.len() as u16);
        value.extend_from_slice(igp_id);
    }
    if let Some(bgp_id) = desc.bgp_router_id {
        value.put_u16(NodeDescriptorType::BgpRouterId.into());
        value.put_u16(4);
        value.extend_from_slice(&bgp_id.octets());
    }
    for tlv in &desc.unknown_tlvs {
        value.put_u16(tlv.tlv_type);
        value.put_u16(tlv.length());
        value.extend_from_slice(&tlv.value);
    }
    bytes.put_u16(tlv_type.into());
    bytes.put_u16(value.len() as u16);
    bytes.extend_from_slice(&value);
}

fn encode_link_descriptors(bytes: &mut BytesMut, desc: &LinkDescriptor) {
    if let Some((local_id, remote_id)) = desc.link_local_remote_identifiers {
        bytes.put_u16(LinkDescriptorType::LinkLocalRemoteIdentifiers.into());
        bytes.put_u16(8);
        bytes.put_u32(local_id);
        bytes.put_u32(remote_id);
    }
    if let Some(ip) = desc.ipv4_interface_address {
        bytes.put_u16(LinkDescriptorType::Ipv4InterfaceAddress.into());
        bytes.put_u16(4);
        bytes.extend_from_slice(&ip.octets());
    }
    if let Some(ip) = desc.ipv4_neighbor_address {
        bytes.put_u16(LinkDescriptorType::Ipv4NeighborAddress.into());
        bytes.put_u16(4);
        bytes.extend_from_slice(&ip.octets());
    }
    if let Some(ip) = desc.ipv6_interface_address {
        bytes.put_u16(LinkDescriptorType::Ipv6InterfaceAddress.into());
        bytes.put_u16(16);
        bytes.extend_from_slice(&ip.octets());
    }
    if let Some(ip) = desc.ipv6_neighbor_address {
        bytes.put_u16(LinkDescriptorType::Ipv6NeighborAddress.into());
        bytes.put_u16(16);
        bytes.extend_from_slice(&ip.octets());
    }
    if let Some(mt_id) = desc.multi_topology_id {
        bytes.put_u16(LinkDescriptorType::MultiTopologyId.into());
        bytes.put_u16(2);
        bytes.put_u16(mt_id);
    }
    for tlv in &desc.unknown_tlvs {
        bytes.put_u16(tlv.tlv_type);
        bytes.put_u16(tlv.length());
        bytes.extend_from_slice(&tlv.value);
    }
}

fn encode_prefix_descriptors(bytes: &mut BytesMut, desc: &PrefixDescriptor) {
    if let Some(mt_id) = desc.multi_topology_id {
        bytes.put_u16(PrefixDescriptorType::MultiTopologyId.into());
        bytes.put_u16(2);
        bytes.put_u16(mt_id);
    }
    if let Some(route_type) = desc.ospf_route_type {
        bytes.put_u16(PrefixDescriptorType::OspfRouteType.into());
        bytes.put_u16(1);
        bytes.put_u8(route_type);
    }
    if let Some(prefix) = &desc.ip_reachability_information {
        let addr_bytes = prefix.encode_address_only();
        bytes.put_u16(PrefixDescriptorType::IpReachabilityInformation.into());
        bytes.put_u16((1 + addr_bytes.len()) as u16);
        bytes.put_u8(prefix.prefix.prefix_len());
        bytes.extend_from_slice(&addr_bytes);
    }
    for tlv in &desc.unknown_tlvs {
        bytes.put_u16(tlv.tlv_type);
        bytes.put_u16(tlv.length());
        bytes.extend_from_slice(&tlv.value);
    }
}

/// Encodes a BGP-LS NLRI list, the inverse of [`parse_link_state_nlri_list`].
pub fn encode_link_state_nlri_list(entries: &[LinkStateNlri]) -> Bytes {
    let mut out = BytesMut::new();
    for entry in entries {
        let mut body = BytesMut::new();
        body.put_u8(entry.protocol_id.into());
        body.put_u64(entry.identifier);
        encode_node_descriptor_tlv(
            &mut body,
            NodeDescriptorType::LocalDescriptor,
            &entry.local_node_descriptors,
        );
        if let Some(remote) = &entry.remote_node_descriptors {
            encode_node_descriptor_tlv(&mut body, NodeDescriptorType::RemoteDescriptor, remote);
        }
        if let Some(link) = &entry.link_descriptors {
            encode_link_descriptors(&mut body, link);
        }
        if let Some(prefix) = &entry.prefix_descriptors {
            encode_prefix_descriptors(&mut body, prefix);
        }
        out.put_u16(entry.nlri_type.into());
        out.put_u16(body.len() as u16);
        out.extend_from_slice(&body);
    }
    out.freeze()
}

/// Encode BGP Link-State attribute
pub fn encode_link_state_attribute(attr: &LinkStateAttribute) -> Bytes {
    let mut bytes = BytesMut::new();

    // Encode node attributes
    for (attr_type, value) in &attr.node_attributes {
        let type_code = u16::from(*attr_type);
        bytes.put_u16(type_code);
        bytes.put_u16(value.len() as u16);
        bytes.extend_from_slice(value);
    }

    // Encode link attributes
    for (attr_type, value) in &attr.link_attributes {
        let type_code = u16::from(*attr_type);
        bytes.put_u16(type_code);
        bytes.put_u16(value.len() as u16);
        bytes.extend_from_slice(value);
    }

    // Encode prefix attributes
    for (attr_type, value) in &attr.prefix_attributes {
        let type_code = u16::from(*attr_type);
        bytes.put_u16(type_code);
        bytes.put_u16(value.len() as u16);
        bytes.extend_from_slice(value);
    }

    // Encode unknown attributes
    for tlv in &attr.unknown_attributes {
        bytes.put_u16(tlv.tlv_type);
        bytes.put_u16(tlv.length());
        bytes.extend_from_slice(&tlv.value);
    }

    bytes.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_link_state_attribute_encoding() {
        let mut attr = LinkStateAttribute::new();
        attr.add_node_attribute(NodeAttributeType::NodeName, b"router1".to_vec());

        let encoded = encode_link_state_attribute(&attr);
        assert!(!encoded.is_empty());

        // Should contain the node name TLV
        // Type (1026) + Length (7) + "router1"
        assert!(encoded.len() >= 11);
    }

    fn sample_node_descriptor(asn: u32, igp_router_id: Vec<u8>) -> NodeDescriptor {
        NodeDescriptor {
            autonomous_system: Some(asn),
            bgp_ls_identifier: Some(0),
            ospf_area_id: Some(0),
            igp_router_id: Some(igp_router_id),
            bgp_router_id: Some(Ipv4Addr::new(10, 0, 0, 1)),
            unknown_tlvs: vec![],
        }
    }

    #[test]
    fn test_parse_and_encode_node_nlri() {
        let node = LinkStateNlri::new_node_nlri(
            ProtocolId::IsisL2,
            0,
            sample_node_descriptor(65001, vec![10, 0, 0, 1]),
        );
        let encoded = encode_link_state_nlri_list(std::slice::from_ref(&node));
        let parsed = parse_link_state_nlri_list(encoded).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0], node);
    }

    #[test]
    fn test_parse_and_encode_link_nlri() {
        let local = sample_node_descriptor(65001, vec![10, 0, 0, 1]);
        let remote = sample_node_descriptor(65002, vec![10, 0, 0, 2]);
        let link_desc = LinkDescriptor {
            link_local_remote_identifiers: Some((1, 2)),
            ipv4_interface_address: Some(Ipv4Addr::new(192, 168, 1, 1)),
            ipv4_neighbor_address: Some(Ipv4Addr::new(192, 168, 1, 2)),
            ipv6_interface_address: None,
            ipv6_neighbor_address: None,
            multi_topology_id: Some(0),
            unknown_tlvs: vec![],
        };
        let link = LinkStateNlri::new_link_nlri(ProtocolId::IsisL2, 0, local, remote, link_desc);
        let encoded = encode_link_state_nlri_list(std::slice::from_ref(&link));
        let parsed = parse_link_state_nlri_list(encoded).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0], link);

        let parsed_link_desc = parsed[0].link_descriptors.as_ref().unwrap();
        assert_eq!(parsed_link_desc.link_local_remote_identifiers, Some((1, 2)));
    }

    #[test]
    fn test_parse_and_encode_prefix_nlri() {
        let local = sample_node_descriptor(65001, vec![10, 0, 0, 1]);
        let prefix_desc = PrefixDescriptor {
            multi_topology_id: Some(0),
            ospf_route_type: Some(2),
            ip_reachability_information: Some(NetworkPrefix::from_str("10.1.0.0/24").unwrap()),
            unknown_tlvs: vec![],
        };
        let prefix = LinkStateNlri::new_prefix_nlri(
            NlriType::Ipv4TopologyPrefix,
            ProtocolId::Ospfv2,
            0,
            local,
            prefix_desc,
        );
        let encoded = encode_link_state_nlri_list(std::slice::from_ref(&prefix));
        let parsed = parse_link_state_nlri_list(encoded).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0], prefix);
    }

    #[test]
    fn test_link_local_remote_identifiers_distinct() {
        let local = sample_node_descriptor(65001, vec![10, 0, 0, 1]);
        let remote = sample_node_descriptor(65002, vec![10, 0, 0, 2]);
        let link_desc = LinkDescriptor {
            link_local_remote_identifiers: Some((0xAAAAAAAA, 0xBBBBBBBB)),
            ..Default::default()
        };
        let link = LinkStateNlri::new_link_nlri(ProtocolId::IsisL2, 0, local, remote, link_desc);
        let encoded = encode_link_state_nlri_list(std::slice::from_ref(&link));
        let parsed = parse_link_state_nlri_list(encoded).unwrap();
        let parsed_link_desc = parsed[0].link_descriptors.as_ref().unwrap();
        assert_eq!(
            parsed_link_desc.link_local_remote_identifiers,
            Some((0xAAAAAAAA, 0xBBBBBBBB))
        );
    }
}
