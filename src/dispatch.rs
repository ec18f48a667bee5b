/*!
Dispatch layer (§4.D→E→F→G): turns one decoded [`BmpMessage`] into the identity-stamped,
topic-routed records the publication layer sends onward, and mirrors the raw frame that
produced it.

A route-monitoring UPDATE decomposes into exactly one `path_attrs` record followed by the
reachability/withdrawal records that reference it by hash (§3, §8.1); peer up/down, stats,
and router init/term each become their own event record. Everything not named by a topic
variable in the loaded config still gets a topic: [`Dispatcher::resolve`] falls back to the
bare topic variable name so the collector runs unconfigured.
*/
use std::sync::Arc;

use bytes::Bytes;
use ipnet::IpNet;
use log::warn;

use crate::config::Config;
use crate::identity::{
    hash_ls_link, hash_ls_node, hash_ls_prefix, hash_path_attrs, hash_rib_entry, HashId,
    LsLinkFields, PathAttrFields,
};
use crate::models::{
    Asn, AttributeValue, Attributes, BgpMessage, EvpnRoute, LabeledNlri, LinkStateNlri, Nlri,
    NlriDetail, NlriType, NodeDescriptor, NetworkPrefix, VpnNlri,
};
use crate::parser::bmp::messages::{
    BmpMessage, BmpPerPeerHeader, InitiationMessage, InitiationTlvType, MessageBody,
    PeerDownNotification, PeerUpNotification, StatsData, StatsReport, TerminationMessage,
};
use crate::parser::utils::decode_route_distinguisher;
use crate::publish::topic::{resolve_topic_name, GroupCache, GroupKey};
use crate::publish::{PublishRequest, Publisher};
use crate::session::{Session, TermReasonCode};

const TOPIC_RAW: &str = "bmp_raw";
const TOPIC_PATH_ATTRS: &str = "path_attrs";
const TOPIC_UNICAST_PREFIX: &str = "unicast_prefix";
const TOPIC_L3VPN_PREFIX: &str = "l3vpn_prefix";
const TOPIC_EVPN_PREFIX: &str = "evpn_prefix";
const TOPIC_LS_NODE: &str = "ls_node";
const TOPIC_LS_LINK: &str = "ls_link";
const TOPIC_LS_PREFIX: &str = "ls_prefix";
const TOPIC_PEER_EVENT: &str = "peer_event";
const TOPIC_ROUTER_EVENT: &str = "router_event";
const TOPIC_STATS: &str = "stats_report";

/// Owns a session's group assignment and drives its message-to-record decomposition.
/// One `Dispatcher` per accepted router connection, same lifetime as the `Session` it serves.
pub struct Dispatcher {
    config: Arc<Config>,
    publisher: Arc<dyn Publisher>,
    collector_hash: HashId,
    hostname: Option<String>,
    groups: GroupCache,
}

impl Dispatcher {
    pub fn new(
        config: Arc<Config>,
        publisher: Arc<dyn Publisher>,
        collector_hash: HashId,
        hostname: Option<String>,
        router_group: GroupKey,
    ) -> Self {
        Dispatcher {
            config,
            publisher,
            collector_hash,
            hostname,
            groups: GroupCache::new(router_group),
        }
    }

    /// Entry point called once per decoded BMP frame.
    pub fn dispatch(&mut self, session: &mut Session, msg: &BmpMessage, raw_frame: &Bytes) {
        self.publish_raw_mirror(session, raw_frame);

        match (&msg.per_peer_header, &msg.message_body) {
            (Some(header), MessageBody::RouteMonitoring(rm)) => {
                self.dispatch_route_monitoring(session, header, &rm.bgp_message)
            }
            (Some(header), MessageBody::PeerUpNotification(up)) => {
                self.dispatch_peer_up(session, header, up)
            }
            (Some(header), MessageBody::PeerDownNotification(down)) => {
                self.dispatch_peer_down(session, header, down)
            }
            (Some(header), MessageBody::StatsReport(stats)) => {
                self.dispatch_stats(session, header, stats)
            }
            (None, MessageBody::InitiationMessage(init)) => {
                self.dispatch_initiation(session, init)
            }
            (None, MessageBody::TerminationMessage(term)) => {
                self.dispatch_termination(session, term)
            }
            _ => {}
        }
    }

    fn resolve(&self, topic_var: &str, peer_group: &GroupKey, peer_asn: u32) -> String {
        resolve_topic_name(&self.config, topic_var, &self.groups.router_group, peer_group, peer_asn)
            .unwrap_or_else(|| topic_var.to_string())
    }

    fn peer_group_for(&mut self, peer_hash: HashId, addr: std::net::IpAddr, asn: u32) -> GroupKey {
        self.groups.peer_group_or_insert(
            peer_hash,
            &self.config.mapping.groups.peer_groups,
            self.hostname.as_deref(),
            addr,
            asn,
        )
    }

    fn publish_lines(&self, topic: String, key: Vec<u8>, lines: Vec<String>) {
        if lines.is_empty() {
            return;
        }
        let row_count = lines.len() as u32;
        let mut payload = Vec::new();
        for line in &lines {
            payload.extend_from_slice(line.as_bytes());
            payload.push(b'\n');
        }
        let req = PublishRequest {
            topic,
            key,
            payload,
            row_count,
            collector_hash: self.collector_hash,
            raw_router: None,
        };
        if let Err(e) = self.publisher.publish(req) {
            warn!("publish failed: {e}");
        }
    }

    fn publish_raw_mirror(&mut self, session: &Session, raw_frame: &Bytes) {
        let topic = self.resolve(TOPIC_RAW, &GroupKey::default(), 0);
        let req = PublishRequest {
            topic,
            key: session.router.hash_id.as_bytes().to_vec(),
            payload: raw_frame.to_vec(),
            row_count: 1,
            collector_hash: self.collector_hash,
            raw_router: Some((session.router.hash_id, session.router.ip_addr.to_string())),
        };
        if let Err(e) = self.publisher.publish(req) {
            warn!("failed to publish raw BMP mirror: {e}");
        }
    }

    fn dispatch_route_monitoring(
        &mut self,
        session: &mut Session,
        header: &BmpPerPeerHeader,
        bgp_msg: &BgpMessage,
    ) {
        let BgpMessage::Update(update) = bgp_msg else {
            return;
        };
        let peer = session.peer_entry_for_header(header);
        let peer_hash = peer.hash_id;
        let peer_addr = peer.peer_addr;
        let peer_asn = peer.peer_as.map(|a| a.to_u32()).unwrap_or(0);
        let peer_group = self.peer_group_for(peer_hash, peer_addr, peer_asn);

        let owned = extract_path_attrs(&update.attributes);
        let fields = PathAttrFields {
            as_path: &owned.as_path,
            next_hop: &owned.next_hop,
            aggregator: &owned.aggregator,
            origin: &owned.origin,
            med: owned.med,
            local_pref: owned.local_pref,
            communities: &owned.communities,
            ext_communities: &owned.ext_communities,
        };
        let path_attrs_hash = hash_path_attrs(&fields, &peer_hash);

        let mut rows = RouteRows::default();
        for prefix in &update.withdrawn_prefixes {
            rows.unicast
                .push(rib_row(prefix, &peer_hash, &path_attrs_hash, false, &[]));
        }
        for prefix in &update.announced_prefixes {
            rows.unicast
                .push(rib_row(prefix, &peer_hash, &path_attrs_hash, true, &[]));
        }
        if let Some(nlri) = update.attributes.get_unreachable() {
            collect_nlri_rows(nlri, &peer_hash, &path_attrs_hash, false, &mut rows);
        }
        if let Some(nlri) = update.attributes.get_reachable() {
            collect_nlri_rows(nlri, &peer_hash, &path_attrs_hash, true, &mut rows);
        }

        if !rows.has_any() {
            // End-of-RIB marker or an attribute-only update with nothing to announce or
            // withdraw: the "at most one path-attrs message" invariant means we emit nothing
            // sooner than publish an orphan hash no reachability record ever references.
            return;
        }

        let key = peer_hash.as_bytes().to_vec();
        let path_attrs_topic = self.resolve(TOPIC_PATH_ATTRS, &peer_group, peer_asn);
        self.publish_lines(
            path_attrs_topic,
            key.clone(),
            vec![path_attrs_row(&path_attrs_hash, &peer_hash, &owned)],
        );

        if !rows.unicast.is_empty() {
            let topic = self.resolve(TOPIC_UNICAST_PREFIX, &peer_group, peer_asn);
            self.publish_lines(topic, key.clone(), rows.unicast);
        }
        if !rows.l3vpn.is_empty() {
            let topic = self.resolve(TOPIC_L3VPN_PREFIX, &peer_group, peer_asn);
            self.publish_lines(topic, key.clone(), rows.l3vpn);
        }
        if !rows.evpn.is_empty() {
            let topic = self.resolve(TOPIC_EVPN_PREFIX, &peer_group, peer_asn);
            self.publish_lines(topic, key.clone(), rows.evpn);
        }
        if !rows.ls_node.is_empty() {
            let topic = self.resolve(TOPIC_LS_NODE, &peer_group, peer_asn);
            self.publish_lines(topic, key.clone(), rows.ls_node);
        }
        if !rows.ls_link.is_empty() {
            let topic = self.resolve(TOPIC_LS_LINK, &peer_group, peer_asn);
            self.publish_lines(topic, key.clone(), rows.ls_link);
        }
        if !rows.ls_prefix.is_empty() {
            let topic = self.resolve(TOPIC_LS_PREFIX, &peer_group, peer_asn);
            self.publish_lines(topic, key, rows.ls_prefix);
        }
    }

    fn dispatch_peer_up(&mut self, session: &mut Session, header: &BmpPerPeerHeader, up: &PeerUpNotification) {
        let peer_hash = session.mark_peer_up(header);
        let router_hash = session.router.hash_id;
        let peer_asn = header.peer_asn.to_u32();
        let peer_group = self.peer_group_for(peer_hash, header.peer_ip, peer_asn);

        let info = up
            .tlvs
            .iter()
            .map(|t| t.info_value.clone())
            .collect::<Vec<_>>()
            .join(";");
        let peer_rd = decode_route_distinguisher(header.peer_distinguisher);
        let row = format!(
            "{peer_hash}\t{router_hash}\tup\t{}\t{peer_rd}\t{peer_asn}\t{}\t{info}",
            header.peer_ip, header.peer_bgp_id
        );
        let topic = self.resolve(TOPIC_PEER_EVENT, &peer_group, peer_asn);
        self.publish_lines(topic, peer_hash.as_bytes().to_vec(), vec![row]);
    }

    fn dispatch_peer_down(
        &mut self,
        session: &mut Session,
        header: &BmpPerPeerHeader,
        down: &PeerDownNotification,
    ) {
        let Some(peer) = session.mark_peer_down(header) else {
            warn!("peer down for unseen peer {}", header.peer_ip);
            return;
        };
        let router_hash = session.router.hash_id;
        let peer_asn = peer.peer_as.map(|a| a.to_u32()).unwrap_or(0);
        let peer_group = self.peer_group_for(peer.hash_id, peer.peer_addr, peer_asn);

        let row = format!(
            "{}\t{router_hash}\tdown\t{}\t{}\t{peer_asn}\treason={}",
            peer.hash_id, peer.peer_addr, peer.peer_rd, down.reason
        );
        let topic = self.resolve(TOPIC_PEER_EVENT, &peer_group, peer_asn);
        self.publish_lines(topic, peer.hash_id.as_bytes().to_vec(), vec![row]);
    }

    fn dispatch_stats(&mut self, session: &mut Session, header: &BmpPerPeerHeader, stats: &StatsReport) {
        let peer = session.peer_entry_for_header(header);
        let peer_hash = peer.hash_id;
        let peer_addr = peer.peer_addr;
        let peer_asn = peer.peer_as.map(|a| a.to_u32()).unwrap_or(0);
        let router_hash = session.router.hash_id;
        let peer_group = self.peer_group_for(peer_hash, peer_addr, peer_asn);

        let rows: Vec<String> = stats
            .counters
            .iter()
            .map(|c| {
                let value = match c.stat_data {
                    StatsData::Counter(v) => v as u64,
                    StatsData::Gauge(v) => v,
                };
                format!("{peer_hash}\t{router_hash}\t{:?}\t{value}", c.named_type())
            })
            .collect();

        let topic = self.resolve(TOPIC_STATS, &peer_group, peer_asn);
        self.publish_lines(topic, peer_hash.as_bytes().to_vec(), rows);
    }

    fn dispatch_initiation(&mut self, session: &mut Session, init: &InitiationMessage) {
        for tlv in &init.tlvs {
            match tlv.info_type {
                InitiationTlvType::SysName => session.router.name = Some(tlv.info.clone()),
                InitiationTlvType::SysDescr => session.router.description = Some(tlv.info.clone()),
                _ => {}
            }
        }
        let router_hash = session.router.hash_id;
        let info = init
            .tlvs
            .iter()
            .map(|t| format!("{:?}={}", t.info_type, t.info))
            .collect::<Vec<_>>()
            .join(";");
        let row = format!("{router_hash}\tinit\t{}\t{info}", session.router.ip_addr);
        let topic = self.resolve(TOPIC_ROUTER_EVENT, &GroupKey::default(), 0);
        self.publish_lines(topic, router_hash.as_bytes().to_vec(), vec![row]);
    }

    fn dispatch_termination(&mut self, session: &mut Session, term: &TerminationMessage) {
        let router_hash = session.router.hash_id;
        let reason_text = term
            .tlvs
            .iter()
            .map(|t| match t.reason() {
                Some(r) => format!("{r:?}"),
                None => t.info.clone(),
            })
            .collect::<Vec<_>>()
            .join(";");
        // A router-initiated Termination message always falls into the admin-close class
        // (§4.D); the RFC 7854 reason TLV decoded above travels separately as free text.
        let code = TermReasonCode::AdminClose.code();
        let row = format!("{router_hash}\tterm\t{}\t{code}\t{reason_text}", session.router.ip_addr);
        let topic = self.resolve(TOPIC_ROUTER_EVENT, &GroupKey::default(), 0);
        self.publish_lines(topic, router_hash.as_bytes().to_vec(), vec![row]);
    }
}

#[derive(Default)]
struct RouteRows {
    unicast: Vec<String>,
    l3vpn: Vec<String>,
    evpn: Vec<String>,
    ls_node: Vec<String>,
    ls_link: Vec<String>,
    ls_prefix: Vec<String>,
}

impl RouteRows {
    fn has_any(&self) -> bool {
        !self.unicast.is_empty()
            || !self.l3vpn.is_empty()
            || !self.evpn.is_empty()
            || !self.ls_node.is_empty()
            || !self.ls_link.is_empty()
            || !self.ls_prefix.is_empty()
    }
}

struct PathAttrOwned {
    as_path: String,
    next_hop: String,
    aggregator: String,
    origin: String,
    med: u32,
    local_pref: u32,
    communities: String,
    ext_communities: String,
}

fn extract_path_attrs(attrs: &Attributes) -> PathAttrOwned {
    let mut next_hop = String::new();
    let mut aggregator = String::new();
    let mut origin = String::new();
    let mut med = 0u32;
    let mut local_pref = 0u32;
    let mut communities = Vec::new();
    let mut ext_communities = Vec::new();

    for value in attrs {
        match value {
            AttributeValue::NextHop(ip) => next_hop = ip.to_string(),
            AttributeValue::Origin(o) => origin = o.to_string(),
            AttributeValue::MultiExitDiscriminator(m) => med = *m,
            AttributeValue::LocalPreference(p) => local_pref = *p,
            AttributeValue::Aggregator(asn, ip) => aggregator = format!("{}:{ip}", asn.to_u32()),
            AttributeValue::Communities(cs) => communities = cs.iter().map(|c| c.to_string()).collect(),
            AttributeValue::ExtendedCommunities(cs) => {
                ext_communities = cs.iter().map(|c| c.to_string()).collect()
            }
            _ => {}
        }
    }
    if next_hop.is_empty() {
        if let Some(nh) = attrs.get_reachable().and_then(|n| n.next_hop.as_ref()) {
            next_hop = nh.to_string();
        }
    }
    let as_path = attrs.as_path().map(|p| p.to_string()).unwrap_or_default();

    PathAttrOwned {
        as_path,
        next_hop,
        aggregator,
        origin,
        med,
        local_pref,
        communities: communities.join(","),
        ext_communities: ext_communities.join(","),
    }
}

fn path_attrs_row(hash: &HashId, peer_hash: &HashId, fields: &PathAttrOwned) -> String {
    format!(
        "{hash}\t{peer_hash}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        fields.as_path,
        fields.next_hop,
        fields.origin,
        fields.med,
        fields.local_pref,
        fields.aggregator,
        fields.communities,
        fields.ext_communities
    )
}

fn rib_row(
    prefix: &NetworkPrefix,
    peer_hash: &HashId,
    path_attrs_hash: &HashId,
    advertise: bool,
    labels: &[u32],
) -> String {
    let action = if advertise { "A" } else { "W" };
    let addr_bytes = prefix.encode_address_only();
    let prefix_len = prefix.prefix.prefix_len();
    let is_ipv4 = matches!(prefix.prefix, IpNet::V4(_));
    let labels_present = !labels.is_empty();
    let hash = hash_rib_entry(&addr_bytes, prefix_len, peer_hash, prefix.path_id, labels_present);
    let path_id = prefix.path_id.map(|p| p.to_string()).unwrap_or_default();
    let labels_str = labels.iter().map(|l| l.to_string()).collect::<Vec<_>>().join(",");
    format!(
        "{hash}\t{path_attrs_hash}\t{peer_hash}\t{action}\t{prefix}\t{prefix_len}\t{is_ipv4}\t{path_id}\t{labels_str}"
    )
}

fn vpn_row(
    rd: &str,
    prefix: &NetworkPrefix,
    labels: &[u32],
    peer_hash: &HashId,
    path_attrs_hash: &HashId,
    advertise: bool,
) -> String {
    let action = if advertise { "A" } else { "W" };
    let addr_bytes = prefix.encode_address_only();
    let prefix_len = prefix.prefix.prefix_len();
    let is_ipv4 = matches!(prefix.prefix, IpNet::V4(_));
    let labels_present = !labels.is_empty();
    let hash = hash_rib_entry(&addr_bytes, prefix_len, peer_hash, prefix.path_id, labels_present);
    let labels_str = labels.iter().map(|l| l.to_string()).collect::<Vec<_>>().join(",");
    format!("{hash}\t{path_attrs_hash}\t{peer_hash}\t{action}\t{rd}\t{prefix}\t{prefix_len}\t{is_ipv4}\t{labels_str}")
}

fn evpn_row(route: &EvpnRoute, peer_hash: &HashId, path_attrs_hash: &HashId, advertise: bool) -> String {
    let action = if advertise { "A" } else { "W" };
    // EVPN route types vary too widely in shape for a flat column layout; downstream
    // consumers pattern-match the Debug rendering of the per-type struct.
    format!("{peer_hash}\t{path_attrs_hash}\t{action}\t{route:?}")
}

fn collect_nlri_rows(
    nlri: &Nlri,
    peer_hash: &HashId,
    path_attrs_hash: &HashId,
    advertise: bool,
    rows: &mut RouteRows,
) {
    match &nlri.detail {
        NlriDetail::None => {
            for prefix in &nlri.prefixes {
                rows.unicast
                    .push(rib_row(prefix, peer_hash, path_attrs_hash, advertise, &[]));
            }
        }
        NlriDetail::Labeled(entries) => {
            for LabeledNlri { labels, prefix } in entries {
                rows.unicast
                    .push(rib_row(prefix, peer_hash, path_attrs_hash, advertise, labels));
            }
        }
        NlriDetail::Vpn(entries) => {
            for VpnNlri {
                route_distinguisher,
                labels,
                prefix,
            } in entries
            {
                rows.l3vpn.push(vpn_row(
                    route_distinguisher,
                    prefix,
                    labels,
                    peer_hash,
                    path_attrs_hash,
                    advertise,
                ));
            }
        }
        NlriDetail::Evpn(routes) => {
            for route in routes {
                rows.evpn.push(evpn_row(route, peer_hash, path_attrs_hash, advertise));
            }
        }
        NlriDetail::LinkState(entries) => {
            for entry in entries {
                collect_ls_rows(entry, peer_hash, rows);
            }
        }
    }
}

fn collect_ls_rows(nlri: &LinkStateNlri, peer_hash: &HashId, rows: &mut RouteRows) {
    let local_hash = ls_node_hash_and_row(&nlri.local_node_descriptors, peer_hash, &mut rows.ls_node);

    match nlri.nlri_type {
        NlriType::Node => {}
        NlriType::Link => {
            let (Some(remote_desc), Some(link_desc)) =
                (&nlri.remote_node_descriptors, &nlri.link_descriptors)
            else {
                return;
            };
            let remote_hash = ls_node_hash_and_row(remote_desc, peer_hash, &mut rows.ls_node);
            let (local_id, remote_id) = link_desc.link_local_remote_identifiers.unwrap_or((0, 0));
            let ipv4_if = link_desc.ipv4_interface_address.map(|a| a.to_string()).unwrap_or_default();
            let ipv4_nbr = link_desc.ipv4_neighbor_address.map(|a| a.to_string()).unwrap_or_default();
            let ipv6_if = link_desc.ipv6_interface_address.map(|a| a.to_string()).unwrap_or_default();
            let ipv6_nbr = link_desc.ipv6_neighbor_address.map(|a| a.to_string()).unwrap_or_default();
            let fields = LsLinkFields {
                local_node_hash: &local_hash,
                remote_node_hash: &remote_hash,
                link_local_id: local_id,
                link_remote_id: remote_id,
                ipv4_interface_addr: &ipv4_if,
                ipv4_neighbor_addr: &ipv4_nbr,
                ipv6_interface_addr: &ipv6_if,
                ipv6_neighbor_addr: &ipv6_nbr,
            };
            let link_hash = hash_ls_link(&fields, peer_hash);
            rows.ls_link.push(format!(
                "{link_hash}\t{peer_hash}\t{local_hash}\t{remote_hash}\t{local_id}\t{remote_id}\t{ipv4_if}\t{ipv4_nbr}\t{ipv6_if}\t{ipv6_nbr}"
            ));
        }
        NlriType::Ipv4TopologyPrefix | NlriType::Ipv6TopologyPrefix => {
            let Some(prefix_desc) = &nlri.prefix_descriptors else {
                return;
            };
            let Some(net_prefix) = &prefix_desc.ip_reachability_information else {
                return;
            };
            let mtid = prefix_desc.multi_topology_id.unwrap_or(0);
            let addr_bytes = net_prefix.encode_address_only();
            let prefix_len = net_prefix.prefix.prefix_len();
            let prefix_hash = hash_ls_prefix(&local_hash, &addr_bytes, prefix_len, mtid, peer_hash);
            rows.ls_prefix.push(format!(
                "{prefix_hash}\t{peer_hash}\t{local_hash}\t{net_prefix}\t{prefix_len}\t{mtid}"
            ));
        }
        NlriType::Reserved => {}
    }
}

/// Hashes one node's descriptors, appends its row to `rows` (idempotent: repeated
/// descriptors in the same update just repeat the same hash and row), and returns the hash
/// for the caller to reference from a link or prefix row.
fn ls_node_hash_and_row(desc: &NodeDescriptor, peer_hash: &HashId, rows: &mut Vec<String>) -> HashId {
    let igp_router_id = desc.igp_router_id_string().unwrap_or_default();
    let bgp_ls_id = desc.bgp_ls_identifier.unwrap_or(0);
    let asn = Asn::from(desc.autonomous_system.unwrap_or(0));
    let ospf_area = desc.ospf_area_id.map(|a| a.to_string()).unwrap_or_default();
    let hash = hash_ls_node(&igp_router_id, bgp_ls_id, asn, &ospf_area, peer_hash);
    rows.push(format!("{hash}\t{peer_hash}\t{igp_router_id}\t{bgp_ls_id}\t{asn}\t{ospf_area}"));
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::identity::hash_collector;
    use crate::publish::PublishError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPublisher {
        requests: Mutex<Vec<PublishRequest>>,
    }

    impl Publisher for RecordingPublisher {
        fn publish(&self, req: PublishRequest) -> Result<(), PublishError> {
            self.requests.lock().unwrap().push(req);
            Ok(())
        }
    }

    fn test_config() -> Config {
        serde_yaml::from_str(
            r#"
base:
  admin_id: "test-collector"
  listen_port: 1790
  listen_mode: v4
kafka:
  brokers: ["localhost:9092"]
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_raw_mirror_published_for_every_frame() {
        let publisher = Arc::new(RecordingPublisher::default());
        let config = Arc::new(test_config());
        let collector_hash = hash_collector("test-collector");
        let mut dispatcher = Dispatcher::new(
            config,
            publisher.clone(),
            collector_hash,
            None,
            GroupKey::default(),
        );
        let mut session = Session::new("10.0.0.1".parse().unwrap(), collector_hash);
        let raw = Bytes::from_static(&[3, 0, 0, 0, 6, 4]);
        let msg = BmpMessage {
            common_header: crate::parser::bmp::messages::BmpCommonHeader {
                version: 3,
                msg_len: 6,
                msg_type: crate::parser::bmp::messages::BmpMsgType::TerminationMessage,
            },
            per_peer_header: None,
            message_body: MessageBody::TerminationMessage(TerminationMessage { tlvs: vec![] }),
        };
        dispatcher.dispatch(&mut session, &msg, &raw);

        let requests = publisher.requests.lock().unwrap();
        assert!(requests.iter().any(|r| r.topic == "bmp_raw"));
        assert!(requests.iter().any(|r| r.topic == "router_event"));
    }

    #[test]
    fn test_path_attrs_and_rib_rows_reference_same_hash() {
        let mut rows = RouteRows::default();
        let peer_hash = hash_collector("peer");
        let path_attrs_hash = hash_collector("path-attrs-stand-in");
        let prefix: NetworkPrefix = "192.0.2.0/24".parse().unwrap();
        rows.unicast
            .push(rib_row(&prefix, &peer_hash, &path_attrs_hash, true, &[]));
        let row = &rows.unicast[0];
        assert!(row.contains(&path_attrs_hash.to_hex()));
        assert!(row.ends_with("\t\t"));
    }
}
