/*!
Router-group / peer-group matching and topic-name template resolution (§4.F).
*/
use std::collections::HashMap;
use std::net::IpAddr;

use ipnet::IpNet;
use regex::RegexBuilder;

use crate::config::{Config, PeerGroup, RouterGroup};
use crate::identity::HashId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GroupKey(pub String);

impl GroupKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn compiled_regex(pattern: &str) -> Option<regex::Regex> {
    RegexBuilder::new(pattern).case_insensitive(true).build().ok()
}

fn matches_hostname(patterns: &[String], hostname: Option<&str>) -> bool {
    let Some(hostname) = hostname else { return false };
    patterns
        .iter()
        .filter_map(|p| compiled_regex(p))
        .any(|re| re.is_match(hostname))
}

fn matches_prefix(ranges: &[String], addr: IpAddr) -> bool {
    ranges
        .iter()
        .filter_map(|r| r.parse::<IpNet>().ok())
        .any(|net| net.contains(&addr))
}

/// Resolves the router-group for a session: hostname regex first, then prefix range.
/// The first match wins; no match yields an empty group.
pub fn match_router_group(groups: &[RouterGroup], hostname: Option<&str>, addr: IpAddr) -> GroupKey {
    for group in groups {
        if matches_hostname(&group.regexp_hostname, hostname) {
            return GroupKey(group.name.clone());
        }
    }
    for group in groups {
        if matches_prefix(&group.prefix_range, addr) {
            return GroupKey(group.name.clone());
        }
    }
    GroupKey::default()
}

/// Resolves the peer-group for one peer: hostname regex, then prefix range, then ASN list.
pub fn match_peer_group(
    groups: &[PeerGroup],
    hostname: Option<&str>,
    addr: IpAddr,
    asn: u32,
) -> GroupKey {
    for group in groups {
        if matches_hostname(&group.regexp_hostname, hostname) {
            return GroupKey(group.name.clone());
        }
    }
    for group in groups {
        if matches_prefix(&group.prefix_range, addr) {
            return GroupKey(group.name.clone());
        }
    }
    for group in groups {
        if group.asn.contains(&asn) {
            return GroupKey(group.name.clone());
        }
    }
    GroupKey::default()
}

/// Caches a session's router-group (computed once) and its peers' groups (computed per peer
/// hash, per §4.F: "peer-group is evaluated per peer and cached keyed by peer hash").
#[derive(Debug, Default)]
pub struct GroupCache {
    pub router_group: GroupKey,
    peer_groups: HashMap<HashId, GroupKey>,
}

impl GroupCache {
    pub fn new(router_group: GroupKey) -> Self {
        GroupCache {
            router_group,
            peer_groups: HashMap::new(),
        }
    }

    pub fn peer_group_or_insert(
        &mut self,
        peer_hash: HashId,
        groups: &[PeerGroup],
        hostname: Option<&str>,
        addr: IpAddr,
        asn: u32,
    ) -> GroupKey {
        self.peer_groups
            .entry(peer_hash)
            .or_insert_with(|| match_peer_group(groups, hostname, addr, asn))
            .clone()
    }
}

/// Resolves a configured topic name for `topic_var`, substituting `{router_group}`,
/// `{peer_group}`, and `{peer_asn}` placeholders, and reading user-defined `topic_vars_map`
/// variables.
pub fn resolve_topic_name(
    config: &Config,
    topic_var: &str,
    router_group: &GroupKey,
    peer_group: &GroupKey,
    peer_asn: u32,
) -> Option<String> {
    let template = config.kafka.topics.names.get(topic_var)?;
    let mut resolved = template.clone();
    resolved = resolved.replace("{router_group}", router_group.as_str());
    resolved = resolved.replace("{peer_group}", peer_group.as_str());
    resolved = resolved.replace("{peer_asn}", &peer_asn.to_string());
    for (name, value) in &config.kafka.topics.variables {
        resolved = resolved.replace(&format!("{{{name}}}"), value);
    }
    Some(resolved)
}

/// Builds the topic-map key `<var>_<router_group>_<peer_group>[_<peer_asn>]` (§8.7): the
/// `peer_asn` suffix is included iff the literal `{peer_asn}` placeholder appears in the
/// configured template for `topic_var` (§9, open question (b)).
pub fn topic_map_key(
    config: &Config,
    topic_var: &str,
    router_group: &GroupKey,
    peer_group: &GroupKey,
    peer_asn: u32,
) -> String {
    let include_asn = config
        .kafka
        .topics
        .names
        .get(topic_var)
        .map(|t| t.contains("{peer_asn}"))
        .unwrap_or(false);
    if include_asn {
        format!(
            "{topic_var}_{}_{}_{peer_asn}",
            router_group.as_str(),
            peer_group.as_str()
        )
    } else {
        format!("{topic_var}_{}_{}", router_group.as_str(), peer_group.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_router_groups() -> Vec<RouterGroup> {
        vec![RouterGroup {
            name: "core".to_string(),
            regexp_hostname: vec!["^rtr.*".to_string()],
            prefix_range: vec!["10.0.0.0/8".to_string()],
        }]
    }

    #[test]
    fn test_hostname_match_wins_over_prefix() {
        let groups = sample_router_groups();
        let key = match_router_group(&groups, Some("rtr1.example.net"), "192.0.2.1".parse().unwrap());
        assert_eq!(key.as_str(), "core");
    }

    #[test]
    fn test_prefix_match_when_hostname_absent() {
        let groups = sample_router_groups();
        let key = match_router_group(&groups, None, "10.1.1.1".parse().unwrap());
        assert_eq!(key.as_str(), "core");
    }

    #[test]
    fn test_no_match_is_empty() {
        let groups = sample_router_groups();
        let key = match_router_group(&groups, Some("other.example.net"), "172.16.0.1".parse().unwrap());
        assert_eq!(key.as_str(), "");
    }
}
