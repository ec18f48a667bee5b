/*!
YAML configuration loading.

The loader is a thin `serde_yaml` deserialization pass followed by an explicit validation
pass: range and cross-field checks that `serde` itself cannot express are run afterward so
that the first failure is reported with a dotted field path, not a generic parse error.
*/
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("{field}: {message}")]
    Invalid { field: String, message: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub base: BaseConfig,
    #[serde(default)]
    pub debug: DebugConfig,
    pub kafka: KafkaConfig,
    #[serde(default)]
    pub mapping: MappingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BaseConfig {
    /// Either a literal admin id, or the string `hostname`, resolved to the local hostname at load.
    pub admin_id: String,
    pub listen_port: u16,
    pub listen_mode: ListenMode,
    #[serde(default = "default_router_buffer_mib")]
    pub buffers_router_mib: u32,
    #[serde(default = "default_heartbeat_minutes")]
    pub heartbeat_interval_minutes: u32,
}

fn default_router_buffer_mib() -> u32 {
    2
}

fn default_heartbeat_minutes() -> u32 {
    5
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenMode {
    V4,
    V6,
    V4v6,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DebugConfig {
    #[serde(default)]
    pub general: bool,
    #[serde(default)]
    pub bmp: bool,
    #[serde(default)]
    pub bgp: bool,
    #[serde(default)]
    pub msgbus: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionCodec {
    None,
    Snappy,
    Gzip,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KafkaConfig {
    pub brokers: Vec<String>,
    #[serde(rename = "message.max.bytes", default = "default_message_max_bytes")]
    pub message_max_bytes: u32,
    #[serde(
        rename = "receive.message.max.bytes",
        default = "default_message_max_bytes"
    )]
    pub receive_message_max_bytes: u32,
    #[serde(rename = "session.timeout.ms", default = "default_session_timeout_ms")]
    pub session_timeout_ms: u32,
    #[serde(rename = "socket.timeout.ms", default = "default_socket_timeout_ms")]
    pub socket_timeout_ms: u32,
    #[serde(
        rename = "queue.buffering.max.messages",
        default = "default_queue_max_messages"
    )]
    pub queue_buffering_max_messages: u32,
    #[serde(rename = "queue.buffering.max.ms", default = "default_queue_max_ms")]
    pub queue_buffering_max_ms: u32,
    #[serde(rename = "message.send.max.retries", default)]
    pub message_send_max_retries: u32,
    #[serde(rename = "retry.backoff.ms", default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u32,
    #[serde(rename = "compression.codec", default = "default_compression")]
    pub compression_codec: CompressionCodec,
    #[serde(rename = "topics", default)]
    pub topics: TopicsConfig,
}

fn default_message_max_bytes() -> u32 {
    1_000_000
}
fn default_session_timeout_ms() -> u32 {
    30_000
}
fn default_socket_timeout_ms() -> u32 {
    60_000
}
fn default_queue_max_messages() -> u32 {
    100_000
}
fn default_queue_max_ms() -> u32 {
    1_000
}
fn default_retry_backoff_ms() -> u32 {
    100
}
fn default_compression() -> CompressionCodec {
    CompressionCodec::None
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopicsConfig {
    #[serde(default, rename = "variables")]
    pub variables: std::collections::BTreeMap<String, String>,
    #[serde(default, rename = "names")]
    pub names: std::collections::BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MappingConfig {
    #[serde(default)]
    pub groups: GroupsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupsConfig {
    #[serde(default, rename = "router_group")]
    pub router_groups: Vec<RouterGroup>,
    #[serde(default, rename = "peer_group")]
    pub peer_groups: Vec<PeerGroup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouterGroup {
    pub name: String,
    #[serde(default)]
    pub regexp_hostname: Vec<String>,
    #[serde(default)]
    pub prefix_range: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PeerGroup {
    pub name: String,
    #[serde(default)]
    pub regexp_hostname: Vec<String>,
    #[serde(default)]
    pub prefix_range: Vec<String>,
    #[serde(default)]
    pub asn: Vec<u32>,
}

const RESERVED_TOPIC_VARS: [&str; 2] = ["router_group", "peer_group"];

impl Config {
    /// Load and validate a config from a YAML file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = serde_yaml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        invalid_unless(
            "base.listen_port",
            (25..=65535).contains(&self.base.listen_port),
            format!("{} is out of range 25..=65535", self.base.listen_port),
        )?;
        invalid_unless(
            "base.buffers.router",
            (2..=384).contains(&self.base.buffers_router_mib),
            format!("{} MiB is out of range 2..=384", self.base.buffers_router_mib),
        )?;
        invalid_unless(
            "base.heartbeat.interval",
            (1..=1440).contains(&self.base.heartbeat_interval_minutes),
            format!(
                "{} is out of range 1..=1440 minutes",
                self.base.heartbeat_interval_minutes
            ),
        )?;
        invalid_unless(
            "kafka.brokers",
            !self.kafka.brokers.is_empty(),
            "at least one broker is required".to_string(),
        )?;
        invalid_unless(
            "kafka.message.max.bytes",
            (1_000..=1_000_000_000).contains(&self.kafka.message_max_bytes),
            format!("{} is out of range", self.kafka.message_max_bytes),
        )?;
        invalid_unless(
            "kafka.session.timeout.ms",
            (1..=3_600_000).contains(&self.kafka.session_timeout_ms),
            format!("{} is out of range", self.kafka.session_timeout_ms),
        )?;
        invalid_unless(
            "kafka.socket.timeout.ms",
            (10..=300_000).contains(&self.kafka.socket_timeout_ms),
            format!("{} is out of range", self.kafka.socket_timeout_ms),
        )?;
        invalid_unless(
            "kafka.queue.buffering.max.messages",
            (1..=10_000_000).contains(&self.kafka.queue_buffering_max_messages),
            format!("{} is out of range", self.kafka.queue_buffering_max_messages),
        )?;
        invalid_unless(
            "kafka.queue.buffering.max.ms",
            (1..=900_000).contains(&self.kafka.queue_buffering_max_ms),
            format!("{} is out of range", self.kafka.queue_buffering_max_ms),
        )?;
        invalid_unless(
            "kafka.retry.backoff.ms",
            (1..=300_000).contains(&self.kafka.retry_backoff_ms),
            format!("{} is out of range", self.kafka.retry_backoff_ms),
        )?;

        for name in self.kafka.topics.variables.keys() {
            invalid_unless(
                "kafka.topics.variables",
                !RESERVED_TOPIC_VARS.contains(&name.as_str()),
                format!("'{name}' is reserved and cannot be used as a topic variable"),
            )?;
        }
        for key in self.kafka.topics.names.keys() {
            invalid_unless(
                "kafka.topics.names",
                !key.is_empty(),
                "topic name key must not be empty".to_string(),
            )?;
        }

        for group in &self.mapping.groups.router_groups {
            for pattern in &group.regexp_hostname {
                invalid_unless(
                    "mapping.groups.router_group[].regexp_hostname",
                    regex::Regex::new(pattern).is_ok(),
                    format!("invalid regex '{pattern}' in group '{}'", group.name),
                )?;
            }
            for range in &group.prefix_range {
                invalid_unless(
                    "mapping.groups.router_group[].prefix_range",
                    range.parse::<ipnet::IpNet>().is_ok(),
                    format!("invalid CIDR '{range}' in group '{}'", group.name),
                )?;
            }
        }
        for group in &self.mapping.groups.peer_groups {
            for pattern in &group.regexp_hostname {
                invalid_unless(
                    "mapping.groups.peer_group[].regexp_hostname",
                    regex::Regex::new(pattern).is_ok(),
                    format!("invalid regex '{pattern}' in group '{}'", group.name),
                )?;
            }
            for range in &group.prefix_range {
                invalid_unless(
                    "mapping.groups.peer_group[].prefix_range",
                    range.parse::<ipnet::IpNet>().is_ok(),
                    format!("invalid CIDR '{range}' in group '{}'", group.name),
                )?;
            }
        }

        Ok(())
    }

    /// Resolves `base.admin_id`, substituting the local hostname when the literal value
    /// `hostname` is configured.
    pub fn resolved_admin_id(&self) -> String {
        if self.base.admin_id == "hostname" {
            hostname_or_unknown()
        } else {
            self.base.admin_id.clone()
        }
    }
}

fn hostname_or_unknown() -> String {
    hostname::get()
        .ok()
        .and_then(|s| s.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
}

fn invalid_unless(field: &str, ok: bool, message: String) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field: field.to_string(),
            message,
        })
    }
}

impl Display for ListenMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenMode::V4 => write!(f, "v4"),
            ListenMode::V6 => write!(f, "v6"),
            ListenMode::V4v6 => write!(f, "v4v6"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
base:
  admin_id: collector-1
  listen_port: 5000
  listen_mode: v4v6
kafka:
  brokers:
    - "127.0.0.1:9092"
  topics:
    variables:
      region: us-east
    names:
      unicast_prefix: "unicast_prefix_{router_group}_{peer_group}"
mapping:
  groups:
    router_group:
      - name: core
        regexp_hostname: ["^rtr.*"]
        prefix_range: ["10.0.0.0/8"]
"#
    }

    #[test]
    fn test_parses_and_validates() {
        let config: Config = serde_yaml::from_str(sample_yaml()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.resolved_admin_id(), "collector-1");
        assert_eq!(config.kafka.compression_codec, CompressionCodec::None);
        assert_eq!(config.base.buffers_router_mib, 2);
    }

    #[test]
    fn test_rejects_reserved_topic_variable() {
        let mut config: Config = serde_yaml::from_str(sample_yaml()).unwrap();
        config
            .kafka
            .topics
            .variables
            .insert("router_group".to_string(), "x".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_port() {
        let mut config: Config = serde_yaml::from_str(sample_yaml()).unwrap();
        config.base.listen_port = 10;
        assert!(config.validate().is_err());
    }
}
