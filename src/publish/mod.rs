/*!
Publication layer (§4.G): envelope framing, key partitioning, and a `Publisher` trait with
one production backend. This collapses the source's deep `DbInterface`/`msgBus_kafka`
inheritance into a single interface; the SQL backend referenced there is abandoned (§9).
*/
pub mod template;
pub mod topic;

use std::fmt::Write as _;

use log::warn;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::CompressionCodec;
use crate::identity::HashId;

pub const API_VERSION: &str = "1.7";

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("outbound queue closed")]
    QueueClosed,
    #[error("producer backend error: {0}")]
    Backend(String),
}

/// A publish request prepared by the session layer, ready for envelope framing.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub topic: String,
    pub key: Vec<u8>,
    pub payload: Vec<u8>,
    pub row_count: u32,
    pub collector_hash: HashId,
    /// Present only for the raw-BMP mirror topic (§6: envelope additionally carries
    /// `R_HASH:`/`R_IP:`).
    pub raw_router: Option<(HashId, String)>,
}

/// Prepends the text envelope described in §6 to `payload`.
pub fn frame_envelope(req: &PublishRequest) -> Vec<u8> {
    let mut header = String::new();
    let _ = writeln!(header, "V: {API_VERSION}");
    let _ = writeln!(header, "C_HASH_ID: {}", req.collector_hash);
    if let Some((router_hash, router_ip)) = &req.raw_router {
        let _ = writeln!(header, "R_HASH: {router_hash}");
        let _ = writeln!(header, "R_IP: {router_ip}");
    }
    let _ = writeln!(header, "L: {}", req.payload.len());
    let _ = writeln!(header, "R: {}", req.row_count);
    header.push('\n');

    let mut framed = header.into_bytes();
    framed.extend_from_slice(&req.payload);
    framed
}

/// `partition(K) == (K[0] + K[-1]) mod partition_count`. Must be preserved exactly for
/// consumer compatibility (§4.G, §8.6).
pub fn partition_for_key(key: &[u8], partition_count: u32) -> u32 {
    if key.is_empty() || partition_count == 0 {
        return 0;
    }
    let first = key[0] as u32;
    let last = key[key.len() - 1] as u32;
    (first + last) % partition_count
}

/// Collapses the source's concrete producer implementations (Kafka client, abandoned SQL
/// backend) into a single interface (§9). `publish` must not block the caller beyond the
/// bounded-queue back-pressure point described in §4.G.
pub trait Publisher: Send + Sync {
    fn publish(&self, req: PublishRequest) -> Result<(), PublishError>;
}

/// A bounded channel plus one writer task (§9 "concurrent producer" redesign): `publish`
/// blocks only when the queue is full, which is the intended back-pressure path to the
/// network input. Kept non-generic over backend so session code doesn't need to know
/// whether the eventual sink is Kafka or a test double.
#[derive(Clone)]
pub struct MpscPublisher {
    sender: mpsc::Sender<PublishRequest>,
}

impl MpscPublisher {
    pub fn new(queue_depth: usize) -> (Self, mpsc::Receiver<PublishRequest>) {
        let (sender, receiver) = mpsc::channel(queue_depth);
        (MpscPublisher { sender }, receiver)
    }
}

impl Publisher for MpscPublisher {
    fn publish(&self, req: PublishRequest) -> Result<(), PublishError> {
        self.sender.try_send(req).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                warn!("outbound publish queue full; back-pressuring caller");
                PublishError::Backend("queue full".to_string())
            }
            mpsc::error::TrySendError::Closed(_) => PublishError::QueueClosed,
        })
    }
}

pub(crate) fn compression_codec_name(codec: CompressionCodec) -> &'static str {
    match codec {
        CompressionCodec::None => "none",
        CompressionCodec::Snappy => "snappy",
        CompressionCodec::Gzip => "gzip",
    }
}

#[cfg(feature = "kafka-publisher")]
pub mod rdkafka_backend {
    //! The production `Publisher` backed by `rdkafka`'s async producer (§4.G.1). Feature-gated
    //! so the core decode/dispatch pipeline can build without linking librdkafka.
    use super::*;
    use rdkafka::config::ClientConfig;
    use rdkafka::producer::{FutureProducer, FutureRecord};
    use std::time::Duration;

    use crate::config::KafkaConfig;

    pub struct RdKafkaPublisher {
        producer: FutureProducer,
    }

    impl RdKafkaPublisher {
        pub fn new(config: &KafkaConfig) -> Result<Self, PublishError> {
            let producer: FutureProducer = ClientConfig::new()
                .set("bootstrap.servers", config.brokers.join(","))
                .set("message.max.bytes", config.message_max_bytes.to_string())
                .set("session.timeout.ms", config.session_timeout_ms.to_string())
                .set("socket.timeout.ms", config.socket_timeout_ms.to_string())
                .set(
                    "queue.buffering.max.messages",
                    config.queue_buffering_max_messages.to_string(),
                )
                .set(
                    "queue.buffering.max.ms",
                    config.queue_buffering_max_ms.to_string(),
                )
                .set(
                    "message.send.max.retries",
                    config.message_send_max_retries.to_string(),
                )
                .set("retry.backoff.ms", config.retry_backoff_ms.to_string())
                .set(
                    "compression.codec",
                    compression_codec_name(config.compression_codec),
                )
                .create()
                .map_err(|e| PublishError::Backend(e.to_string()))?;
            Ok(RdKafkaPublisher { producer })
        }

        /// Sends one already-framed record, fire-and-forget from the caller's perspective;
        /// delivery failures are logged by the event callback rather than propagated here.
        pub async fn send(&self, req: &PublishRequest) -> Result<(), PublishError> {
            let payload = frame_envelope(req);
            let record = FutureRecord::to(&req.topic).key(&req.key).payload(&payload);
            self.producer
                .send(record, Duration::from_secs(0))
                .await
                .map_err(|(e, _)| PublishError::Backend(e.to_string()))?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_matches_first_plus_last() {
        let key = b"abcdef";
        assert_eq!(
            partition_for_key(key, 4),
            ((b'a' as u32) + (b'f' as u32)) % 4
        );
    }

    #[test]
    fn test_envelope_length_matches_payload() {
        let req = PublishRequest {
            topic: "unicast_prefix".to_string(),
            key: b"k".to_vec(),
            payload: b"192.0.2.0/24\tigp\n".to_vec(),
            row_count: 1,
            collector_hash: crate::identity::hash_collector("c1"),
            raw_router: None,
        };
        let framed = frame_envelope(&req);
        let text = String::from_utf8(framed).unwrap();
        let l_line = text.lines().find(|l| l.starts_with("L: ")).unwrap();
        let declared: usize = l_line.trim_start_matches("L: ").parse().unwrap();
        assert_eq!(declared, req.payload.len());
    }

    #[test]
    fn test_raw_bmp_envelope_carries_router_fields() {
        let req = PublishRequest {
            topic: "bmp_raw".to_string(),
            key: b"k".to_vec(),
            payload: b"\x03\x00\x00\x00\x06\x04".to_vec(),
            row_count: 1,
            collector_hash: crate::identity::hash_collector("c1"),
            raw_router: Some((crate::identity::hash_collector("r1"), "10.0.0.1".to_string())),
        };
        let framed = frame_envelope(&req);
        let text = String::from_utf8_lossy(&framed).to_string();
        assert!(text.contains("R_HASH:"));
        assert!(text.contains("R_IP: 10.0.0.1"));
    }
}
