/*!
Per-router session state machine (§4.D): accept a BMP TCP connection, frame and dispatch its
messages, and track the router/peer state needed to stamp identities and choose topics.

Each session owns its socket, its decode buffer, and its peer cache exclusively; no mutable
state is shared across sessions.
*/
use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::BytesMut;
use log::{debug, warn};
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

use crate::identity::{hash_peer, hash_router, HashId};
use crate::models::Afi;
use crate::parser::bmp::error::ParserBmpError;
use crate::parser::bmp::messages::{BmpMsgType, BmpPerPeerHeader};
use crate::parser::bmp::parse_bmp_msg;
use crate::parser::utils::decode_route_distinguisher;

const MIN_READ_BUFFER: usize = 64 * 1024;

/// Lifecycle of a router session, per §4.D.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Accepted,
    Initialized,
    Running,
    Terminating,
    Closed,
}

/// Canonical termination reason codes (§4.D).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermReasonCode {
    AdminClose,
    CollectorLocalClose,
    Internal(u16),
}

impl TermReasonCode {
    pub fn code(&self) -> u16 {
        match self {
            TermReasonCode::AdminClose => 0,
            TermReasonCode::CollectorLocalClose => 65531,
            TermReasonCode::Internal(c) => *c,
        }
    }
}

/// A router known to this session: one per accepted TCP connection.
#[derive(Debug, Clone)]
pub struct Router {
    pub ip_addr: IpAddr,
    pub name: Option<String>,
    pub description: Option<String>,
    pub hash_id: HashId,
}

/// Lifecycle of a single peer within a router session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    Init,
    Up,
    Down,
}

/// A peer observed on this router's BMP session, keyed by (peer_rd, peer_addr).
#[derive(Debug, Clone)]
pub struct Peer {
    pub peer_addr: IpAddr,
    pub peer_rd: String,
    pub peer_bgp_id: Option<IpAddr>,
    pub peer_as: Option<crate::models::Asn>,
    pub state: PeerState,
    pub hash_id: HashId,
    /// Per (AFI,SAFI) Add-Path enablement, derived from the intersection of the sent and
    /// received OPEN capability exchanges (§4.B).
    pub add_path: HashMap<(Afi, crate::models::Safi), bool>,
}

/// Per-session, in-memory state. Owned exclusively by the task driving `run`.
pub struct Session {
    pub state: SessionState,
    pub router: Router,
    pub collector_hash: HashId,
    peers: HashMap<(String, IpAddr), Peer>,
}

impl Session {
    pub fn new(router_ip: IpAddr, collector_hash: HashId) -> Self {
        let router_hash = hash_router(router_ip, &collector_hash);
        Session {
            state: SessionState::Accepted,
            router: Router {
                ip_addr: router_ip,
                name: None,
                description: None,
                hash_id: router_hash,
            },
            collector_hash,
            peers: HashMap::new(),
        }
    }

    pub(crate) fn peer_entry(&mut self, peer_rd: &str, peer_addr: IpAddr) -> &mut Peer {
        let key = (peer_rd.to_string(), peer_addr);
        let router_hash = self.router.hash_id;
        self.peers.entry(key).or_insert_with(|| Peer {
            peer_addr,
            peer_rd: peer_rd.to_string(),
            peer_bgp_id: None,
            peer_as: None,
            state: PeerState::Init,
            hash_id: hash_peer(&router_hash, peer_rd, peer_addr),
            add_path: HashMap::new(),
        })
    }

    /// Looks up (creating if absent) the peer named by a per-peer header, refreshing its
    /// `peer_as`/`peer_bgp_id` from the header's own fields. Used by the dispatch layer
    /// before it can stamp any peer-scoped identity.
    pub(crate) fn peer_entry_for_header(&mut self, header: &BmpPerPeerHeader) -> &mut Peer {
        let peer_rd = decode_route_distinguisher(header.peer_distinguisher);
        let peer = self.peer_entry(&peer_rd, header.peer_ip);
        peer.peer_as = Some(header.peer_asn);
        peer.peer_bgp_id = Some(IpAddr::V4(header.peer_bgp_id));
        peer
    }

    /// Transitions the peer named by `header` to UP, creating it first if this router
    /// never sent Initiation or an earlier Route Monitoring message for it.
    pub(crate) fn mark_peer_up(&mut self, header: &BmpPerPeerHeader) -> HashId {
        let peer = self.peer_entry_for_header(header);
        peer.state = PeerState::Up;
        peer.hash_id
    }

    /// Transitions the peer named by `header` to DOWN. Returns `None` if the peer was
    /// never observed (a Peer Down with no preceding Up/Route Monitoring message).
    pub(crate) fn mark_peer_down(&mut self, header: &BmpPerPeerHeader) -> Option<Peer> {
        let peer_rd = decode_route_distinguisher(header.peer_distinguisher);
        let key = (peer_rd, header.peer_ip);
        let peer = self.peers.get_mut(&key)?;
        peer.state = PeerState::Down;
        Some(peer.clone())
    }

    /// Removes any peer not named in `still_present`, per §4.D ("peer hashes that disappear
    /// from the session's peer table are removed from the session's cache").
    pub fn prune_peers(&mut self, still_present: &[(String, IpAddr)]) {
        self.peers.retain(|key, _| still_present.contains(key));
    }

    pub fn peers(&self) -> impl Iterator<Item = &Peer> {
        self.peers.values()
    }
}

/// Reads length-framed BMP messages off `stream` until EOF or a fatal parse error, yielding
/// each parsed message to `on_message`. Runs the ACCEPTED→...→CLOSED state machine described
/// in §4.D; the caller supplies an event sink for router/peer lifecycle notifications.
pub async fn run<F>(
    mut stream: TcpStream,
    peer_ip: IpAddr,
    collector_hash: HashId,
    mut on_message: F,
) -> Result<(), ParserBmpError>
where
    F: FnMut(&crate::parser::bmp::messages::BmpMessage, &bytes::Bytes, &mut Session),
{
    let mut session = Session::new(peer_ip, collector_hash);
    let mut buf = BytesMut::with_capacity(MIN_READ_BUFFER);

    loop {
        // Frame by length (the BMP common header's own message-length field), never by
        // delimiter: keep reading until a full header, then a full body, is buffered.
        while buf.len() < 5 {
            if !fill(&mut stream, &mut buf).await? {
                return close(&mut session, TermReasonCode::Internal(65534));
            }
        }
        let declared_len = u32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]) as usize;
        while buf.len() < declared_len {
            if !fill(&mut stream, &mut buf).await? {
                return close(&mut session, TermReasonCode::Internal(65534));
            }
        }

        let raw_frame = buf.split_to(declared_len).freeze();
        let mut frame = raw_frame.clone();
        match parse_bmp_msg(&mut frame) {
            Ok(mut msg) => {
                // A zero per-peer timestamp means the router didn't stamp one; substitute
                // the collector's wall clock so downstream consumers always see a time.
                if let Some(header) = msg.per_peer_header.as_mut() {
                    if header.timestamp == 0.0 {
                        header.timestamp = wall_clock_seconds();
                    }
                }
                advance_state(&mut session, &msg);
                on_message(&msg, &raw_frame, &mut session);
                if matches!(msg.common_header.msg_type, BmpMsgType::TerminationMessage) {
                    return close(&mut session, TermReasonCode::AdminClose);
                }
            }
            Err(ParserBmpError::CorruptedBmpMessage) => {
                warn!("malformed BMP frame from {peer_ip}, closing session");
                return close(&mut session, TermReasonCode::Internal(65534));
            }
            Err(e) => {
                // A well-formed BMP frame carrying malformed BGP is non-fatal: the frame was
                // already consumed based on its own length, so the session continues.
                warn!("failed to decode BMP payload from {peer_ip}: {e}");
            }
        }
    }
}

fn advance_state(session: &mut Session, msg: &crate::parser::bmp::messages::BmpMessage) {
    use crate::parser::bmp::messages::MessageBody;
    match (session.state, &msg.message_body) {
        (SessionState::Accepted, MessageBody::InitiationMessage(_)) => {
            session.state = SessionState::Initialized;
        }
        (SessionState::Accepted, _) => {
            // Some implementations omit Initiation; the first peer message also advances us.
            session.state = SessionState::Initialized;
        }
        (SessionState::Initialized, _) => {
            session.state = SessionState::Running;
        }
        (SessionState::Running, MessageBody::TerminationMessage(_)) => {
            session.state = SessionState::Terminating;
        }
        _ => {}
    }
}

fn close(session: &mut Session, reason: TermReasonCode) -> Result<(), ParserBmpError> {
    session.state = SessionState::Closed;
    debug!(
        "session for router {} closed with reason {}",
        session.router.ip_addr,
        reason.code()
    );
    Ok(())
}

async fn fill(stream: &mut TcpStream, buf: &mut BytesMut) -> Result<bool, ParserBmpError> {
    let mut tmp = [0u8; 4096];
    let n = stream.read(&mut tmp).await.map_err(ParserBmpError::IoError)?;
    if n == 0 {
        return Ok(false);
    }
    buf.extend_from_slice(&tmp[..n]);
    Ok(true)
}

pub(crate) fn wall_clock_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_hash_stable_across_lookups() {
        let collector_hash = crate::identity::hash_collector("c1");
        let mut session = Session::new("10.0.0.1".parse().unwrap(), collector_hash);
        let ip: IpAddr = "192.0.2.1".parse().unwrap();
        let h1 = session.peer_entry("0:100:1", ip).hash_id;
        let h2 = session.peer_entry("0:100:1", ip).hash_id;
        assert_eq!(h1, h2);
    }
}
