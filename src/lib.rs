/*!
`bmpd` is a BGP Monitoring Protocol (RFC 7854) collector: it accepts long-lived TCP sessions
from routers, parses the embedded BGP OPEN/UPDATE/NOTIFICATION and BMP control messages, and
publishes a structured event stream onto a partitioned message bus.

This crate is the library half of the collector: message models, wire parsers, the per-session
state machine, and the publication layer. The `bmpd` binary (built with the `cli` feature) wires
these together into a running daemon.

# Parsing a single BMP message

```no_run
use bytes::Bytes;
use bmp_collector::parser::bmp::parse_bmp_msg;

fn handle_frame(mut frame: Bytes) {
    match parse_bmp_msg(&mut frame) {
        Ok(msg) => println!("{:?}", msg.common_header.msg_type),
        Err(e) => eprintln!("failed to parse BMP message: {e}"),
    }
}
```

# RFCs Support

## BGP

- [X] [RFC 2858](https://datatracker.ietf.org/doc/html/rfc2858): Multiprotocol Extensions for BGP-4
- [X] [RFC 2918](https://datatracker.ietf.org/doc/html/rfc2918): Route Refresh Capability for BGP-4
- [X] [RFC 3392](https://datatracker.ietf.org/doc/html/rfc3392): Capabilities Advertisement with BGP-4
- [X] [RFC 4271](https://datatracker.ietf.org/doc/html/rfc4271): A Border Gateway Protocol 4 (BGP-4)
- [X] [RFC 4360](https://datatracker.ietf.org/doc/html/rfc4360): BGP Extended Communities Attribute
- [X] [RFC 4724](https://datatracker.ietf.org/doc/html/rfc4724): Graceful Restart Mechanism for BGP
- [X] [RFC 4760](https://datatracker.ietf.org/doc/html/rfc4760): Multiprotocol Extensions for BGP-4
- [X] [RFC 6793](https://datatracker.ietf.org/doc/html/rfc6793): BGP Support for Four-Octet AS Number Space
- [X] [RFC 7606](https://datatracker.ietf.org/doc/html/rfc7606): Revised Error Handling for BGP UPDATE Messages
- [X] [RFC 7911](https://datatracker.ietf.org/doc/html/rfc7911): Advertisement of Multiple Paths in BGP (ADD-PATH)
- [X] [RFC 7432](https://datatracker.ietf.org/doc/html/rfc7432): BGP MPLS-Based Ethernet VPN
- [X] [RFC 8092](https://datatracker.ietf.org/doc/html/rfc8092): BGP Large Communities
- [X] [RFC 8277](https://datatracker.ietf.org/doc/html/rfc8277): Using BGP to Bind MPLS Labels to Address Prefixes
- [X] [RFC 9234](https://datatracker.ietf.org/doc/html/rfc9234): Route Leak Prevention and Detection Using Roles

## BMP

- [X] [RFC 7854](https://datatracker.ietf.org/doc/html/rfc7854): BGP Monitoring Protocol (BMP)
- [X] [RFC 8671](https://datatracker.ietf.org/doc/html/rfc8671): Support for Adj-RIB-Out in BMP
- [X] [RFC 9069](https://datatracker.ietf.org/doc/html/rfc9069): Support for Local RIB in BMP

## Link-State

- [X] [RFC 7752](https://datatracker.ietf.org/doc/html/rfc7752): North-Bound Distribution of Link-State and TE Information Using BGP
*/

#![doc(
    html_logo_url = "https://raw.githubusercontent.com/bgpkit/assets/main/logos/icon-transparent.png",
    html_favicon_url = "https://raw.githubusercontent.com/bgpkit/assets/main/logos/favicon.ico"
)]

pub mod config;
pub mod dispatch;
pub mod dns;
pub mod error;
pub mod identity;
pub mod models;
#[cfg(feature = "parser")]
pub mod parser;
pub mod publish;
pub mod session;

pub use error::ParserError;
