//! Shared data types for BGP and BMP messages.

use std::fmt::{Display, Formatter};

pub mod bgp;
pub mod network;

pub use bgp::*;
pub use network::*;

/// Error produced when parsing a model type from its textual representation (e.g. a prefix
/// string). Distinct from [crate::error::ParserError], which covers wire-format parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BgpModelsError(pub String);

impl Display for BgpModelsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BgpModelsError {}

impl From<ipnet::AddrParseError> for BgpModelsError {
    fn from(e: ipnet::AddrParseError) -> Self {
        BgpModelsError(e.to_string())
    }
}
