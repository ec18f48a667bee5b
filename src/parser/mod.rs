pub mod bgp;
pub mod bmp;
pub mod utils;

pub use crate::error::ParserError;
pub use utils::{
    bytes_to_prefix, decode_route_distinguisher, parse_nlri_list, read_mpls_label,
    read_route_distinguisher, ReadUtils,
};
