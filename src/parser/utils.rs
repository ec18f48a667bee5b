/*!
Bounds-checked byte-cursor helpers shared by the BGP and BMP parsers.
*/
use crate::error::ParserError;
use crate::models::*;
use bytes::{Buf, Bytes};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Bounds-checked reads over a [Buf]-backed cursor.
///
/// Every BMP/BGP wire parser in this crate reads through this trait rather than calling
/// `bytes::Buf` methods directly, so a short/truncated frame turns into a [ParserError]
/// instead of a panic.
pub trait ReadUtils: Buf {
    fn has_n_remaining(&self, n: usize) -> Result<(), ParserError> {
        if self.remaining() < n {
            return Err(ParserError::TruncatedMsg(format!(
                "need {} bytes, {} remaining",
                n,
                self.remaining()
            )));
        }
        Ok(())
    }

    fn read_u8(&mut self) -> Result<u8, ParserError> {
        self.has_n_remaining(1)?;
        Ok(self.get_u8())
    }

    fn read_u16(&mut self) -> Result<u16, ParserError> {
        self.has_n_remaining(2)?;
        Ok(self.get_u16())
    }

    fn read_u32(&mut self) -> Result<u32, ParserError> {
        self.has_n_remaining(4)?;
        Ok(self.get_u32())
    }

    fn read_u64(&mut self) -> Result<u64, ParserError> {
        self.has_n_remaining(8)?;
        Ok(self.get_u64())
    }

    fn read_u128(&mut self) -> Result<u128, ParserError> {
        self.has_n_remaining(16)?;
        Ok(self.get_u128())
    }

    fn read_ipv4_address(&mut self) -> Result<Ipv4Addr, ParserError> {
        self.has_n_remaining(4)?;
        Ok(Ipv4Addr::from(self.get_u32()))
    }

    fn read_ipv6_address(&mut self) -> Result<Ipv6Addr, ParserError> {
        self.has_n_remaining(16)?;
        Ok(Ipv6Addr::from(self.get_u128()))
    }

    fn read_afi(&mut self) -> Result<Afi, ParserError> {
        let val = self.read_u16()?;
        Afi::try_from(val).map_err(|_| ParserError::ParseError(format!("unknown AFI {val}")))
    }

    fn read_safi(&mut self) -> Result<Safi, ParserError> {
        let val = self.read_u8()?;
        Safi::try_from(val).map_err(|_| ParserError::ParseError(format!("unknown SAFI {val}")))
    }

    fn read_n_bytes(&mut self, n: usize) -> Result<Vec<u8>, ParserError> {
        self.has_n_remaining(n)?;
        let mut buf = vec![0u8; n];
        self.copy_to_slice(&mut buf);
        Ok(buf)
    }

    fn read_n_bytes_to_string(&mut self, n: usize) -> Result<String, ParserError> {
        let bytes = self.read_n_bytes(n)?;
        Ok(String::from_utf8_lossy(&bytes)
            .trim_end_matches('\0')
            .to_string())
    }
}

impl ReadUtils for Bytes {}
impl ReadUtils for &[u8] {}

/// Parses an NLRI prefix list per RFC 4760 §5, honoring Add-Path (RFC 7911).
///
/// `afi` governs address length for the plain unicast/multicast case. SAFI-specific prefix
/// shapes (labels, route distinguishers) are handled by the caller before reaching here; see
/// `parser::bgp::attributes::attr_14_15_nlri::parse_nlri`.
pub fn parse_nlri_list(
    mut data: Bytes,
    add_path: bool,
    afi: &Afi,
) -> Result<Vec<NetworkPrefix>, ParserError> {
    let mut prefixes = vec![];
    while data.remaining() > 0 {
        let path_id = if add_path {
            Some(data.read_u32()?)
        } else {
            None
        };

        let bit_len = data.read_u8()?;
        let byte_len = (bit_len as usize).div_ceil(8);
        data.has_n_remaining(byte_len)?;
        let addr_bytes = data.read_n_bytes(byte_len)?;

        let prefix = bytes_to_prefix(*afi, bit_len, addr_bytes)?;
        prefixes.push(NetworkPrefix::new(prefix, path_id));
    }
    Ok(prefixes)
}

/// Builds an [ipnet::IpNet] out of a prefix length in bits and its (possibly short) address
/// bytes, zero-padding up to the AFI's full address width.
pub fn bytes_to_prefix(
    afi: Afi,
    bit_len: u8,
    mut addr_bytes: Vec<u8>,
) -> Result<ipnet::IpNet, ParserError> {
    match afi {
        Afi::Ipv4 => {
            if bit_len > 32 {
                return Err(ParserError::ParseError(format!(
                    "invalid IPv4 prefix length {bit_len}"
                )));
            }
            addr_bytes.resize(4, 0);
            let addr = Ipv4Addr::new(addr_bytes[0], addr_bytes[1], addr_bytes[2], addr_bytes[3]);
            Ok(ipnet::IpNet::V4(
                ipnet::Ipv4Net::new(addr, bit_len)
                    .map_err(|e| ParserError::ParseError(e.to_string()))?,
            ))
        }
        Afi::Ipv6 => {
            if bit_len > 128 {
                return Err(ParserError::ParseError(format!(
                    "invalid IPv6 prefix length {bit_len}"
                )));
            }
            addr_bytes.resize(16, 0);
            let mut octets = [0u8; 16];
            octets.copy_from_slice(&addr_bytes[0..16]);
            let addr = Ipv6Addr::from(octets);
            Ok(ipnet::IpNet::V6(
                ipnet::Ipv6Net::new(addr, bit_len)
                    .map_err(|e| ParserError::ParseError(e.to_string()))?,
            ))
        }
        other => Err(ParserError::ParseError(format!(
            "cannot build a plain IP prefix for AFI {other:?}"
        ))),
    }
}

/// Reads a 3-byte MPLS label stack entry (RFC 3107 / RFC 8277): 20-bit label, 3 bits reserved,
/// 1 bottom-of-stack bit. `0x800000` is the explicit "withdraw" pseudo-label (RFC 3107 §3).
pub fn read_mpls_label(data: &mut Bytes) -> Result<(u32, bool), ParserError> {
    data.has_n_remaining(3)?;
    let b = data.read_n_bytes(3)?;
    let raw = ((b[0] as u32) << 16) | ((b[1] as u32) << 8) | (b[2] as u32);
    let label = raw >> 4;
    let bottom_of_stack = raw & 0x1 != 0;
    Ok((label, bottom_of_stack))
}

/// Decodes an 8-byte Route Distinguisher (RFC 4364 §4.2) into its display form.
pub fn decode_route_distinguisher(raw: u64) -> String {
    let bytes = raw.to_be_bytes();
    let rd_type = u16::from_be_bytes([bytes[0], bytes[1]]);
    match rd_type {
        0 => {
            let admin = u16::from_be_bytes([bytes[2], bytes[3]]);
            let assigned = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
            format!("{admin}:{assigned}")
        }
        1 => {
            let admin = Ipv4Addr::new(bytes[2], bytes[3], bytes[4], bytes[5]);
            let assigned = u16::from_be_bytes([bytes[6], bytes[7]]);
            format!("{admin}:{assigned}")
        }
        2 => {
            let admin = u32::from_be_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]);
            let assigned = u16::from_be_bytes([bytes[6], bytes[7]]);
            format!("{admin}:{assigned}")
        }
        _ => format!("{raw:016x}"),
    }
}

/// Reads an 8-byte Route Distinguisher straight off the wire and decodes it.
pub fn read_route_distinguisher(data: &mut Bytes) -> Result<String, ParserError> {
    Ok(decode_route_distinguisher(data.read_u64()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nlri_list_simple() {
        let data = Bytes::from(vec![0x18, 0xC0, 0x00, 0x02]);
        let prefixes = parse_nlri_list(data, false, &Afi::Ipv4).unwrap();
        assert_eq!(prefixes.len(), 1);
        assert_eq!(prefixes[0].path_id, None);
    }

    #[test]
    fn test_parse_nlri_list_add_path() {
        let data = Bytes::from(vec![0, 0, 0, 7, 0x18, 0xC0, 0x00, 0x02]);
        let prefixes = parse_nlri_list(data, true, &Afi::Ipv4).unwrap();
        assert_eq!(prefixes.len(), 1);
        assert_eq!(prefixes[0].path_id, Some(7));
    }

    #[test]
    fn test_read_mpls_label_withdraw() {
        let mut data = Bytes::from(vec![0x80, 0x00, 0x01]);
        let (label, bos) = read_mpls_label(&mut data).unwrap();
        assert_eq!(label, 0x800000 >> 4);
        assert!(bos);
    }

    #[test]
    fn test_rd_type0_decodes_as_asn_colon_number() {
        let raw = (0u64 << 48) | (100u64 << 32) | 200u64;
        assert_eq!(decode_route_distinguisher(raw), "100:200");
    }

    #[test]
    fn test_rd_type1_decodes_as_ipv4_colon_number() {
        let raw =
            (1u64 << 48) | (10u64 << 40) | (0u64 << 32) | (0u64 << 24) | (1u64 << 16) | 42u64;
        assert_eq!(decode_route_distinguisher(raw), "10.0.0.1:42");
    }
}
