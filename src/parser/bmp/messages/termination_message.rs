use crate::parser::bmp::error::ParserBmpError;
use crate::parser::ReadUtils;
use bytes::{Buf, Bytes};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::convert::TryFrom;

#[derive(Debug)]
pub struct TerminationMessage {
    pub tlvs: Vec<TerminationTlv>,
}

#[derive(Debug)]
pub struct TerminationTlv {
    pub info_type: TerminationTlvType,
    pub info_len: u16,
    pub info: String,
}

///Type-Length-Value Type
///
/// For more, see: https://datatracker.ietf.org/doc/html/rfc1213
#[derive(Debug, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum TerminationTlvType {
    String = 0,
    Reason = 1,
}

/// Decoded values of the 2-byte Reason TLV (RFC 7854 §4.5).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TerminationReason {
    AdminClose,
    Unspecified,
    OutOfResources,
    Redundant,
    Unknown(u16),
}

impl From<u16> for TerminationReason {
    fn from(code: u16) -> Self {
        match code {
            0 => TerminationReason::AdminClose,
            1 => TerminationReason::Unspecified,
            2 => TerminationReason::OutOfResources,
            3 => TerminationReason::Redundant,
            other => TerminationReason::Unknown(other),
        }
    }
}

impl TerminationTlv {
    /// Decodes this TLV's reason code if it is a `Reason` TLV with a 2-byte body.
    pub fn reason(&self) -> Option<TerminationReason> {
        if !matches!(self.info_type, TerminationTlvType::Reason) {
            return None;
        }
        self.info.parse::<u16>().ok().map(TerminationReason::from)
    }
}

pub fn parse_termination_message(data: &mut Bytes) -> Result<TerminationMessage, ParserBmpError> {
    let mut tlvs = vec![];

    while data.remaining() > 4 {
        let info_type: TerminationTlvType = TerminationTlvType::try_from(data.read_u16()?)?;
        let info_len = data.read_u16()?;
        if data.remaining() < info_len as usize {
            // not enough bytes to read
            break;
        }
        let info = match info_type {
            TerminationTlvType::Reason if info_len == 2 => {
                data.read_u16()?.to_string()
            }
            _ => data.read_n_bytes_to_string(info_len as usize)?,
        };
        tlvs.push(TerminationTlv {
            info_type,
            info_len,
            info,
        })
    }

    Ok(TerminationMessage { tlvs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    #[test]
    fn test_reason_tlv_decodes_numeric_code() {
        let mut buffer = BytesMut::new();
        buffer.put_u16(TerminationTlvType::Reason.into());
        buffer.put_u16(2);
        buffer.put_u16(2); // out-of-resources
        let mut bytes = buffer.freeze();
        let msg = parse_termination_message(&mut bytes).unwrap();
        assert_eq!(msg.tlvs[0].reason(), Some(TerminationReason::OutOfResources));
    }
}
