use crate::parser::bmp::error::ParserBmpError;
use crate::parser::ReadUtils;
use bytes::Bytes;

#[derive(Debug)]
pub struct StatsReport {
    pub stats_count: u32,
    pub counters: Vec<StatCounter>,
}

#[derive(Debug)]
pub struct StatCounter {
    pub stat_type: u16,
    pub stat_len: u16,
    pub stat_data: StatsData,
}

/// Named stat types from RFC 7854 §4.8 / RFC 8671. Unrecognized type codes still parse; they
/// just render as a bare number downstream instead of a name.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StatType {
    RejectedPrefixes,
    DuplicatePrefixAdvertisements,
    DuplicateWithdraws,
    InvalidUpdateDueToClusterListLoop,
    InvalidUpdateDueToAsPathLoop,
    InvalidUpdateDueToOriginatorId,
    InvalidUpdateDueToAsConfed,
    AdjRibInRoutes,
    LocRibRoutes,
    AdjRibInRoutesPerAfiSafi,
    LocRibRoutesPerAfiSafi,
    UpdatesTreatedAsWithdraw,
    PrefixesTreatedAsWithdraw,
    DuplicateUpdates,
    AddressPrefixesOutstandingMarkedStale,
    NumberOfUpdatesSubjectToTreatAsWithdraw,
    NumberOfPrefixesSubjectToTreatAsWithdraw,
    NumberOfDuplicateUpdateMessagesReceived,
    Unknown(u16),
}

impl From<u16> for StatType {
    fn from(code: u16) -> Self {
        match code {
            0 => StatType::RejectedPrefixes,
            1 => StatType::DuplicatePrefixAdvertisements,
            2 => StatType::DuplicateWithdraws,
            3 => StatType::InvalidUpdateDueToClusterListLoop,
            4 => StatType::InvalidUpdateDueToAsPathLoop,
            5 => StatType::InvalidUpdateDueToOriginatorId,
            6 => StatType::InvalidUpdateDueToAsConfed,
            7 => StatType::AdjRibInRoutes,
            8 => StatType::LocRibRoutes,
            9 => StatType::AdjRibInRoutesPerAfiSafi,
            10 => StatType::LocRibRoutesPerAfiSafi,
            11 => StatType::UpdatesTreatedAsWithdraw,
            12 => StatType::PrefixesTreatedAsWithdraw,
            13 => StatType::DuplicateUpdates,
            14 => StatType::AddressPrefixesOutstandingMarkedStale,
            15 => StatType::NumberOfUpdatesSubjectToTreatAsWithdraw,
            16 => StatType::NumberOfPrefixesSubjectToTreatAsWithdraw,
            17 => StatType::NumberOfDuplicateUpdateMessagesReceived,
            other => StatType::Unknown(other),
        }
    }
}

impl StatCounter {
    pub fn named_type(&self) -> StatType {
        StatType::from(self.stat_type)
    }
}

#[derive(Debug)]
pub enum StatsData {
    Counter(u32),
    Gauge(u64),
}

pub fn parse_stats_report(data: &mut Bytes) -> Result<StatsReport, ParserBmpError> {
    let stats_count = data.read_u32()?;
    let mut counters = vec![];
    for _ in 0..stats_count {
        let stat_type = data.read_u16()?;
        let stat_len = data.read_u16()?;
        let stat_data = match stat_len {
            4 => StatsData::Counter(data.read_u32()?),
            8 => StatsData::Gauge(data.read_u64()?),
            _ => return Err(ParserBmpError::CorruptedBmpMessage),
        };
        counters.push(StatCounter {
            stat_type,
            stat_len,
            stat_data,
        })
    }

    Ok(StatsReport {
        stats_count,
        counters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    #[test]
    fn test_parse_stats_report_names_known_type() {
        let mut buffer = BytesMut::new();
        buffer.put_u32(1);
        buffer.put_u16(8); // LocRibRoutes
        buffer.put_u16(8);
        buffer.put_u64(42);
        let mut bytes = buffer.freeze();
        let report = parse_stats_report(&mut bytes).unwrap();
        assert_eq!(report.counters[0].named_type(), StatType::LocRibRoutes);
        assert!(matches!(report.counters[0].stat_data, StatsData::Gauge(42)));
    }

    #[test]
    fn test_unknown_stat_type_still_parses() {
        let mut buffer = BytesMut::new();
        buffer.put_u32(1);
        buffer.put_u16(999);
        buffer.put_u16(4);
        buffer.put_u32(7);
        let mut bytes = buffer.freeze();
        let report = parse_stats_report(&mut bytes).unwrap();
        assert_eq!(report.counters[0].named_type(), StatType::Unknown(999));
    }
}
