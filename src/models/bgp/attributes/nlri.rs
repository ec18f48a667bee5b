use crate::models::*;

#[derive(Debug, PartialEq, Clone, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Nlri {
    pub afi: Afi,
    pub safi: Safi,
    pub next_hop: Option<NextHopAddress>,
    pub prefixes: Vec<NetworkPrefix>,
    /// Route-distinguisher/label/EVPN-route-type structure for SAFIs where a plain
    /// [`NetworkPrefix`] can't carry the full route (§4.B). Empty for unicast/multicast.
    #[cfg_attr(feature = "serde", serde(default))]
    pub detail: NlriDetail,
}
