// ── Host domain types ──

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::net::IpAddr;

use super::address::{MacAddress, VlanId};
use super::annotations::Annotations;
use super::connect_point::ConnectPoint;
use super::element::{Annotated, ModelBase, Projectable, Provided};
use super::entity_id::{ElementId, HostId};
use super::port_number::PortNumber;
use super::provider::ProviderId;

/// Where a host attaches to the network, and when it was last seen there.
///
/// Identity is the connect point alone; the timestamp is informational.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostLocation {
    connect_point: ConnectPoint,
    /// Milliseconds since the Unix epoch.
    time_ms: i64,
}

impl HostLocation {
    pub fn new(connect_point: ConnectPoint, time_ms: i64) -> Self {
        Self {
            connect_point,
            time_ms,
        }
    }

    /// Placeholder location for hosts without a known attachment.
    pub fn none() -> Self {
        Self::new(ConnectPoint::new(HostId::NONE, PortNumber::new(0)), 0)
    }

    pub fn connect_point(&self) -> &ConnectPoint {
        &self.connect_point
    }

    pub fn element_id(&self) -> &ElementId {
        self.connect_point.element_id()
    }

    pub fn port(&self) -> &PortNumber {
        self.connect_point.port()
    }

    pub fn time_ms(&self) -> i64 {
        self.time_ms
    }
}

impl PartialEq for HostLocation {
    fn eq(&self, other: &Self) -> bool {
        self.connect_point == other.connect_point
    }
}

impl Eq for HostLocation {}

impl Hash for HostLocation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.connect_point.hash(state);
    }
}

impl PartialOrd for HostLocation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HostLocation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.connect_point.cmp(&other.connect_point)
    }
}

/// End-station snapshot.
///
/// Equality covers identity, locations, addresses and the configured
/// flag; provider and annotations are ignored.
#[derive(Debug, Clone, Serialize)]
pub struct Host {
    id: HostId,
    locations: BTreeSet<HostLocation>,
    ip_addresses: BTreeSet<IpAddr>,
    configured: bool,
    #[serde(flatten)]
    base: ModelBase,
}

impl Host {
    pub fn new(
        provider_id: ProviderId,
        id: HostId,
        locations: impl IntoIterator<Item = HostLocation>,
        ip_addresses: impl IntoIterator<Item = IpAddr>,
        configured: bool,
        annotations: Annotations,
    ) -> Self {
        Self {
            id,
            locations: locations.into_iter().collect(),
            ip_addresses: ip_addresses.into_iter().collect(),
            configured,
            base: ModelBase::new(provider_id, annotations),
        }
    }

    pub fn id(&self) -> HostId {
        self.id
    }

    pub fn mac(&self) -> MacAddress {
        self.id.mac()
    }

    pub fn vlan(&self) -> VlanId {
        self.id.vlan()
    }

    pub fn locations(&self) -> &BTreeSet<HostLocation> {
        &self.locations
    }

    /// Most recently observed location.
    pub fn location(&self) -> Option<&HostLocation> {
        self.locations.iter().max_by_key(|l| l.time_ms)
    }

    pub fn ip_addresses(&self) -> &BTreeSet<IpAddr> {
        &self.ip_addresses
    }

    /// Whether the host was configured by an operator rather than learned.
    pub fn is_configured(&self) -> bool {
        self.configured
    }
}

impl PartialEq for Host {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.locations == other.locations
            && self.ip_addresses == other.ip_addresses
            && self.configured == other.configured
    }
}

impl Eq for Host {}

impl Hash for Host {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Annotated for Host {
    fn annotations(&self) -> &Annotations {
        self.base.annotations()
    }
}

impl Provided for Host {
    fn provider_id(&self) -> &ProviderId {
        self.base.provider_id()
    }
}

impl Projectable for Host {
    fn model_base(&self) -> &ModelBase {
        &self.base
    }

    fn element_id(&self) -> ElementId {
        ElementId::Host(self.id)
    }

    fn describe(&self) -> String {
        format!("host {}", self.id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::DeviceId;

    fn cp(device: &str, port: u64) -> ConnectPoint {
        ConnectPoint::new(DeviceId::new(device).unwrap(), PortNumber::new(port))
    }

    fn host_id() -> HostId {
        "aa:bb:cc:dd:ee:ff/100".parse().unwrap()
    }

    #[test]
    fn location_identity_ignores_time() {
        assert_eq!(HostLocation::new(cp("of:1", 1), 10), HostLocation::new(cp("of:1", 1), 99));
        assert_ne!(HostLocation::new(cp("of:1", 1), 10), HostLocation::new(cp("of:1", 2), 10));
    }

    #[test]
    fn latest_location_wins() {
        let host = Host::new(
            ProviderId::NONE,
            host_id(),
            [HostLocation::new(cp("of:1", 1), 10), HostLocation::new(cp("of:2", 4), 20)],
            [],
            false,
            Annotations::empty(),
        );
        assert_eq!(host.location().unwrap().connect_point(), &cp("of:2", 4));
        assert_eq!(host.mac().to_string(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(host.vlan().to_u16(), 100);
    }

    #[test]
    fn equality_covers_addresses_and_configured() {
        let ip: IpAddr = "10.0.0.1".parse().unwrap();
        let make = |ips: Vec<IpAddr>, configured| {
            Host::new(
                ProviderId::NONE,
                host_id(),
                [HostLocation::new(cp("of:1", 1), 0)],
                ips,
                configured,
                Annotations::empty(),
            )
        };
        assert_eq!(make(vec![ip], false), make(vec![ip], false));
        assert_ne!(make(vec![ip], false), make(vec![], false));
        assert_ne!(make(vec![ip], false), make(vec![ip], true));
    }
}
