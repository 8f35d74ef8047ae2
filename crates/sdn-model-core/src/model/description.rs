// ── Provider descriptions ──
//
// What a provider reports about an entity. Descriptions carry sparse
// annotations so a provider can retract a key it set earlier; the store
// composes them into the resolved entities.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::net::IpAddr;

use super::address::{MacAddress, VlanId};
use super::annotations::SparseAnnotations;
use super::connect_point::ConnectPoint;
use super::device::DeviceInfo;
use super::entity_id::{DeviceId, HostId};
use super::host::HostLocation;
use super::link::LinkType;
use super::port::PortType;
use super::port_number::PortNumber;

/// Device facts from one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescription {
    pub id: DeviceId,
    #[serde(flatten)]
    pub info: DeviceInfo,
    #[serde(default)]
    pub annotations: SparseAnnotations,
}

impl DeviceDescription {
    pub fn new(id: DeviceId, info: DeviceInfo) -> Self {
        Self {
            id,
            info,
            annotations: SparseAnnotations::empty(),
        }
    }

    #[must_use]
    pub fn with_annotations(mut self, annotations: SparseAnnotations) -> Self {
        self.annotations = annotations;
        self
    }
}

/// Port facts from one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDescription {
    pub number: PortNumber,
    pub enabled: bool,
    #[serde(default)]
    pub port_type: PortType,
    /// Mbps.
    #[serde(default)]
    pub port_speed: u64,
    #[serde(default)]
    pub annotations: SparseAnnotations,
}

impl PortDescription {
    pub fn new(number: PortNumber, enabled: bool, port_type: PortType, port_speed: u64) -> Self {
        Self {
            number,
            enabled,
            port_type,
            port_speed,
            annotations: SparseAnnotations::empty(),
        }
    }

    #[must_use]
    pub fn with_annotations(mut self, annotations: SparseAnnotations) -> Self {
        self.annotations = annotations;
        self
    }
}

/// Link facts from one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDescription {
    pub src: ConnectPoint,
    pub dst: ConnectPoint,
    #[serde(default)]
    pub link_type: LinkType,
    #[serde(default)]
    pub expected: bool,
    #[serde(default)]
    pub annotations: SparseAnnotations,
}

impl LinkDescription {
    pub fn new(src: ConnectPoint, dst: ConnectPoint, link_type: LinkType) -> Self {
        Self {
            src,
            dst,
            link_type,
            expected: false,
            annotations: SparseAnnotations::empty(),
        }
    }

    #[must_use]
    pub fn with_expected(mut self, expected: bool) -> Self {
        self.expected = expected;
        self
    }

    #[must_use]
    pub fn with_annotations(mut self, annotations: SparseAnnotations) -> Self {
        self.annotations = annotations;
        self
    }
}

/// Host facts from one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostDescription {
    pub mac: MacAddress,
    pub vlan: VlanId,
    pub locations: BTreeSet<HostLocation>,
    #[serde(default)]
    pub ip_addresses: BTreeSet<IpAddr>,
    #[serde(default)]
    pub configured: bool,
    #[serde(default)]
    pub annotations: SparseAnnotations,
}

impl HostDescription {
    pub fn new(
        mac: MacAddress,
        vlan: VlanId,
        locations: impl IntoIterator<Item = HostLocation>,
        ip_addresses: impl IntoIterator<Item = IpAddr>,
    ) -> Self {
        Self {
            mac,
            vlan,
            locations: locations.into_iter().collect(),
            ip_addresses: ip_addresses.into_iter().collect(),
            configured: false,
            annotations: SparseAnnotations::empty(),
        }
    }

    pub fn host_id(&self) -> HostId {
        HostId::new(self.mac, self.vlan)
    }

    #[must_use]
    pub fn with_configured(mut self, configured: bool) -> Self {
        self.configured = configured;
        self
    }

    #[must_use]
    pub fn with_annotations(mut self, annotations: SparseAnnotations) -> Self {
        self.annotations = annotations;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Annotations;

    #[test]
    fn port_description_defaults_from_json() {
        let desc: PortDescription =
            serde_json::from_str(r#"{"number":"7","enabled":true,"annotations":{"portName":null}}"#)
                .unwrap();
        assert_eq!(desc.number, PortNumber::new(7));
        assert_eq!(desc.port_type, PortType::Copper);
        assert_eq!(desc.port_speed, 0);
        assert!(desc.annotations.is_removed("portName"));
    }

    #[test]
    fn host_description_identity() {
        let mac: MacAddress = "aa:bb:cc:dd:ee:ff".parse().unwrap();
        let desc = HostDescription::new(mac, VlanId::NONE, [], [])
            .with_annotations(SparseAnnotations::from(Annotations::empty()));
        assert_eq!(desc.host_id().to_string(), "aa:bb:cc:dd:ee:ff/None");
        assert!(!desc.configured);
    }
}
