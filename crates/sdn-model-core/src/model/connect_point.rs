// ── Connect points and link keys ──
//
// A connect point is the (element, port) address of one end of a link or
// of a host attachment. A link key is the (src, dst) pair of connect
// points and identifies a link independent of its state.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::entity_id::{DeviceId, ElementId, HostId, IpElementId};
use super::link::Link;
use super::port_number::PortNumber;
use crate::error::ModelError;

/// Port of an element in the network graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectPoint {
    element_id: ElementId,
    port: PortNumber,
}

impl ConnectPoint {
    pub fn new(element_id: impl Into<ElementId>, port: PortNumber) -> Self {
        Self {
            element_id: element_id.into(),
            port,
        }
    }

    pub fn element_id(&self) -> &ElementId {
        &self.element_id
    }

    pub fn port(&self) -> &PortNumber {
        &self.port
    }

    /// Device this point belongs to; fails if the element is not a device.
    pub fn device_id(&self) -> Result<&DeviceId, ModelError> {
        self.element_id
            .as_device()
            .ok_or_else(|| self.wrong_kind("device"))
    }

    /// Host this point belongs to; fails if the element is not a host.
    pub fn host_id(&self) -> Result<&HostId, ModelError> {
        self.element_id.as_host().ok_or_else(|| self.wrong_kind("host"))
    }

    /// IP element this point belongs to; fails if the element is not one.
    pub fn ip_element_id(&self) -> Result<&IpElementId, ModelError> {
        self.element_id.as_ip().ok_or_else(|| self.wrong_kind("ip"))
    }

    fn wrong_kind(&self, wanted: &str) -> ModelError {
        ModelError::invalid_state(format!(
            "connect point {self} is on a {} element, not a {wanted}",
            self.element_id.kind()
        ))
    }

    /// Parse `<deviceUri>/<port>`, splitting on the last `/`.
    pub fn device_connect_point(s: &str) -> Result<Self, ModelError> {
        let (device, port) = s
            .rsplit_once('/')
            .filter(|(device, port)| !device.is_empty() && !port.is_empty())
            .ok_or_else(|| {
                ModelError::invalid_argument(format!(
                    "connect point '{s}' must be in \"deviceUri/portNumber\" format"
                ))
            })?;
        Ok(Self::new(DeviceId::new(device)?, port.parse()?))
    }

    /// Parse `<mac>/<vlan>/<port>`, splitting on the last `/`.
    pub fn host_connect_point(s: &str) -> Result<Self, ModelError> {
        let bad = || {
            ModelError::invalid_argument(format!(
                "connect point '{s}' must be in \"mac/vlan/portNumber\" format"
            ))
        };
        if s.split('/').count() != 3 {
            return Err(bad());
        }
        let (host, port) = s.rsplit_once('/').ok_or_else(bad)?;
        Ok(Self::new(host.parse::<HostId>()?, port.parse()?))
    }
}

impl fmt::Display for ConnectPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.element_id, self.port)
    }
}

// ── LinkKey ─────────────────────────────────────────────────────────

/// Identity of a link: its source and destination connect points.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkKey {
    src: ConnectPoint,
    dst: ConnectPoint,
}

impl LinkKey {
    pub fn new(src: ConnectPoint, dst: ConnectPoint) -> Self {
        Self { src, dst }
    }

    pub fn src(&self) -> &ConnectPoint {
        &self.src
    }

    pub fn dst(&self) -> &ConnectPoint {
        &self.dst
    }

    /// Key of the link running the other way.
    pub fn reversed(&self) -> Self {
        Self::new(self.dst.clone(), self.src.clone())
    }
}

impl From<&Link> for LinkKey {
    fn from(link: &Link) -> Self {
        Self::new(link.src().clone(), link.dst().clone())
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.src, self.dst)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn device_connect_point_splits_on_last_slash() {
        let cp = ConnectPoint::device_connect_point("of:1/3").unwrap();
        assert_eq!(cp.device_id().unwrap(), &DeviceId::new("of:1").unwrap());
        assert_eq!(cp.port(), &PortNumber::new(3));
        assert_eq!(cp.to_string(), "of:1/3");
    }

    #[test]
    fn device_connect_point_round_trips_named_port() {
        let text = "of:0000000000000001/[eth0](2)";
        let cp = ConnectPoint::device_connect_point(text).unwrap();
        assert_eq!(cp.to_string(), text);
    }

    #[test]
    fn device_connect_point_requires_separator() {
        assert!(matches!(
            ConnectPoint::device_connect_point("of:1"),
            Err(ModelError::InvalidArgument { .. })
        ));
        assert!(ConnectPoint::device_connect_point("of:1/").is_err());
        assert!(ConnectPoint::device_connect_point("/3").is_err());
    }

    #[test]
    fn host_connect_point_parses_three_segments() {
        let cp = ConnectPoint::host_connect_point("aa:bb:cc:dd:ee:ff/100/3").unwrap();
        assert_eq!(cp.host_id().unwrap().to_string(), "aa:bb:cc:dd:ee:ff/100");
        assert_eq!(cp.port().to_u64(), 3);
        assert_eq!(cp.to_string(), "aa:bb:cc:dd:ee:ff/100/3");
    }

    #[test]
    fn host_connect_point_rejects_wrong_segment_count() {
        assert!(ConnectPoint::host_connect_point("aa:bb:cc:dd:ee:ff/3").is_err());
        assert!(ConnectPoint::host_connect_point("aa:bb:cc:dd:ee:ff/1/2/3").is_err());
    }

    #[test]
    fn kind_guards_report_invalid_state() {
        let on_host = ConnectPoint::new(HostId::NONE, PortNumber::new(1));
        assert!(matches!(
            on_host.device_id(),
            Err(ModelError::InvalidState { .. })
        ));

        let on_device = ConnectPoint::new(DeviceId::NONE, PortNumber::new(1));
        assert!(matches!(
            on_device.host_id(),
            Err(ModelError::InvalidState { .. })
        ));
        assert!(on_device.ip_element_id().is_err());
    }

    #[test]
    fn link_key_is_usable_as_map_key() {
        let a = ConnectPoint::device_connect_point("of:1/1").unwrap();
        let b = ConnectPoint::device_connect_point("of:2/1").unwrap();
        let key = LinkKey::new(a.clone(), b.clone());

        let mut keys = HashSet::new();
        keys.insert(key.clone());
        assert!(keys.contains(&LinkKey::new(a, b)));
        assert!(!keys.contains(&key.reversed()));
    }
}
