// ── Link domain types ──

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use strum::{Display, EnumString};

use super::annotations::Annotations;
use super::connect_point::ConnectPoint;
use super::element::{Annotated, ModelBase, Projectable, Provided};
use super::entity_id::{ElementId, HostId};
use super::host::HostLocation;
use super::port_number::PortNumber;
use super::provider::ProviderId;

/// How two connect points are joined.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[non_exhaustive]
pub enum LinkType {
    /// Point-to-point physical link.
    #[default]
    Direct,
    /// Link through an unmanaged segment.
    Indirect,
    /// Host attachment to an infrastructure port.
    Edge,
    Tunnel,
    Optical,
    Virtual,
}

/// Operational state of a link.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum LinkState {
    #[default]
    Active,
    Inactive,
}

/// Unidirectional link snapshot.
///
/// Equality is source, destination and type. State and the `expected`
/// flag change over a link's lifetime without changing its identity.
#[derive(Debug, Clone, Serialize)]
pub struct Link {
    src: ConnectPoint,
    dst: ConnectPoint,
    link_type: LinkType,
    state: LinkState,
    /// Whether the link is expected to exist even when not observed.
    expected: bool,
    #[serde(flatten)]
    base: ModelBase,
}

impl Link {
    /// Active, unexpected link with no annotations.
    pub fn new(
        provider_id: ProviderId,
        src: ConnectPoint,
        dst: ConnectPoint,
        link_type: LinkType,
    ) -> Self {
        Self {
            src,
            dst,
            link_type,
            state: LinkState::Active,
            expected: false,
            base: ModelBase::new(provider_id, Annotations::empty()),
        }
    }

    /// Edge link between a host and the infrastructure port it sits on.
    ///
    /// `is_ingress` orients the link from the host into the network.
    pub fn edge(
        provider_id: ProviderId,
        host: HostId,
        location: &HostLocation,
        is_ingress: bool,
    ) -> Self {
        let host_point = ConnectPoint::new(host, PortNumber::new(0));
        let edge_point = location.connect_point().clone();
        let (src, dst) = if is_ingress {
            (host_point, edge_point)
        } else {
            (edge_point, host_point)
        };
        Self::new(provider_id, src, dst, LinkType::Edge)
    }

    #[must_use]
    pub fn with_state(mut self, state: LinkState) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub fn with_expected(mut self, expected: bool) -> Self {
        self.expected = expected;
        self
    }

    #[must_use]
    pub fn with_annotations(self, annotations: Annotations) -> Self {
        let provider_id = self.base.provider_id().clone();
        Self {
            base: ModelBase::new(provider_id, annotations),
            ..self
        }
    }

    pub fn src(&self) -> &ConnectPoint {
        &self.src
    }

    pub fn dst(&self) -> &ConnectPoint {
        &self.dst
    }

    pub fn link_type(&self) -> LinkType {
        self.link_type
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_expected(&self) -> bool {
        self.expected
    }

    pub fn is_edge(&self) -> bool {
        self.link_type == LinkType::Edge
    }
}

impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        self.src == other.src && self.dst == other.dst && self.link_type == other.link_type
    }
}

impl Eq for Link {}

impl Hash for Link {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.src.hash(state);
        self.dst.hash(state);
        self.link_type.hash(state);
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {} ({})", self.src, self.dst, self.link_type)
    }
}

impl Annotated for Link {
    fn annotations(&self) -> &Annotations {
        self.base.annotations()
    }
}

impl Provided for Link {
    fn provider_id(&self) -> &ProviderId {
        self.base.provider_id()
    }
}

impl Projectable for Link {
    fn model_base(&self) -> &ModelBase {
        &self.base
    }

    /// Behaviours see the link through its source element.
    fn element_id(&self) -> ElementId {
        self.src.element_id().clone()
    }

    fn describe(&self) -> String {
        format!("link {self}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{DeviceId, LinkKey};

    fn cp(device: &str, port: u64) -> ConnectPoint {
        ConnectPoint::new(DeviceId::new(device).unwrap(), PortNumber::new(port))
    }

    #[test]
    fn equality_ignores_state_and_expected() {
        let a = Link::new(ProviderId::NONE, cp("of:1", 1), cp("of:2", 1), LinkType::Direct);
        let b = a
            .clone()
            .with_state(LinkState::Inactive)
            .with_expected(true)
            .with_annotations([("layer", "ETHERNET")].into_iter().collect());
        assert_eq!(a, b);
        assert_eq!(b.state(), LinkState::Inactive);
        assert!(b.is_expected());
        assert_eq!(b.annotations().value("layer"), Some("ETHERNET"));
    }

    #[test]
    fn equality_covers_type() {
        let a = Link::new(ProviderId::NONE, cp("of:1", 1), cp("of:2", 1), LinkType::Direct);
        let b = Link::new(ProviderId::NONE, cp("of:1", 1), cp("of:2", 1), LinkType::Indirect);
        assert_ne!(a, b);
        assert_eq!(LinkKey::from(&a), LinkKey::from(&b));
    }

    #[test]
    fn edge_link_orientation() {
        let host: HostId = "aa:bb:cc:dd:ee:ff/None".parse().unwrap();
        let location = HostLocation::new(cp("of:1", 7), 0);

        let ingress = Link::edge(ProviderId::NONE, host, &location, true);
        assert!(ingress.is_edge());
        assert_eq!(ingress.src().host_id().unwrap(), &host);
        assert_eq!(ingress.dst(), location.connect_point());

        let egress = Link::edge(ProviderId::NONE, host, &location, false);
        assert_eq!(egress.src(), location.connect_point());
    }

    #[test]
    fn projects_through_source_element() {
        let link = Link::new(ProviderId::NONE, cp("of:1", 1), cp("of:2", 1), LinkType::Direct);
        assert_eq!(link.element_id(), ElementId::Device(DeviceId::new("of:1").unwrap()));
    }
}
