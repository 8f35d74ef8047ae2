// ── Filter predicates for entity streams ──
//
// Narrow a collection subscription without re-reading the store.

use crate::model::{
    Device, DeviceId, DeviceType, Host, Link, LinkState, LinkType, Port, PortType, ProviderId,
    Provided, VlanId,
};

/// Predicate over one kind of entity.
///
/// Implemented by the filter enums below and by any
/// `Fn(&T) -> bool + Send + Sync` closure.
pub trait EntityFilter<T>: Send + Sync {
    fn matches(&self, entity: &T) -> bool;
}

impl<T, F> EntityFilter<T> for F
where
    F: Fn(&T) -> bool + Send + Sync,
{
    fn matches(&self, entity: &T) -> bool {
        self(entity)
    }
}

/// Filter predicate for device collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceFilter {
    All,
    ByType(DeviceType),
    /// Case-insensitive manufacturer prefix.
    ByManufacturer(String),
    /// Devices whose primary provider is the given one.
    ByProvider(ProviderId),
}

impl EntityFilter<Device> for DeviceFilter {
    fn matches(&self, device: &Device) -> bool {
        match self {
            Self::All => true,
            Self::ByType(dt) => device.device_type() == *dt,
            Self::ByManufacturer(prefix) => device
                .manufacturer()
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix)),
            Self::ByProvider(provider) => device.provider_id() == provider,
        }
    }
}

/// Filter predicate for port collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortFilter {
    All,
    OfDevice(DeviceId),
    Enabled,
    ByType(PortType),
}

impl EntityFilter<Port> for PortFilter {
    fn matches(&self, port: &Port) -> bool {
        match self {
            Self::All => true,
            Self::OfDevice(id) => port.element().as_device() == Some(id),
            Self::Enabled => port.is_enabled(),
            Self::ByType(pt) => port.port_type() == *pt,
        }
    }
}

/// Filter predicate for link collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkFilter {
    All,
    /// Links with either end on the device.
    Touching(DeviceId),
    ByType(LinkType),
    ByState(LinkState),
}

impl EntityFilter<Link> for LinkFilter {
    fn matches(&self, link: &Link) -> bool {
        match self {
            Self::All => true,
            Self::Touching(id) => [link.src(), link.dst()]
                .into_iter()
                .any(|cp| cp.element_id().as_device() == Some(id)),
            Self::ByType(lt) => link.link_type() == *lt,
            Self::ByState(ls) => link.state() == *ls,
        }
    }
}

/// Filter predicate for host collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostFilter {
    All,
    /// Hosts with at least one location on the device.
    AttachedTo(DeviceId),
    ByVlan(VlanId),
}

impl EntityFilter<Host> for HostFilter {
    fn matches(&self, host: &Host) -> bool {
        match self {
            Self::All => true,
            Self::AttachedTo(id) => host
                .locations()
                .iter()
                .any(|loc| loc.element_id().as_device() == Some(id)),
            Self::ByVlan(vlan) => host.vlan() == *vlan,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Annotations, ConnectPoint, DeviceInfo, PortNumber};

    fn device(manufacturer: &str) -> Device {
        Device::new(
            ProviderId::new("of", "test"),
            DeviceId::new("of:1").unwrap(),
            DeviceInfo {
                manufacturer: manufacturer.into(),
                device_type: DeviceType::Router,
                ..DeviceInfo::default()
            },
            Annotations::empty(),
        )
    }

    fn cp(device: &str, port: u64) -> ConnectPoint {
        ConnectPoint::new(DeviceId::new(device).unwrap(), PortNumber::new(port))
    }

    #[test]
    fn device_filters() {
        let d = device("Acme Networks");
        assert!(DeviceFilter::All.matches(&d));
        assert!(DeviceFilter::ByType(DeviceType::Router).matches(&d));
        assert!(!DeviceFilter::ByType(DeviceType::Switch).matches(&d));
        assert!(DeviceFilter::ByManufacturer("acme".into()).matches(&d));
        assert!(!DeviceFilter::ByManufacturer("Acme Networks Inc".into()).matches(&d));
        assert!(DeviceFilter::ByProvider(ProviderId::new("of", "test")).matches(&d));
        assert!(!DeviceFilter::ByProvider(ProviderId::NONE).matches(&d));
    }

    #[test]
    fn link_touching_checks_both_ends() {
        let link = Link::new(
            ProviderId::NONE,
            cp("of:1", 1),
            cp("of:2", 1),
            LinkType::Direct,
        );
        assert!(LinkFilter::Touching(DeviceId::new("of:2").unwrap()).matches(&link));
        assert!(!LinkFilter::Touching(DeviceId::new("of:3").unwrap()).matches(&link));
        assert!(LinkFilter::ByState(LinkState::Active).matches(&link));
    }

    #[test]
    fn closures_are_filters() {
        let by_serial = |d: &Device| d.serial_number().is_empty();
        assert!(by_serial.matches(&device("x")));
    }
}
