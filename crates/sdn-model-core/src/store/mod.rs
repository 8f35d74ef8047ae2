// ── Network model snapshot store ──
//
// Providers submit descriptions; the store keeps the latest description
// per provider, composes them into immutable entity snapshots, publishes
// those snapshots and reports what changed. Readers never see a partially
// composed entity.

mod collection;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use self::collection::EntityCollection;
use crate::error::ModelError;
use crate::model::{
    Annotated, Annotations, Device, DeviceDescription, DeviceId, Host, HostDescription, HostId,
    Link, LinkDescription, LinkKey, Port, PortDescription, PortNumber, ProviderId,
    SparseAnnotations,
};
use crate::stream::{EntityStream, EventStream};

const EVENT_CHANNEL_SIZE: usize = 256;

// ── Events ──────────────────────────────────────────────────────────

/// Observable change produced by a store mutation.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum ModelEvent {
    DeviceAdded(Arc<Device>),
    DeviceUpdated(Arc<Device>),
    DeviceRemoved(Arc<Device>),
    PortAdded(Arc<Port>),
    PortUpdated(Arc<Port>),
    LinkAdded(Arc<Link>),
    LinkUpdated(Arc<Link>),
    LinkRemoved(Arc<Link>),
    HostAdded(Arc<Host>),
    HostUpdated(Arc<Host>),
    HostRemoved(Arc<Host>),
}

impl ModelEvent {
    /// Short name of the event kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DeviceAdded(_) => "device-added",
            Self::DeviceUpdated(_) => "device-updated",
            Self::DeviceRemoved(_) => "device-removed",
            Self::PortAdded(_) => "port-added",
            Self::PortUpdated(_) => "port-updated",
            Self::LinkAdded(_) => "link-added",
            Self::LinkUpdated(_) => "link-updated",
            Self::LinkRemoved(_) => "link-removed",
            Self::HostAdded(_) => "host-added",
            Self::HostUpdated(_) => "host-updated",
            Self::HostRemoved(_) => "host-removed",
        }
    }
}

// ── Timestamped descriptions ────────────────────────────────────────

/// A description together with when the store accepted it.
///
/// The sequence number orders descriptions accepted within the same clock
/// tick.
#[derive(Debug, Clone, Serialize)]
pub struct Timestamped<T> {
    value: T,
    timestamp: DateTime<Utc>,
    sequence: u64,
}

impl<T> Timestamped<T> {
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_newer_than<U>(&self, other: &Timestamped<U>) -> bool {
        (self.timestamp, self.sequence) > (other.timestamp, other.sequence)
    }
}

type ProviderDescriptions<T> = BTreeMap<ProviderId, Timestamped<T>>;

/// First non-ancillary provider, else the first one at all.
fn primary_provider<T>(descriptions: &ProviderDescriptions<T>) -> Option<&ProviderId> {
    descriptions
        .keys()
        .find(|p| !p.is_ancillary())
        .or_else(|| descriptions.keys().next())
}

/// Resolve every provider's sparse annotations, primary first.
fn compose_annotations<'a, T: 'a>(
    descriptions: &'a ProviderDescriptions<T>,
    primary: &ProviderId,
    sparse: impl Fn(&'a T) -> &'a SparseAnnotations,
) -> Annotations {
    let mut resolved = Annotations::empty();
    if let Some(first) = descriptions.get(primary) {
        resolved = resolved.merge(sparse(&first.value));
    }
    for (provider, described) in descriptions {
        if provider != primary {
            resolved = resolved.merge(sparse(&described.value));
        }
    }
    resolved
}

/// Classify a replacement as added, updated or unchanged.
fn change<T: PartialEq + Annotated>(
    previous: Option<&Arc<T>>,
    current: &Arc<T>,
    added: fn(Arc<T>) -> ModelEvent,
    updated: fn(Arc<T>) -> ModelEvent,
) -> Option<ModelEvent> {
    match previous {
        None => Some(added(Arc::clone(current))),
        Some(old) if **old == **current && old.annotations() == current.annotations() => None,
        Some(_) => Some(updated(Arc::clone(current))),
    }
}

// ── ModelStore ──────────────────────────────────────────────────────

/// Thread-safe store of devices, ports, links and hosts.
///
/// All reads are wait-free; writes use fine-grained per-shard locks
/// within `DashMap`. Every mutation returns the resulting [`ModelEvent`]
/// (or `None` if nothing observable changed) and also broadcasts it to
/// [`subscribe_events`](Self::subscribe_events) receivers.
pub struct ModelStore {
    device_descs: DashMap<DeviceId, ProviderDescriptions<DeviceDescription>>,
    port_descs: DashMap<(DeviceId, PortNumber), ProviderDescriptions<PortDescription>>,
    link_descs: DashMap<LinkKey, ProviderDescriptions<LinkDescription>>,

    devices: EntityCollection<DeviceId, Device>,
    ports: EntityCollection<(DeviceId, PortNumber), Port>,
    links: EntityCollection<LinkKey, Link>,
    hosts: EntityCollection<HostId, Host>,

    sequence: AtomicU64,
    event_tx: broadcast::Sender<ModelEvent>,
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelStore {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self {
            device_descs: DashMap::new(),
            port_descs: DashMap::new(),
            link_descs: DashMap::new(),
            devices: EntityCollection::new(),
            ports: EntityCollection::new(),
            links: EntityCollection::new(),
            hosts: EntityCollection::new(),
            sequence: AtomicU64::new(0),
            event_tx,
        }
    }

    fn stamp<T>(&self, value: T) -> Timestamped<T> {
        Timestamped {
            value,
            timestamp: Utc::now(),
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
        }
    }

    fn publish(&self, event: Option<ModelEvent>) -> Option<ModelEvent> {
        if let Some(ref event) = event {
            debug!(kind = event.kind(), "model event");
            // No receivers is fine.
            let _ = self.event_tx.send(event.clone());
        }
        event
    }

    /// Record `incoming` as `provider`'s latest description. A repeat
    /// description from the same provider has its annotations combined
    /// with the previous ones.
    fn record<T>(
        &self,
        descriptions: &mut ProviderDescriptions<T>,
        provider: &ProviderId,
        mut incoming: T,
        sparse: impl Fn(&mut T) -> &mut SparseAnnotations,
    ) {
        if let Some(mut previous) = descriptions.remove(provider) {
            let combined = sparse(&mut previous.value).union(sparse(&mut incoming));
            *sparse(&mut incoming) = combined;
        }
        descriptions.insert(provider.clone(), self.stamp(incoming));
    }

    // ── Devices ──────────────────────────────────────────────────────

    /// Accept a device description from `provider`.
    pub fn update_device(
        &self,
        provider: &ProviderId,
        description: DeviceDescription,
    ) -> Option<ModelEvent> {
        let id = description.id.clone();
        let mut descs = self.device_descs.entry(id.clone()).or_default();
        self.record(&mut descs, provider, description, |d| &mut d.annotations);

        let device = Arc::new(Self::compose_device(&id, &descs)?);
        let previous = self.devices.upsert(id, Arc::clone(&device));
        drop(descs);

        self.publish(change(
            previous.as_ref(),
            &device,
            ModelEvent::DeviceAdded,
            ModelEvent::DeviceUpdated,
        ))
    }

    fn compose_device(
        id: &DeviceId,
        descs: &ProviderDescriptions<DeviceDescription>,
    ) -> Option<Device> {
        let primary = primary_provider(descs)?;
        let base = descs.get(primary)?;
        let annotations = compose_annotations(descs, primary, |d| &d.annotations);
        Some(Device::new(
            primary.clone(),
            id.clone(),
            base.value.info.clone(),
            annotations,
        ))
    }

    /// Drop a device, its ports and every provider description of them.
    pub fn remove_device(&self, id: &DeviceId) -> Option<ModelEvent> {
        self.device_descs.remove(id);
        self.port_descs.retain(|(device, _), _| device != id);
        self.ports.remove_where(|(device, _)| device == id);
        let removed = self.devices.remove(id)?;
        self.publish(Some(ModelEvent::DeviceRemoved(removed)))
    }

    pub fn device(&self, id: &DeviceId) -> Option<Arc<Device>> {
        self.devices.get(id)
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn devices(&self) -> EntityStream<Device> {
        EntityStream::new(self.devices.subscribe())
    }

    pub fn devices_snapshot(&self) -> Arc<Vec<Arc<Device>>> {
        self.devices.snapshot()
    }

    /// Descriptions of a device from every provider that reported it.
    pub fn device_descriptions(
        &self,
        id: &DeviceId,
    ) -> Vec<(ProviderId, Timestamped<DeviceDescription>)> {
        self.device_descs
            .get(id)
            .map(|descs| {
                descs
                    .iter()
                    .map(|(p, d)| (p.clone(), d.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    // ── Ports ────────────────────────────────────────────────────────

    /// Accept a port description from `provider` for a known device.
    ///
    /// The device's description entry stays read-locked until the port is
    /// published, so a concurrent `remove_device` either rejects this port
    /// or sweeps it.
    pub fn update_port(
        &self,
        provider: &ProviderId,
        device: &DeviceId,
        description: PortDescription,
    ) -> Result<Option<ModelEvent>, ModelError> {
        let owner_descs = self.device_descs.get(device);
        let Some(owner) = owner_descs.as_ref().and_then(|_| self.devices.get(device)) else {
            return Err(ModelError::invalid_state(format!(
                "port {} reported for unknown device {device}",
                description.number
            )));
        };

        let key = (device.clone(), description.number.clone());
        let mut descs = self.port_descs.entry(key.clone()).or_default();
        self.record(&mut descs, provider, description, |d| &mut d.annotations);

        let Some(port) = Self::compose_port(owner.id(), &descs) else {
            return Ok(None);
        };
        let port = Arc::new(port);
        let previous = self.ports.upsert(key, Arc::clone(&port));
        drop(descs);

        let event = match previous {
            None => Some(ModelEvent::PortAdded(port)),
            Some(old) if *old == *port => None,
            Some(_) => Some(ModelEvent::PortUpdated(port)),
        };
        let event = self.publish(event);
        drop(owner_descs);
        Ok(event)
    }

    /// Fields from the newest description; annotations resolved oldest
    /// to newest so later reports win.
    fn compose_port(
        device: &DeviceId,
        descs: &ProviderDescriptions<PortDescription>,
    ) -> Option<Port> {
        let mut ordered: Vec<&Timestamped<PortDescription>> = descs.values().collect();
        ordered.sort_by_key(|d| (d.timestamp, d.sequence));
        let newest = ordered.last()?;

        let annotations = ordered
            .iter()
            .fold(Annotations::empty(), |resolved, d| {
                resolved.merge(&d.value.annotations)
            });
        let desc = &newest.value;
        Some(Port::new(
            device.clone(),
            desc.number.clone(),
            desc.enabled,
            desc.port_type,
            desc.port_speed,
            annotations,
        ))
    }

    pub fn port(&self, device: &DeviceId, number: &PortNumber) -> Option<Arc<Port>> {
        self.ports.get(&(device.clone(), number.clone()))
    }

    /// Ports of one device, ordered by port number.
    pub fn ports_of(&self, device: &DeviceId) -> Vec<Arc<Port>> {
        let mut ports = self.ports.filter(|(owner, _)| owner == device);
        ports.sort_by(|a, b| a.number().cmp(b.number()));
        ports
    }

    pub fn ports(&self) -> EntityStream<Port> {
        EntityStream::new(self.ports.subscribe())
    }

    // ── Links ────────────────────────────────────────────────────────

    /// Accept a link description from `provider`.
    pub fn update_link(
        &self,
        provider: &ProviderId,
        description: LinkDescription,
    ) -> Option<ModelEvent> {
        let key = LinkKey::new(description.src.clone(), description.dst.clone());
        let mut descs = self.link_descs.entry(key.clone()).or_default();
        self.record(&mut descs, provider, description, |d| &mut d.annotations);

        let link = Arc::new(Self::compose_link(&descs)?);
        let previous = self.links.upsert(key, Arc::clone(&link));
        drop(descs);

        let event = match previous {
            None => Some(ModelEvent::LinkAdded(link)),
            Some(old)
                if *old == *link
                    && old.state() == link.state()
                    && old.is_expected() == link.is_expected()
                    && old.annotations() == link.annotations() =>
            {
                None
            }
            Some(_) => Some(ModelEvent::LinkUpdated(link)),
        };
        self.publish(event)
    }

    fn compose_link(descs: &ProviderDescriptions<LinkDescription>) -> Option<Link> {
        let primary = primary_provider(descs)?;
        let base = &descs.get(primary)?.value;
        let annotations = compose_annotations(descs, primary, |d| &d.annotations);
        Some(
            Link::new(primary.clone(), base.src.clone(), base.dst.clone(), base.link_type)
                .with_expected(base.expected)
                .with_annotations(annotations),
        )
    }

    pub fn remove_link(&self, key: &LinkKey) -> Option<ModelEvent> {
        self.link_descs.remove(key);
        let removed = self.links.remove(key)?;
        self.publish(Some(ModelEvent::LinkRemoved(removed)))
    }

    pub fn link(&self, key: &LinkKey) -> Option<Arc<Link>> {
        self.links.get(key)
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn links(&self) -> EntityStream<Link> {
        EntityStream::new(self.links.subscribe())
    }

    // ── Hosts ────────────────────────────────────────────────────────

    /// Accept a host description from `provider`.
    ///
    /// The description's sparse annotations are resolved against the
    /// previously stored host's annotations.
    pub fn update_host(
        &self,
        provider: &ProviderId,
        description: HostDescription,
    ) -> Option<ModelEvent> {
        let id = description.host_id();
        let previous = self.hosts.get(&id);
        let annotations = previous
            .as_ref()
            .map_or_else(Annotations::empty, |old| old.annotations().clone())
            .merge(&description.annotations);

        let host = Arc::new(Host::new(
            provider.clone(),
            id,
            description.locations,
            description.ip_addresses,
            description.configured,
            annotations,
        ));
        self.hosts.upsert(id, Arc::clone(&host));

        self.publish(change(
            previous.as_ref(),
            &host,
            ModelEvent::HostAdded,
            ModelEvent::HostUpdated,
        ))
    }

    pub fn remove_host(&self, id: &HostId) -> Option<ModelEvent> {
        let removed = self.hosts.remove(id)?;
        self.publish(Some(ModelEvent::HostRemoved(removed)))
    }

    pub fn host(&self, id: &HostId) -> Option<Arc<Host>> {
        self.hosts.get(id)
    }

    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    pub fn hosts(&self) -> EntityStream<Host> {
        EntityStream::new(self.hosts.subscribe())
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Receive every event produced after this call.
    pub fn subscribe_events(&self) -> broadcast::Receiver<ModelEvent> {
        self.event_tx.subscribe()
    }

    /// Every event produced after this call, as a `Stream`.
    pub fn events(&self) -> EventStream {
        EventStream::new(self.event_tx.subscribe())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn primary_prefers_non_ancillary() {
        let store = ModelStore::new();
        let mut descs: ProviderDescriptions<u8> = BTreeMap::new();
        descs.insert(ProviderId::ancillary("a", "x"), store.stamp(1));
        descs.insert(ProviderId::new("z", "y"), store.stamp(2));
        assert_eq!(primary_provider(&descs), Some(&ProviderId::new("z", "y")));

        descs.remove(&ProviderId::new("z", "y"));
        assert_eq!(primary_provider(&descs), Some(&ProviderId::ancillary("a", "x")));
    }

    #[test]
    fn later_stamps_are_newer() {
        let store = ModelStore::new();
        let first = store.stamp(());
        let second = store.stamp(());
        assert!(second.is_newer_than(&first));
        assert!(!first.is_newer_than(&second));
    }
}
