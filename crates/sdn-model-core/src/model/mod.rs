// ── Network information model ──
//
// Immutable snapshots of the network's infrastructure: identities,
// annotations, devices, ports, links, hosts and the paths built from
// them. A change in the network produces a new snapshot; nothing here is
// mutated in place.

pub mod address;
pub mod annotation_keys;
pub mod annotations;
pub mod connect_point;
pub mod entity_id;
pub mod port_number;
pub mod provider;

pub mod description;
pub mod device;
pub mod element;
pub mod host;
pub mod link;
pub mod port;

pub mod disjoint_path;
pub mod path;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use sdn_model_core::model::*` gives you everything.

// Identity
pub use address::{MacAddress, VlanId};
pub use connect_point::{ConnectPoint, LinkKey};
pub use entity_id::{ChassisId, DeviceId, ElementId, HostId, IpElementId};
pub use port_number::{LogicalPort, PortNumber};
pub use provider::ProviderId;

// Annotations
pub use annotation_keys::AnnotationKeys;
pub use annotations::{Annotations, AnnotationsBuilder, SparseAnnotations};

// Entities
pub use element::{Annotated, ModelBase, Projectable, Provided, driver_from_annotations};
pub use device::{Device, DeviceInfo, DeviceType};
pub use host::{Host, HostLocation};
pub use link::{Link, LinkState, LinkType};
pub use port::{Port, PortType};

// Provider descriptions
pub use description::{DeviceDescription, HostDescription, LinkDescription, PortDescription};

// Paths
pub use disjoint_path::DisjointPath;
pub use path::{Path, ScalarWeight, Weight};
