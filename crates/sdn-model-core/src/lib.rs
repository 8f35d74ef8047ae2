//! Network information model core for an SDN controller.
//!
//! This crate owns the canonical, immutable representation of the network
//! and the machinery that reconciles provider reports into it:
//!
//! - **Identity types** ([`model`]) — [`DeviceId`], [`HostId`],
//!   [`PortNumber`], [`ConnectPoint`] and [`LinkKey`]: canonical, parseable
//!   keys used everywhere else.
//!
//! - **Annotations** — [`Annotations`] (resolved) and [`SparseAnnotations`]
//!   (deltas with tombstones). `merge` resolves a delta against a resolved
//!   set; `union` combines two deltas from the same provider.
//!
//! - **Entities** — [`Device`], [`Port`], [`Link`] and [`Host`] snapshots.
//!   Every projectable entity can be viewed as a driver capability through
//!   [`Projectable::project`], with the driver bound once and memoized.
//!
//! - **Drivers** ([`driver`]) — [`DriverRegistry`] resolves drivers by name
//!   or by manufacturer / hardware / software; [`DriverService`] is the
//!   install-once handle every projection goes through.
//!
//! - **Paths** — [`Path`] (validated link chain with a cost) and
//!   [`DisjointPath`] (primary/backup pair, symmetric equality).
//!
//! - **[`ModelStore`]** — Lock-free reactive storage built on
//!   `EntityCollection` (`DashMap` + `tokio::sync::watch` channels).
//!   Composes per-provider descriptions into snapshots and reports each
//!   change as a [`ModelEvent`]; [`EntityStream<T>`] exposes
//!   `current()` / `latest()` / `changed()` to subscribers, narrowed by
//!   the filters in [`stream`], and [`EventStream`] carries the events.

pub mod driver;
pub mod error;
pub mod model;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use driver::{
    BehaviourCatalog, Capability, CapabilityFamily, Driver, DriverData, DriverDefinition,
    DriverRegistry, DriverResolver, DriverService, HandlerContext,
};
pub use error::ModelError;
pub use store::{ModelEvent, ModelStore};
pub use stream::{EntityFilter, EntityStream, EventStream};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Identity
    ConnectPoint, DeviceId, ElementId, HostId, LinkKey, MacAddress, PortNumber, ProviderId,
    VlanId,
    // Annotations
    AnnotationKeys, Annotations, SparseAnnotations,
    // Entities
    Annotated, Device, DeviceType, Host, HostLocation, Link, LinkType, Port, PortType,
    Projectable, Provided,
    // Paths
    DisjointPath, Path, ScalarWeight, Weight,
};
