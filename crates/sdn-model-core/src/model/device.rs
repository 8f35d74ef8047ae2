// ── Device domain types ──

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use strum::{Display, EnumString};

use super::annotations::Annotations;
use super::element::{Annotated, ModelBase, Projectable, Provided, driver_from_annotations};
use super::entity_id::{ChassisId, DeviceId, ElementId};
use super::provider::ProviderId;
use crate::driver::{Driver, DriverResolver};

/// Coarse device classification.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[non_exhaustive]
pub enum DeviceType {
    #[default]
    Switch,
    Router,
    Roadm,
    Otn,
    RoadmOtn,
    Firewall,
    Balancer,
    Ipvpn,
    Microwave,
    FiberSwitch,
    OpticalAmplifier,
    Controller,
    Virtual,
    Other,
}

/// Descriptive facts about a device, as reported by a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub device_type: DeviceType,
    pub manufacturer: String,
    pub hw_version: String,
    pub sw_version: String,
    pub serial_number: String,
    pub chassis_id: ChassisId,
}

/// Infrastructure device snapshot.
///
/// Equality covers the identity and descriptive facts; provider and
/// annotations are ignored.
#[derive(Debug, Clone, Serialize)]
pub struct Device {
    id: DeviceId,
    #[serde(flatten)]
    info: DeviceInfo,
    #[serde(flatten)]
    base: ModelBase,
}

impl Device {
    pub fn new(
        provider_id: ProviderId,
        id: DeviceId,
        info: DeviceInfo,
        annotations: Annotations,
    ) -> Self {
        Self {
            id,
            info,
            base: ModelBase::new(provider_id, annotations),
        }
    }

    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    pub fn device_type(&self) -> DeviceType {
        self.info.device_type
    }

    pub fn manufacturer(&self) -> &str {
        &self.info.manufacturer
    }

    pub fn hw_version(&self) -> &str {
        &self.info.hw_version
    }

    pub fn sw_version(&self) -> &str {
        &self.info.sw_version
    }

    pub fn serial_number(&self) -> &str {
        &self.info.serial_number
    }

    pub fn chassis_id(&self) -> ChassisId {
        self.info.chassis_id
    }
}

impl PartialEq for Device {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.info == other.info
    }
}

impl Eq for Device {}

impl Hash for Device {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Annotated for Device {
    fn annotations(&self) -> &Annotations {
        self.base.annotations()
    }
}

impl Provided for Device {
    fn provider_id(&self) -> &ProviderId {
        self.base.provider_id()
    }
}

impl Projectable for Device {
    fn model_base(&self) -> &ModelBase {
        &self.base
    }

    fn element_id(&self) -> ElementId {
        ElementId::Device(self.id.clone())
    }

    fn describe(&self) -> String {
        format!("device {}", self.id)
    }

    /// The `driver` annotation first, then the manufacturer /
    /// hardware / software identification.
    fn locate_driver(&self, resolver: &dyn DriverResolver) -> Option<Arc<Driver>> {
        driver_from_annotations(self.annotations(), resolver, &self.id).or_else(|| {
            resolver.driver_for(
                &self.info.manufacturer,
                &self.info.hw_version,
                &self.info.sw_version,
            )
        })
    }
}
