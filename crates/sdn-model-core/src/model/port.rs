// ── Port domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::annotation_keys::AnnotationKeys;
use super::annotations::Annotations;
use super::connect_point::ConnectPoint;
use super::element::Annotated;
use super::entity_id::ElementId;
use super::port_number::PortNumber;

/// Physical or logical medium of a port.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[non_exhaustive]
pub enum PortType {
    #[default]
    Copper,
    Fiber,
    Packet,
    Oduclt,
    Oms,
    Och,
    Odu,
    Otu,
    Virtual,
}

/// Port snapshot on an element.
///
/// Ports carry no provider of their own; they are owned by the device they
/// sit on. Equality includes annotations so that renamed ports compare
/// unequal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Port {
    element: ElementId,
    number: PortNumber,
    enabled: bool,
    port_type: PortType,
    /// Mbps.
    port_speed: u64,
    annotations: Annotations,
}

impl Port {
    pub fn new(
        element: impl Into<ElementId>,
        number: PortNumber,
        enabled: bool,
        port_type: PortType,
        port_speed: u64,
        annotations: Annotations,
    ) -> Self {
        Self {
            element: element.into(),
            number,
            enabled,
            port_type,
            port_speed,
            annotations,
        }
    }

    pub fn element(&self) -> &ElementId {
        &self.element
    }

    pub fn number(&self) -> &PortNumber {
        &self.number
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn port_type(&self) -> PortType {
        self.port_type
    }

    pub fn port_speed(&self) -> u64 {
        self.port_speed
    }

    /// Connect point addressing this port.
    pub fn connect_point(&self) -> ConnectPoint {
        ConnectPoint::new(self.element.clone(), self.number.clone())
    }

    /// Display name: the `portName` annotation, else the number's name.
    pub fn display_name(&self) -> String {
        self.annotations
            .value(AnnotationKeys::PORT_NAME)
            .or_else(|| self.number.name())
            .map_or_else(|| self.number.to_string(), str::to_owned)
    }
}

impl Annotated for Port {
    fn annotations(&self) -> &Annotations {
        &self.annotations
    }
}
