// ── Core identity types ──
//
// DeviceId, HostId and IpElementId identify the elements of the network
// graph. ElementId unifies them for connect points, which may sit on any
// of the three.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use url::Url;

use super::address::{MacAddress, VlanId};
use crate::error::ModelError;

// ── DeviceId ────────────────────────────────────────────────────────

/// Identifier of an infrastructure device.
///
/// Wraps a URI such as `of:0000000000000001`. The URI text is lower-cased
/// on construction so that equality and hashing are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId(Cow<'static, str>);

impl DeviceId {
    /// Placeholder for "no device".
    pub const NONE: Self = Self(Cow::Borrowed("none:none"));

    /// Build a device identifier from a URI string.
    ///
    /// Relative references such as `1.1.1.1` are accepted as-is; a string
    /// that carries a scheme must parse as an absolute URI.
    pub fn new(uri: impl AsRef<str>) -> Result<Self, ModelError> {
        let raw = uri.as_ref().trim();
        if raw.is_empty() || raw.contains(char::is_whitespace) {
            return Err(ModelError::invalid_argument(format!(
                "invalid device URI '{raw}': must be non-empty without whitespace"
            )));
        }
        if uri_scheme(raw).is_some() {
            Url::parse(raw).map_err(|e| {
                ModelError::invalid_argument(format!("invalid device URI '{raw}': {e}"))
            })?;
        }
        Ok(Self(Cow::Owned(raw.to_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URI scheme, e.g. `of` for OpenFlow datapaths; empty for relative ids.
    pub fn scheme(&self) -> &str {
        uri_scheme(&self.0).unwrap_or("")
    }

    /// Parsed URI view of this identifier. Relative ids have none.
    pub fn uri(&self) -> Result<Url, ModelError> {
        Url::parse(&self.0)
            .map_err(|e| ModelError::invalid_state(format!("device URI '{}': {e}", self.0)))
    }
}

/// Scheme of `s` per RFC 3986: a letter followed by letters, digits,
/// `+`, `-` or `.`, terminated by `:`.
fn uri_scheme(s: &str) -> Option<&str> {
    let (scheme, _) = s.split_once(':')?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DeviceId {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<DeviceId> for String {
    fn from(id: DeviceId) -> Self {
        id.0.into_owned()
    }
}

// ── HostId ──────────────────────────────────────────────────────────

/// Identifier of an end-station: its MAC address and VLAN.
///
/// Textual form is `<mac>/<vlan>`, e.g. `aa:bb:cc:dd:ee:ff/100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HostId {
    mac: MacAddress,
    vlan: VlanId,
}

impl HostId {
    /// Placeholder for "no host".
    pub const NONE: Self = Self {
        mac: MacAddress::ZERO,
        vlan: VlanId::NONE,
    };

    pub const fn new(mac: MacAddress, vlan: VlanId) -> Self {
        Self { mac, vlan }
    }

    /// Untagged host with the given MAC.
    pub const fn untagged(mac: MacAddress) -> Self {
        Self::new(mac, VlanId::NONE)
    }

    pub const fn mac(&self) -> MacAddress {
        self.mac
    }

    pub const fn vlan(&self) -> VlanId {
        self.vlan
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.mac, self.vlan)
    }
}

impl FromStr for HostId {
    type Err = ModelError;

    /// First 17 characters are the MAC, then a `/`, then the VLAN.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ModelError::invalid_argument(format!("host id '{s}' must be <mac>/<vlan>"));

        if s.len() < MacAddress::TEXT_LEN + 2 {
            return Err(bad());
        }
        let mac = s.get(..MacAddress::TEXT_LEN).ok_or_else(bad)?;
        let rest = s.get(MacAddress::TEXT_LEN..).ok_or_else(bad)?;
        let vlan = rest.strip_prefix('/').ok_or_else(bad)?;

        Ok(Self::new(mac.parse()?, vlan.parse()?))
    }
}

impl TryFrom<String> for HostId {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<HostId> for String {
    fn from(id: HostId) -> Self {
        id.to_string()
    }
}

// ── IpElementId ─────────────────────────────────────────────────────

/// Identifier of an element known only by an IP address (e.g. a
/// routing peer outside the controlled domain).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IpElementId(IpAddr);

impl IpElementId {
    pub const fn new(ip: IpAddr) -> Self {
        Self(ip)
    }

    pub const fn ip_address(&self) -> IpAddr {
        self.0
    }
}

impl fmt::Display for IpElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for IpElementId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse()
            .map(Self)
            .map_err(|_| ModelError::invalid_argument(format!("invalid IP address '{s}'")))
    }
}

// ── ElementId ───────────────────────────────────────────────────────

/// Identifier of any element a port can belong to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementId {
    Device(DeviceId),
    Host(HostId),
    Ip(IpElementId),
}

impl ElementId {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Device(_) => "device",
            Self::Host(_) => "host",
            Self::Ip(_) => "ip",
        }
    }

    pub fn as_device(&self) -> Option<&DeviceId> {
        match self {
            Self::Device(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_host(&self) -> Option<&HostId> {
        match self {
            Self::Host(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_ip(&self) -> Option<&IpElementId> {
        match self {
            Self::Ip(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device(id) => id.fmt(f),
            Self::Host(id) => id.fmt(f),
            Self::Ip(id) => id.fmt(f),
        }
    }
}

impl From<DeviceId> for ElementId {
    fn from(id: DeviceId) -> Self {
        Self::Device(id)
    }
}

impl From<HostId> for ElementId {
    fn from(id: HostId) -> Self {
        Self::Host(id)
    }
}

impl From<IpElementId> for ElementId {
    fn from(id: IpElementId) -> Self {
        Self::Ip(id)
    }
}

// ── ChassisId ───────────────────────────────────────────────────────

/// Chassis identifier reported by a device, encoded as hex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChassisId(u64);

impl ChassisId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChassisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl FromStr for ChassisId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix("0x").unwrap_or(s);
        u64::from_str_radix(hex, 16)
            .map(Self)
            .map_err(|_| ModelError::invalid_argument(format!("invalid chassis id '{s}'")))
    }
}

impl TryFrom<String> for ChassisId {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ChassisId> for String {
    fn from(id: ChassisId) -> Self {
        id.to_string()
    }
}
