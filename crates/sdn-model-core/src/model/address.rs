// ── Layer-2 addressing ──
//
// MAC addresses and VLAN identifiers, the two halves of a host identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

// ── MacAddress ──────────────────────────────────────────────────────

/// 48-bit MAC address.
///
/// Parses colon- or dash-separated hex in any case and always displays in
/// lowercase colon-separated form (`aa:bb:cc:dd:ee:ff`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// Length of the textual form, e.g. `aa:bb:cc:dd:ee:ff`.
    pub const TEXT_LEN: usize = 17;

    pub const ZERO: Self = Self([0; 6]);
    pub const BROADCAST: Self = Self([0xff; 6]);

    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    /// Group bit set in the first octet.
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddress {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ModelError::invalid_argument(format!("invalid MAC address '{s}'"));

        let mut octets = [0u8; 6];
        let mut parts = s.split([':', '-']);
        for octet in &mut octets {
            let part = parts.next().ok_or_else(bad)?;
            if part.len() != 2 {
                return Err(bad());
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| bad())?;
        }
        if parts.next().is_some() {
            return Err(bad());
        }
        Ok(Self(octets))
    }
}

impl TryFrom<String> for MacAddress {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.to_string()
    }
}

// ── VlanId ──────────────────────────────────────────────────────────

/// 802.1Q VLAN identifier, plus the `None` (untagged) and `Any` markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VlanId(u16);

impl VlanId {
    /// Highest tag value carried on the wire.
    pub const MAX_VLAN: u16 = 4095;

    /// Untagged traffic.
    pub const NONE: Self = Self(0xffff);
    /// Wildcard matching any tag.
    pub const ANY: Self = Self(0x1000);

    pub fn new(id: u16) -> Result<Self, ModelError> {
        if id > Self::MAX_VLAN {
            return Err(ModelError::invalid_argument(format!(
                "VLAN id {id} exceeds {}",
                Self::MAX_VLAN
            )));
        }
        Ok(Self(id))
    }

    pub const fn to_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NONE => f.write_str("None"),
            Self::ANY => f.write_str("Any"),
            Self(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for VlanId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // `-1` is the numeric spelling of untagged.
        if s.eq_ignore_ascii_case("none") || s == "-1" {
            return Ok(Self::NONE);
        }
        if s.eq_ignore_ascii_case("any") {
            return Ok(Self::ANY);
        }
        let id: u16 = s
            .parse()
            .map_err(|_| ModelError::invalid_argument(format!("invalid VLAN id '{s}'")))?;
        Self::new(id)
    }
}

impl TryFrom<String> for VlanId {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<VlanId> for String {
    fn from(vlan: VlanId) -> Self {
        vlan.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn mac_address_normalizes_dashes() {
        let mac: MacAddress = "AA-BB-CC-DD-EE-FF".parse().unwrap();
        assert_eq!(mac.to_string(), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn mac_address_normalizes_case() {
        let mac: MacAddress = "AA:bb:CC:dd:EE:ff".parse().unwrap();
        assert_eq!(mac.octets(), [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
    }

    #[test]
    fn mac_address_rejects_short_and_long_forms() {
        assert!("aa:bb:cc:dd:ee".parse::<MacAddress>().is_err());
        assert!("aa:bb:cc:dd:ee:ff:00".parse::<MacAddress>().is_err());
        assert!("aa:bb:cc:dd:ee:f".parse::<MacAddress>().is_err());
        assert!("zz:bb:cc:dd:ee:ff".parse::<MacAddress>().is_err());
    }

    #[test]
    fn mac_address_flags() {
        assert!(MacAddress::BROADCAST.is_broadcast());
        assert!(MacAddress::BROADCAST.is_multicast());
        assert!(!MacAddress::ZERO.is_multicast());
    }

    #[test]
    fn vlan_markers_display_and_parse() {
        assert_eq!(VlanId::NONE.to_string(), "None");
        assert_eq!(VlanId::ANY.to_string(), "Any");
        assert_eq!("None".parse::<VlanId>().unwrap(), VlanId::NONE);
        assert_eq!("any".parse::<VlanId>().unwrap(), VlanId::ANY);
        assert_eq!("100".parse::<VlanId>().unwrap().to_u16(), 100);
    }

    #[test]
    fn vlan_minus_one_means_untagged() {
        assert_eq!("-1".parse::<VlanId>().unwrap(), VlanId::NONE);
        assert!("-2".parse::<VlanId>().is_err());
    }

    #[test]
    fn vlan_out_of_range_is_rejected() {
        assert!(matches!(
            "4096".parse::<VlanId>(),
            Err(ModelError::InvalidArgument { .. })
        ));
    }
}
