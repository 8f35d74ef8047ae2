// ── Port numbers ──
//
// A port number is either a physical port (optionally carrying a display
// name) or one of the reserved logical ports. Logical ports occupy the top
// of the u64 range, i.e. the values -8..=-1 in two's complement.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::ModelError;

/// Reserved logical ports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LogicalPort {
    InPort,
    Table,
    Normal,
    Flood,
    All,
    Controller,
    Local,
    Any,
}

impl LogicalPort {
    /// Raw number of this logical port.
    pub const fn number(self) -> u64 {
        let offset = match self {
            Self::InPort => 7,
            Self::Table => 6,
            Self::Normal => 5,
            Self::Flood => 4,
            Self::All => 3,
            Self::Controller => 2,
            Self::Local => 1,
            Self::Any => 0,
        };
        u64::MAX - offset
    }

    pub fn from_number(number: u64) -> Option<Self> {
        Self::iter().find(|logical| logical.number() == number)
    }
}

/// Port number with an optional display name.
///
/// Equality, ordering and hashing consider only the numeric value; the
/// name is cosmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PortNumber {
    number: u64,
    name: Option<String>,
}

impl PortNumber {
    /// Largest number a physical port may carry.
    pub const MAX_NUMBER: u64 = 0xffff_ffff;

    pub const IN_PORT: Self = Self::logical(LogicalPort::InPort);
    pub const TABLE: Self = Self::logical(LogicalPort::Table);
    pub const NORMAL: Self = Self::logical(LogicalPort::Normal);
    pub const FLOOD: Self = Self::logical(LogicalPort::Flood);
    pub const ALL: Self = Self::logical(LogicalPort::All);
    pub const CONTROLLER: Self = Self::logical(LogicalPort::Controller);
    pub const LOCAL: Self = Self::logical(LogicalPort::Local);
    pub const ANY: Self = Self::logical(LogicalPort::Any);

    pub const fn new(number: u64) -> Self {
        Self { number, name: None }
    }

    pub fn named(number: u64, name: impl Into<String>) -> Self {
        Self {
            number,
            name: Some(name.into()),
        }
    }

    pub const fn logical(port: LogicalPort) -> Self {
        Self::new(port.number())
    }

    pub const fn to_u64(&self) -> u64 {
        self.number
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub const fn is_logical(&self) -> bool {
        self.number > Self::MAX_NUMBER
    }

    pub fn as_logical(&self) -> Option<LogicalPort> {
        if self.is_logical() {
            LogicalPort::from_number(self.number)
        } else {
            None
        }
    }

    fn parse_number(raw: &str, whole: &str) -> Result<u64, ModelError> {
        raw.parse()
            .map_err(|_| ModelError::invalid_argument(format!("invalid port number '{whole}'")))
    }

    /// `[name](number)`
    fn parse_named(s: &str) -> Result<Self, ModelError> {
        let bad = || ModelError::invalid_argument(format!("port '{s}' must be [name](number)"));

        let body = s.strip_prefix('[').ok_or_else(bad)?;
        let body = body.strip_suffix(')').ok_or_else(bad)?;
        let (name, number) = body.rsplit_once("](").ok_or_else(bad)?;
        Ok(Self::named(Self::parse_number(number, s)?, name))
    }
}

impl PartialEq for PortNumber {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number
    }
}

impl Eq for PortNumber {}

impl Hash for PortNumber {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.number.hash(state);
    }
}

impl PartialOrd for PortNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PortNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number.cmp(&other.number)
    }
}

impl From<u64> for PortNumber {
    fn from(number: u64) -> Self {
        Self::new(number)
    }
}

impl From<LogicalPort> for PortNumber {
    fn from(port: LogicalPort) -> Self {
        Self::logical(port)
    }
}

impl fmt::Display for PortNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_logical() {
            return match LogicalPort::from_number(self.number) {
                Some(logical) => logical.fmt(f),
                None => write!(f, "UNKNOWN({})", self.number),
            };
        }
        match &self.name {
            Some(name) => write!(f, "[{name}]({})", self.number),
            None => write!(f, "{}", self.number),
        }
    }
}

impl FromStr for PortNumber {
    type Err = ModelError;

    /// Accepts the three textual forms produced by `Display`: a plain
    /// decimal, `[name](number)`, or a logical token / `UNKNOWN(number)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(first) = s.chars().next() else {
            return Err(ModelError::invalid_argument("empty port number"));
        };

        if first.is_ascii_digit() {
            return Ok(Self::new(Self::parse_number(s, s)?));
        }
        if first == '[' {
            return Self::parse_named(s);
        }
        if let Ok(logical) = s.parse::<LogicalPort>() {
            return Ok(Self::logical(logical));
        }
        if let Some(raw) = s.strip_prefix("UNKNOWN(").and_then(|r| r.strip_suffix(')')) {
            return Ok(Self::new(Self::parse_number(raw, s)?));
        }
        Err(ModelError::invalid_argument(format!(
            "unrecognized port number '{s}'"
        )))
    }
}

impl TryFrom<String> for PortNumber {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PortNumber> for String {
    fn from(port: PortNumber) -> Self {
        port.to_string()
    }
}
