// ── Provider attribution ──

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Identifies the provider (southbound adapter, discovery agent) that
/// supplied an entity's state.
///
/// Ancillary providers only contribute annotations on top of what a
/// primary provider reports; they never become an entity's owner while a
/// primary provider is present.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProviderId {
    scheme: Cow<'static, str>,
    id: Cow<'static, str>,
    ancillary: bool,
}

impl ProviderId {
    /// Attribution for values not produced by any provider.
    pub const NONE: Self = Self {
        scheme: Cow::Borrowed("none"),
        id: Cow::Borrowed("none"),
        ancillary: false,
    };

    pub fn new(scheme: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            scheme: Cow::Owned(scheme.into()),
            id: Cow::Owned(id.into()),
            ancillary: false,
        }
    }

    pub fn ancillary(scheme: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            ancillary: true,
            ..Self::new(scheme, id)
        }
    }

    /// URI scheme of the devices this provider handles, e.g. `of`.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_ancillary(&self) -> bool {
        self.ancillary
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme, self.id)?;
        if self.ancillary {
            f.write_str(" (ancillary)")?;
        }
        Ok(())
    }
}
