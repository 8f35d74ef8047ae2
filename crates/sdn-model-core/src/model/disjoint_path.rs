// ── Disjoint paths ──
//
// A primary/backup pair of paths between the same endpoints. Which side is
// active is part of the value: switching sides yields a new value and
// leaves the original as it was.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::connect_point::ConnectPoint;
use super::element::Provided;
use super::link::Link;
use super::path::Path;
use super::provider::ProviderId;

/// Primary path plus an optional backup, one of which is active.
///
/// Equality and hashing ignore which side is labelled primary and which
/// side is active: `(a, b)` equals `(b, a)`.
#[derive(Debug, Clone)]
pub struct DisjointPath {
    provider_id: ProviderId,
    primary: Path,
    backup: Option<Path>,
    backup_active: bool,
}

impl DisjointPath {
    pub fn new(provider_id: ProviderId, primary: Path, backup: Option<Path>) -> Self {
        Self {
            provider_id,
            primary,
            backup,
            backup_active: false,
        }
    }

    /// The same pair with the other side active, or `None` without a backup.
    #[must_use]
    pub fn use_backup(&self) -> Option<Self> {
        self.backup.as_ref()?;
        Some(Self {
            backup_active: !self.backup_active,
            ..self.clone()
        })
    }

    pub fn primary(&self) -> &Path {
        &self.primary
    }

    pub fn backup(&self) -> Option<&Path> {
        self.backup.as_ref()
    }

    pub fn is_backup_active(&self) -> bool {
        self.backup_active
    }

    /// Currently active side.
    pub fn active(&self) -> &Path {
        match (&self.backup, self.backup_active) {
            (Some(backup), true) => backup,
            _ => &self.primary,
        }
    }

    pub fn links(&self) -> &[Link] {
        self.active().links()
    }

    pub fn cost(&self) -> f64 {
        self.active().cost()
    }

    pub fn src(&self) -> &ConnectPoint {
        self.active().src()
    }

    pub fn dst(&self) -> &ConnectPoint {
        self.active().dst()
    }
}

fn path_hash(path: &Path) -> u64 {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    hasher.finish()
}

impl PartialEq for DisjointPath {
    fn eq(&self, other: &Self) -> bool {
        let same = self.primary == other.primary && self.backup == other.backup;
        let swapped = match (&self.backup, &other.backup) {
            (Some(mine), Some(theirs)) => *mine == other.primary && self.primary == *theirs,
            _ => false,
        };
        same || swapped
    }
}

impl Eq for DisjointPath {}

impl Hash for DisjointPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Order-independent combination of the two sides.
        let primary = path_hash(&self.primary);
        let backup = self.backup.as_ref().map_or(0, path_hash);
        (primary ^ backup).hash(state);
        primary.wrapping_add(backup).hash(state);
    }
}

impl Provided for DisjointPath {
    fn provider_id(&self) -> &ProviderId {
        &self.provider_id
    }
}

impl fmt::Display for DisjointPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.active())?;
        if self.backup_active {
            f.write_str(" [backup]")?;
        }
        Ok(())
    }
}
