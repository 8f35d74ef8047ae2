// ── Paths ──
//
// A path is a non-empty chain of links, each link's destination being the
// next link's source, together with the weight the path computation
// assigned to it.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::connect_point::ConnectPoint;
use super::element::Provided;
use super::link::Link;
use super::provider::ProviderId;
use crate::error::ModelError;

/// Opaque path weight. Only its scalar value takes part in comparisons.
pub trait Weight: fmt::Debug + Send + Sync {
    /// Scalar cost.
    fn value(&self) -> f64;

    /// Whether a path with this weight may be used at all.
    fn is_viable(&self) -> bool {
        self.value().is_finite()
    }

    fn is_negative(&self) -> bool {
        self.value() < 0.0
    }
}

/// Plain numeric weight.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ScalarWeight(f64);

impl ScalarWeight {
    /// Weight of a path that must never be chosen.
    pub const NON_VIABLE: Self = Self(f64::INFINITY);

    pub const fn new(value: f64) -> Self {
        Self(value)
    }
}

impl Weight for ScalarWeight {
    fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for ScalarWeight {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

/// Chained sequence of links with a cost.
///
/// Equality and hashing consider the links only.
#[derive(Debug, Clone)]
pub struct Path {
    provider_id: ProviderId,
    src: ConnectPoint,
    dst: ConnectPoint,
    links: Vec<Link>,
    weight: Arc<dyn Weight>,
}

impl Path {
    /// Build a path, rejecting an empty link list or a broken chain.
    pub fn new(
        provider_id: ProviderId,
        links: Vec<Link>,
        weight: impl Weight + 'static,
    ) -> Result<Self, ModelError> {
        let (Some(first), Some(last)) = (links.first(), links.last()) else {
            return Err(ModelError::invalid_argument("path requires at least one link"));
        };
        let (src, dst) = (first.src().clone(), last.dst().clone());
        if let Some((index, pair)) = links
            .windows(2)
            .enumerate()
            .find(|(_, pair)| pair[0].dst() != pair[1].src())
        {
            return Err(ModelError::invalid_argument(format!(
                "links {index} and {} are not chained: {} != {}",
                index + 1,
                pair[0].dst(),
                pair[1].src()
            )));
        }
        Ok(Self {
            provider_id,
            src,
            dst,
            links,
            weight: Arc::new(weight),
        })
    }

    /// Path with a plain numeric cost.
    pub fn with_cost(
        provider_id: ProviderId,
        links: Vec<Link>,
        cost: f64,
    ) -> Result<Self, ModelError> {
        Self::new(provider_id, links, ScalarWeight::new(cost))
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn cost(&self) -> f64 {
        self.weight.value()
    }

    pub fn weight(&self) -> &dyn Weight {
        self.weight.as_ref()
    }

    /// Source of the first link.
    pub fn src(&self) -> &ConnectPoint {
        &self.src
    }

    /// Destination of the last link.
    pub fn dst(&self) -> &ConnectPoint {
        &self.dst
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Always false: a path holds at least one link.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.links == other.links
    }
}

impl Eq for Path {}

impl Hash for Path {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.links.hash(state);
    }
}

impl Provided for Path {
    fn provider_id(&self) -> &ProviderId {
        &self.provider_id
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.src())?;
        for link in &self.links {
            write!(f, " -> {}", link.dst())?;
        }
        write!(f, " (cost {})", self.cost())
    }
}
