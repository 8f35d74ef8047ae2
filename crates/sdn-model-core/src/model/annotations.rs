// ── Annotations ──
//
// Free-form key/value attributes carried by every entity. Providers send
// `SparseAnnotations` deltas, which may tombstone a key; the store folds
// them into fully resolved `Annotations` with `merge`, and accumulates
// successive deltas from one provider with `union`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ── Annotations ─────────────────────────────────────────────────────

/// Fully resolved annotation set. Never contains tombstones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotations {
    map: BTreeMap<String, String>,
}

impl Annotations {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> AnnotationsBuilder {
        AnnotationsBuilder::default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Apply a delta: tombstoned keys are deleted, every other key in the
    /// delta is set, keys absent from the delta are carried over.
    ///
    /// Applying the same delta twice yields the same result as applying it
    /// once; an empty delta returns `self` unchanged.
    pub fn merge(&self, delta: &SparseAnnotations) -> Self {
        if delta.is_empty() {
            return self.clone();
        }
        let mut map = self.map.clone();
        for (key, value) in &delta.map {
            match value {
                Some(value) => {
                    map.insert(key.clone(), value.clone());
                }
                None => {
                    map.remove(key);
                }
            }
        }
        Self { map }
    }
}

impl fmt::Display for Annotations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str("}")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Annotations {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            map: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ── SparseAnnotations ───────────────────────────────────────────────

/// Annotation delta. A key mapped to `None` is a tombstone: the key is
/// listed by [`keys`](Self::keys) but [`value`](Self::value) reports it
/// absent, and merging the delta deletes it downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SparseAnnotations {
    map: BTreeMap<String, Option<String>>,
}

impl SparseAnnotations {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every key in the delta, tombstoned ones included.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    /// Value for `key`; `None` if never set or tombstoned.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.map.get(key).and_then(Option::as_deref)
    }

    /// True if this delta tombstones `key`.
    pub fn is_removed(&self, key: &str) -> bool {
        matches!(self.map.get(key), Some(None))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Combine two deltas into one that stays sparse.
    ///
    /// Values in `delta` override `self`. A tombstone in `delta` for a key
    /// `self` holds a value for cancels that key out; a tombstone for a key
    /// `self` lacks (or already tombstones) is kept so a later `merge` still
    /// deletes the key.
    pub fn union(&self, delta: &SparseAnnotations) -> Self {
        if delta.is_empty() {
            return self.clone();
        }
        let mut map = self.map.clone();
        for (key, value) in &delta.map {
            match value {
                Some(value) => {
                    map.insert(key.clone(), Some(value.clone()));
                }
                None if matches!(map.get(key), Some(Some(_))) => {
                    map.remove(key);
                }
                None => {
                    map.insert(key.clone(), None);
                }
            }
        }
        Self { map }
    }

    /// Drop tombstones, keeping only keys that carry a value.
    pub fn compress(&self) -> Annotations {
        Annotations {
            map: self
                .map
                .iter()
                .filter_map(|(k, v)| v.as_ref().map(|v| (k.clone(), v.clone())))
                .collect(),
        }
    }
}

impl From<Annotations> for SparseAnnotations {
    fn from(annotations: Annotations) -> Self {
        Self {
            map: annotations
                .map
                .into_iter()
                .map(|(k, v)| (k, Some(v)))
                .collect(),
        }
    }
}

// ── Builder ─────────────────────────────────────────────────────────

/// Accumulates `set` / `remove` directives. For any key the last
/// directive wins.
#[derive(Debug, Clone, Default)]
pub struct AnnotationsBuilder {
    map: BTreeMap<String, Option<String>>,
}

impl AnnotationsBuilder {
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.map.insert(key.into(), Some(value.into()));
        self
    }

    /// Tombstone `key`.
    pub fn remove(mut self, key: impl Into<String>) -> Self {
        self.map.insert(key.into(), None);
        self
    }

    /// Copy every entry of `delta`, tombstones included.
    pub fn put_all(mut self, delta: &SparseAnnotations) -> Self {
        self.map
            .extend(delta.map.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Tombstone-preserving result.
    pub fn build(self) -> SparseAnnotations {
        SparseAnnotations { map: self.map }
    }

    /// Tombstone-free result.
    pub fn build_compressed(self) -> Annotations {
        self.build().compress()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base() -> Annotations {
        [("bw", "10"), ("name", "core-1")].into_iter().collect()
    }

    #[test]
    fn merge_removes_tombstoned_key() {
        let delta = Annotations::builder().remove("bw").build();
        let merged = base().merge(&delta);
        assert_eq!(merged.value("bw"), None);
        assert!(!merged.keys().any(|k| k == "bw"));
        assert_eq!(merged.value("name"), Some("core-1"));
    }

    #[test]
    fn merge_overrides_and_adds() {
        let delta = Annotations::builder()
            .set("bw", "40")
            .set("latency", "3")
            .build();
        let merged = base().merge(&delta);
        assert_eq!(merged.value("bw"), Some("40"));
        assert_eq!(merged.value("latency"), Some("3"));
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn merge_with_empty_delta_is_identity() {
        assert_eq!(base().merge(&SparseAnnotations::empty()), base());
    }

    #[test]
    fn merge_is_idempotent() {
        let delta = Annotations::builder().set("bw", "1").remove("name").build();
        let once = base().merge(&delta);
        assert_eq!(once.merge(&delta), once);
    }

    #[test]
    fn later_delta_wins() {
        let first = Annotations::builder().set("bw", "1").build();
        let second = Annotations::builder().set("bw", "2").build();
        assert_eq!(base().merge(&first).merge(&second).value("bw"), Some("2"));
        assert_eq!(base().merge(&second).merge(&first).value("bw"), Some("1"));
    }

    #[test]
    fn tombstone_is_listed_but_has_no_value() {
        let delta = Annotations::builder().remove("owner").build();
        assert!(delta.keys().any(|k| k == "owner"));
        assert_eq!(delta.value("owner"), None);
        assert!(delta.is_removed("owner"));
    }

    #[test]
    fn union_preserves_tombstone_for_absent_key() {
        let base = Annotations::builder().set("name", "a").build();
        let delta = Annotations::builder().remove("owner").build();
        let joined = base.union(&delta);
        assert!(joined.is_removed("owner"));
        assert_eq!(joined.value("name"), Some("a"));
    }

    #[test]
    fn union_cancels_key_present_in_base() {
        let base = Annotations::builder().set("owner", "ops").build();
        let delta = Annotations::builder().remove("owner").build();
        let joined = base.union(&delta);
        assert!(!joined.keys().any(|k| k == "owner"));
        assert!(!joined.is_removed("owner"));
    }

    #[test]
    fn union_keeps_existing_tombstone() {
        let base = Annotations::builder().remove("owner").build();
        let delta = Annotations::builder().remove("owner").build();
        assert!(base.union(&delta).is_removed("owner"));
    }

    #[test]
    fn builder_last_directive_wins() {
        let sparse = Annotations::builder()
            .set("a", "1")
            .remove("a")
            .set("b", "2")
            .build();
        assert!(sparse.is_removed("a"));

        let compressed = Annotations::builder()
            .remove("a")
            .set("a", "1")
            .remove("b")
            .build_compressed();
        assert_eq!(compressed.value("a"), Some("1"));
        assert!(!compressed.contains_key("b"));
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let a: Annotations = [("x", "1"), ("y", "2")].into_iter().collect();
        let b: Annotations = [("y", "2"), ("x", "1")].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn sparse_serializes_tombstones_as_null() {
        let sparse = Annotations::builder().set("a", "1").remove("b").build();
        let json = serde_json::to_string(&sparse).unwrap();
        assert_eq!(json, r#"{"a":"1","b":null}"#);
        let back: SparseAnnotations = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sparse);
    }

    #[test]
    fn display_lists_entries() {
        assert_eq!(base().to_string(), "{bw=10, name=core-1}");
    }
}
