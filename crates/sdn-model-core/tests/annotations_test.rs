#![allow(clippy::unwrap_used)]
// Property tests for annotation merge, union and the builder.

use std::collections::BTreeMap;

use proptest::prelude::*;

use sdn_model_core::model::AnnotationsBuilder;
use sdn_model_core::{Annotations, SparseAnnotations};

// ── Strategies ──────────────────────────────────────────────────────

fn arb_key() -> impl Strategy<Value = String> {
    "k[0-4]"
}

fn arb_annotations() -> impl Strategy<Value = Annotations> {
    prop::collection::btree_map(arb_key(), "[a-c]{1,2}", 0..5)
        .prop_map(|map| map.into_iter().collect())
}

fn arb_delta() -> impl Strategy<Value = SparseAnnotations> {
    prop::collection::btree_map(arb_key(), prop::option::of("[a-c]{1,2}"), 0..5)
        .prop_map(|map| build(&map))
}

fn build(map: &BTreeMap<String, Option<String>>) -> SparseAnnotations {
    map.iter()
        .fold(Annotations::builder(), |b, (k, v)| match v {
            Some(v) => b.set(k, v),
            None => b.remove(k),
        })
        .build()
}

// ── Properties ──────────────────────────────────────────────────────

proptest! {
    /// Applying a delta twice is the same as applying it once.
    #[test]
    fn prop_merge_is_idempotent(base in arb_annotations(), delta in arb_delta()) {
        let once = base.merge(&delta);
        prop_assert_eq!(once.merge(&delta), once);
    }

    /// An empty delta leaves the base unchanged.
    #[test]
    fn prop_empty_delta_is_identity(base in arb_annotations()) {
        prop_assert_eq!(base.merge(&SparseAnnotations::empty()), base);
    }

    /// Every value in the delta lands; every tombstoned key is gone;
    /// every key the delta does not mention is carried over.
    #[test]
    fn prop_merge_applies_delta(base in arb_annotations(), delta in arb_delta()) {
        let merged = base.merge(&delta);
        for key in delta.keys() {
            prop_assert_eq!(merged.value(key), delta.value(key));
        }
        for (key, value) in base.iter() {
            if !delta.keys().any(|k| k == key) {
                prop_assert_eq!(merged.value(key), Some(value));
            }
        }
    }

    /// Later values in a union override earlier ones.
    #[test]
    fn prop_union_prefers_later_values(first in arb_delta(), second in arb_delta()) {
        let combined = first.union(&second);
        for key in second.keys() {
            if let Some(value) = second.value(key) {
                prop_assert_eq!(combined.value(key), Some(value));
            } else {
                prop_assert_eq!(combined.value(key), None);
            }
        }
    }

    /// Sequential merges of tombstone-free deltas equal one merge of their union.
    #[test]
    fn prop_union_of_values_composes(
        base in arb_annotations(),
        first in arb_annotations(),
        second in arb_annotations(),
    ) {
        let first = SparseAnnotations::from(first);
        let second = SparseAnnotations::from(second);
        prop_assert_eq!(
            base.merge(&first).merge(&second),
            base.merge(&first.union(&second))
        );
    }

    /// Compressing never leaves a tombstone behind.
    #[test]
    fn prop_compress_drops_tombstones(delta in arb_delta()) {
        let compressed = delta.compress();
        for key in compressed.keys() {
            prop_assert!(delta.value(key).is_some());
        }
        prop_assert_eq!(
            compressed.len(),
            delta.keys().filter(|k| !delta.is_removed(k)).count()
        );
    }
}

// ── Examples ────────────────────────────────────────────────────────

#[test]
fn merge_example_from_provider_update() {
    let base: Annotations = [("name", "sw1"), ("owner", "ops")].into_iter().collect();
    let delta = Annotations::builder()
        .set("name", "core-1")
        .remove("owner")
        .set("rackAddress", "R7")
        .build();

    let merged = base.merge(&delta);
    let expected: Annotations = [("name", "core-1"), ("rackAddress", "R7")]
        .into_iter()
        .collect();
    assert_eq!(merged, expected);
}

#[test]
fn builder_last_directive_wins() {
    let removed = AnnotationsBuilder::default().set("a", "1").remove("a").build();
    assert!(removed.is_removed("a"));

    let restored = AnnotationsBuilder::default().remove("a").set("a", "2").build();
    assert_eq!(restored.value("a"), Some("2"));
}

#[test]
fn union_cancels_a_value_then_tombstone() {
    let earlier = Annotations::builder().set("a", "1").build();
    let later = Annotations::builder().remove("a").remove("b").build();

    let combined = earlier.union(&later);
    assert!(!combined.keys().any(|k| k == "a"));
    assert!(combined.is_removed("b"));
}
