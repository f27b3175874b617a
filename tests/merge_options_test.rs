//! Tests for multi-layer option merging.
//!
//! These tests verify that:
//! 1. Later layers win for adapters, payloads, and flag blocks
//! 2. Metadata shallow-merges and hook sequences concatenate in order
//! 3. An adapter's payload-merge capability drives the whole fold
//! 4. Factory layers resolve exactly once, in sequence order

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use reqopts::{
    merge_options, Adapter, Layer, NormalizedOptions, OptionsConfig, PayloadMerge, RawOptions,
};
use serde_json::{json, Map, Value};

struct Plain;

impl Adapter for Plain {
    fn name(&self) -> &str {
        "plain"
    }
}

struct TakeNext;

struct NextWins;

impl PayloadMerge for NextWins {
    fn merge(&self, _previous: &Value, next: &Value) -> Value {
        next.clone()
    }
}

impl Adapter for TakeNext {
    fn name(&self) -> &str {
        "take-next"
    }

    fn payload_merge(&self) -> Option<&dyn PayloadMerge> {
        Some(&NextWins)
    }
}

struct Summing;

struct Sum;

impl PayloadMerge for Sum {
    fn merge(&self, previous: &Value, next: &Value) -> Value {
        json!(previous.as_i64().unwrap_or(0) + next.as_i64().unwrap_or(0))
    }
}

impl Adapter for Summing {
    fn name(&self) -> &str {
        "summing"
    }

    fn payload_merge(&self) -> Option<&dyn PayloadMerge> {
        Some(&Sum)
    }
}

fn layer(raw: RawOptions) -> Layer {
    raw.into()
}

mod adapters {
    use super::*;

    #[test]
    fn none_provided_yields_none() {
        let merged = merge_options([layer(RawOptions::new()), layer(RawOptions::new())]).unwrap();
        assert!(merged.adapter.is_none());
    }

    #[test]
    fn only_first_provided_keeps_the_first() {
        let first: Arc<dyn Adapter> = Arc::new(Plain);
        let merged = merge_options([
            layer(RawOptions::new().with_shared_adapter(first.clone())),
            layer(RawOptions::new()),
        ])
        .unwrap();
        assert!(Arc::ptr_eq(merged.adapter.as_ref().unwrap(), &first));
    }

    #[test]
    fn only_second_provided_takes_the_second() {
        let second: Arc<dyn Adapter> = Arc::new(Plain);
        let merged = merge_options([
            layer(RawOptions::new()),
            layer(RawOptions::new().with_shared_adapter(second.clone())),
        ])
        .unwrap();
        assert!(Arc::ptr_eq(merged.adapter.as_ref().unwrap(), &second));
    }

    #[test]
    fn both_provided_takes_the_second() {
        let first: Arc<dyn Adapter> = Arc::new(Plain);
        let second: Arc<dyn Adapter> = Arc::new(Plain);
        let merged = merge_options([
            layer(RawOptions::new().with_shared_adapter(first)),
            layer(RawOptions::new().with_shared_adapter(second.clone())),
        ])
        .unwrap();
        assert!(Arc::ptr_eq(merged.adapter.as_ref().unwrap(), &second));
    }
}

mod payloads {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn none_provided_yields_null() {
        let merged = merge_options([layer(RawOptions::new()), layer(RawOptions::new())]).unwrap();
        assert_eq!(merged.payload, Some(Value::Null));
    }

    #[test]
    fn only_first_provided_keeps_the_first() {
        let merged = merge_options([
            layer(RawOptions::new().with_payload(json!(1))),
            layer(RawOptions::new()),
        ])
        .unwrap();
        assert_eq!(merged.payload, Some(json!(1)));
    }

    #[test]
    fn only_second_provided_takes_the_second() {
        let merged = merge_options([
            layer(RawOptions::new()),
            layer(RawOptions::new().with_payload(json!(1))),
        ])
        .unwrap();
        assert_eq!(merged.payload, Some(json!(1)));
    }

    #[test]
    fn newest_adapter_merge_capability_is_preferred() {
        let merged = merge_options([
            layer(RawOptions::new().with_adapter(TakeNext).with_payload(json!(1))),
            layer(RawOptions::new().with_adapter(Summing).with_payload(json!(2))),
        ])
        .unwrap();
        assert_eq!(merged.payload, Some(json!(3)));
    }

    #[test]
    fn without_a_capability_the_second_wins() {
        let merged = merge_options([
            layer(RawOptions::new().with_payload(json!(1))),
            layer(RawOptions::new().with_payload(json!(2))),
        ])
        .unwrap();
        assert_eq!(merged.payload, Some(json!(2)));
    }
}

#[test]
fn meta_merges_shallowly_with_later_keys_winning() {
    let merged = merge_options([
        layer(RawOptions::new().with_meta_entry("a", json!(1)).with_meta_entry("b", json!(2))),
        layer(RawOptions::new().with_meta_entry("a", json!(2)).with_meta_entry("c", json!(2))),
    ])
    .unwrap();
    let mut expected = Map::new();
    expected.insert("a".to_string(), json!(2));
    expected.insert("b".to_string(), json!(2));
    expected.insert("c".to_string(), json!(2));
    assert_eq!(merged.meta, expected);
}

mod hooks {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lifecycle_config() -> OptionsConfig {
        OptionsConfig::new().with_hook_names(["before", "resolve", "reject"])
    }

    #[test]
    fn none_provided_yields_the_default_slots() {
        let merged = lifecycle_config()
            .merge([layer(RawOptions::new()), layer(RawOptions::new())])
            .unwrap();
        assert_eq!(merged.hooks.len(), 3);
        for name in ["before", "resolve", "reject"] {
            assert!(merged.hook(name).is_empty());
        }
    }

    #[test]
    fn a_single_side_passes_through_normalized() {
        let merged = lifecycle_config()
            .merge([
                layer(RawOptions::new().with_hook("before", |_| {})),
                layer(RawOptions::new()),
            ])
            .unwrap();
        assert_eq!(merged.hook("before").len(), 1);
        assert!(merged.hook("resolve").is_empty());
        assert!(merged.hook("reject").is_empty());
    }

    #[test]
    fn both_sides_concatenate_in_layer_order() {
        let first_before = Arc::new(|_: &mut Value| {}) as reqopts::HookFn;
        let second_before = Arc::new(|_: &mut Value| {}) as reqopts::HookFn;
        let merged = lifecycle_config()
            .merge([
                layer(
                    RawOptions::new()
                        .with_hooks("before", [first_before.clone()])
                        .with_hook("resolve", |_| {}),
                ),
                layer(
                    RawOptions::new()
                        .with_hooks("before", [second_before.clone()])
                        .with_hook("reject", |_| {}),
                ),
            ])
            .unwrap();
        let before = merged.hook("before");
        assert_eq!(before.len(), 2);
        assert!(Arc::ptr_eq(&before[0], &first_before));
        assert!(Arc::ptr_eq(&before[1], &second_before));
        assert_eq!(merged.hook("resolve").len(), 1);
        assert_eq!(merged.hook("reject").len(), 1);
    }
}

#[test]
fn merges_more_than_two_layers() {
    let adapter: Arc<dyn Adapter> = Arc::new(Summing);
    let merged = merge_options([
        layer(
            RawOptions::new()
                .with_shared_adapter(adapter.clone())
                .with_payload(json!(1))
                .with_hook("before", |_| {}),
        ),
        layer(RawOptions::new().with_payload(json!(2)).with_hook("before", |_| {})),
        layer(RawOptions::new().with_payload(json!(3)).with_hook("done", |_| {})),
    ])
    .unwrap();

    assert!(Arc::ptr_eq(merged.adapter.as_ref().unwrap(), &adapter));
    assert_eq!(merged.payload, Some(json!(6)));
    assert_eq!(merged.meta, Map::new());
    assert_eq!(merged.hook("before").len(), 2);
    assert_eq!(merged.hook("done").len(), 1);
    assert!(merged.hook("fail").is_empty());
}

#[test]
fn factories_resolve_once_each_in_order() {
    let calls = Arc::new(AtomicUsize::new(0));
    let first_calls = calls.clone();
    let second_calls = calls.clone();

    let merged = merge_options([
        Layer::factory(move || {
            first_calls.fetch_add(1, Ordering::SeqCst);
            RawOptions::new().with_payload(json!("payload")).into()
        }),
        Layer::factory(move || {
            second_calls.fetch_add(1, Ordering::SeqCst);
            RawOptions::new().with_payload(json!("test")).into()
        }),
    ])
    .unwrap();

    assert_eq!(merged.payload, Some(json!("test")));
    assert!(merged.adapter.is_none());
    assert_eq!(merged.meta, Map::new());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn single_layer_merge_degenerates_to_its_normalized_form() {
    let build = || RawOptions::new().with_payload(json!({ "id": 7 })).with_hook("before", |_| {});
    let merged = merge_options([layer(build())]).unwrap();
    // Hook identities differ between the two builds; compare the data
    // fields and sequence shapes instead.
    let normalized = reqopts::normalize_options(build()).unwrap();
    assert_eq!(merged.payload, normalized.payload);
    assert_eq!(merged.meta, normalized.meta);
    assert_eq!(merged.options, normalized.options);
    assert_eq!(merged.hook("before").len(), normalized.hook("before").len());
}

#[test]
fn all_empty_layers_collapse_to_the_documented_shape() {
    let merged = merge_options([layer(RawOptions::new()), layer(RawOptions::new())]).unwrap();
    assert!(merged.adapter.is_none());
    assert_eq!(merged.payload, Some(Value::Null));
    assert_eq!(merged.meta, Map::new());
    for name in reqopts::DEFAULT_HOOK_NAMES {
        assert!(merged.hook(name).is_empty());
    }
}

#[test]
fn a_previous_merge_result_can_be_layered_again() {
    let base = merge_options([layer(RawOptions::new().with_meta_entry("service", json!("users")))])
        .unwrap();
    let merged = merge_options([
        Layer::from(base),
        layer(RawOptions::new().with_payload(json!({ "id": 7 }))),
    ])
    .unwrap();
    assert_eq!(merged.meta.get("service"), Some(&json!("users")));
    assert_eq!(merged.payload, Some(json!({ "id": 7 })));
}

#[test]
fn validation_errors_propagate_unwrapped() {
    let bad = RawOptions::from_value(json!({ "hooks": { "before": [42] } })).unwrap();
    let err = merge_options([layer(RawOptions::new()), layer(bad)]).unwrap_err();
    assert!(matches!(
        err,
        reqopts::OptionsError::HookNotCallable { ref hook, index: 0 } if hook == "before"
    ));
}

#[test]
fn merging_against_the_empty_value_changes_nothing() {
    let options = reqopts::normalize_options(
        RawOptions::new().with_payload(json!({ "id": 7 })).with_meta_entry("a", json!(1)),
    )
    .unwrap();
    let merged = merge_options([
        Layer::from(NormalizedOptions::empty()),
        Layer::from(options.clone()),
    ])
    .unwrap();
    assert_eq!(merged, options);
}
