//! The canonical, post-normalization option shape.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::adapter::Adapter;
use crate::hooks::{hook_maps_eq, HookFn, HookMap};

/// One fully-normalized configuration layer.
///
/// The type itself is the normalization marker: holding a
/// `NormalizedOptions` proves the value went through
/// [`normalize`](crate::normalize_options) (or is the canonical empty
/// value), so re-normalizing is a guaranteed no-op rather than a runtime
/// flag check.
///
/// Values are plain data: created fresh per normalize/merge call and not
/// meant to be mutated in place. To layer more configuration on top, merge
/// again instead.
#[derive(Clone, Default)]
pub struct NormalizedOptions {
    /// Execution backend, `None` when none is configured.
    pub adapter: Option<Arc<dyn Adapter>>,
    /// Free-form metadata, shallow-merged across layers.
    pub meta: Map<String, Value>,
    /// Request payload.
    ///
    /// `None` only on the canonical empty value ("no options at all").
    /// Normalizing any real layer produces `Some`: the caller's value, or
    /// an empty object when no payload was supplied. Merging layers that
    /// both lack a payload produces `Some(Value::Null)`.
    pub payload: Option<Value>,
    /// Hook sequences, one per hook name. Every recognized name is
    /// present, possibly empty.
    pub hooks: HookMap,
    /// Execution flags with defaults filled in. `None` only on the
    /// canonical empty value.
    pub options: Option<Map<String, Value>>,
}

impl NormalizedOptions {
    /// The canonical "no options at all" value.
    ///
    /// This is the merge fold's seed: every field is in its "not provided"
    /// state, so merging any layer against it only fills defaults.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The hook sequence for `name`, empty if the name is unknown.
    pub fn hook(&self, name: &str) -> &[HookFn] {
        self.hooks.get(name).map_or(&[], Vec::as_slice)
    }

    /// One execution flag, if set.
    pub fn flag(&self, name: &str) -> Option<&Value> {
        self.options.as_ref()?.get(name)
    }

    /// Whether the request should run at most once. Defaults to `false`.
    pub fn once(&self) -> bool {
        self.flag("once").and_then(Value::as_bool).unwrap_or(false)
    }

    /// Whether the request should run immediately. Defaults to `true`.
    pub fn immediate(&self) -> bool {
        self.flag("immediate")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }
}

/// Structural equality, with adapters and hooks compared by identity.
///
/// Adapters and callables have no structural form, so two normalized
/// values are equal when their data fields match and they reference the
/// same adapter and hook instances.
impl PartialEq for NormalizedOptions {
    fn eq(&self, other: &Self) -> bool {
        adapters_eq(&self.adapter, &other.adapter)
            && self.meta == other.meta
            && self.payload == other.payload
            && self.options == other.options
            && hook_maps_eq(&self.hooks, &other.hooks)
    }
}

fn adapters_eq(a: &Option<Arc<dyn Adapter>>, b: &Option<Arc<dyn Adapter>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        _ => false,
    }
}

impl std::fmt::Debug for NormalizedOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Hooks are opaque; show per-name sequence lengths instead.
        let hooks: std::collections::BTreeMap<&str, usize> = self
            .hooks
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        f.debug_struct("NormalizedOptions")
            .field("adapter", &self.adapter.as_ref().map(|a| a.name()))
            .field("meta", &self.meta)
            .field("payload", &self.payload)
            .field("hooks", &hooks)
            .field("options", &self.options)
            .finish()
    }
}
