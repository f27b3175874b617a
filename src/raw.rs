//! Raw, pre-normalization option values.
//!
//! A [`RawOptions`] is one partial, caller-shaped configuration layer. It
//! can be assembled through builder methods or classified out of a raw
//! JSON object via [`RawOptions::from_value`], where reserved field names
//! are routed to their named slots and everything else becomes payload.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::adapter::Adapter;
use crate::error::{json_type_name, OptionsError, Result};
use crate::hooks::{HookEntry, HookFn, HookInput};

/// Top-level field names claimed by the canonical shape.
///
/// During classification these route to named slots; nested occurrences
/// inside a payload trigger the advisory collision warning.
pub(crate) const RESERVED_KEYS: [&str; 4] = ["adapter", "meta", "hooks", "options"];

/// One partial request-option layer, before normalization.
///
/// Every slot is optional: an absent slot means "not supplied" and lets
/// the static defaults win during normalization. Values are cheap to clone
/// (adapters and hooks are reference-counted).
///
/// # Examples
///
/// ```
/// use reqopts::RawOptions;
/// use serde_json::json;
///
/// let raw = RawOptions::new()
///     .with_meta_entry("service", json!("users"))
///     .with_hook("before", |_state| {})
///     .with_payload(json!({ "id": 7 }));
///
/// assert!(raw.adapter.is_none());
/// assert_eq!(raw.payload, Some(json!({ "id": 7 })));
/// ```
#[derive(Clone, Default)]
pub struct RawOptions {
    /// Execution backend for this layer, if any.
    pub adapter: Option<Arc<dyn Adapter>>,
    /// Free-form metadata.
    pub meta: Option<Map<String, Value>>,
    /// Lifecycle hook slots, keyed by hook name.
    pub hooks: Option<HashMap<String, HookInput>>,
    /// Execution flags (e.g. `once`, `immediate`).
    pub options: Option<Map<String, Value>>,
    /// Request payload. May be any JSON value, not just an object.
    pub payload: Option<Value>,
}

impl RawOptions {
    /// Create an empty layer. Equivalent to `RawOptions::default()`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the execution backend for this layer.
    pub fn with_adapter(self, adapter: impl Adapter + 'static) -> Self {
        self.with_shared_adapter(Arc::new(adapter))
    }

    /// Set an already-shared execution backend for this layer.
    ///
    /// Useful when the same adapter instance backs several layers and the
    /// caller wants them to compare identical after merging.
    pub fn with_shared_adapter(mut self, adapter: Arc<dyn Adapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// Replace the metadata map wholesale.
    pub fn with_meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Insert one metadata entry.
    pub fn with_meta_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }

    /// Append one callback to a hook slot.
    ///
    /// The first callback on a name is stored as a bare entry (which
    /// normalization coerces to a one-element sequence); subsequent calls
    /// extend it into an explicit sequence, preserving insertion order.
    pub fn with_hook<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Value) + Send + Sync + 'static,
    {
        self.push_hook_entry(name.into(), HookEntry::callback(f))
    }

    /// Replace a hook slot with an explicit ordered sequence of callables.
    pub fn with_hooks<I>(mut self, name: impl Into<String>, hooks: I) -> Self
    where
        I: IntoIterator<Item = HookFn>,
    {
        let entries = hooks.into_iter().map(HookEntry::Callback).collect();
        self.hooks
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), HookInput::List(entries));
        self
    }

    /// Replace a hook slot with an arbitrary raw input.
    ///
    /// Exists for callers that assemble hook slots from dynamic sources;
    /// [`HookEntry::Data`] entries will fail normalization.
    pub fn with_hook_input(mut self, name: impl Into<String>, input: HookInput) -> Self {
        self.hooks
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), input);
        self
    }

    /// Set one execution flag.
    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }

    /// Replace the payload wholesale.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Insert one entry into an object payload.
    ///
    /// If the current payload is a non-object value it is kept and the
    /// entry is dropped with a warning; replace it with
    /// [`with_payload`](Self::with_payload) instead.
    pub fn with_payload_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        match self.payload.get_or_insert_with(|| Value::Object(Map::new())) {
            Value::Object(map) => {
                map.insert(key.into(), value);
            },
            other => {
                tracing::warn!(
                    payload_type = json_type_name(other),
                    "payload entry dropped: payload is not an object"
                );
            },
        }
        self
    }

    fn push_hook_entry(mut self, name: String, entry: HookEntry) -> Self {
        let hooks = self.hooks.get_or_insert_with(HashMap::new);
        match hooks.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(HookInput::Single(entry));
            },
            Entry::Occupied(mut slot) => {
                let input = slot.get_mut();
                let placeholder = HookInput::List(Vec::new());
                let mut entries = std::mem::replace(input, placeholder).into_entries();
                entries.push(entry);
                *input = HookInput::List(entries);
            },
        }
        self
    }

    /// Classify a raw JSON object into an options layer.
    ///
    /// Reserved keys (`adapter`, `meta`, `hooks`, `options`, `payload`) are
    /// routed to their named slots; every other key becomes a payload
    /// entry. `null` reserved values count as "not supplied".
    ///
    /// JSON cannot carry callables or backend references, so:
    /// - hook slots classified here hold plain data and will fail
    ///   normalization with [`OptionsError::HookNotCallable`];
    /// - a non-null `adapter` value is ignored with a warning (attach
    ///   adapters via [`with_adapter`](Self::with_adapter)).
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::InvalidRawValue`] when the value itself, or
    /// one of `meta`, `hooks`, `options`, is not a JSON object.
    ///
    /// # Examples
    ///
    /// ```
    /// use reqopts::RawOptions;
    /// use serde_json::json;
    ///
    /// let raw = RawOptions::from_value(json!({
    ///     "meta": { "service": "users" },
    ///     "id": 7,
    ///     "verbose": true,
    /// }))?;
    ///
    /// assert_eq!(raw.payload, Some(json!({ "id": 7, "verbose": true })));
    /// assert_eq!(raw.meta.unwrap().get("service"), Some(&json!("users")));
    /// # Ok::<(), reqopts::OptionsError>(())
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        let object = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) => map,
            other => {
                return Err(OptionsError::InvalidRawValue {
                    field: "options",
                    expected: "a JSON object",
                    found: json_type_name(&other),
                })
            },
        };

        let mut raw = Self::default();
        let mut loose = Map::new();
        for (key, value) in object {
            match key.as_str() {
                "adapter" => {
                    if !matches!(value, Value::Null | Value::Bool(false)) {
                        tracing::warn!(
                            value_type = json_type_name(&value),
                            "adapter in raw JSON options ignored; attach adapters through the builder"
                        );
                    }
                },
                "meta" => raw.meta = classify_object("meta", value)?,
                "options" => raw.options = classify_object("options", value)?,
                "hooks" => {
                    if let Some(map) = classify_object("hooks", value)? {
                        let mut hooks = HashMap::with_capacity(map.len());
                        for (name, slot) in map {
                            let input = match slot {
                                Value::Array(items) => {
                                    HookInput::List(items.into_iter().map(HookEntry::Data).collect())
                                },
                                single => HookInput::Single(HookEntry::Data(single)),
                            };
                            hooks.insert(name, input);
                        }
                        raw.hooks = Some(hooks);
                    }
                },
                "payload" => {
                    if !value.is_null() {
                        raw.payload = Some(value);
                    }
                },
                _ => {
                    loose.insert(key, value);
                },
            }
        }

        raw.payload = match (raw.payload, loose) {
            (None, loose) => Some(Value::Object(loose)),
            (Some(explicit), loose) if loose.is_empty() => Some(explicit),
            (Some(Value::Object(mut explicit)), loose) => {
                // Explicit payload entries win over loose top-level keys.
                for (key, value) in loose {
                    explicit.entry(key).or_insert(value);
                }
                Some(Value::Object(explicit))
            },
            (Some(explicit), loose) => {
                tracing::warn!(
                    dropped = loose.len(),
                    "loose option keys dropped: explicit payload is not an object"
                );
                Some(explicit)
            },
        };
        if raw.payload == Some(Value::Object(Map::new())) {
            raw.payload = None;
        }

        Ok(raw)
    }
}

fn classify_object(field: &'static str, value: Value) -> Result<Option<Map<String, Value>>> {
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        other => Err(OptionsError::InvalidRawValue {
            field,
            expected: "a JSON object",
            found: json_type_name(&other),
        }),
    }
}

impl fmt::Debug for RawOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawOptions")
            .field("adapter", &self.adapter.as_ref().map(|a| a.name()))
            .field("meta", &self.meta)
            .field("hooks", &self.hooks)
            .field("options", &self.options)
            .field("payload", &self.payload)
            .finish()
    }
}
