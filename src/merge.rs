//! Left-to-right folding of option layers.

use serde_json::Value;

use crate::adapter::Adapter;
use crate::error::Result;
use crate::layer::Layer;
use crate::normalize::OptionsConfig;
use crate::normalized::NormalizedOptions;

impl OptionsConfig {
    /// Merge an ordered sequence of layers into one normalized value.
    ///
    /// Each element is resolved (factories invoked once, in order),
    /// normalized, then folded into the accumulator with per-field rules:
    ///
    /// - **adapter** — the later layer wins when it carries one.
    /// - **meta** — shallow merge, later keys win.
    /// - **hooks** — per hook name, earlier entries then later entries.
    /// - **payload** — when both sides carry one, the adapter active at
    ///   this step may combine them via its
    ///   [`PayloadMerge`](crate::PayloadMerge) capability; otherwise the
    ///   later side wins. A single provided side wins outright; neither
    ///   side yields an explicit `null`.
    /// - **options** — the later layer's flag block wins as a whole.
    ///
    /// The fold seeds from [`NormalizedOptions::empty`], so a one-element
    /// sequence degenerates to that element's normalized form.
    ///
    /// # Errors
    ///
    /// Propagates normalization errors from any element, unwrapped.
    ///
    /// # Examples
    ///
    /// ```
    /// use reqopts::{OptionsConfig, RawOptions};
    /// use serde_json::json;
    ///
    /// let config = OptionsConfig::new();
    /// let service = RawOptions::new().with_meta_entry("service", json!("users"));
    /// let call = RawOptions::new()
    ///     .with_meta_entry("trace", json!(true))
    ///     .with_payload(json!({ "id": 7 }));
    ///
    /// let merged = config.merge([service.into(), call.into()])?;
    /// assert_eq!(merged.meta.get("service"), Some(&json!("users")));
    /// assert_eq!(merged.meta.get("trace"), Some(&json!(true)));
    /// assert_eq!(merged.payload, Some(json!({ "id": 7 })));
    /// # Ok::<(), reqopts::OptionsError>(())
    /// ```
    pub fn merge<I>(&self, layers: I) -> Result<NormalizedOptions>
    where
        I: IntoIterator<Item = Layer>,
    {
        let mut acc = NormalizedOptions::empty();
        let mut depth = 0usize;
        for layer in layers {
            let next = self.normalize(layer)?;
            acc = combine(acc, next);
            depth += 1;
        }
        tracing::debug!(layers = depth, "merged option layers");
        Ok(acc)
    }
}

/// One pairwise merge step.
fn combine(acc: NormalizedOptions, next: NormalizedOptions) -> NormalizedOptions {
    let adapter = next.adapter.or(acc.adapter);

    let mut meta = acc.meta;
    for (key, value) in next.meta {
        meta.insert(key, value);
    }

    let mut hooks = acc.hooks;
    for (name, entries) in next.hooks {
        hooks.entry(name).or_default().extend(entries);
    }

    let payload = merge_payloads(adapter.as_deref(), acc.payload, next.payload);
    let options = next.options.or(acc.options);

    NormalizedOptions {
        adapter,
        meta,
        payload,
        hooks,
        options,
    }
}

/// Whether a payload value actually carries data.
///
/// `null` and the empty object both mean "nothing supplied": the former is
/// the explicit merged-from-nothing marker, the latter what normalization
/// fills for a layer without payload keys.
fn is_provided(payload: &Value) -> bool {
    match payload {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

fn merge_payloads(
    adapter: Option<&dyn Adapter>,
    previous: Option<Value>,
    next: Option<Value>,
) -> Option<Value> {
    let previous = previous.filter(is_provided);
    let next = next.filter(is_provided);
    match (previous, next) {
        (Some(previous), Some(next)) => {
            let merged = match adapter.and_then(Adapter::payload_merge) {
                Some(custom) => custom.merge(&previous, &next),
                None => next,
            };
            Some(merged)
        },
        (Some(previous), None) => Some(previous),
        (None, Some(next)) => Some(next),
        (None, None) => Some(Value::Null),
    }
}
