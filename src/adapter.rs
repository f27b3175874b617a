//! The adapter collaborator interface.
//!
//! An adapter is the execution backend attached to an option layer. This
//! crate never drives the backend itself; it only inspects one optional
//! capability, [`Adapter::payload_merge`], which lets the adapter active at
//! a merge step define how two payloads combine (request-body composition,
//! deep merge, numeric accumulation, and so on).

use serde_json::Value;

/// A pluggable execution backend reference.
///
/// Transport and request execution live elsewhere; from this crate's point
/// of view an adapter is opaque except for an optional payload-merge
/// capability. The default implementation declares no capability, which
/// keeps plain adapters a one-line impl.
///
/// # Examples
///
/// ```
/// use reqopts::{Adapter, PayloadMerge};
/// use serde_json::{json, Value};
///
/// /// Backend with no custom merge behavior.
/// struct HttpAdapter;
///
/// impl Adapter for HttpAdapter {
///     fn name(&self) -> &str {
///         "http"
///     }
/// }
///
/// /// Backend that sums numeric payloads across layers.
/// struct CounterAdapter;
///
/// struct SumPayloads;
///
/// impl PayloadMerge for SumPayloads {
///     fn merge(&self, previous: &Value, next: &Value) -> Value {
///         json!(previous.as_i64().unwrap_or(0) + next.as_i64().unwrap_or(0))
///     }
/// }
///
/// impl Adapter for CounterAdapter {
///     fn name(&self) -> &str {
///         "counter"
///     }
///
///     fn payload_merge(&self) -> Option<&dyn PayloadMerge> {
///         Some(&SumPayloads)
///     }
/// }
///
/// assert!(HttpAdapter.payload_merge().is_none());
/// assert!(CounterAdapter.payload_merge().is_some());
/// ```
pub trait Adapter: Send + Sync {
    /// Short backend name, used in diagnostics only.
    fn name(&self) -> &str;

    /// Adapter-defined payload combination.
    ///
    /// Return `Some` to replace the default last-writer-wins payload policy
    /// for merge steps where this adapter is active. The capability is
    /// re-queried at every pairwise step, so the adapter carried forward
    /// through a fold keeps combining subsequent payloads.
    fn payload_merge(&self) -> Option<&dyn PayloadMerge> {
        None
    }
}

/// Domain-specific combination of two payloads from adjacent layers.
pub trait PayloadMerge: Send + Sync {
    /// Combine the accumulated payload with the next layer's payload.
    ///
    /// Called only when both sides actually carry a payload; single-sided
    /// and empty cases are resolved before the capability is consulted.
    fn merge(&self, previous: &Value, next: &Value) -> Value;
}
