//! Layered request-option normalization and merging for pluggable request
//! pipelines.
//!
//! Callers assembling a request often hold several partial configuration
//! layers: a service-wide base, a per-endpoint override, a call-site
//! tweak. Each layer describes an execution backend ([`Adapter`]),
//! lifecycle hooks, free-form metadata, execution flags, and a payload.
//! This crate does two things with those layers:
//!
//! - **Normalize** one raw layer into the canonical
//!   [`NormalizedOptions`] shape, filling defaults and validating hooks.
//!   Normalization is idempotent by construction: raw and normalized
//!   values are distinct types, and normalized input passes through
//!   unchanged.
//! - **Merge** an ordered sequence of layers (or zero-argument factories
//!   producing them) left-to-right into one normalized result, with
//!   per-field rules: later adapters and payloads win, metadata
//!   shallow-merges, hook sequences concatenate, and an adapter may
//!   override payload combination through its
//!   [`PayloadMerge`] capability.
//!
//! Hook invocation, transport, and scheduling are the surrounding
//! pipeline's concern; this crate is a pure, synchronous computation from
//! layers to one value.
//!
//! # Examples
//!
//! ```
//! use reqopts::{merge_options, RawOptions};
//! use serde_json::json;
//!
//! let service = RawOptions::new()
//!     .with_meta_entry("service", json!("users"))
//!     .with_hook("before", |_state| { /* auth header */ });
//! let call = RawOptions::new()
//!     .with_hook("before", |_state| { /* request id */ })
//!     .with_payload(json!({ "id": 7 }));
//!
//! let merged = merge_options([service.into(), call.into()])?;
//! assert_eq!(merged.meta.get("service"), Some(&json!("users")));
//! assert_eq!(merged.hook("before").len(), 2);
//! assert_eq!(merged.payload, Some(json!({ "id": 7 })));
//! # Ok::<(), reqopts::OptionsError>(())
//! ```
//!
//! # Module Organization
//!
//! - [`raw`] - Caller-shaped layers and JSON classification
//! - [`normalized`] - The canonical shape
//! - [`normalize`] - The normalizer and its shared [`OptionsConfig`]
//! - [`merge`] - The left-to-right fold
//! - [`adapter`] - The adapter collaborator traits
//! - [`hooks`] - Hook value shapes
//! - [`error`] - Error types

pub mod adapter;
pub mod error;
pub mod hooks;
pub mod layer;
pub mod merge;
pub mod normalize;
pub mod normalized;
pub mod raw;

pub use adapter::{Adapter, PayloadMerge};
pub use error::{OptionsError, Result};
pub use hooks::{HookEntry, HookFn, HookInput, HookMap};
pub use layer::Layer;
pub use normalize::{OptionsConfig, DEFAULT_HOOK_NAMES};
pub use normalized::NormalizedOptions;
pub use raw::RawOptions;

/// Normalize one layer with the default [`OptionsConfig`].
///
/// # Errors
///
/// See [`OptionsConfig::normalize`].
///
/// # Examples
///
/// ```
/// use reqopts::{normalize_options, RawOptions};
/// use serde_json::json;
///
/// let normalized = normalize_options(RawOptions::new().with_payload(json!({ "q": "rust" })))?;
/// assert_eq!(normalized.payload, Some(json!({ "q": "rust" })));
/// assert!(normalized.immediate());
/// # Ok::<(), reqopts::OptionsError>(())
/// ```
pub fn normalize_options(layer: impl Into<Layer>) -> Result<NormalizedOptions> {
    OptionsConfig::new().normalize(layer)
}

/// Merge a sequence of layers with the default [`OptionsConfig`].
///
/// # Errors
///
/// See [`OptionsConfig::merge`].
pub fn merge_options<I>(layers: I) -> Result<NormalizedOptions>
where
    I: IntoIterator<Item = Layer>,
{
    OptionsConfig::new().merge(layers)
}
