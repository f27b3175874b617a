//! Lifecycle hook values and their pre-normalization shapes.
//!
//! A hook slot holds an ordered sequence of callables that the downstream
//! pipeline invokes around request execution. This crate only shapes and
//! validates those sequences; it never invokes them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// A single lifecycle callback.
///
/// Hooks receive the in-flight request state; invocation is the execution
/// pipeline's concern, not this crate's. Hooks are reference-counted so a
/// normalized layer can be cloned and merged without copying callables.
pub type HookFn = Arc<dyn Fn(&mut Value) + Send + Sync>;

/// Hook sequences keyed by hook name, as carried by a normalized layer.
///
/// Every recognized hook name is present (possibly with an empty sequence);
/// additional caller-supplied names are carried through alongside them.
pub type HookMap = HashMap<String, Vec<HookFn>>;

/// One entry of a raw hook sequence before validation.
///
/// Entries built through [`RawOptions`](crate::RawOptions) builder methods
/// are always [`HookEntry::Callback`]. Entries classified out of raw JSON
/// configuration arrive as [`HookEntry::Data`] and fail validation, since
/// JSON cannot describe a callable.
#[derive(Clone)]
pub enum HookEntry {
    /// A real callable.
    Callback(HookFn),
    /// Plain data standing where a callable is required.
    Data(Value),
}

impl HookEntry {
    /// Wrap a closure as a callback entry.
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&mut Value) + Send + Sync + 'static,
    {
        Self::Callback(Arc::new(f))
    }
}

impl fmt::Debug for HookEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("Callback(..)"),
            Self::Data(value) => f.debug_tuple("Data").field(value).finish(),
        }
    }
}

/// A raw hook slot: either one bare entry or an explicit sequence.
///
/// Normalization coerces `Single` to a one-element sequence and keeps
/// `List` order untouched.
#[derive(Clone, Debug)]
pub enum HookInput {
    /// A bare entry, coerced to a one-element sequence.
    Single(HookEntry),
    /// An explicit ordered sequence.
    List(Vec<HookEntry>),
}

impl HookInput {
    pub(crate) fn into_entries(self) -> Vec<HookEntry> {
        match self {
            Self::Single(entry) => vec![entry],
            Self::List(entries) => entries,
        }
    }
}

/// Identity comparison of two hook sequences, element by element.
///
/// Callables have no structural equality; two sequences are equal when they
/// hold the same callables in the same order.
pub(crate) fn hook_lists_eq(a: &[HookFn], b: &[HookFn]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Arc::ptr_eq(x, y))
}

pub(crate) fn hook_maps_eq(a: &HookMap, b: &HookMap) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(name, list)| b.get(name).is_some_and(|other| hook_lists_eq(list, other)))
}
