//! Merge-sequence elements.

use std::fmt;

use crate::normalized::NormalizedOptions;
use crate::raw::RawOptions;

/// One element of a merge sequence.
///
/// A layer is either an options value (raw or already normalized) or a
/// zero-argument factory producing one. Factories are invoked exactly once,
/// in sequence order, when the merger resolves its input; their side
/// effects are the caller's responsibility.
pub enum Layer {
    /// A raw, caller-shaped layer.
    Raw(RawOptions),
    /// An already-normalized layer, e.g. the result of a previous merge.
    /// Passed through normalization unchanged.
    Normalized(NormalizedOptions),
    /// A deferred layer, resolved at merge time.
    Factory(Box<dyn FnOnce() -> Layer + Send>),
}

impl Layer {
    /// Wrap a zero-argument factory as a layer.
    ///
    /// # Examples
    ///
    /// ```
    /// use reqopts::{merge_options, Layer, RawOptions};
    /// use serde_json::json;
    ///
    /// let deferred = Layer::factory(|| {
    ///     RawOptions::new().with_payload(json!("computed")).into()
    /// });
    /// let merged = merge_options([deferred])?;
    /// assert_eq!(merged.payload, Some(json!("computed")));
    /// # Ok::<(), reqopts::OptionsError>(())
    /// ```
    pub fn factory<F>(f: F) -> Self
    where
        F: FnOnce() -> Layer + Send + 'static,
    {
        Self::Factory(Box::new(f))
    }
}

impl From<RawOptions> for Layer {
    fn from(raw: RawOptions) -> Self {
        Self::Raw(raw)
    }
}

impl From<NormalizedOptions> for Layer {
    fn from(normalized: NormalizedOptions) -> Self {
        Self::Normalized(normalized)
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw(raw) => f.debug_tuple("Raw").field(raw).finish(),
            Self::Normalized(n) => f.debug_tuple("Normalized").field(n).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}
