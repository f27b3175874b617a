//! Normalization of one raw layer into the canonical shape.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{OptionsError, Result};
use crate::hooks::{HookEntry, HookFn, HookInput, HookMap};
use crate::layer::Layer;
use crate::normalized::NormalizedOptions;
use crate::raw::{RawOptions, RESERVED_KEYS};

/// The canonical recognized hook-name set.
///
/// Every normalized layer carries a (possibly empty) sequence for each of
/// these names. Pipelines with a different lifecycle vocabulary configure
/// their own set via [`OptionsConfig::with_hook_names`].
pub const DEFAULT_HOOK_NAMES: [&str; 3] = ["before", "done", "fail"];

fn default_hook_names() -> Vec<String> {
    DEFAULT_HOOK_NAMES.iter().map(ToString::to_string).collect()
}

fn default_flags() -> Map<String, Value> {
    let mut flags = Map::new();
    flags.insert("once".to_string(), json!(false));
    flags.insert("immediate".to_string(), json!(true));
    flags
}

/// Shared configuration for the normalizer and merger.
///
/// Holds the static defaults both components draw from: the recognized
/// hook-name set and the default execution flags. The config is plain data
/// and serializable, so a pipeline can load its lifecycle vocabulary from
/// its own configuration file.
///
/// # Examples
///
/// ```
/// use reqopts::{OptionsConfig, RawOptions};
///
/// let config = OptionsConfig::new().with_hook_names(["before", "resolve", "reject"]);
/// let normalized = config.normalize(RawOptions::new())?;
///
/// assert!(normalized.hooks.contains_key("resolve"));
/// assert!(!normalized.hooks.contains_key("done"));
/// # Ok::<(), reqopts::OptionsError>(())
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Recognized hook names, each guaranteed a slot after normalization.
    #[serde(default = "default_hook_names")]
    hook_names: Vec<String>,
    /// Default execution flags, filled where the caller supplied none.
    #[serde(default = "default_flags")]
    default_flags: Map<String, Value>,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            hook_names: default_hook_names(),
            default_flags: default_flags(),
        }
    }
}

impl OptionsConfig {
    /// Create a config with the canonical hook names and default flags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the recognized hook-name set.
    pub fn with_hook_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hook_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set or override one default execution flag.
    pub fn with_default_flag(mut self, name: impl Into<String>, value: Value) -> Self {
        self.default_flags.insert(name.into(), value);
        self
    }

    /// The recognized hook names.
    pub fn hook_names(&self) -> &[String] {
        &self.hook_names
    }

    /// Normalize one layer into the canonical shape.
    ///
    /// Already-normalized layers pass through unchanged; factories are
    /// resolved (invoked once) and their result normalized. Raw layers are
    /// built up from the static defaults, with caller-supplied slots
    /// winning over defaults field by field.
    ///
    /// # Errors
    ///
    /// [`OptionsError::HookNotCallable`] when any hook sequence contains a
    /// non-callable entry; no partial result is produced.
    ///
    /// # Examples
    ///
    /// ```
    /// use reqopts::{OptionsConfig, RawOptions};
    /// use serde_json::json;
    ///
    /// let config = OptionsConfig::new();
    /// let normalized = config.normalize(
    ///     RawOptions::new().with_hook("before", |_state| {}),
    /// )?;
    ///
    /// assert_eq!(normalized.hook("before").len(), 1);
    /// assert!(normalized.hook("done").is_empty());
    /// assert_eq!(normalized.payload, Some(json!({})));
    /// assert!(!normalized.once());
    /// # Ok::<(), reqopts::OptionsError>(())
    /// ```
    pub fn normalize(&self, layer: impl Into<Layer>) -> Result<NormalizedOptions> {
        match layer.into() {
            Layer::Normalized(normalized) => Ok(normalized),
            Layer::Factory(factory) => self.normalize(factory()),
            Layer::Raw(raw) => self.normalize_raw(raw),
        }
    }

    fn normalize_raw(&self, raw: RawOptions) -> Result<NormalizedOptions> {
        let RawOptions {
            adapter,
            meta,
            hooks,
            options,
            payload,
        } = raw;

        let hooks = self.normalize_hooks(hooks)?;

        let payload = match payload {
            Some(value) => {
                warn_on_reserved_payload_keys(&value);
                Some(value)
            },
            None => Some(Value::Object(Map::new())),
        };

        let mut flags = self.default_flags.clone();
        if let Some(options) = options {
            for (key, value) in options {
                flags.insert(key, value);
            }
        }

        Ok(NormalizedOptions {
            adapter,
            meta: meta.unwrap_or_default(),
            payload,
            hooks,
            options: Some(flags),
        })
    }

    fn normalize_hooks(
        &self,
        hooks: Option<HashMap<String, HookInput>>,
    ) -> Result<HookMap> {
        let mut normalized: HookMap = self
            .hook_names
            .iter()
            .map(|name| (name.clone(), Vec::new()))
            .collect();
        let Some(hooks) = hooks else {
            return Ok(normalized);
        };
        for (name, input) in hooks {
            let entries = input.into_entries();
            let mut callbacks: Vec<HookFn> = Vec::with_capacity(entries.len());
            for (index, entry) in entries.into_iter().enumerate() {
                match entry {
                    HookEntry::Callback(hook) => callbacks.push(hook),
                    HookEntry::Data(_) => {
                        return Err(OptionsError::HookNotCallable { hook: name, index })
                    },
                }
            }
            normalized.insert(name, callbacks);
        }
        Ok(normalized)
    }
}

/// Advisory check for reserved field names nested inside a payload.
///
/// Those keys were already classified away at the top level, so nesting
/// them in the payload usually means a mis-assembled layer. Emitted in
/// debug builds only; never affects the result.
fn warn_on_reserved_payload_keys(payload: &Value) {
    if !cfg!(debug_assertions) {
        return;
    }
    if let Value::Object(map) = payload {
        for key in RESERVED_KEYS {
            if map.contains_key(key) {
                tracing::warn!(
                    key,
                    "reserved field name inside payload; it will not be treated as configuration"
                );
            }
        }
    }
}
