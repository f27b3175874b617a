//! Error types for option normalization and merging.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = OptionsError> = std::result::Result<T, E>;

/// Errors that can occur while normalizing or merging request options.
///
/// Normalization never returns a partial result: the first invalid hook
/// entry aborts the whole call and the error is propagated to the caller
/// unchanged, so the surrounding pipeline decides whether a misconfigured
/// layer aborts the request or falls back to defaults.
///
/// # Examples
///
/// ```
/// use reqopts::OptionsError;
///
/// let err = OptionsError::HookNotCallable {
///     hook: "before".to_string(),
///     index: 1,
/// };
/// assert_eq!(err.to_string(), "hook 'before' entry #1 is not callable");
/// ```
#[derive(Error, Debug)]
pub enum OptionsError {
    /// A hook sequence contains an entry that is not a callable.
    ///
    /// Raw JSON configuration can describe hook slots but cannot carry
    /// callables, so any hook entry that arrives as plain data fails here.
    #[error("hook '{hook}' entry #{index} is not callable")]
    HookNotCallable {
        /// The hook name whose sequence failed validation.
        hook: String,
        /// Zero-based index of the offending entry.
        index: usize,
    },

    /// A raw JSON options value had the wrong shape for a reserved field.
    #[error("invalid raw options: expected {expected} for '{field}', found {found}")]
    InvalidRawValue {
        /// The reserved field that failed classification.
        field: &'static str,
        /// What the field is required to be.
        expected: &'static str,
        /// JSON type name of the value actually supplied.
        found: &'static str,
    },
}

/// JSON type name used in [`OptionsError::InvalidRawValue`] messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
