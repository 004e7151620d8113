//! Crate-wide error type.
//!
//! Everything that can fail at a boundary (payload validation, the pricing
//! service, the browser DOM) is funnelled into [`ViewError`]. Degraded paths
//! that are part of normal operation (oversized trees, dangling edges, the
//! convergence fallback) are not errors and never produce one.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Errors raised by the tree view.
#[derive(Debug, Error)]
pub enum ViewError {
    /// A required part of the tree payload is absent.
    #[error("invalid tree dataset: missing `{0}`")]
    MissingField(&'static str),

    /// The payload is present but does not have the expected shape.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// The pricing service answered with `success: false`.
    #[error("{0}")]
    Rejected(String),

    /// The request never produced a usable response.
    #[error("communication error: {0}")]
    Transport(String),

    /// A DOM call failed.
    #[error("dom error: {0}")]
    Dom(String),

    /// The configured drawing surface could not be found.
    #[error("drawing surface `{0}` not found")]
    NoSurface(String),
}

impl From<JsValue> for ViewError {
    fn from(value: JsValue) -> Self {
        let message = value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}"));
        ViewError::Dom(message)
    }
}

impl From<serde_json::Error> for ViewError {
    fn from(err: serde_json::Error) -> Self {
        ViewError::Malformed(err.to_string())
    }
}

impl From<serde_wasm_bindgen::Error> for ViewError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        ViewError::Malformed(err.to_string())
    }
}

impl From<ViewError> for JsValue {
    fn from(err: ViewError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message() {
        let err = ViewError::MissingField("tree_params");
        assert_eq!(err.to_string(), "invalid tree dataset: missing `tree_params`");
    }

    #[test]
    fn test_rejected_is_verbatim() {
        let err = ViewError::Rejected("Paramètre manquant: K".to_string());
        assert_eq!(err.to_string(), "Paramètre manquant: K");
    }

    #[test]
    fn test_json_error_is_malformed() {
        let err: ViewError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, ViewError::Malformed(_)));
    }
}
