//! Window lifecycle service (`SPAWN_WINDOW`).
//!
//! The service only acknowledges the request; the window itself is created
//! later on the UI thread. See [`ShellWindows`](crate::host::ShellWindows).

// ============================================================================
// Imports
// ============================================================================

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::host::WindowOptions;
use crate::protocol::SpawnedWindow;

// ============================================================================
// WindowService
// ============================================================================

/// Opens new UI surfaces on behalf of the UI.
pub trait WindowService: Send + Sync {
    /// Requests a new window.
    ///
    /// Must not block on window creation.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPayload`] if `htmlPath` is missing or a field has the wrong type
    /// - [`Error::ShellClosed`] if the UI thread is gone
    fn spawn_window(&self, payload: &Value) -> Result<SpawnedWindow>;
}

// ============================================================================
// SpawnWindowRequest
// ============================================================================

/// Parsed `SPAWN_WINDOW` payload.
///
/// ```json
/// { "htmlPath": "about.html", "title": "Sobre", "width": 640, "height": 480 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnWindowRequest {
    /// Bundled page to load.
    pub html_path: String,
    /// Window title, if given.
    pub title: Option<String>,
    /// Width in logical pixels, if given.
    pub width: Option<u32>,
    /// Height in logical pixels, if given.
    pub height: Option<u32>,
}

impl SpawnWindowRequest {
    /// Validates and parses the payload. `null` fields count as absent.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPayload`] on a missing `htmlPath` or mistyped field.
    pub fn from_payload(payload: &Value) -> Result<Self> {
        let object = payload
            .as_object()
            .ok_or_else(|| Error::invalid_payload("payload must be an object"))?;

        let html_path = optional_string(object, "htmlPath")?
            .filter(|path| !path.is_empty())
            .ok_or_else(|| Error::invalid_payload("'htmlPath' is required"))?;

        Ok(Self {
            html_path,
            title: optional_string(object, "title")?,
            width: optional_dimension(object, "width")?,
            height: optional_dimension(object, "height")?,
        })
    }

    /// Fills absent fields from `defaults`.
    #[must_use]
    pub fn resolve(&self, defaults: &WindowOptions) -> WindowOptions {
        WindowOptions {
            title: self.title.clone().unwrap_or_else(|| defaults.title.clone()),
            width: self.width.unwrap_or(defaults.width),
            height: self.height.unwrap_or(defaults.height),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Reads an optional string field.
fn optional_string(object: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(Error::invalid_payload(format!("'{key}' must be a string"))),
    }
}

/// Reads an optional positive pixel dimension.
///
/// Whole floats (`800.0`) are accepted since UI scripts do not distinguish
/// integers from floats.
fn optional_dimension(object: &Map<String, Value>, key: &str) -> Result<Option<u32>> {
    let value = match object.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    let pixels = value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(u32::MAX))
                .map(|f| f as u64)
        })
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
        .ok_or_else(|| Error::invalid_payload(format!("'{key}' must be a positive integer")))?;

    Ok(Some(pixels))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_payload() {
        let request = SpawnWindowRequest::from_payload(&json!({
            "htmlPath": "about.html",
            "title": "Sobre",
            "width": 640,
            "height": 480.0
        }))
        .expect("parse");

        assert_eq!(request.html_path, "about.html");
        assert_eq!(request.title.as_deref(), Some("Sobre"));
        assert_eq!(request.width, Some(640));
        assert_eq!(request.height, Some(480));
    }

    #[test]
    fn test_defaults_are_applied() {
        let request =
            SpawnWindowRequest::from_payload(&json!({"htmlPath": "about.html"})).expect("parse");
        let options = request.resolve(&WindowOptions::spawned());

        assert_eq!(options.title, "Nova Janela");
        assert_eq!(options.width, 800);
        assert_eq!(options.height, 600);
    }

    #[test]
    fn test_null_fields_count_as_absent() {
        let request = SpawnWindowRequest::from_payload(&json!({
            "htmlPath": "about.html",
            "title": null,
            "width": null
        }))
        .expect("parse");
        assert!(request.title.is_none());
        assert!(request.width.is_none());
    }

    #[test]
    fn test_missing_html_path() {
        for payload in [json!({}), json!({"htmlPath": ""}), json!({"htmlPath": null})] {
            let err = SpawnWindowRequest::from_payload(&payload).expect_err("should fail");
            assert!(matches!(err, Error::InvalidPayload { .. }), "{payload}");
        }
    }

    #[test]
    fn test_non_object_payload() {
        let err = SpawnWindowRequest::from_payload(&json!("about.html")).expect_err("should fail");
        assert!(matches!(err, Error::InvalidPayload { .. }));
    }

    #[test]
    fn test_bad_dimensions() {
        for width in [json!(-1), json!(0), json!(12.5), json!("800")] {
            let payload = json!({"htmlPath": "a.html", "width": width});
            let err = SpawnWindowRequest::from_payload(&payload).expect_err("should fail");
            assert!(matches!(err, Error::InvalidPayload { .. }), "{payload}");
        }
    }

    #[test]
    fn test_bad_title_type() {
        let payload = json!({"htmlPath": "a.html", "title": 3});
        assert!(SpawnWindowRequest::from_payload(&payload).is_err());
    }
}
