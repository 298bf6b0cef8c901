//! Localized alert model.
//!
//! The `alert` entry of a payload is either a plain string or a dictionary
//! with localization fields. [`AlertContent`] carries that choice as an enum;
//! [`Alert`] is the dictionary form.
//!
//! # Example
//!
//! ```
//! use apns_wire::payload::Alert;
//!
//! let mut alert = Alert::new();
//! alert.body("Very important").loc_key("ALERTMSG").loc_args(["a", "b"]);
//!
//! let rendered = serde_json::to_string(&alert).unwrap();
//! assert!(rendered.contains(r#""loc-args":["a","b"]"#));
//! ```

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ApnsError, Result};

const BODY: &str = "body";
const ACTION_LOC_KEY: &str = "action-loc-key";
const LOC_KEY: &str = "loc-key";
const LOC_ARGS: &str = "loc-args";

/// Structured alert dictionary.
///
/// Every field is optional. Absent or empty fields are never rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Alert {
    #[serde(rename = "body", skip_serializing_if = "is_blank")]
    body: Option<String>,
    #[serde(rename = "action-loc-key", skip_serializing_if = "is_blank")]
    action_loc_key: Option<String>,
    #[serde(rename = "loc-key", skip_serializing_if = "is_blank")]
    loc_key: Option<String>,
    #[serde(rename = "loc-args", skip_serializing_if = "has_no_args")]
    loc_args: Option<Vec<String>>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

fn has_no_args(value: &Option<Vec<String>>) -> bool {
    value.as_ref().map_or(true, Vec::is_empty)
}

impl Alert {
    /// Create an empty alert.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the alert text.
    pub fn body(&mut self, body: impl Into<String>) -> &mut Self {
        self.body = Some(body.into());
        self
    }

    /// Set the key of the localized action button title.
    ///
    /// When set, the device shows an alert with two buttons.
    pub fn action_loc_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.action_loc_key = Some(key.into());
        self
    }

    /// Set the key of the localized alert message.
    pub fn loc_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.loc_key = Some(key.into());
        self
    }

    /// Set the values substituted into the `loc-key` format string.
    ///
    /// Each element is converted to text.
    pub fn loc_args<I, T>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.loc_args = Some(args.into_iter().map(|a| a.to_string()).collect());
        self
    }

    /// Remove the alert text.
    pub fn clear_body(&mut self) -> &mut Self {
        self.body = None;
        self
    }

    /// Remove the action button key.
    pub fn clear_action_loc_key(&mut self) -> &mut Self {
        self.action_loc_key = None;
        self
    }

    /// Remove the localization key.
    pub fn clear_loc_key(&mut self) -> &mut Self {
        self.loc_key = None;
        self
    }

    /// Remove the localization arguments.
    pub fn clear_loc_args(&mut self) -> &mut Self {
        self.loc_args = None;
        self
    }

    /// Get the alert text.
    pub fn get_body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Get the action button key.
    pub fn get_action_loc_key(&self) -> Option<&str> {
        self.action_loc_key.as_deref()
    }

    /// Get the message localization key.
    pub fn get_loc_key(&self) -> Option<&str> {
        self.loc_key.as_deref()
    }

    /// Get the localization arguments.
    pub fn get_loc_args(&self) -> Option<&[String]> {
        self.loc_args.as_deref()
    }

    /// Render the alert dictionary with only the present fields.
    pub fn render(&self) -> Map<String, Value> {
        let mut map = Map::new();
        if let Some(body) = self.body.as_ref().filter(|s| !s.is_empty()) {
            map.insert(BODY.to_string(), Value::String(body.clone()));
        }
        if let Some(key) = self.action_loc_key.as_ref().filter(|s| !s.is_empty()) {
            map.insert(ACTION_LOC_KEY.to_string(), Value::String(key.clone()));
        }
        if let Some(key) = self.loc_key.as_ref().filter(|s| !s.is_empty()) {
            map.insert(LOC_KEY.to_string(), Value::String(key.clone()));
        }
        if let Some(args) = self.loc_args.as_ref().filter(|a| !a.is_empty()) {
            let args = args.iter().cloned().map(Value::String).collect();
            map.insert(LOC_ARGS.to_string(), Value::Array(args));
        }
        map
    }

    /// Check whether rendering would produce an empty dictionary.
    pub fn is_empty(&self) -> bool {
        is_blank(&self.body)
            && is_blank(&self.action_loc_key)
            && is_blank(&self.loc_key)
            && has_no_args(&self.loc_args)
    }
}

/// Read an optional text field from a dynamic document.
fn text_field(map: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ApnsError::InvalidValue(format!(
            "'{}' must be a string or null, got {}",
            key, other
        ))),
    }
}

impl TryFrom<Value> for Alert {
    type Error = ApnsError;

    /// Build an alert from a dynamic JSON document.
    ///
    /// Text fields accept a string or null. `loc-args` accepts an array of
    /// scalars, each converted to text.
    fn try_from(value: Value) -> Result<Self> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(ApnsError::InvalidValue(format!(
                    "alert must be an object, got {}",
                    other
                )))
            }
        };

        if let Some(unknown) = map
            .keys()
            .find(|k| ![BODY, ACTION_LOC_KEY, LOC_KEY, LOC_ARGS].contains(&k.as_str()))
        {
            return Err(ApnsError::InvalidValue(format!(
                "unknown alert field '{}'",
                unknown
            )));
        }

        let loc_args = match map.get(LOC_ARGS) {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => Ok(s.clone()),
                        Value::Number(n) => Ok(n.to_string()),
                        Value::Bool(b) => Ok(b.to_string()),
                        other => Err(ApnsError::InvalidValue(format!(
                            "'loc-args' elements must be scalars, got {}",
                            other
                        ))),
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
            Some(other) => {
                return Err(ApnsError::InvalidValue(format!(
                    "'loc-args' must be an array, got {}",
                    other
                )))
            }
        };

        Ok(Self {
            body: text_field(&map, BODY)?,
            action_loc_key: text_field(&map, ACTION_LOC_KEY)?,
            loc_key: text_field(&map, LOC_KEY)?,
            loc_args,
        })
    }
}

/// Content of the `alert` entry: plain text or a structured dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AlertContent {
    /// Plain alert text.
    Text(String),
    /// Localized alert dictionary.
    Structured(Alert),
}

impl From<&str> for AlertContent {
    fn from(text: &str) -> Self {
        AlertContent::Text(text.to_string())
    }
}

impl From<String> for AlertContent {
    fn from(text: String) -> Self {
        AlertContent::Text(text)
    }
}

impl From<Alert> for AlertContent {
    fn from(alert: Alert) -> Self {
        AlertContent::Structured(alert)
    }
}

impl TryFrom<Value> for AlertContent {
    type Error = ApnsError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::String(text) => Ok(AlertContent::Text(text)),
            Value::Object(_) => Ok(AlertContent::Structured(Alert::try_from(value)?)),
            other => Err(ApnsError::InvalidValue(format!(
                "alert must be a string or an object, got {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_alert_renders_empty_object() {
        let alert = Alert::new();
        assert!(alert.is_empty());
        assert!(alert.render().is_empty());
        assert_eq!(serde_json::to_string(&alert).unwrap(), "{}");
    }

    #[test]
    fn test_full_alert_render() {
        let mut alert = Alert::new();
        alert
            .body("Very important alert message")
            .loc_key("ALERTMSG")
            .loc_args(["arg1", "arg2"])
            .action_loc_key("OPEN");

        let rendered = Value::Object(alert.render());
        assert_eq!(
            rendered,
            json!({
                "body": "Very important alert message",
                "action-loc-key": "OPEN",
                "loc-key": "ALERTMSG",
                "loc-args": ["arg1", "arg2"]
            })
        );

        // Serialize impl and render() agree
        assert_eq!(serde_json::to_value(&alert).unwrap(), rendered);
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut alert = Alert::new();
        alert.body("hello");
        assert_eq!(alert.render(), alert.render());
    }

    #[test]
    fn test_blank_fields_omitted() {
        let mut alert = Alert::new();
        alert.body("").loc_args(Vec::<String>::new()).loc_key("KEY");

        let rendered = serde_json::to_string(&alert).unwrap();
        assert_eq!(rendered, r#"{"loc-key":"KEY"}"#);
        assert_eq!(Value::Object(alert.render()), json!({"loc-key": "KEY"}));
    }

    #[test]
    fn test_loc_args_coerced_to_text() {
        let mut alert = Alert::new();
        alert.loc_args([1, 2, 3]);
        assert_eq!(
            alert.get_loc_args().unwrap(),
            &["1".to_string(), "2".to_string(), "3".to_string()]
        );
    }

    #[test]
    fn test_clear_fields() {
        let mut alert = Alert::new();
        alert.body("x").loc_key("K");
        alert.clear_body().clear_loc_key();
        assert!(alert.is_empty());
    }

    #[test]
    fn test_try_from_value() {
        let alert = Alert::try_from(json!({
            "body": "hi",
            "loc-key": null,
            "loc-args": ["a", 2, true]
        }))
        .unwrap();

        assert_eq!(alert.get_body(), Some("hi"));
        assert_eq!(alert.get_loc_key(), None);
        assert_eq!(
            alert.get_loc_args().unwrap(),
            &["a".to_string(), "2".to_string(), "true".to_string()]
        );
    }

    #[test]
    fn test_try_from_rejects_non_text() {
        let result = Alert::try_from(json!({"body": 42}));
        assert!(matches!(result, Err(ApnsError::InvalidValue(_))));

        let result = Alert::try_from(json!({"loc-args": "not a list"}));
        assert!(matches!(result, Err(ApnsError::InvalidValue(_))));

        let result = Alert::try_from(json!({"loc-args": [{"nested": 1}]}));
        assert!(matches!(result, Err(ApnsError::InvalidValue(_))));

        let result = Alert::try_from(json!({"title": "x"}));
        assert!(result.unwrap_err().to_string().contains("unknown alert field"));
    }

    #[test]
    fn test_alert_content_variants() {
        let text = AlertContent::from("plain");
        assert_eq!(serde_json::to_string(&text).unwrap(), r#""plain""#);

        let mut alert = Alert::new();
        alert.body("structured");
        let structured = AlertContent::from(alert);
        assert_eq!(
            serde_json::to_string(&structured).unwrap(),
            r#"{"body":"structured"}"#
        );
    }

    #[test]
    fn test_alert_content_try_from_value() {
        assert_eq!(
            AlertContent::try_from(json!("hello")).unwrap(),
            AlertContent::Text("hello".to_string())
        );
        assert!(matches!(
            AlertContent::try_from(json!({"body": "x"})).unwrap(),
            AlertContent::Structured(_)
        ));
        assert!(matches!(
            AlertContent::try_from(json!(12)),
            Err(ApnsError::InvalidValue(_))
        ));
    }
}
