//! Notification entity and payload builder.
//!
//! A [`Notification`] collects everything that ends up in one frame: the
//! device token, the `aps` dictionary (alert, badge, sound) and arbitrary
//! custom properties merged next to it at the top level. [`PayloadBuilder`]
//! renders it to compact JSON and enforces the payload size limit.
//!
//! ```text
//! { "aps": { "alert": ..., "badge": 3, "sound": "default" }, "acme": [1, "x"] }
//! ```
//!
//! # Example
//!
//! ```
//! use apns_wire::payload::{Notification, PayloadBuilder};
//!
//! let mut notification = Notification::new();
//! notification.badge(0).alert("hello");
//!
//! let payload = PayloadBuilder::default().build(&notification).unwrap();
//! assert_eq!(&payload[..], br#"{"aps":{"alert":"hello","badge":0}}"#);
//! ```

use bytes::Bytes;
use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::alert::AlertContent;
use crate::codec::{DeviceToken, JsonCodec, TokenCodec};
use crate::error::{ApnsError, Result};
use crate::protocol::DEFAULT_MAX_PAYLOAD_SIZE;

/// Top-level key holding the alert, badge and sound.
pub const RESERVED_KEY: &str = "aps";

/// Sound name that plays the system default sound.
pub const DEFAULT_SOUND: &str = "default";

/// A single push notification.
///
/// Setters mutate in place and return `&mut Self` for chaining. Fallible
/// setters validate before touching any field, so a failed call leaves the
/// notification as it was.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notification {
    token: Option<DeviceToken>,
    badge: Option<i64>,
    sound: Option<String>,
    alert: Option<AlertContent>,
    properties: Map<String, Value>,
}

/// The `aps` dictionary as it goes on the wire.
#[derive(Serialize)]
struct Aps<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    alert: Option<&'a AlertContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    badge: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sound: Option<&'a str>,
}

impl Notification {
    /// Create an empty notification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target device token.
    pub fn token(&mut self, token: DeviceToken) -> &mut Self {
        self.token = Some(token);
        self
    }

    /// Set the token from raw bytes (default token length).
    pub fn token_raw(&mut self, raw: &[u8]) -> Result<&mut Self> {
        self.token_raw_with(&TokenCodec::default(), raw)
    }

    /// Set the token from base64 text (default token length).
    pub fn token_base64(&mut self, text: &str) -> Result<&mut Self> {
        self.token_base64_with(&TokenCodec::default(), text)
    }

    /// Set the token from hex text (default token length).
    ///
    /// Accepts the `<xxxxxxxx xxxxxxxx ...>` form printed by device SDKs.
    pub fn token_hex(&mut self, text: &str) -> Result<&mut Self> {
        self.token_hex_with(&TokenCodec::default(), text)
    }

    /// Set the token from raw bytes, checked by `codec`.
    pub fn token_raw_with(&mut self, codec: &TokenCodec, raw: &[u8]) -> Result<&mut Self> {
        let token = codec.from_raw(raw)?;
        Ok(self.token(token))
    }

    /// Set the token from base64 text, checked by `codec`.
    pub fn token_base64_with(&mut self, codec: &TokenCodec, text: &str) -> Result<&mut Self> {
        let token = codec.from_base64(text)?;
        Ok(self.token(token))
    }

    /// Set the token from hex text, checked by `codec`.
    pub fn token_hex_with(&mut self, codec: &TokenCodec, text: &str) -> Result<&mut Self> {
        let token = codec.from_hex(text)?;
        Ok(self.token(token))
    }

    /// Set the badge count.
    ///
    /// `0` is sent explicitly and clears the badge on the device.
    pub fn badge(&mut self, count: i64) -> &mut Self {
        self.badge = Some(count);
        self
    }

    /// Set or unset the badge count. `None` leaves the `badge` key out.
    pub fn set_badge(&mut self, count: Option<i64>) -> &mut Self {
        self.badge = count;
        self
    }

    /// Leave the `badge` key out.
    pub fn clear_badge(&mut self) -> &mut Self {
        self.set_badge(None)
    }

    /// Shortcut for `badge(0)`.
    pub fn unbadge(&mut self) -> &mut Self {
        self.badge(0)
    }

    /// Set the sound name.
    pub fn sound(&mut self, sound: impl Into<String>) -> &mut Self {
        self.sound = Some(sound.into());
        self
    }

    /// Play the system default sound.
    pub fn default_sound(&mut self) -> &mut Self {
        self.sound(DEFAULT_SOUND)
    }

    /// Leave the `sound` key out.
    pub fn clear_sound(&mut self) -> &mut Self {
        self.sound = None;
        self
    }

    /// Set the alert, either plain text or a structured [`Alert`](super::Alert).
    pub fn alert(&mut self, alert: impl Into<AlertContent>) -> &mut Self {
        self.alert = Some(alert.into());
        self
    }

    /// Leave the `alert` key out.
    pub fn clear_alert(&mut self) -> &mut Self {
        self.alert = None;
        self
    }

    /// Add a custom top-level property.
    ///
    /// # Errors
    ///
    /// - `ReservedKeyConflict` if `key` is the reserved `aps` key
    /// - `Json` if the value cannot be represented as JSON
    pub fn set_property<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: T,
    ) -> Result<&mut Self> {
        let key = key.into();
        if key == RESERVED_KEY {
            return Err(ApnsError::ReservedKeyConflict(key));
        }
        let value = serde_json::to_value(value)?;
        self.properties.insert(key, value);
        Ok(self)
    }

    /// Remove a custom property, returning its value.
    pub fn remove_property(&mut self, key: &str) -> Option<Value> {
        self.properties.remove(key)
    }

    /// Remove all custom properties.
    pub fn clear_properties(&mut self) -> &mut Self {
        self.properties.clear();
        self
    }

    /// Get the device token.
    pub fn get_token(&self) -> Option<&DeviceToken> {
        self.token.as_ref()
    }

    /// Get the badge count.
    pub fn get_badge(&self) -> Option<i64> {
        self.badge
    }

    /// Get the sound name.
    pub fn get_sound(&self) -> Option<&str> {
        self.sound.as_deref()
    }

    /// Get the alert.
    pub fn get_alert(&self) -> Option<&AlertContent> {
        self.alert.as_ref()
    }

    /// Get a custom property.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Iterate over custom properties.
    pub fn properties(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.properties.iter()
    }

    /// Build a notification (without token) from a payload document.
    ///
    /// The inverse of rendering: `aps` fields are validated and every other
    /// top-level key becomes a custom property.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` if the document or one of the `aps` fields has
    /// the wrong shape.
    pub fn from_payload(value: Value) -> Result<Self> {
        let mut properties = match value {
            Value::Object(map) => map,
            other => {
                return Err(ApnsError::InvalidValue(format!(
                    "payload must be an object, got {}",
                    other
                )))
            }
        };

        let mut aps = match properties.remove(RESERVED_KEY) {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(aps)) => aps,
            Some(other) => {
                return Err(ApnsError::InvalidValue(format!(
                    "'{}' must be an object, got {}",
                    RESERVED_KEY, other
                )))
            }
        };

        let badge = match aps.remove("badge") {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => Some(n.as_i64().ok_or_else(|| {
                ApnsError::InvalidValue(format!("'badge' must be an integer, got {}", n))
            })?),
            Some(other) => {
                return Err(ApnsError::InvalidValue(format!(
                    "'badge' must be an integer, got {}",
                    other
                )))
            }
        };

        let sound = match aps.remove("sound") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                return Err(ApnsError::InvalidValue(format!(
                    "'sound' must be a string, got {}",
                    other
                )))
            }
        };

        let alert = match aps.remove("alert") {
            None | Some(Value::Null) => None,
            Some(alert) => Some(AlertContent::try_from(alert)?),
        };

        if let Some(unknown) = aps.keys().next() {
            return Err(ApnsError::InvalidValue(format!(
                "unknown '{}' field '{}'",
                RESERVED_KEY, unknown
            )));
        }

        Ok(Self {
            token: None,
            badge,
            sound,
            alert,
            properties,
        })
    }

    fn wire_alert(&self) -> Option<&AlertContent> {
        self.alert
            .as_ref()
            .filter(|a| !matches!(a, AlertContent::Text(text) if text.is_empty()))
    }

    fn wire_sound(&self) -> Option<&str> {
        self.sound.as_deref().filter(|s| !s.is_empty())
    }
}

impl Serialize for Notification {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.properties.contains_key(RESERVED_KEY) {
            return Err(S::Error::custom(format!(
                "custom property collides with reserved key '{}'",
                RESERVED_KEY
            )));
        }

        let aps = Aps {
            alert: self.wire_alert(),
            badge: self.badge,
            sound: self.wire_sound(),
        };

        let mut map = serializer.serialize_map(Some(1 + self.properties.len()))?;
        map.serialize_entry(RESERVED_KEY, &aps)?;
        for (key, value) in &self.properties {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Renders notifications to size-checked compact JSON payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadBuilder {
    max_payload_size: usize,
}

impl PayloadBuilder {
    /// Create a builder enforcing `max_payload_size` bytes.
    pub fn new(max_payload_size: usize) -> Self {
        Self { max_payload_size }
    }

    /// Maximum serialized payload size in bytes.
    #[inline]
    pub fn max_payload_size(&self) -> usize {
        self.max_payload_size
    }

    /// Render the payload document without the size check.
    pub fn to_value(&self, notification: &Notification) -> Result<Value> {
        check_reserved(notification)?;
        Ok(serde_json::to_value(notification)?)
    }

    /// Render the compact JSON payload.
    ///
    /// # Errors
    ///
    /// - `ReservedKeyConflict` if a custom property uses the reserved key
    /// - `PayloadTooLarge` if the rendered bytes exceed the configured maximum
    pub fn build(&self, notification: &Notification) -> Result<Bytes> {
        check_reserved(notification)?;
        let payload = JsonCodec::encode_with_limit(notification, self.max_payload_size)?;
        Ok(Bytes::from(payload))
    }
}

impl Default for PayloadBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAYLOAD_SIZE)
    }
}

fn check_reserved(notification: &Notification) -> Result<()> {
    if notification.properties.contains_key(RESERVED_KEY) {
        return Err(ApnsError::ReservedKeyConflict(RESERVED_KEY.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Alert;
    use serde_json::json;

    fn render(notification: &Notification) -> String {
        let bytes = PayloadBuilder::default().build(notification).unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_empty_notification_has_empty_aps() {
        assert_eq!(render(&Notification::new()), r#"{"aps":{}}"#);
    }

    #[test]
    fn test_badge_zero_differs_from_unset() {
        let mut zero = Notification::new();
        zero.badge(0);
        assert_eq!(render(&zero), r#"{"aps":{"badge":0}}"#);

        let mut unset = Notification::new();
        unset.badge(5).clear_badge();
        assert_eq!(render(&unset), r#"{"aps":{}}"#);

        let mut unbadged = Notification::new();
        unbadged.unbadge();
        assert_eq!(render(&unbadged), r#"{"aps":{"badge":0}}"#);
    }

    #[test]
    fn test_sound() {
        let mut notification = Notification::new();
        notification.default_sound();
        assert_eq!(render(&notification), r#"{"aps":{"sound":"default"}}"#);

        notification.clear_sound();
        assert_eq!(render(&notification), r#"{"aps":{}}"#);

        notification.sound("");
        assert_eq!(render(&notification), r#"{"aps":{}}"#);
    }

    #[test]
    fn test_alert_and_custom_properties() {
        let mut alert = Alert::new();
        alert
            .body("Very important alert message")
            .loc_key("ALERTMSG")
            .loc_args(["arg1", "arg2"])
            .action_loc_key("OPEN");

        let mut notification = Notification::new();
        notification
            .alert(alert)
            .set_property("acme", (1, "custom string argument"))
            .unwrap();

        let value = PayloadBuilder::default().to_value(&notification).unwrap();
        assert_eq!(
            value,
            json!({
                "aps": {
                    "alert": {
                        "body": "Very important alert message",
                        "action-loc-key": "OPEN",
                        "loc-key": "ALERTMSG",
                        "loc-args": ["arg1", "arg2"]
                    }
                },
                "acme": [1, "custom string argument"]
            })
        );
    }

    #[test]
    fn test_empty_text_alert_omitted_but_empty_dictionary_kept() {
        let mut notification = Notification::new();
        notification.alert("");
        assert_eq!(render(&notification), r#"{"aps":{}}"#);

        notification.alert(Alert::new());
        assert_eq!(render(&notification), r#"{"aps":{"alert":{}}}"#);
    }

    #[test]
    fn test_reserved_key_rejected_without_mutation() {
        let mut notification = Notification::new();
        notification.set_property("a", 1).unwrap();

        let result = notification.set_property(RESERVED_KEY, json!({"badge": 1}));
        assert!(matches!(result, Err(ApnsError::ReservedKeyConflict(_))));

        assert!(notification.property(RESERVED_KEY).is_none());
        assert_eq!(notification.properties().count(), 1);
        assert_eq!(render(&notification), r#"{"aps":{},"a":1}"#);
    }

    #[test]
    fn test_token_setters_with_custom_codec() {
        let codec = TokenCodec::new(4);
        let mut notification = Notification::new();

        notification.token_hex_with(&codec, "<deadbeef>").unwrap();
        assert_eq!(notification.get_token().unwrap().as_bytes(), &[0xDE, 0xAD, 0xBE, 0xEF]);

        notification.token_base64_with(&codec, "AQIDBA==").unwrap();
        assert_eq!(notification.get_token().unwrap().as_bytes(), &[1, 2, 3, 4]);

        let result = notification.token_raw_with(&codec, &[0u8; 32]);
        assert!(matches!(result, Err(ApnsError::TokenFormat(_))));
        assert_eq!(notification.get_token().unwrap().as_bytes(), &[1, 2, 3, 4]);

        assert!(notification.token_raw(&[0u8; 4]).is_err());
    }

    #[test]
    fn test_property_management() {
        let mut notification = Notification::new();
        notification.set_property("x", "y").unwrap();
        notification.set_property("n", 2).unwrap();

        assert_eq!(notification.property("x"), Some(&json!("y")));
        assert_eq!(notification.remove_property("x"), Some(json!("y")));
        notification.clear_properties();
        assert_eq!(notification.properties().count(), 0);
    }

    #[test]
    fn test_fresh_instances_do_not_share_properties() {
        let mut first = Notification::new();
        first.set_property("only_first", true).unwrap();

        let second = Notification::new();
        assert!(second.property("only_first").is_none());
    }

    #[test]
    fn test_size_limit_boundary() {
        let overhead = r#"{"aps":{},"p":""}"#.len();

        let mut exact = Notification::new();
        exact
            .set_property("p", "x".repeat(DEFAULT_MAX_PAYLOAD_SIZE - overhead))
            .unwrap();
        let payload = PayloadBuilder::default().build(&exact).unwrap();
        assert_eq!(payload.len(), DEFAULT_MAX_PAYLOAD_SIZE);

        let mut over = Notification::new();
        over
            .set_property("p", "x".repeat(DEFAULT_MAX_PAYLOAD_SIZE - overhead + 1))
            .unwrap();
        let result = PayloadBuilder::default().build(&over);
        assert!(matches!(
            result,
            Err(ApnsError::PayloadTooLarge { size: 257, max: 256 })
        ));
    }

    #[test]
    fn test_configurable_limit() {
        let mut notification = Notification::new();
        notification.alert("x".repeat(300));

        assert!(PayloadBuilder::default().build(&notification).is_err());
        assert!(PayloadBuilder::new(2048).build(&notification).is_ok());
    }

    #[test]
    fn test_token_setters() {
        let raw = [7u8; 32];
        let mut notification = Notification::new();
        notification.token_raw(&raw).unwrap();
        let expected = notification.get_token().cloned();

        let mut from_hex = Notification::new();
        from_hex.token_hex(&hex::encode(raw)).unwrap();
        assert_eq!(from_hex.get_token().cloned(), expected);

        // Failed setter leaves the previous token in place
        assert!(from_hex.token_hex("<00 11>").is_err());
        assert_eq!(from_hex.get_token().cloned(), expected);
    }

    #[test]
    fn test_from_payload() {
        let notification = Notification::from_payload(json!({
            "aps": {"alert": "hi", "badge": 0, "sound": "bell.caf"},
            "acme": {"id": 7}
        }))
        .unwrap();

        assert_eq!(notification.get_badge(), Some(0));
        assert_eq!(notification.get_sound(), Some("bell.caf"));
        assert_eq!(
            notification.get_alert(),
            Some(&AlertContent::Text("hi".to_string()))
        );
        assert_eq!(notification.property("acme"), Some(&json!({"id": 7})));
        assert!(notification.get_token().is_none());
    }

    #[test]
    fn test_from_payload_rejects_bad_fields() {
        let bad_badge = Notification::from_payload(json!({"aps": {"badge": "3"}}));
        assert!(matches!(bad_badge, Err(ApnsError::InvalidValue(_))));

        let bad_sound = Notification::from_payload(json!({"aps": {"sound": 1}}));
        assert!(matches!(bad_sound, Err(ApnsError::InvalidValue(_))));

        let bad_alert = Notification::from_payload(json!({"aps": {"alert": [1]}}));
        assert!(matches!(bad_alert, Err(ApnsError::InvalidValue(_))));

        let unknown = Notification::from_payload(json!({"aps": {"category": "x"}}));
        assert!(matches!(unknown, Err(ApnsError::InvalidValue(_))));

        let not_object = Notification::from_payload(json!([1, 2]));
        assert!(matches!(not_object, Err(ApnsError::InvalidValue(_))));
    }
}
