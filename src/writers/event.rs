//! # Collected event with optional routing metadata.
//!
//! [`Event`] carries one collected record plus the optional fields the host
//! uses to route and attribute it. Builders follow the `with_*` pattern;
//! unset fields are simply omitted from the serialized forms.
//!
//! ## Example
//! ```
//! use modinput::Event;
//!
//! let ev = Event::new("login accepted for user=jdoe")
//!     .with_time(1754524800.123)
//!     .with_sourcetype("demo:auth")
//!     .with_stanza("demo://alpha");
//!
//! assert_eq!(ev.sourcetype.as_deref(), Some("demo:auth"));
//! ```

use serde_json::{json, Value};

/// One record bound for the collection endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// The record body. Strings pass through verbatim; structured values
    /// are serialized as JSON text on the classic path.
    pub data: Value,
    /// Event timestamp, seconds since the epoch (fractional).
    pub time: Option<f64>,
    /// Destination index.
    pub index: Option<String>,
    /// Originating host.
    pub host: Option<String>,
    /// Event source.
    pub source: Option<String>,
    /// Event sourcetype.
    pub sourcetype: Option<String>,
    /// Name of the stanza that produced the event.
    pub stanza: Option<String>,
}

impl Event {
    /// Creates an event carrying `data` with no routing metadata.
    pub fn new(data: impl Into<Value>) -> Self {
        Self {
            data: data.into(),
            time: None,
            index: None,
            host: None,
            source: None,
            sourcetype: None,
            stanza: None,
        }
    }

    /// Attaches an epoch timestamp.
    #[inline]
    pub fn with_time(mut self, time: f64) -> Self {
        self.time = Some(time);
        self
    }

    /// Attaches a destination index.
    #[inline]
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Attaches an originating host.
    #[inline]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Attaches a source.
    #[inline]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attaches a sourcetype.
    #[inline]
    pub fn with_sourcetype(mut self, sourcetype: impl Into<String>) -> Self {
        self.sourcetype = Some(sourcetype.into());
        self
    }

    /// Attaches the producing stanza name.
    #[inline]
    pub fn with_stanza(mut self, stanza: impl Into<String>) -> Self {
        self.stanza = Some(stanza.into());
        self
    }

    /// The record body as text, for the classic envelope.
    pub(crate) fn data_text(&self) -> String {
        match &self.data {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// The JSON envelope for the HTTP collector.
    pub(crate) fn to_hec_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("event".to_string(), self.data.clone());
        if let Some(time) = self.time {
            map.insert("time".to_string(), json!(time));
        }
        if let Some(index) = &self.index {
            map.insert("index".to_string(), json!(index));
        }
        if let Some(host) = &self.host {
            map.insert("host".to_string(), json!(host));
        }
        if let Some(source) = &self.source {
            map.insert("source".to_string(), json!(source));
        }
        if let Some(sourcetype) = &self.sourcetype {
            map.insert("sourcetype".to_string(), json!(sourcetype));
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hec_envelope_omits_unset_fields() {
        let envelope = Event::new("ping").to_hec_json();
        assert_eq!(envelope, json!({ "event": "ping" }));
    }

    #[test]
    fn hec_envelope_carries_routing_metadata() {
        let envelope = Event::new(json!({"user": "jdoe"}))
            .with_time(1754524800.5)
            .with_index("main")
            .with_sourcetype("demo:auth")
            .to_hec_json();

        assert_eq!(
            envelope,
            json!({
                "event": {"user": "jdoe"},
                "time": 1754524800.5,
                "index": "main",
                "sourcetype": "demo:auth",
            })
        );
    }

    #[test]
    fn structured_data_renders_as_json_text() {
        let ev = Event::new(json!({"a": 1}));
        assert_eq!(ev.data_text(), r#"{"a":1}"#);
        assert_eq!(Event::new("plain").data_text(), "plain");
    }
}
