use reqwest::header::HeaderMap;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

/// Per-request configuration forwarded to the transport.
///
/// Only `raise_for_status` is interpreted by the facade itself; every other
/// field is passed through to the request builder untouched.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub headers: HeaderMap,
    pub json: Option<Value>,
    pub form: Option<Vec<(String, String)>>,
    pub params: Option<Vec<(String, String)>>,
    pub raise_for_status: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            headers: HeaderMap::new(),
            json: None,
            form: None,
            params: None,
            raise_for_status: true,
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_json(mut self, json: Value) -> Self {
        self.json = Some(json);
        self
    }

    pub fn with_form<K, V>(mut self, form: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.form = Some(
            form.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    pub fn with_params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.params = Some(
            params.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    pub fn with_raise_for_status(mut self, raise_for_status: bool) -> Self {
        self.raise_for_status = raise_for_status;
        self
    }

    /// The first non-empty payload among json, form and params, rendered for
    /// the request log. Checked in exactly that order.
    pub(crate) fn loggable_payload(&self) -> Option<String> {
        if let Some(json) = &self.json
            && !is_empty_json(json)
        {
            return Some(pretty_print(json));
        }
        if let Some(form) = &self.form
            && !form.is_empty()
        {
            return Some(pretty_print(&pairs_to_object(form)));
        }
        if let Some(params) = &self.params
            && !params.is_empty()
        {
            return Some(pretty_print(&pairs_to_object(params)));
        }
        None
    }
}

fn is_empty_json(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn pairs_to_object(pairs: &[(String, String)]) -> Value {
    Value::Object(
        pairs
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect(),
    )
}

/// Renders a JSON value with 4-space indentation.
fn pretty_print(value: &Value) -> String {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);

    // Serializing an in-memory value to a Vec cannot fail.
    value
        .serialize(&mut serializer)
        .expect("Failed to serialize JSON value");
    String::from_utf8(buffer).expect("Serialized JSON was not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_uses_four_space_indentation() {
        let options = RequestOptions::new().with_json(json!({"a": 1}));

        assert_eq!(
            options.loggable_payload().unwrap(),
            "{\n    \"a\": 1\n}"
        );
    }

    #[test]
    fn test_payload_prefers_json_over_form_and_params() {
        let options = RequestOptions::new()
            .with_json(json!({"source": "json"}))
            .with_form([("source", "form")])
            .with_params([("source", "params")]);

        let payload = options.loggable_payload().unwrap();
        assert!(payload.contains("\"source\": \"json\""));
    }

    #[test]
    fn test_payload_prefers_form_over_params() {
        let options = RequestOptions::new()
            .with_form([("source", "form")])
            .with_params([("source", "params")]);

        let payload = options.loggable_payload().unwrap();
        assert!(payload.contains("\"source\": \"form\""));
    }

    #[test]
    fn test_empty_payloads_are_skipped() {
        let options = RequestOptions::new()
            .with_json(json!({}))
            .with_form(Vec::<(String, String)>::new())
            .with_params(Vec::<(String, String)>::new());

        assert_eq!(options.loggable_payload(), None);
    }

    #[test]
    fn test_null_json_is_skipped() {
        let options = RequestOptions::new().with_json(Value::Null);

        assert_eq!(options.loggable_payload(), None);
    }

    #[test]
    fn test_empty_json_falls_through_to_form() {
        let options = RequestOptions::new()
            .with_json(json!({}))
            .with_form([("key", "value")]);

        let payload = options.loggable_payload().unwrap();
        assert!(payload.contains("\"key\": \"value\""));
    }

    #[test]
    fn test_absent_payloads_log_nothing() {
        assert_eq!(RequestOptions::new().loggable_payload(), None);
    }

    #[test]
    fn test_raise_for_status_defaults_to_true() {
        assert!(RequestOptions::new().raise_for_status);
        assert!(!RequestOptions::new().with_raise_for_status(false).raise_for_status);
    }
}
