//! tRPC naming and envelope conventions.
//!
//! Every procedure lives under `/api/trpc/<group>.<procedure>`. Reads carry
//! their parameters as `?input=<json>` where the JSON is `{"json": params}`;
//! writes carry the flat parameter bag as the request body.

use std::borrow::Cow;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::{Error, FieldErrors, Result};

/// Path prefix shared by every procedure.
pub const TRPC_PREFIX: &str = "/api/trpc";

/// Ordered key/value payload of a single call.
pub type Params = Map<String, Value>;

/// Dotted procedure name, e.g. `services.mysql.createService`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint(Cow<'static, str>);

impl Endpoint {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Endpoint(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path relative to the panel's base URL.
    pub fn path(&self) -> String {
        format!("{TRPC_PREFIX}/{}", self.0)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Endpoint {
    fn from(name: &'static str) -> Self {
        Endpoint::new(name)
    }
}

impl From<String> for Endpoint {
    fn from(name: String) -> Self {
        Endpoint::new(name)
    }
}

/// Wraps a bag in the `{"json": ...}` envelope used for reads.
pub fn wrap_input(params: &Params) -> Value {
    let mut envelope = Map::new();
    envelope.insert("json".to_string(), Value::Object(params.clone()));
    Value::Object(envelope)
}

/// Query string for a read, or `None` when there is nothing to send.
pub fn encode_input_query(params: &Params) -> Result<Option<String>> {
    if params.is_empty() {
        return Ok(None);
    }
    let input = serde_json::to_string(&wrap_input(params))
        .map_err(|e| Error::Generic(format!("failed to encode request input: {e}")))?;
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("input", &input)
        .finish();
    Ok(Some(query))
}

/// Inner data of a tRPC success envelope (`result.data.json`, or
/// `result.data` for panels without a transformer).
pub fn trpc_data(payload: &Value) -> Option<&Value> {
    let data = payload.get("result")?.get("data")?;
    Some(data.get("json").unwrap_or(data))
}

/// Best message an error body offers: `message`, `error`, `error.message`,
/// then `error.json.message`.
pub(crate) fn error_message(body: &Value) -> Option<String> {
    if let Some(message) = body.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }
    match body.get("error") {
        Some(Value::String(message)) => Some(message.clone()),
        Some(error @ Value::Object(_)) => error
            .get("message")
            .or_else(|| error.get("json").and_then(|json| json.get("message")))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// `errors` map of a 422 body. Single strings are promoted to one-element
/// lists; anything that is not a string is dropped.
pub(crate) fn field_errors(body: &Value) -> FieldErrors {
    let Some(errors) = body.get("errors").and_then(Value::as_object) else {
        return FieldErrors::new();
    };
    errors
        .iter()
        .map(|(field, messages)| {
            let messages = match messages {
                Value::String(message) => vec![message.clone()],
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
                _ => Vec::new(),
            };
            (field.clone(), messages)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    fn decode_input(query: &str) -> Value {
        let (key, value) = url::form_urlencoded::parse(query.as_bytes())
            .next()
            .unwrap();
        assert_eq!(key, "input");
        serde_json::from_str(&value).unwrap()
    }

    #[test]
    fn endpoint_path_uses_trpc_prefix() {
        let endpoint = Endpoint::from("auth.getUser");
        assert_eq!(endpoint.path(), "/api/trpc/auth.getUser");
        assert_eq!(endpoint.to_string(), "auth.getUser");
    }

    #[test]
    fn input_query_decodes_back_to_envelope() {
        let query = encode_input_query(&bag(json!({"a": 1}))).unwrap().unwrap();
        assert!(query.starts_with("input="));
        assert_eq!(decode_input(&query), json!({"json": {"a": 1}}));
    }

    #[test]
    fn input_query_escapes_reserved_characters() {
        let query = encode_input_query(&bag(json!({"q": "a&b=c d"})))
            .unwrap()
            .unwrap();
        assert!(!query.contains('&'));
        assert_eq!(decode_input(&query), json!({"json": {"q": "a&b=c d"}}));
    }

    #[test]
    fn empty_params_produce_no_query() {
        assert_eq!(encode_input_query(&Params::new()).unwrap(), None);
    }

    #[test]
    fn wrap_input_preserves_key_order() {
        let wrapped = wrap_input(&bag(json!({"projectName": "p", "serviceName": "s"})));
        let keys: Vec<_> = wrapped["json"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["projectName", "serviceName"]);
    }

    #[test]
    fn trpc_data_unwraps_result_envelope() {
        let payload = json!({"result": {"data": {"json": [1, 2]}}});
        assert_eq!(trpc_data(&payload), Some(&json!([1, 2])));
        let plain = json!({"result": {"data": {"ok": true}}});
        assert_eq!(trpc_data(&plain), Some(&json!({"ok": true})));
        assert_eq!(trpc_data(&json!({"x": 1})), None);
    }

    #[test]
    fn error_message_lookup_order() {
        assert_eq!(
            error_message(&json!({"message": "m", "error": "e"})).as_deref(),
            Some("m")
        );
        assert_eq!(error_message(&json!({"error": "e"})).as_deref(), Some("e"));
        assert_eq!(
            error_message(&json!({"error": {"message": "nested"}})).as_deref(),
            Some("nested")
        );
        assert_eq!(
            error_message(&json!({"error": {"json": {"message": "trpc", "code": -32600}}}))
                .as_deref(),
            Some("trpc")
        );
        assert_eq!(error_message(&json!({"status": "bad"})), None);
        assert_eq!(error_message(&Value::Null), None);
    }

    #[test]
    fn field_errors_accept_lists_and_single_strings() {
        let errors = field_errors(&json!({
            "errors": {"name": ["required", "too short"], "port": "invalid"}
        }));
        assert_eq!(errors["name"], vec!["required", "too short"]);
        assert_eq!(errors["port"], vec!["invalid"]);
        assert!(field_errors(&json!({"message": "x"})).is_empty());
    }
}
