//! The shared HTTP client every resource calls through.
//!
//! # Design
//! `HttpClient` holds the current `ClientConfig` and a boxed [`Transport`].
//! A call is split the same way at every verb: `build_request` turns
//! (method, endpoint, params) into a plain `HttpRequest`, the transport
//! executes it, and `parse_response` turns the `HttpResponse` into a JSON
//! payload or a typed error. Both halves are public so the exact wire shape
//! can be inspected without a network.
//!
//! Configuration sits behind an `RwLock`; setters take `&self` so one client
//! can be shared through an `Arc` by the facade and every resource.

use std::fmt;
use std::sync::{PoisonError, RwLock};

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::rpc::{self, Endpoint, Params};

pub const USER_AGENT: &str = concat!("easypanel-rs/", env!("CARGO_PKG_VERSION"));

pub struct HttpClient {
    config: RwLock<ClientConfig>,
    transport: Box<dyn Transport>,
}

impl HttpClient {
    /// Client backed by the blocking ureq transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }

    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config: RwLock::new(config),
            transport: Box::new(transport),
        }
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> ClientConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Trailing slashes are stripped; the URL is otherwise stored as given.
    pub fn set_base_url(&self, base_url: &str) -> &Self {
        self.write_config(|config| config.set_base_url(base_url));
        self
    }

    pub fn set_auth_token(&self, token: &str) -> &Self {
        self.write_config(|config| config.set_auth_token(token));
        self
    }

    pub fn set_timeout(&self, seconds: u64) -> &Self {
        self.write_config(|config| config.set_timeout(seconds));
        self
    }

    fn write_config(&self, update: impl FnOnce(&mut ClientConfig)) {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut config);
    }

    pub fn get(&self, endpoint: impl Into<Endpoint>, params: Params) -> Result<Value> {
        self.call(HttpMethod::Get, endpoint, params)
    }

    pub fn post(&self, endpoint: impl Into<Endpoint>, params: Params) -> Result<Value> {
        self.call(HttpMethod::Post, endpoint, params)
    }

    pub fn put(&self, endpoint: impl Into<Endpoint>, params: Params) -> Result<Value> {
        self.call(HttpMethod::Put, endpoint, params)
    }

    pub fn patch(&self, endpoint: impl Into<Endpoint>, params: Params) -> Result<Value> {
        self.call(HttpMethod::Patch, endpoint, params)
    }

    pub fn delete(&self, endpoint: impl Into<Endpoint>, params: Params) -> Result<Value> {
        self.call(HttpMethod::Delete, endpoint, params)
    }

    /// Sends one request and decodes the answer.
    pub fn call(
        &self,
        method: HttpMethod,
        endpoint: impl Into<Endpoint>,
        params: Params,
    ) -> Result<Value> {
        let endpoint = endpoint.into();
        let request = self.build_request(method, &endpoint, &params)?;
        debug!(%method, %endpoint, "sending request");

        let response = self.transport.execute(&request)?;
        debug!(%method, %endpoint, status = response.status, "received response");
        if !(200..300).contains(&response.status) {
            warn!(%method, %endpoint, status = response.status, "request failed");
        }
        parse_response(&response)
    }

    /// Builds the exact request `call` would send.
    ///
    /// GET carries the bag as `?input={"json": params}` (nothing when the
    /// bag is empty). POST, PUT and PATCH always send the flat bag as the
    /// body. DELETE sends the flat bag only when it has entries.
    pub fn build_request(
        &self,
        method: HttpMethod,
        endpoint: &Endpoint,
        params: &Params,
    ) -> Result<HttpRequest> {
        let config = self.config();
        let mut url = format!("{}{}", config.base_url(), endpoint.path());

        let body = match method {
            HttpMethod::Get => {
                if let Some(query) = rpc::encode_input_query(params)? {
                    url.push('?');
                    url.push_str(&query);
                }
                None
            }
            HttpMethod::Delete if params.is_empty() => None,
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch | HttpMethod::Delete => {
                Some(serde_json::to_string(params).map_err(|e| {
                    Error::Generic(format!("failed to encode request body: {e}"))
                })?)
            }
        };

        let mut headers = vec![
            ("accept".to_string(), "application/json".to_string()),
            ("user-agent".to_string(), USER_AGENT.to_string()),
        ];
        if !config.auth_token().is_empty() {
            headers.push((
                "authorization".to_string(),
                format!("Bearer {}", config.auth_token()),
            ));
        }
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
            timeout: config.timeout(),
        })
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config())
            .finish_non_exhaustive()
    }
}

/// Decodes a 2xx body, or maps any other status to an error.
///
/// An empty or `null` success body becomes an empty object.
pub fn parse_response(response: &HttpResponse) -> Result<Value> {
    if !(200..300).contains(&response.status) {
        return Err(map_status_to_error(response.status, &response.body));
    }
    if response.body.trim().is_empty() {
        return Ok(empty_object());
    }
    match serde_json::from_str::<Value>(&response.body) {
        Ok(Value::Null) => Ok(empty_object()),
        Ok(payload) => Ok(payload),
        Err(e) => Err(Error::Generic(format!(
            "response body is not valid JSON: {e}"
        ))),
    }
}

/// Status-code mapping: 401 authentication, 422 validation, anything else
/// an API error carrying the status.
pub fn map_status_to_error(status: u16, body: &str) -> Error {
    let payload: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let message = rpc::error_message(&payload);

    match status {
        401 => Error::Authentication {
            message: message.unwrap_or_else(|| "Authentication failed".to_string()),
            status,
        },
        422 => Error::Validation {
            message: message.unwrap_or_else(|| "Validation failed".to_string()),
            errors: rpc::field_errors(&payload),
        },
        _ => Error::Api {
            message: message.unwrap_or_else(|| "API request failed".to_string()),
            status: Some(status),
        },
    }
}

fn empty_object() -> Value {
    Value::Object(Params::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, TransportError};
    use crate::testing::{bag, input_of, json_body, recording_client, RecordingTransport};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn trailing_slash_is_stripped_from_base_url() {
        let (transport, client) = recording_client();
        client.set_base_url("https://host.test/");
        client.get("auth.getUser", Params::new()).unwrap();
        assert_eq!(
            transport.last_request().url,
            "https://host.test/api/trpc/auth.getUser"
        );
    }

    #[test]
    fn get_wraps_params_in_input_envelope() {
        let (transport, client) = recording_client();
        client
            .get("projects.inspectProject", bag(json!({"a": 1})))
            .unwrap();
        let request = transport.last_request();
        assert_eq!(request.method, HttpMethod::Get);
        assert!(request.body.is_none());
        assert_eq!(input_of(&request), Some(json!({"json": {"a": 1}})));
    }

    #[test]
    fn get_with_empty_params_has_no_query_string() {
        let (transport, client) = recording_client();
        client.get("projects.listProjects", Params::new()).unwrap();
        let request = transport.last_request();
        assert!(!request.url.contains('?'));
        assert!(request.header("content-type").is_none());
    }

    #[test]
    fn writes_send_the_flat_bag() {
        let (transport, client) = recording_client();
        let params = bag(json!({"name": "web"}));
        client.post("projects.createProject", params.clone()).unwrap();
        client.put("x.put", params.clone()).unwrap();
        client.patch("x.patch", params.clone()).unwrap();
        client.delete("x.delete", params).unwrap();
        for request in transport.requests() {
            assert_eq!(json_body(&request), json!({"name": "web"}));
            assert_eq!(request.header("content-type"), Some("application/json"));
            assert!(!request.url.contains('?'));
        }
    }

    #[test]
    fn empty_bag_is_an_empty_object_except_for_delete() {
        let (transport, client) = recording_client();
        client.post("x.post", Params::new()).unwrap();
        client.delete("x.delete", Params::new()).unwrap();
        let requests = transport.requests();
        assert_eq!(requests[0].body.as_deref(), Some("{}"));
        assert!(requests[1].body.is_none());
    }

    #[test]
    fn headers_include_accept_and_bearer_token() {
        let (transport, client) = recording_client();
        client.set_auth_token("secret");
        client.get("auth.getUser", Params::new()).unwrap();
        let request = transport.last_request();
        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(request.header("authorization"), Some("Bearer secret"));
        assert!(request.header("user-agent").unwrap().starts_with("easypanel-rs/"));
    }

    #[test]
    fn empty_token_sends_no_authorization() {
        let (transport, client) = recording_client();
        client.set_auth_token("");
        client.get("auth.getUser", Params::new()).unwrap();
        assert!(transport.last_request().header("authorization").is_none());
    }

    #[test]
    fn setters_chain_and_apply_to_later_calls() {
        let (transport, client) = recording_client();
        client
            .set_base_url("https://a.test")
            .set_timeout(5)
            .set_base_url("https://b.test/");
        client.get("auth.getUser", Params::new()).unwrap();
        let request = transport.last_request();
        assert!(request.url.starts_with("https://b.test/api/trpc/"));
        assert_eq!(request.timeout, Duration::from_secs(5));
    }

    #[test]
    fn success_body_is_returned_verbatim() {
        let payload = json!({"x": 1});
        assert_eq!(parse_response(&response(200, r#"{"x":1}"#)).unwrap(), payload);
        assert_eq!(parse_response(&response(201, "[1,2]")).unwrap(), json!([1, 2]));
    }

    #[test]
    fn empty_or_null_success_body_is_an_empty_object() {
        assert_eq!(parse_response(&response(204, "")).unwrap(), json!({}));
        assert_eq!(parse_response(&response(200, "  \n")).unwrap(), json!({}));
        assert_eq!(parse_response(&response(200, "null")).unwrap(), json!({}));
    }

    #[test]
    fn undecodable_success_body_is_generic() {
        let err = parse_response(&response(200, "<html>")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Generic);
    }

    #[test]
    fn unauthorized_maps_to_authentication() {
        let err = parse_response(&response(401, r#"{"message":"bad token"}"#)).unwrap_err();
        assert!(matches!(err, Error::Authentication { status: 401, .. }));
        assert_eq!(err.message(), "bad token");

        let err = parse_response(&response(401, "")).unwrap_err();
        assert_eq!(err.message(), "Authentication failed");
    }

    #[test]
    fn unprocessable_maps_to_validation_with_field_errors() {
        let err = parse_response(&response(
            422,
            r#"{"message":"invalid","errors":{"name":["required"]}}"#,
        ))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.message(), "invalid");
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["name"], vec!["required".to_string()]);

        let err = parse_response(&response(422, "{}")).unwrap_err();
        assert_eq!(err.message(), "Validation failed");
        assert!(err.field_errors().unwrap().is_empty());
    }

    #[test]
    fn other_statuses_map_to_api_errors() {
        for (status, body) in [(500, "oops"), (500, r#"{"error":"boom"}"#), (404, "")] {
            let err = parse_response(&response(status, body)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Api);
            assert_eq!(err.status(), Some(status));
        }
        assert_eq!(map_status_to_error(500, "oops").message(), "API request failed");
        assert_eq!(map_status_to_error(500, r#"{"error":"boom"}"#).message(), "boom");
        assert_eq!(
            map_status_to_error(400, r#"{"error":{"json":{"message":"Invalid input"}}}"#)
                .message(),
            "Invalid input"
        );
    }

    #[test]
    fn transport_failures_are_not_domain_errors() {
        let transport = Arc::new(RecordingTransport::default());
        transport.fail_with(TransportError::Timeout(Duration::from_secs(1)));
        let client = HttpClient::with_transport(ClientConfig::new("http://x.test", ""), transport);
        let err = client.get("auth.getUser", Params::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn status_errors_flow_through_call() {
        let (transport, client) = recording_client();
        transport.respond(500, "internal error");
        let err = client.post("projects.createProject", Params::new()).unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn debug_does_not_leak_token() {
        let (_, client) = recording_client();
        client.set_auth_token("super-secret-token");
        assert!(!format!("{client:?}").contains("super-secret-token"));
    }
}
