//! In-memory transport shared by unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::client::HttpClient;
use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::rpc::Params;

/// Records every request and answers from a queue, `200 {}` when empty.
#[derive(Default)]
pub(crate) struct RecordingTransport {
    requests: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<HttpResponse>>,
    failure: Mutex<Option<TransportError>>,
}

impl RecordingTransport {
    pub(crate) fn respond(&self, status: u16, body: &str) {
        self.responses.lock().unwrap().push_back(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        });
    }

    pub(crate) fn fail_with(&self, err: TransportError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl Transport for RecordingTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(err) = self.failure.lock().unwrap().take() {
            return Err(err);
        }
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: "{}".to_string(),
            }))
    }
}

pub(crate) fn recording_client() -> (Arc<RecordingTransport>, Arc<HttpClient>) {
    let transport = Arc::new(RecordingTransport::default());
    let client = HttpClient::with_transport(
        ClientConfig::new("http://panel.test", "token"),
        transport.clone(),
    );
    (transport, Arc::new(client))
}

pub(crate) fn bag(value: Value) -> Params {
    value.as_object().cloned().expect("bag must be a JSON object")
}

pub(crate) fn json_body(request: &HttpRequest) -> Value {
    serde_json::from_str(request.body.as_deref().expect("request has no body")).unwrap()
}

/// Decoded `input` query parameter, if the URL has one.
pub(crate) fn input_of(request: &HttpRequest) -> Option<Value> {
    let (_, query) = request.url.split_once('?')?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "input")
        .map(|(_, value)| serde_json::from_str(&value).unwrap())
}

/// Last request's procedure name and parameters, whichever verb carried them.
pub(crate) fn last_call(transport: &RecordingTransport) -> (String, Value) {
    let request = transport.last_request();
    let path = request.url.split('?').next().unwrap_or_default();
    let procedure = path.rsplit('/').next().unwrap_or_default().to_string();
    let params = match &request.body {
        Some(_) => json_body(&request),
        None => input_of(&request)
            .map(|input| input["json"].clone())
            .unwrap_or_else(|| Value::Object(Params::new())),
    };
    (procedure, params)
}
