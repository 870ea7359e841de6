//! In-memory stand-in for an Easypanel instance.
//!
//! Serves a handful of tRPC procedures under `/api/trpc/{procedure}` with the
//! same envelope, verbs and error shapes as a real panel, so the client can
//! be exercised end to end over HTTP.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
}

/// One procedure call as the panel received it.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub procedure: String,
    pub input: Value,
}

#[derive(Debug, Default)]
pub struct Panel {
    pub token: String,
    pub projects: Vec<Project>,
    pub calls: Vec<RecordedCall>,
}

impl Panel {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            ..Self::default()
        }
    }
}

pub type SharedPanel = Arc<RwLock<Panel>>;

pub fn app(panel: SharedPanel) -> Router {
    Router::new()
        .route("/api/trpc/{procedure}", any(dispatch))
        .with_state(panel)
}

pub async fn run(listener: TcpListener, panel: SharedPanel) -> Result<(), std::io::Error> {
    axum::serve(listener, app(panel)).await
}

/// Whether a procedure is read with GET or changed with another verb.
enum Kind {
    Query,
    Mutation,
}

fn kind_of(procedure: &str) -> Option<Kind> {
    match procedure {
        "auth.getUser"
        | "projects.listProjects"
        | "projects.inspectProject"
        | "settings.getServerIp"
        | "monitor.getSystemStats" => Some(Kind::Query),
        "projects.createProject" | "projects.deleteProject" => Some(Kind::Mutation),
        _ => None,
    }
}

async fn dispatch(
    State(panel): State<SharedPanel>,
    Path(procedure): Path<String>,
    method: Method,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> Response {
    let Some(kind) = kind_of(&procedure) else {
        return trpc_error(
            StatusCode::NOT_FOUND,
            &format!("No procedure found on path \"{procedure}\""),
        );
    };
    let verb_ok = match kind {
        Kind::Query => method == Method::GET,
        Kind::Mutation => method != Method::GET,
    };
    if !verb_ok {
        return trpc_error(StatusCode::METHOD_NOT_ALLOWED, "Unsupported method");
    }

    let input = match read_input(&method, &query, &body) {
        Ok(input) => input,
        Err(message) => return trpc_error(StatusCode::BAD_REQUEST, &message),
    };

    let mut panel = panel.write().await;
    panel.calls.push(RecordedCall {
        method: method.to_string(),
        procedure: procedure.clone(),
        input: Value::Object(input.clone()),
    });

    let expected = format!("Bearer {}", panel.token);
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected);
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"json": {"message": "Invalid or missing token"}}})),
        )
            .into_response();
    }

    match procedure.as_str() {
        "auth.getUser" => data(json!({"id": "admin", "email": "admin@example.com", "admin": true})),
        "projects.listProjects" => data(json!(panel.projects)),
        "projects.inspectProject" => {
            let name = input.get("projectName").and_then(Value::as_str).unwrap_or_default();
            match panel.projects.iter().find(|p| p.name == name) {
                Some(project) => data(json!({"project": project, "services": []})),
                None => not_found(name),
            }
        }
        "projects.createProject" => create_project(&mut panel, &input),
        "projects.deleteProject" => {
            let name = input.get("projectName").and_then(Value::as_str).unwrap_or_default();
            let before = panel.projects.len();
            panel.projects.retain(|p| p.name != name);
            if panel.projects.len() == before {
                return not_found(name);
            }
            data(Value::Null)
        }
        // answers with no body at all
        "settings.getServerIp" => StatusCode::OK.into_response(),
        "monitor.getSystemStats" => {
            (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
        }
        _ => trpc_error(StatusCode::NOT_IMPLEMENTED, "Procedure not emulated"),
    }
}

/// GET input comes from `?input={"json": ...}`, everything else from a
/// flat JSON body. Missing input is an empty object.
fn read_input(
    method: &Method,
    query: &HashMap<String, String>,
    body: &str,
) -> Result<Map<String, Value>, String> {
    let raw = if *method == Method::GET {
        match query.get("input") {
            None => return Ok(Map::new()),
            Some(raw) => {
                let wrapped: Value =
                    serde_json::from_str(raw).map_err(|e| format!("bad input: {e}"))?;
                wrapped.get("json").cloned().unwrap_or(Value::Null)
            }
        }
    } else if body.trim().is_empty() {
        return Ok(Map::new());
    } else {
        serde_json::from_str(body).map_err(|e| format!("bad body: {e}"))?
    };
    match raw {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err("input must be an object".to_string()),
    }
}

fn create_project(panel: &mut Panel, input: &Map<String, Value>) -> Response {
    let name = input.get("name").and_then(Value::as_str).unwrap_or_default();
    if name.is_empty() {
        return validation_error("name", "Name is required");
    }
    let valid = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !valid {
        return validation_error("name", "Invalid project name");
    }
    if panel.projects.iter().any(|p| p.name == name) {
        return validation_error("name", "Project already exists");
    }
    let project = Project {
        id: Uuid::new_v4(),
        name: name.to_string(),
    };
    panel.projects.push(project.clone());
    data(json!(project))
}

fn data(value: Value) -> Response {
    Json(json!({"result": {"data": {"json": value}}})).into_response()
}

fn trpc_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"error": {"json": {"message": message}}}))).into_response()
}

fn not_found(project: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": format!("Project {project} not found")})),
    )
        .into_response()
}

fn validation_error(field: &str, message: &str) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({"message": "Validation failed", "errors": {field: [message]}})),
    )
        .into_response()
}
