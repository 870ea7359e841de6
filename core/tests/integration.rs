//! End-to-end tests against the mock panel.
//!
//! # Design
//! Each test starts the mock server on a random port in a background thread,
//! then drives the facade over real HTTP through the default ureq transport.
//! This catches drift between the request shapes the core builds and the
//! ones a panel accepts.

use std::sync::Arc;

use easypanel_core::{Easypanel, Error, ErrorKind, Params};
use mock_server::{Panel, SharedPanel};
use serde_json::{json, Value};
use tokio::sync::RwLock;

const TOKEN: &str = "integration-token";

/// Starts a mock panel and returns its base URL and shared state.
fn start_panel() -> (String, SharedPanel) {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let panel: SharedPanel = Arc::new(RwLock::new(Panel::new(TOKEN)));
    let state = panel.clone();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, state).await
        })
        .unwrap();
    });

    (format!("http://{addr}"), panel)
}

fn project(name: &str) -> Params {
    json!({ "name": name }).as_object().cloned().unwrap()
}

fn data(payload: &Value) -> &Value {
    &payload["result"]["data"]["json"]
}

#[test]
fn authenticated_user_over_trailing_slash_base_url() {
    let (base, _) = start_panel();
    let panel = Easypanel::new(&format!("{base}/"), TOKEN);

    let user = panel.auth().get_user().unwrap();
    assert_eq!(data(&user)["email"], "admin@example.com");
}

#[test]
fn project_lifecycle() {
    let (base, state) = start_panel();
    let panel = Easypanel::new(&base, TOKEN);
    let projects = panel.projects();

    // Step 1: nothing yet.
    let listed = projects.list_projects().unwrap();
    assert_eq!(data(&listed), &json!([]));

    // Step 2: create.
    let created = projects.create_project(project("shop")).unwrap();
    assert_eq!(data(&created)["name"], "shop");

    // Step 3: inspect over GET input.
    let inspected = projects.inspect_project("shop").unwrap();
    assert_eq!(data(&inspected)["project"]["name"], "shop");

    // Step 4: delete sends its target in a DELETE body.
    projects.delete_project("shop").unwrap();
    let last = state.blocking_read().calls.last().cloned().unwrap();
    assert_eq!(last.method, "DELETE");
    assert_eq!(last.input, json!({"projectName": "shop"}));

    // Step 5: gone.
    let err = projects.inspect_project("shop").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.message(), "Project shop not found");
}

#[test]
fn bad_token_is_authentication_error() {
    let (base, _) = start_panel();
    let panel = Easypanel::new(&base, "wrong");

    let err = panel.auth().get_user().unwrap_err();
    assert!(matches!(err, Error::Authentication { status: 401, .. }));
    assert_eq!(err.message(), "Invalid or missing token");

    panel.set_auth_token(TOKEN);
    assert!(panel.auth().get_user().is_ok());
}

#[test]
fn server_side_validation_carries_field_errors() {
    let (base, _) = start_panel();
    let panel = Easypanel::new(&base, TOKEN);
    panel.projects().create_project(project("shop")).unwrap();

    let err = panel.projects().create_project(project("shop")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.message(), "Validation failed");
    assert_eq!(
        err.field_errors().unwrap()["name"],
        vec!["Project already exists".to_string()]
    );
}

#[test]
fn local_validation_never_reaches_the_panel() {
    let (base, state) = start_panel();
    let panel = Easypanel::new(&base, TOKEN);

    let err = panel.projects().create_project(project("Bad Name")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(state.blocking_read().calls.is_empty());
}

#[test]
fn empty_success_body_is_empty_object() {
    let (base, _) = start_panel();
    let panel = Easypanel::new(&base, TOKEN);

    assert_eq!(panel.settings().get_server_ip().unwrap(), json!({}));
}

#[test]
fn plain_text_failure_uses_fallback_message() {
    let (base, _) = start_panel();
    let panel = Easypanel::new(&base, TOKEN);

    let err = panel.monitor().get_system_stats().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.message(), "API request failed");
}

#[test]
fn resolve_by_name_reaches_the_panel() {
    let (base, _) = start_panel();
    let panel = Easypanel::new(&base, TOKEN);

    let easypanel_core::Resource::Projects(projects) = panel.resolve("projects").unwrap() else {
        panic!("projects resolved to another capability");
    };
    projects.create_project(project("blog")).unwrap();
    assert_eq!(data(&panel.projects().list_projects().unwrap())[0]["name"], "blog");
}

#[test]
fn refused_connection_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let panel = Easypanel::new(&format!("http://127.0.0.1:{port}"), TOKEN);
    panel.set_timeout(2);

    let err = panel.auth().get_user().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}
