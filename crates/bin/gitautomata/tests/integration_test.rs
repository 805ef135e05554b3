//! End-to-end smoke tests for the full gitautomata stack.
//!
//! Each test wires the real built-in automations, the real runner and the
//! real axum router, with a recording dry-run client standing in for GitHub,
//! and exercises the HTTP layer via `tower::ServiceExt::oneshot`, so no TCP
//! port is bound.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use gitautomata_adapter_http_axum::config::{CorsConfig, WebhookConfig};
use gitautomata_adapter_http_axum::router;
use gitautomata_adapter_http_axum::signature;
use gitautomata_adapter_http_axum::state::AppState;
use gitautomata_app::dry_run::DryRunClient;
use gitautomata_app::runner::AutomationRunner;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "it's a secret";

/// Build a fully-wired router with every built-in automation registered.
fn app(client: Arc<DryRunClient>) -> axum::Router {
    let runner = AutomationRunner::new();
    gitautomata_automations::register(&runner, &gitautomata_automations::BUILTIN)
        .expect("built-in automations should register");

    let webhook = WebhookConfig {
        secret: Some(SECRET.to_string()),
        ..WebhookConfig::default()
    };
    let state = AppState::new(Arc::new(runner), client, webhook);
    router::build(state, &CorsConfig::default())
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn signed_webhook(event: &str, payload: &Value) -> Request<Body> {
    let body = payload.to_string();
    let signature = signature::sign(SECRET.as_bytes(), body.as_bytes()).unwrap();
    Request::builder()
        .method("POST")
        .uri("/webhook/github")
        .header("content-type", "application/json")
        .header("x-github-event", event)
        .header("x-hub-signature-256", signature)
        .body(Body::from(body))
        .unwrap()
}

fn repository() -> Value {
    json!({ "name": "hello", "full_name": "octo/hello", "owner": { "login": "octo" } })
}

// ---------------------------------------------------------------------------
// Health & discovery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let resp = app(Arc::new(DryRunClient::new()))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn should_list_every_builtin_automation() {
    let resp = app(Arc::new(DryRunClient::new()))
        .oneshot(Request::builder().uri("/automations").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    let names: Vec<&str> = body["automations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|automation| automation["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, gitautomata_automations::BUILTIN);

    let slack = &body["automations"][3];
    assert_eq!(slack["has_run"], false);
    assert_eq!(slack["events"], json!(["pull_request", "issues"]));
}

// ---------------------------------------------------------------------------
// Webhooks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_label_and_welcome_opened_pull_request() {
    let client = Arc::new(DryRunClient::new());
    let payload = json!({
        "action": "opened",
        "pull_request": {
            "number": 7,
            "title": "fix: resolve crash on start",
            "user": { "login": "mona" },
            "html_url": "https://github.com/octo/hello/pull/7",
            "head": { "ref": "fix/crash", "sha": "abc123" }
        },
        "repository": repository()
    });

    let resp = app(client.clone())
        .oneshot(signed_webhook("pull_request", &payload))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({ "success": true }));

    let comments = client.calls_to("add_comment");
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].args["number"], 7);
    assert!(comments[0].args["body"].as_str().unwrap().starts_with("Hi @mona!"));

    let labels = client.calls_to("add_labels");
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].args["labels"], json!(["bug"]));
}

#[tokio::test]
async fn should_not_label_issue_when_no_rule_matches() {
    let client = Arc::new(DryRunClient::new());
    let payload = json!({
        "action": "opened",
        "issue": { "number": 3, "title": "Rename the project", "body": "Thoughts?" },
        "repository": repository()
    });

    let resp = app(client.clone())
        .oneshot(signed_webhook("issues", &payload))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(client.calls_to("add_labels").is_empty());
}

#[tokio::test]
async fn should_accept_webhook_even_when_github_call_fails() {
    let client = Arc::new(DryRunClient::new().fail_on("add_labels"));
    let payload = json!({
        "action": "opened",
        "issue": { "number": 4, "title": "Crash: app is broken", "body": "" },
        "repository": repository()
    });

    let resp = app(client.clone())
        .oneshot(signed_webhook("issues", &payload))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(client.calls_to("add_labels").len(), 1);
}

#[tokio::test]
async fn should_reject_tampered_webhook() {
    let client = Arc::new(DryRunClient::new());
    let mut request = signed_webhook("push", &json!({ "ref": "refs/heads/main" }));
    *request.body_mut() = Body::from(r#"{"ref":"refs/heads/evil"}"#);

    let resp = app(client.clone()).oneshot(request).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(resp).await["error"], "invalid signature");
    assert!(client.calls().is_empty());
}

// ---------------------------------------------------------------------------
// Manual runs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_replay_auto_label_on_existing_issue() {
    let client = Arc::new(
        DryRunClient::new().with_response(
            "get_issue",
            json!({ "number": 9, "title": "Feature: dark mode", "body": "please" }),
        ),
    );

    let resp = app(client.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/automations/auto-label/run")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"args":["octo","hello",9]}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "automation 'auto-label' executed successfully");

    let labels = client.calls_to("add_labels");
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].args["labels"], json!(["enhancement"]));
}

#[tokio::test]
async fn should_return_400_when_running_automation_without_manual_entry() {
    let resp = app(Arc::new(DryRunClient::new()))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/automations/slack-notifier/run")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["success"], false);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("does not support manual execution")
    );
}
