//! Axum router assembly.

use axum::http::{HeaderValue, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CorsConfig;
use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Mounts `/health`, the automation API and the webhook endpoint at its
/// configured path. Unknown routes answer a JSON 404. Includes a
/// [`TraceLayer`] that logs each HTTP request/response at the `DEBUG` level
/// and a CORS layer for the configured origin.
pub fn build(state: AppState, cors: &CorsConfig) -> Router {
    let webhook_path = state.webhook.route_path();
    tracing::info!(path = %webhook_path, "webhook endpoint mounted");

    let router = Router::new()
        .route("/health", get(health_check))
        .merge(crate::api::routes())
        .route(&webhook_path, post(crate::api::webhook::receive))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http());

    let router = match cors_layer(cors) {
        Some(layer) => router.layer(layer),
        None => router,
    };
    router.with_state(state)
}

fn cors_layer(cors: &CorsConfig) -> Option<CorsLayer> {
    let origin = if cors.origin.trim() == "*" {
        AllowOrigin::any()
    } else {
        match HeaderValue::from_str(cors.origin.trim()) {
            Ok(value) => AllowOrigin::exact(value),
            Err(err) => {
                tracing::warn!(origin = %cors.origin, error = %err, "ignoring invalid CORS origin");
                return None;
            }
        }
    };
    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    timestamp: String,
    version: &'static str,
}

async fn health_check() -> Json<Health> {
    Json(Health {
        status: "ok",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "endpoint not found", "path": uri.path() })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WebhookConfig;
    use crate::signature;
    use axum::body::Body;
    use axum::http::Request;
    use gitautomata_app::automation::Automation;
    use gitautomata_app::dry_run::DryRunClient;
    use gitautomata_app::runner::AutomationRunner;
    use gitautomata_domain::event::EventKind;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    const SECRET: &str = "topsecret";

    fn runner() -> Arc<AutomationRunner> {
        let runner = AutomationRunner::new();
        runner.register(
            Automation::builder()
                .name("commenter")
                .description("Comments on new issues")
                .on(EventKind::Issues, |event, client| async move {
                    let number = event.payload["issue"]["number"].as_u64().unwrap_or_default();
                    client.add_comment("octo", "hello", number, "seen").await?;
                    Ok(())
                })
                .manual(|_client, args| async move {
                    if args.first().and_then(Value::as_str) == Some("fail") {
                        anyhow::bail!("asked to fail");
                    }
                    Ok(())
                })
                .build()
                .unwrap(),
        );
        runner.register(
            Automation::builder()
                .name("listener")
                .on(EventKind::Push, |_event, _client| async { Ok(()) })
                .build()
                .unwrap(),
        );
        Arc::new(runner)
    }

    fn app_with(secret: Option<&str>, client: Arc<DryRunClient>, cors: &CorsConfig) -> Router {
        let webhook = WebhookConfig {
            secret: secret.map(str::to_string),
            ..WebhookConfig::default()
        };
        build(AppState::new(runner(), client, webhook), cors)
    }

    fn app() -> Router {
        app_with(None, Arc::new(DryRunClient::new()), &CorsConfig::default())
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn webhook_request(event: Option<&str>, signature: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/webhook/github")
            .header("content-type", "application/json")
            .header("x-github-delivery", "72d3162e-cc78-11e3-81ab-4c9367dc0958");
        if let Some(event) = event {
            builder = builder.header("x-github-event", event);
        }
        if let Some(signature) = signature {
            builder = builder.header("x-hub-signature-256", signature);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    const ISSUE_OPENED: &str = r#"{"action":"opened","issue":{"number":12},"repository":{"full_name":"octo/hello"}}"#;

    // ── Health & fallback ──────────────────────────────────────────

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn should_return_json_404_when_route_unknown() {
        let response = app()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"], "endpoint not found");
        assert_eq!(body["path"], "/nope");
    }

    // ── Automations API ────────────────────────────────────────────

    #[tokio::test]
    async fn should_list_registered_automations() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/automations")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let automations = body["automations"].as_array().unwrap();
        assert_eq!(automations.len(), 2);
        assert_eq!(automations[0]["name"], "commenter");
        assert_eq!(automations[0]["description"], "Comments on new issues");
        assert_eq!(automations[0]["has_run"], true);
        assert_eq!(automations[0]["events"], serde_json::json!(["issues"]));
        assert_eq!(automations[1]["name"], "listener");
        assert!(automations[1]["description"].is_null());
        assert_eq!(automations[1]["has_run"], false);
    }

    #[tokio::test]
    async fn should_run_automation_manually_when_body_empty() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/automations/commenter/run")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "automation 'commenter' executed successfully");
        assert!(body["duration_ms"].is_u64());
    }

    #[tokio::test]
    async fn should_return_400_when_manual_run_fails() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/automations/commenter/run")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"args":["fail"]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "asked to fail");
        assert_eq!(body["message"], "error in automation 'commenter': asked to fail");
    }

    #[tokio::test]
    async fn should_return_400_when_automation_unknown() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/automations/ghost/run")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "automation 'ghost' not found");
    }

    #[tokio::test]
    async fn should_return_400_when_automation_has_no_manual_entry() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/automations/listener/run")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(
            body["error"],
            "automation 'listener' does not support manual execution"
        );
    }

    #[tokio::test]
    async fn should_return_400_when_run_body_is_invalid() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/automations/commenter/run")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("invalid argument 'args'"));
    }

    // ── Webhook ────────────────────────────────────────────────────

    #[tokio::test]
    async fn should_dispatch_webhook_when_signature_valid() {
        let client = Arc::new(DryRunClient::new());
        let app = app_with(Some(SECRET), Arc::clone(&client), &CorsConfig::default());
        let signature = signature::sign(SECRET.as_bytes(), ISSUE_OPENED.as_bytes()).unwrap();

        let response = app
            .oneshot(webhook_request(Some("issues"), Some(&signature), ISSUE_OPENED))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["success"], true);
        let comments = client.calls_to("add_comment");
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].args["number"], 12);
    }

    #[tokio::test]
    async fn should_return_401_when_signature_mismatches() {
        let client = Arc::new(DryRunClient::new());
        let app = app_with(Some(SECRET), Arc::clone(&client), &CorsConfig::default());
        let signature = signature::sign(SECRET.as_bytes(), b"{}").unwrap();

        let response = app
            .oneshot(webhook_request(Some("issues"), Some(&signature), ISSUE_OPENED))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], "invalid signature");
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn should_return_401_when_signature_missing() {
        let app = app_with(
            Some(SECRET),
            Arc::new(DryRunClient::new()),
            &CorsConfig::default(),
        );

        let response = app
            .oneshot(webhook_request(Some("issues"), None, ISSUE_OPENED))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn should_skip_signature_check_when_no_secret() {
        let response = app()
            .oneshot(webhook_request(Some("push"), None, r#"{"ref":"refs/heads/main"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_return_400_when_event_type_missing() {
        let response = app()
            .oneshot(webhook_request(None, None, ISSUE_OPENED))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "missing event type");
    }

    #[tokio::test]
    async fn should_return_400_when_payload_not_json() {
        let response = app()
            .oneshot(webhook_request(Some("push"), None, "not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "invalid payload");
    }

    #[tokio::test]
    async fn should_accept_webhook_when_an_automation_fails() {
        let client = Arc::new(DryRunClient::new().fail_on("add_comment"));
        let app = app_with(None, Arc::clone(&client), &CorsConfig::default());

        let response = app
            .oneshot(webhook_request(Some("issues"), None, ISSUE_OPENED))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(client.calls_to("add_comment").len(), 1);
    }

    #[tokio::test]
    async fn should_mount_webhook_on_configured_path() {
        let webhook = WebhookConfig {
            secret: None,
            path: "/hooks".to_string(),
        };
        let app = build(
            AppState::new(runner(), Arc::new(DryRunClient::new()), webhook),
            &CorsConfig::default(),
        );

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/hooks")
                    .header("x-github-event", "push")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    // ── CORS ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn should_allow_configured_cors_origin() {
        let cors = CorsConfig {
            origin: "https://dashboard.example.com".to_string(),
        };
        let app = app_with(None, Arc::new(DryRunClient::new()), &cors);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", "https://dashboard.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "https://dashboard.example.com"
        );
    }

    #[tokio::test]
    async fn should_allow_any_origin_by_default() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", "https://anywhere.example.org")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }
}
