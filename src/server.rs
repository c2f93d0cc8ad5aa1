//! Relay HTTP server.
//!
//! The browser prototype cannot hold the OAuth client secret, so sign-in goes
//! through this server: the page posts the authorization code GitHub handed
//! it, and the relay trades it for an access token and the user's profile.
//! The same server also answers playground queries.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/github-auth` | Exchange `{code}` for `{access_token, user}` |
//! | `POST` | `/api/search` | Run a playground query against a mock service |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Errors are a flat JSON object, which is what the prototype's sign-in
//! callback reads:
//!
//! ```json
//! { "error": "Code is required" }
//! ```
//!
//! Any origin, method and header is allowed.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use playbook_core::filter::build_filter;
use playbook_core::search::{service_title, SearchParams, AVAILABLE_SERVICES};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::{Config, PlaygroundConfig};
use crate::github::{AuthOutcome, GithubClient, GithubUser};
use crate::playground;

/// OAuth app credentials, resolved once at startup.
#[derive(Clone, Default)]
pub struct Credentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    github: Arc<GithubClient>,
    credentials: Arc<Credentials>,
    playground: Arc<PlaygroundConfig>,
}

impl AppState {
    pub fn new(config: &Config, credentials: Credentials) -> anyhow::Result<Self> {
        Ok(Self {
            github: Arc::new(GithubClient::new(&config.github)?),
            credentials: Arc::new(credentials),
            playground: Arc::new(config.playground.clone()),
        })
    }

    /// Credentials come from `[github]` and the environment.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let credentials = Credentials {
            client_id: config.github.resolve_client_id(),
            client_secret: config.github.resolve_client_secret(),
        };
        Self::new(config, credentials)
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/github-auth", post(handle_github_auth))
        .route("/api/search", post(handle_search))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Starts the relay server on `[server].bind` and runs until the process
/// is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    if state.credentials.client_id.is_none() || state.credentials.client_secret.is_none() {
        tracing::warn!(
            secret_env = %config.github.client_secret_env,
            "GitHub OAuth credentials are not configured; sign-in requests will fail"
        );
    }

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("relay server listening on http://{}", config.server.bind);
    println!("Relay server listening on http://{}", config.server.bind);
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

struct RelayError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> RelayError {
    RelayError {
        status: StatusCode::BAD_REQUEST,
        message: message.into(),
    }
}

fn auth_failed() -> RelayError {
    RelayError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Authentication failed".to_string(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /api/github-auth ============

#[derive(Serialize)]
struct AuthResponse {
    access_token: String,
    user: GithubUser,
}

/// The body is read leniently: anything that does not yield a non-empty
/// string `code` is a missing code.
async fn handle_github_auth(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AuthResponse>, RelayError> {
    let code = serde_json::from_slice::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("code").and_then(|c| c.as_str()).map(str::to_string))
        .filter(|c| !c.is_empty())
        .ok_or_else(|| bad_request("Code is required"))?;

    let (Some(client_id), Some(client_secret)) = (
        state.credentials.client_id.as_deref(),
        state.credentials.client_secret.as_deref(),
    ) else {
        tracing::error!("GitHub OAuth credentials are not configured");
        return Err(auth_failed());
    };

    match state
        .github
        .authenticate(client_id, client_secret, &code)
        .await
    {
        Ok(AuthOutcome::Authenticated { access_token, user }) => {
            tracing::info!(login = %user.login, "GitHub sign-in succeeded");
            Ok(Json(AuthResponse { access_token, user }))
        }
        Ok(AuthOutcome::Rejected(description)) => {
            tracing::warn!(%description, "GitHub rejected the authorization code");
            Err(bad_request(description))
        }
        Err(e) => {
            tracing::error!("GitHub OAuth error: {:#}", e);
            Err(auth_failed())
        }
    }
}

// ============ POST /api/search ============

#[derive(Deserialize)]
struct SearchRequest {
    #[serde(default)]
    service: Option<String>,
    #[serde(default)]
    variant: Option<String>,
    #[serde(flatten)]
    params: SearchParams,
}

async fn handle_search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<serde_json::Value>, RelayError> {
    if let Some(variant) = req.variant {
        let results = playground::search_variant(&state.playground, &variant, &req.params).await;
        return Ok(Json(serde_json::json!({
            "variant": variant,
            "results": results,
        })));
    }

    let service = req
        .service
        .unwrap_or_else(|| state.playground.default_service.clone());
    if !AVAILABLE_SERVICES.contains(&service.as_str()) {
        return Err(bad_request(format!("Unknown service: {}", service)));
    }

    let filter = build_filter(&req.params.filters, req.params.logical_op);
    let mut sets = playground::compare(&state.playground, &[service.clone()], &req.params).await;
    let results = sets.pop().map(|s| s.results).unwrap_or_default();

    Ok(Json(serde_json::json!({
        "service": service,
        "title": service_title(&service),
        "filter": filter,
        "results": results,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{HeaderMap, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    // ─── GitHub stand-in ───

    async fn stub_token(Json(body): Json<Value>) -> Response {
        match body["code"].as_str() {
            Some("good") => Json(json!({ "access_token": "tok", "token_type": "bearer" })).into_response(),
            Some("bad") => Json(json!({
                "error": "bad_verification_code",
                "error_description": "The code passed is incorrect or expired."
            }))
            .into_response(),
            Some("empty") => Json(json!({})).into_response(),
            _ => (StatusCode::OK, "<html>not json</html>").into_response(),
        }
    }

    async fn stub_user(headers: HeaderMap) -> Response {
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == "Bearer tok")
            .unwrap_or(false);
        if !authorized {
            return (StatusCode::UNAUTHORIZED, "Bad credentials").into_response();
        }
        let accept = headers.get("accept").and_then(|v| v.to_str().ok());
        if accept != Some("application/json") {
            return (StatusCode::NOT_ACCEPTABLE, "unexpected Accept").into_response();
        }
        Json(json!({
            "login": "octocat",
            "name": "The Octocat",
            "avatar_url": "https://example.test/octocat.png",
            "email": null,
            "id": 1
        }))
        .into_response()
    }

    async fn start_stub() -> String {
        let app = Router::new()
            .route("/login/oauth/access_token", post(stub_token))
            .route("/user", get(stub_user));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn test_config(base: &str) -> Config {
        let mut config = Config::minimal();
        config.github.oauth_url = format!("{}/login/oauth/access_token", base);
        config.github.api_url = base.to_string();
        config.github.timeout_secs = 5;
        config.playground.delay_ms = 0;
        config
    }

    fn credentials() -> Credentials {
        Credentials {
            client_id: Some("client".to_string()),
            client_secret: Some("secret".to_string()),
        }
    }

    fn app(config: &Config, credentials: Credentials) -> Router {
        router(AppState::new(config, credentials).unwrap())
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    // ─── /health ───

    #[tokio::test]
    async fn test_health() {
        let app = app(&test_config("http://127.0.0.1:1"), credentials());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
    }

    // ─── /api/github-auth ───

    #[tokio::test]
    async fn test_missing_code_is_400() {
        let config = test_config("http://127.0.0.1:1");
        for body in ["{}", r#"{"code":""}"#, r#"{"code":5}"#, "not json", ""] {
            let (status, json) = post_json(app(&config, credentials()), "/api/github-auth", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
            assert_eq!(json, json!({ "error": "Code is required" }));
        }
    }

    #[tokio::test]
    async fn test_successful_exchange() {
        let base = start_stub().await;
        let (status, json) = post_json(
            app(&test_config(&base), credentials()),
            "/api/github-auth",
            r#"{"code":"good"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["access_token"], "tok");
        assert_eq!(json["user"]["login"], "octocat");
        assert_eq!(json["user"]["name"], "The Octocat");
        assert!(json["user"]["email"].is_null());
        assert!(json["user"].get("id").is_none());
    }

    #[tokio::test]
    async fn test_rejected_code_is_400_with_description() {
        let base = start_stub().await;
        let (status, json) = post_json(
            app(&test_config(&base), credentials()),
            "/api/github-auth",
            r#"{"code":"bad"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "The code passed is incorrect or expired.");
    }

    #[tokio::test]
    async fn test_unreadable_token_response_is_500() {
        let base = start_stub().await;
        for code in ["broken", "empty"] {
            let (status, json) = post_json(
                app(&test_config(&base), credentials()),
                "/api/github-auth",
                &format!(r#"{{"code":"{}"}}"#, code),
            )
            .await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(json["error"], "Authentication failed");
        }
    }

    #[tokio::test]
    async fn test_unreachable_github_is_500() {
        let (status, json) = post_json(
            app(&test_config("http://127.0.0.1:1"), credentials()),
            "/api/github-auth",
            r#"{"code":"good"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Authentication failed");
    }

    #[tokio::test]
    async fn test_missing_credentials_is_500() {
        let base = start_stub().await;
        let (status, _) = post_json(
            app(&test_config(&base), Credentials::default()),
            "/api/github-auth",
            r#"{"code":"good"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    // ─── /api/search ───

    #[tokio::test]
    async fn test_search_default_service() {
        let config = test_config("http://127.0.0.1:1");
        let (status, json) = post_json(app(&config, credentials()), "/api/search", "{}").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["service"], "CHAT_CUSTOMER_TEST_CSS_A");
        assert_eq!(json["title"], "Customer Support Search");
        assert!(json["filter"].is_null());
        assert_eq!(json["results"][0]["rank"], 1);
    }

    #[tokio::test]
    async fn test_search_with_filter() {
        let config = test_config("http://127.0.0.1:1");
        let body = r#"{
            "service": "CHAT_CUSTOMER_TEST_CSS_B",
            "limit": 5,
            "filters": [{"column": "DOC_ID", "op": "@eq", "value": "doc-xyz-789", "negate": false}]
        }"#;
        let (status, json) = post_json(app(&config, credentials()), "/api/search", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["filter"], json!({ "@eq": { "DOC_ID": "doc-xyz-789" } }));
        let results = json["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["DOC_ID"], "doc-xyz-789");
    }

    #[tokio::test]
    async fn test_search_variant() {
        let config = test_config("http://127.0.0.1:1");
        let (status, json) = post_json(
            app(&config, credentials()),
            "/api/search",
            r#"{"variant":"B","limit":1}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["results"][0]["DOC_ID"], "doc_298_9a7a4f22");
    }

    #[tokio::test]
    async fn test_search_limit_zero_is_empty() {
        let config = test_config("http://127.0.0.1:1");
        let (status, json) = post_json(
            app(&config, credentials()),
            "/api/search",
            r#"{"limit":0}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["results"], json!([]));
    }

    #[tokio::test]
    async fn test_search_unknown_service_is_400() {
        let config = test_config("http://127.0.0.1:1");
        let (status, json) = post_json(
            app(&config, credentials()),
            "/api/search",
            r#"{"service":"NOPE"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("NOPE"));
    }
}
