use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use axum::{
    extract::{Json as AxumJson, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{delete, get, post},
    Json, Router,
};

use crate::interceptor::{NavigationInterceptor, RequestDecision};
use crate::logger::VerdictEntry;
use crate::service::FilterService;

static BLOCKED_PAGE_HTML: &str = include_str!("../../assets/blocked.html");

pub struct ApiState {
    pub service: Arc<FilterService>,
    pub interceptor: Arc<NavigationInterceptor>,
    pub logs_buffer: Arc<RwLock<VecDeque<VerdictEntry>>>,
    pub blocked_page_path: String,
}

pub fn router(state: Arc<ApiState>) -> Router {
    let blocked_page_path = state.blocked_page_path.clone();
    Router::new()
        .route("/api/status", get(get_status))
        .route("/api/enabled", post(set_enabled))
        .route("/api/domains", get(get_domains))
        .route("/api/domains", post(add_domain))
        .route("/api/domains/{domain}", delete(remove_domain))
        .route("/api/check", get(check_url))
        .route("/api/logs", get(get_logs))
        .route(&blocked_page_path, get(blocked_page))
        .with_state(state)
}

pub async fn start_api_server(state: Arc<ApiState>, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = router(state);
    tracing::info!("control API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn get_status(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let store = state.service.store();
    Json(serde_json::json!({
        "enabled": store.is_enabled(),
        "domains": store.domains().len(),
    }))
}

#[derive(serde::Deserialize)]
struct EnabledRequest {
    enabled: bool,
}

async fn set_enabled(
    State(state): State<Arc<ApiState>>,
    AxumJson(payload): AxumJson<EnabledRequest>,
) -> impl IntoResponse {
    match state.service.set_enabled(payload.enabled) {
        Ok(changed) => (
            StatusCode::OK,
            Json(serde_json::json!({ "enabled": payload.enabled, "changed": changed })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}

async fn get_domains(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    Json(state.service.store().domains())
}

#[derive(serde::Deserialize)]
struct DomainRequest {
    domain: String,
}

async fn add_domain(
    State(state): State<Arc<ApiState>>,
    AxumJson(payload): AxumJson<DomainRequest>,
) -> impl IntoResponse {
    match state.service.store().add_domain(&payload.domain) {
        Ok(added) => (
            StatusCode::OK,
            Json(serde_json::json!({ "added": added })),
        ),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}

async fn remove_domain(
    State(state): State<Arc<ApiState>>,
    Path(domain): Path<String>,
) -> impl IntoResponse {
    match state.service.store().remove_domain(&domain) {
        Ok(removed) => (
            StatusCode::OK,
            Json(serde_json::json!({ "removed": removed })),
        ),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}

#[derive(serde::Deserialize)]
struct CheckParams {
    url: String,
}

/// Decision endpoint for the extension's pre-request hook: returns whether to
/// let the navigation proceed and, on a block, where to send it instead.
async fn check_url(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<CheckParams>,
) -> impl IntoResponse {
    match state.interceptor.on_before_request(&params.url) {
        RequestDecision::Continue => Json(serde_json::json!({ "blocked": false })),
        RequestDecision::Redirect(target) => {
            Json(serde_json::json!({ "blocked": true, "redirect": target }))
        }
    }
}

async fn get_logs(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let buffer = state.logs_buffer.read().unwrap();
    // Newest first
    let logs: Vec<VerdictEntry> = buffer.iter().rev().cloned().collect();
    Json(logs)
}

async fn blocked_page() -> impl IntoResponse {
    Html(BLOCKED_PAGE_HTML)
}
