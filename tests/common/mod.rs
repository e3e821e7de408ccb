// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test fixtures: a stub backend served on an ephemeral port so
//! the real transport is exercised end to end.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use zoroark::config::Config;
use zoroark::models::{Cidr, IpWhitelistRule};
use zoroark::AppContext;

/// Mutable backend state the tests poke at.
#[derive(Default)]
pub struct StubState {
    /// Identity returned by `GET /me`; `None` means 401.
    pub me: Mutex<Option<serde_json::Value>>,
    /// Overrides the `/me` status outright (e.g. 403 or 500).
    pub me_status: Mutex<Option<u16>>,
    pub me_calls: AtomicUsize,
    /// Artificial `/me` latency, for stale-response tests.
    pub me_delay_ms: AtomicU64,

    pub logout_calls: AtomicUsize,
    pub logout_fails: AtomicBool,

    pub rules: Mutex<Vec<IpWhitelistRule>>,
    pub whitelist_active: AtomicBool,
    /// When set, an active whitelist 403s requests from an uncovered IP.
    pub enforce_lockout: AtomicBool,
    /// The requester IP "seen" by the backend via forwarded headers.
    pub requester_ip: Mutex<String>,
    pub emergency_token: Mutex<Option<String>>,
    pub emergency_calls: AtomicUsize,
}

impl StubState {
    pub fn new() -> Arc<Self> {
        let state = Self {
            requester_ip: Mutex::new("192.168.1.100".to_string()),
            ..Self::default()
        };
        Arc::new(state)
    }

    #[allow(dead_code)]
    pub fn set_me(&self, me: Option<serde_json::Value>) {
        *self.me.lock().unwrap() = me;
    }

    #[allow(dead_code)]
    pub fn set_requester_ip(&self, ip: &str) {
        *self.requester_ip.lock().unwrap() = ip.to_string();
    }

    #[allow(dead_code)]
    pub fn add_rule(&self, rule: IpWhitelistRule) {
        self.rules.lock().unwrap().push(rule);
    }

    #[allow(dead_code)]
    pub fn rule_ids(&self) -> Vec<String> {
        self.rules.lock().unwrap().iter().map(|r| r.id.clone()).collect()
    }
}

/// A plausible `/me` payload.
#[allow(dead_code)]
pub fn sample_me() -> serde_json::Value {
    serde_json::json!({
        "user_id": "u-1",
        "email": "op@example.com",
        "user_name": "op",
        "tenant_name": "acme",
        "tenant_plan": "enterprise",
        "permissions": ["ip_whitelist.edit", "users.view"],
        "enterprise_features": { "ip_whitelist": { "enabled": true } }
    })
}

/// Build a whitelist rule fixture.
#[allow(dead_code)]
pub fn rule(id: &str, cidr: &str, label: Option<&str>) -> IpWhitelistRule {
    IpWhitelistRule {
        id: id.to_string(),
        tenant_id: "t-1".to_string(),
        ip_address: cidr.parse::<Cidr>().expect("valid test CIDR"),
        label: label.map(str::to_string),
        created_by: "op".to_string(),
        created_at: chrono::Utc::now(),
    }
}

/// Serve the stub backend on an ephemeral port; returns its base URL.
#[allow(dead_code)]
pub async fn spawn_backend(state: Arc<StubState>) -> String {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub backend");
    });
    format!("http://{addr}")
}

/// Spawn a backend plus an application context wired against it.
#[allow(dead_code)]
pub async fn spawn_context() -> (Arc<StubState>, AppContext) {
    let state = StubState::new();
    let base_url = spawn_backend(state.clone()).await;
    let ctx = AppContext::new(Config::for_base_url(&base_url)).expect("context");
    (state, ctx)
}

fn router(state: Arc<StubState>) -> Router {
    Router::new()
        .route("/me", get(me))
        .route("/auth/logout", post(logout))
        .route("/auth/verify-reset-token", post(accept_json))
        .route("/auth/signup", post(accept_json))
        .route("/users/invite", post(accept_json))
        .route("/users/{id}/roles", post(accept_with_id))
        .route("/roles", get(roles))
        .route("/roles/permissions", get(role_permissions))
        .route("/ip-whitelist", get(list_rules))
        .route("/ip-whitelist/create", post(create_rule))
        .route("/ip-whitelist/activate", post(activate))
        .route("/ip-whitelist/deactivate", post(deactivate))
        .route("/ip-whitelist/{id}/delete", post(delete_rule))
        .route("/ip-whitelist/{id}/label/update", post(update_label))
        .route("/ip-whitelist/emergency-deactivate", post(emergency_deactivate))
        // Plain fixtures for transport classification tests.
        .route("/boom", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
        .route("/forbidden", get(|| async { StatusCode::FORBIDDEN }))
        .route("/widgets", get(widgets).post(widget_create))
        .route("/widgets/taken", post(widget_taken))
        .route("/widgets/plain-error", post(widget_plain_error))
        .route("/widgets/expired", post(|| async { StatusCode::UNAUTHORIZED }))
        .with_state(state)
}

async fn me(State(state): State<Arc<StubState>>) -> Response {
    state.me_calls.fetch_add(1, Ordering::SeqCst);

    if locked_out(&state) {
        return (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({ "error": "IP address not allowed" })),
        )
            .into_response();
    }

    let delay = state.me_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
    }

    if let Some(status) = *state.me_status.lock().unwrap() {
        let code = StatusCode::from_u16(status).expect("valid status");
        return (code, Json(serde_json::json!({ "error": "identity unavailable" })))
            .into_response();
    }

    match state.me.lock().unwrap().clone() {
        Some(me) => Json(me).into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn logout(State(state): State<Arc<StubState>>) -> Response {
    state.logout_calls.fetch_add(1, Ordering::SeqCst);
    if state.logout_fails.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "logout failed" })),
        )
            .into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn accept_json(Json(_body): Json<serde_json::Value>) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn accept_with_id(
    Path(_id): Path<String>,
    Json(_body): Json<serde_json::Value>,
) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn roles() -> Json<serde_json::Value> {
    Json(serde_json::json!([
        { "id": "role-admin", "name": "Admin", "permissions": ["tenant.edit", "users.edit", "roles.edit", "ip_whitelist.edit"] },
        { "id": "role-viewer", "name": "Viewer", "permissions": ["tenant.view", "users.view"] }
    ]))
}

async fn role_permissions() -> Json<serde_json::Value> {
    Json(serde_json::json!([
        "tenant.view", "tenant.edit",
        "users.view", "users.edit",
        "roles.view", "roles.edit",
        "ip_whitelist.view", "ip_whitelist.edit"
    ]))
}

async fn list_rules(State(state): State<Arc<StubState>>) -> Response {
    if locked_out(&state) {
        return (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({ "error": "IP address not allowed" })),
        )
            .into_response();
    }
    Json(state.rules.lock().unwrap().clone()).into_response()
}

async fn create_rule(
    State(state): State<Arc<StubState>>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let ip = body["ip_address"].as_str().unwrap_or_default();
    let cidr: Cidr = match ip.parse() {
        Ok(cidr) => cidr,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": "invalid IP address" })),
            )
                .into_response();
        }
    };

    let mut rules = state.rules.lock().unwrap();
    let new_rule = IpWhitelistRule {
        id: format!("r-{}", rules.len() + 1),
        tenant_id: "t-1".to_string(),
        ip_address: cidr,
        label: body["label"].as_str().map(str::to_string),
        created_by: "op".to_string(),
        created_at: chrono::Utc::now(),
    };
    rules.push(new_rule.clone());
    Json(new_rule).into_response()
}

fn locked_out(state: &StubState) -> bool {
    state.enforce_lockout.load(Ordering::SeqCst)
        && state.whitelist_active.load(Ordering::SeqCst)
        && !requester_matches(state)
}

fn requester_matches(state: &StubState) -> bool {
    let ip: std::net::IpAddr = state
        .requester_ip
        .lock()
        .unwrap()
        .parse()
        .expect("valid requester IP");
    state
        .rules
        .lock()
        .unwrap()
        .iter()
        .any(|rule| rule.ip_address.contains(ip))
}

async fn activate(
    State(state): State<Arc<StubState>>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let force = body["force"].as_bool().unwrap_or(false);

    if requester_matches(&state) || force {
        state.whitelist_active.store(true, Ordering::SeqCst);
        return Json(serde_json::json!({ "activated": true })).into_response();
    }

    let requester_ip = state.requester_ip.lock().unwrap().clone();
    Json(serde_json::json!({ "activated": false, "requester_ip": requester_ip }))
        .into_response()
}

async fn deactivate(State(state): State<Arc<StubState>>) -> StatusCode {
    state.whitelist_active.store(false, Ordering::SeqCst);
    StatusCode::NO_CONTENT
}

async fn delete_rule(State(state): State<Arc<StubState>>, Path(id): Path<String>) -> Response {
    let active = state.whitelist_active.load(Ordering::SeqCst);
    let requester: std::net::IpAddr = state
        .requester_ip
        .lock()
        .unwrap()
        .parse()
        .expect("valid requester IP");

    let mut rules = state.rules.lock().unwrap();
    let Some(index) = rules.iter().position(|r| r.id == id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "rule not found" })),
        )
            .into_response();
    };

    if active && rules[index].ip_address.contains(requester) {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "Cannot delete a rule matching your current IP while the whitelist is active"
            })),
        )
            .into_response();
    }

    rules.remove(index);
    StatusCode::NO_CONTENT.into_response()
}

async fn update_label(
    State(state): State<Arc<StubState>>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let mut rules = state.rules.lock().unwrap();
    match rules.iter_mut().find(|r| r.id == id) {
        Some(rule) => {
            rule.label = body["label"].as_str().map(str::to_string);
            StatusCode::NO_CONTENT.into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "rule not found" })),
        )
            .into_response(),
    }
}

async fn emergency_deactivate(
    State(state): State<Arc<StubState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.emergency_calls.fetch_add(1, Ordering::SeqCst);

    let expected = state.emergency_token.lock().unwrap().clone();
    match (expected, params.get("token")) {
        (Some(expected), Some(token)) if &expected == token => {
            state.whitelist_active.store(false, Ordering::SeqCst);
            StatusCode::NO_CONTENT.into_response()
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "invalid or expired token" })),
        )
            .into_response(),
    }
}

async fn widgets() -> Json<serde_json::Value> {
    Json(serde_json::json!([{ "id": "w-1", "name": "alpha" }]))
}

async fn widget_create(Json(_body): Json<serde_json::Value>) -> Response {
    (StatusCode::CREATED, Json(serde_json::json!({ "id": "w-2" }))).into_response()
}

async fn widget_taken() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": "Widget name is taken" })),
    )
        .into_response()
}

async fn widget_plain_error() -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, "nope").into_response()
}
