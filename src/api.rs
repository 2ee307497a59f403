// src/api.rs
//! HTTP trigger surface: read the stored list, run an update cycle on demand
//! (password-gated) or from an external cron (bearer secret).

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::config::TriggerConfig;
use crate::pipeline::{CycleReport, UpdatePipeline};

pub const MSG_UPDATE_FAILED: &str = "ニュースの更新に失敗しました。";
pub const MSG_BAD_PASSWORD: &str = "更新パスワードが違います";
pub const MSG_BUSY: &str = "更新処理中です。しばらくお待ちください。";
pub const MSG_LOAD_FAILED: &str = "ニュースの読み込みに失敗しました。";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<UpdatePipeline>,
    pub trigger: TriggerConfig,
    /// One cycle at a time per process.
    guard: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(pipeline: Arc<UpdatePipeline>, trigger: TriggerConfig) -> Self {
        Self {
            pipeline,
            trigger,
            guard: Arc::new(Mutex::new(())),
        }
    }

    /// `None` when another cycle is already running in this process.
    pub async fn try_run_cycle(&self) -> Option<anyhow::Result<CycleReport>> {
        let _lock = self.guard.try_lock().ok()?;
        Some(self.pipeline.run_cycle().await)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/news", get(list_news))
        .route("/api/update", post(manual_update))
        .route("/api/cron", get(cron_update))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn list_news(State(state): State<AppState>) -> Response {
    match state.pipeline.store().load().await {
        Ok(items) => Json(items).into_response(),
        Err(e) => {
            error!(target: "api", error = ?e, "loading news failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, MSG_LOAD_FAILED)
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct UpdateReq {
    #[serde(default)]
    password: Option<String>,
}

async fn manual_update(State(state): State<AppState>, body: Bytes) -> Response {
    info!(target: "api", "manual update requested");
    if let Some(expected) = state.trigger.update_password.as_deref() {
        let req: UpdateReq = serde_json::from_slice(&body).unwrap_or_default();
        if req.password.as_deref() != Some(expected) {
            warn!(target: "api", "update blocked: wrong password");
            return failure(StatusCode::UNAUTHORIZED, MSG_BAD_PASSWORD);
        }
    }
    run_and_respond(&state).await
}

async fn cron_update(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let presented = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let authorized = match state.trigger.cron_secret.as_deref() {
        Some(secret) => presented == Some(format!("Bearer {secret}").as_str()),
        None => false,
    };
    if !authorized {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }
    info!(target: "api", "cron update triggered");
    run_and_respond(&state).await
}

async fn run_and_respond(state: &AppState) -> Response {
    match state.try_run_cycle().await {
        None => failure(StatusCode::CONFLICT, MSG_BUSY),
        Some(Ok(report)) => Json(json!({
            "success": true,
            "message": report.message,
            "count": report.added,
        }))
        .into_response(),
        Some(Err(e)) => {
            error!(target: "api", error = ?e, "update cycle failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, MSG_UPDATE_FAILED)
        }
    }
}

fn failure(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "success": false, "error": msg }))).into_response()
}
