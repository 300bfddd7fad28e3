use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::config::{ScheduleConfig, UnresolvedPredecessorPolicy};
use crate::error::ScheduleError;
use crate::graph::detect_cycle;
use crate::persistence::PersistenceError;
use crate::persistence::file::network_from_value;
use crate::schedule::{ScheduleSnapshot, compute_schedule};
use crate::task::TaskId;

/// Shared server state. Only the default configuration lives here; every
/// request computes from its own network.
#[derive(Clone, Default)]
pub struct AppState {
    config: Arc<RwLock<ScheduleConfig>>,
}

impl AppState {
    pub fn new(config: ScheduleConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }

    fn config(&self) -> ScheduleConfig {
        self.config.read().clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tasks: Vec<TaskId>,
}

#[derive(Debug)]
enum ApiError {
    Invalid(String),
    Schedule(ScheduleError),
}

impl From<ScheduleError> for ApiError {
    fn from(value: ScheduleError) -> Self {
        ApiError::Schedule(value)
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        ApiError::Invalid(value.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        ApiError::Invalid(value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Invalid(message) => {
                let body = Json(ErrorBody {
                    error: "invalid_request",
                    message,
                    tasks: Vec::new(),
                });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Schedule(err) => {
                let error = match err {
                    ScheduleError::CycleDetected { .. } => "cycle_detected",
                    ScheduleError::InvalidDuration { .. } => "invalid_duration",
                    ScheduleError::UnknownPredecessorReference { .. } => "unknown_predecessor",
                    ScheduleError::DuplicateTaskId(_) => "duplicate_task_id",
                    ScheduleError::DateOverflow { .. } => "date_overflow",
                };
                let body = Json(ErrorBody {
                    error,
                    message: err.to_string(),
                    tasks: err.offending_tasks().into_iter().cloned().collect(),
                });
                (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ScheduleQuery {
    near_critical: Option<i64>,
    strict: Option<bool>,
}

impl ScheduleQuery {
    fn apply(&self, mut config: ScheduleConfig) -> ScheduleConfig {
        if let Some(threshold) = self.near_critical {
            config.near_critical_threshold = threshold;
        }
        if let Some(strict) = self.strict {
            config.unresolved_predecessors = if strict {
                UnresolvedPredecessorPolicy::Reject
            } else {
                UnresolvedPredecessorPolicy::Ignore
            };
        }
        config
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleReport {
    pub acyclic: bool,
    pub cycle: Vec<TaskId>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/config", get(get_config).put(update_config))
        .route("/schedule", post(schedule_network))
        .route("/cycles", post(check_cycles))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, config: ScheduleConfig) -> std::io::Result<()> {
    let state = AppState::new(config);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_config(State(state): State<AppState>) -> Json<ScheduleConfig> {
    Json(state.config())
}

async fn update_config(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ScheduleConfig>, ApiError> {
    let config = ScheduleConfig::from_json_str(&body)?;
    *state.config.write() = config.clone();
    debug!(?config, "default configuration replaced");
    Ok(Json(config))
}

async fn schedule_network(
    State(state): State<AppState>,
    query: Result<Query<ScheduleQuery>, QueryRejection>,
    document: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ScheduleSnapshot>, ApiError> {
    let Query(query) = query?;
    let Json(document) = document?;
    let network = network_from_value(document)?;
    let config = query.apply(state.config());
    let snapshot = compute_schedule(&network, &config)?;
    Ok(Json(snapshot))
}

async fn check_cycles(
    document: Result<Json<Value>, JsonRejection>,
) -> Result<Json<CycleReport>, ApiError> {
    let Json(document) = document?;
    let network = network_from_value(document)?;
    let report = match detect_cycle(&network) {
        Some(cycle) => CycleReport {
            acyclic: false,
            cycle,
        },
        None => CycleReport {
            acyclic: true,
            cycle: Vec::new(),
        },
    };
    Ok(Json(report))
}
