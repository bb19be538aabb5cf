use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::error;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DetailedHealth {
    pub status: String,
    pub timestamp: i64,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub storage: ServiceCheck,
}

#[derive(Debug, Serialize)]
pub struct ServiceCheck {
    pub status: String,
    pub backend: String,
    pub latency_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn health() -> &'static str {
    "OK"
}

/// Detailed health check endpoint
///
/// - HTTP 200 + "healthy": store answered its ping
/// - HTTP 503 + "unhealthy": store unreachable
pub async fn health_detailed(State(state): State<AppState>) -> (StatusCode, Json<DetailedHealth>) {
    let timestamp = chrono::Utc::now().timestamp();
    let storage = check_storage(&state).await;

    let (code, status) = if storage.status == "error" {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    } else {
        (StatusCode::OK, "healthy")
    };

    (
        code,
        Json(DetailedHealth {
            status: status.to_string(),
            timestamp,
            checks: HealthChecks { storage },
        }),
    )
}

async fn check_storage(state: &AppState) -> ServiceCheck {
    let start = std::time::Instant::now();
    let backend = state.store.backend().to_string();
    match state.store.ping().await {
        Ok(()) => ServiceCheck {
            status: "ok".to_string(),
            backend,
            latency_ms: Some(start.elapsed().as_millis() as i64),
            error: None,
        },
        Err(e) => {
            error!("Health check: storage ping failed: {}", e);
            ServiceCheck {
                status: "error".to_string(),
                backend,
                latency_ms: None,
                error: Some(e.to_string()),
            }
        }
    }
}
