use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Form, Json,
};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use super::ApiError;
use crate::canon::normalize;
use crate::models::RepositoryRecord;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    /// Raw repository reference; a missing field is treated as empty
    #[serde(default)]
    pub url: String,
}

/// POST /
///
/// Registers the repository named by form field `url`, or returns the
/// existing record when the canonical identifier is already known.
///
/// `url` is read from a urlencoded body first, then from the query string.
/// Multipart bodies are not read.
///
/// Can be tested with curl:
/// `curl localhost:8081 -d "url=git@github.com:kkochis/adoptmyapp.git"`
///
/// Returns:
/// - 200: { "url": "github.com/owner/repo", "added": "2014-02-26T03:00:56Z" }
/// - 400: Input is not a GitHub repository reference (plain text)
/// - 500: Storage error (plain text)
pub async fn register_repository(
    State(state): State<AppState>,
    Query(query): Query<RegisterForm>,
    body: Option<Form<RegisterForm>>,
) -> Result<Json<RepositoryRecord>, ApiError> {
    let raw = match body {
        Some(Form(form)) if !form.url.is_empty() => form.url,
        _ => query.url,
    };

    let repo = normalize(&raw).map_err(|e| {
        warn!(input = %raw, error = %e, "Rejected repository reference");
        ApiError::from(e)
    })?;

    let registration = state.store.get_or_create(&repo).await.map_err(|e| {
        error!(
            repo = %repo,
            backend = state.store.backend(),
            error = %e,
            "get_or_create failed"
        );
        ApiError::from(e)
    })?;

    if registration.created {
        info!("Registered repository: {}", registration.record.url);
    } else {
        debug!(
            "Repository already registered: {} (added {})",
            registration.record.url, registration.record.added
        );
    }

    Ok(Json(registration.record))
}

/// Any method other than POST on `/`
pub async fn not_implemented() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        "Not Implemented\n",
    )
}
