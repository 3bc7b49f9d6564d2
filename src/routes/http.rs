//! HTTP endpoint handlers. Read-only lookups for the browser: health, the
//! language table, the topic list and a pass-through of the problem catalog.

use std::sync::Arc;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{error, info, instrument};

use crate::domain::LANGUAGES;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info")]
pub async fn http_languages() -> impl IntoResponse {
  Json(LANGUAGES.iter().map(|l| LanguageOut::from(*l)).collect::<Vec<_>>())
}

#[instrument(level = "info", skip(state))]
pub async fn http_topics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(TopicsOut { topics: state.config.topics.clone() })
}

#[instrument(level = "info", skip(state))]
pub async fn http_problems(State(state): State<Arc<AppState>>) -> axum::response::Response {
  match state.problems.list_problems().await {
    Ok(rows) => {
      info!(target: "console_host", count = rows.len(), "HTTP catalog served");
      Json(rows).into_response()
    }
    Err(e) => {
      error!(target: "console_host", error = %e, "HTTP catalog unavailable");
      (StatusCode::BAD_GATEWAY, Json(ErrorOut { error: e.to_string() })).into_response()
    }
  }
}
