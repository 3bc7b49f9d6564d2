//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket workspace at `/ws`
/// - read-only lookups under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        .route("/ws", get(ws::ws_upgrade))
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/languages", get(http::http_languages))
        .route("/api/v1/topics", get(http::http_topics))
        .route("/api/v1/problems", get(http::http_problems))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsoleConfig;
    use crate::domain::{Difficulty, ProblemDescriptor, ProblemSummary, SubmissionRequest};
    use crate::error::ConsoleError;
    use crate::gateway::{Judge, ProblemSource, Tutor};
    use crate::wire::{JudgeReply, VivaBody};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    struct Catalog {
        up: bool,
    }

    #[async_trait]
    impl ProblemSource for Catalog {
        async fn fetch_problem(&self, slug: &str) -> Result<ProblemDescriptor, ConsoleError> {
            Err(ConsoleError::NotFound(slug.to_string()))
        }

        async fn list_problems(&self) -> Result<Vec<ProblemSummary>, ConsoleError> {
            if self.up {
                Ok(vec![ProblemSummary {
                    slug: "two-sum".into(),
                    title: "Two Sum".into(),
                    difficulty: Difficulty::Easy,
                }])
            } else {
                Err(ConsoleError::TransientFetch("connection refused".into()))
            }
        }
    }

    #[async_trait]
    impl Judge for Catalog {
        async fn execute(&self, _request: &SubmissionRequest) -> Result<JudgeReply, ConsoleError> {
            Ok(JudgeReply::default())
        }
    }

    #[async_trait]
    impl Tutor for Catalog {
        async fn ask(&self, _body: &VivaBody) -> Result<String, ConsoleError> {
            Ok(String::new())
        }
    }

    fn app(up: bool) -> Router {
        let backend = Arc::new(Catalog { up });
        let state = AppState::with_backends(ConsoleConfig::default(), backend.clone(), backend.clone(), backend);
        build_router(Arc::new(state))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let res = app.oneshot(Request::get(uri).body(Body::empty()).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = get_json(app(true), "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn languages_in_selector_order() {
        let (_, body) = get_json(app(true), "/api/v1/languages").await;
        let ids: Vec<u64> = body.as_array().unwrap().iter().map(|l| l["id"].as_u64().unwrap()).collect();
        assert_eq!(ids, vec![71, 54, 62, 63]);
        assert_eq!(body[0]["slug"], "python");
    }

    #[tokio::test]
    async fn topics_come_from_config() {
        let (_, body) = get_json(app(true), "/api/v1/topics").await;
        assert_eq!(body["topics"].as_array().unwrap().len(), 8);
        assert_eq!(body["topics"][0], "Binary Search");
    }

    #[tokio::test]
    async fn problems_pass_through_or_bad_gateway() {
        let (status, body) = get_json(app(true), "/api/v1/problems").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["slug"], "two-sum");

        let (status, body) = get_json(app(false), "/api/v1/problems").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("connection refused"));
    }
}
