use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, Method,
    },
    routing::{get, post},
    Router,
};
use or_core::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub mod handlers;
pub mod state;

pub use state::AppState;

/// Any origin may call the API; only the headers browser clients send are allowed.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            CONTENT_TYPE,
        ])
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/health", get(handlers::health))
        .layer(cors_layer())
        .with_state(Arc::new(state))
}

pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🌐 listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

pub mod prelude {
    pub use or_core::{Error, Result};
    pub use crate::{create_app, serve, AppState};
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use or_analysis::{Analyzer, BatchConfig, BatchRunner};
    use or_core::{AnalysisParts, ArticleAnalysis, Error};
    use or_inference::models::DummyModel;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    struct StubAnalyzer;

    #[async_trait]
    impl Analyzer for StubAnalyzer {
        async fn analyze(&self, url: &str, _focus_keyword: &str) -> Result<ArticleAnalysis> {
            if url.contains("broken") {
                return Err(Error::fetch(url, Some(404), "not found"));
            }
            Ok(ArticleAnalysis::new(AnalysisParts {
                title: "Stub".to_string(),
                url: url.to_string(),
                word_count: 1200,
                keywords: vec!["compost".to_string()],
                ..Default::default()
            }))
        }
    }

    fn app(dev_mode: bool) -> Router {
        let config = BatchConfig {
            max_attempts: 1,
            backoff_step: Duration::from_millis(1),
            ..Default::default()
        };
        let runner = BatchRunner::new(Arc::new(StubAnalyzer), Arc::new(DummyModel::new()), config);
        create_app(AppState::new(runner).with_dev_mode(dev_mode))
    }

    fn post_json(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(false)
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_analyze_returns_batch() {
        let response = app(false)
            .oneshot(post_json(json!({"urls": ["https://a.test/1", "https://b.test/2"], "keyword": "compost"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["analyses"].as_array().unwrap().len(), 2);
        assert_eq!(body["analyses"][1]["url"], "https://b.test/2");
        assert_eq!(body["idealStructure"]["targetWordCount"], 1200);
        assert!(!body["idealStructure"]["outline"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_urls_is_bad_request() {
        let response = app(false)
            .oneshot(post_json(json!({"urls": [], "keyword": "compost"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["kind"], "invalid_request");
    }

    #[tokio::test]
    async fn test_failure_is_reported_with_kind() {
        let response = app(false)
            .oneshot(post_json(json!({"urls": ["https://broken.test/"], "keyword": "compost"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["kind"], "batch_analysis");
        assert!(body.get("details").is_none());

        let response = app(true)
            .oneshot(post_json(json!({"urls": ["https://broken.test/"], "keyword": "compost"})))
            .await
            .unwrap();
        assert!(body_json(response).await["details"].as_str().unwrap().contains("Fetch"));
    }

    #[tokio::test]
    async fn test_allow_partial() {
        let response = app(false)
            .oneshot(post_json(json!({
                "urls": ["https://broken.test/", "https://a.test/1"],
                "keyword": "compost",
                "allowPartial": true
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["analyses"][0]["error"].is_string());
        assert!(body["analyses"][1].get("error").is_none());
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/analyze")
            .header("origin", "https://app.example")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type, apikey")
            .body(Body::empty())
            .unwrap();
        let response = app(false).oneshot(request).await.unwrap();
        assert!(response.status().is_success());

        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        let allowed = headers["access-control-allow-headers"].to_str().unwrap().to_lowercase();
        for header in ["authorization", "x-client-info", "apikey", "content-type"] {
            assert!(allowed.contains(header), "missing {}", header);
        }
        let methods = headers["access-control-allow-methods"].to_str().unwrap();
        assert!(methods.contains("POST"));
    }
}
