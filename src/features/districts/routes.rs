use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::districts::handlers::{self, DistrictState};
use crate::features::districts::services::DistrictSyncService;

/// Create routes for the districts feature
///
/// All routes are public
pub fn routes(sync_service: Arc<DistrictSyncService>) -> Router {
    let state = DistrictState { sync_service };

    Router::new()
        .route("/", get(handlers::status_page))
        .route(handlers::DOWNLOAD_PATH, get(handlers::download_districts))
        .route("/api/trigger", post(handlers::trigger_sync))
        .route("/api/status", get(handlers::get_status))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use serde_json::Value;

    use crate::features::districts::services::SyncError;
    use crate::modules::storage::MemoryStore;
    use crate::shared::test_helpers::{guangdong_payload, sync_service, StubSource};

    fn server(source: StubSource) -> (TestServer, Arc<StubSource>, Arc<MemoryStore>) {
        let source = Arc::new(source);
        let store = Arc::new(MemoryStore::new());
        let service = Arc::new(sync_service(source.clone(), store.clone()));
        let server = TestServer::new(routes(service)).unwrap();
        (server, source, store)
    }

    #[tokio::test]
    async fn test_download_before_first_sync_is_not_found() {
        let (server, _, _) = server(StubSource::ok(guangdong_payload()));

        let response = server.get("/api/data").await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Data not found");
    }

    #[tokio::test]
    async fn test_trigger_then_download() {
        let (server, _, store) = server(StubSource::ok(guangdong_payload()));

        let response = server.post("/api/trigger").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["provinces"], 1);
        assert_eq!(body["data"]["shape"], "triple-array");

        let response = server.get("/api/data").await;
        response.assert_status_ok();
        assert_eq!(response.header(header::CONTENT_TYPE), "application/json");
        assert_eq!(
            response.header(header::CONTENT_DISPOSITION),
            "attachment; filename=\"districts.json\""
        );
        assert!(response.headers().get(header::ETAG).is_some());
        assert_eq!(
            response.as_bytes().to_vec(),
            store.object("districts.json").unwrap().body
        );
    }

    #[tokio::test]
    async fn test_trigger_forwards_referer() {
        let (server, source, _) = server(StubSource::ok(guangdong_payload()));

        server
            .post("/api/trigger")
            .add_header(
                header::REFERER,
                HeaderValue::from_static("https://console.example.com/"),
            )
            .await
            .assert_status_ok();

        assert_eq!(
            source.callers(),
            vec![Some("https://console.example.com/".to_string())]
        );
    }

    #[tokio::test]
    async fn test_trigger_upstream_failure_is_bad_gateway() {
        let (server, _, store) = server(StubSource::failing(SyncError::UpstreamApi {
            code: 311,
            message: "key格式错误".to_string(),
        }));

        let response = server.post("/api/trigger").await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn test_status_page_before_first_sync() {
        let (server, _, _) = server(StubSource::ok(guangdong_payload()));

        let response = server.get("/").await;

        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains("从未更新"));
        assert!(html.contains("/api/data"));
    }

    #[tokio::test]
    async fn test_status_reports_last_run() {
        let (server, _, _) = server(StubSource::ok(guangdong_payload()));

        let body: Value = server.get("/api/status").await.json();
        assert_eq!(body["data"]["stored"], false);
        assert_eq!(body["data"]["stage"], "idle");
        assert_eq!(body["data"]["last_updated_display"], "从未更新");

        server.post("/api/trigger").await.assert_status_ok();

        let body: Value = server.get("/api/status").await.json();
        assert_eq!(body["data"]["stored"], true);
        assert_eq!(body["data"]["stage"], "done");
        assert_eq!(body["data"]["last_run"]["success"], true);
        assert!(body["data"]["updated_at_metadata"].is_string());
    }
}
