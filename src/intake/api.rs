use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{error, warn};

use super::messages::{Locale, Wording};
use super::models::{BarcodeRequest, ConfirmationResult, FailureResponse, HealthResponse};
use super::service::CompletionService;
use crate::errors::IntakeError;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub service: CompletionService,
}

pub type SharedState = Arc<AppState>;

// ── Error handling ────────────────────────────────────────────────────

pub enum ApiError {
    BadRequest(Wording),
    NotFound(Wording),
    Unprocessable(Wording),
    Unavailable(Wording),
    Internal(Wording),
}

impl ApiError {
    /// Map a scan failure to its response, logging server-side failures with
    /// their full cause chain.
    pub fn from_intake(err: IntakeError, locale: Locale) -> Self {
        let wording = locale.failure(&err);
        match err {
            IntakeError::InvalidBarcodeFormat { .. } => {
                warn!(error = %err, "Rejected barcode");
                ApiError::BadRequest(wording)
            }
            IntakeError::OrderDetailNotFound { .. } => {
                warn!(error = %err, "Unknown order detail");
                ApiError::NotFound(wording)
            }
            IntakeError::ItemIndexOutOfRange { .. } => {
                warn!(error = %err, "Item index out of range");
                ApiError::Unprocessable(wording)
            }
            IntakeError::StorageUnavailable(ref source) => {
                error!(error = ?source, "Storage unavailable");
                ApiError::Unavailable(wording)
            }
            IntakeError::Other(ref source) => {
                error!(error = ?source, "Unexpected failure processing barcode");
                ApiError::Internal(wording)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, wording) = match self {
            ApiError::BadRequest(w) => (StatusCode::BAD_REQUEST, w),
            ApiError::NotFound(w) => (StatusCode::NOT_FOUND, w),
            ApiError::Unprocessable(w) => (StatusCode::UNPROCESSABLE_ENTITY, w),
            ApiError::Unavailable(w) => (StatusCode::SERVICE_UNAVAILABLE, w),
            ApiError::Internal(w) => (StatusCode::INTERNAL_SERVER_ERROR, w),
        };
        let body = FailureResponse {
            success: false,
            message: wording.message,
            voice_message: wording.voice_message,
        };
        (status, Json(body)).into_response()
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/", get(status))
        .route("/health", get(health_check))
        .route("/api/process-barcode", post(process_barcode))
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn status(State(state): State<SharedState>) -> Json<HealthResponse> {
    let database_connected = state.service.store_reachable().await;
    Json(HealthResponse {
        status: if database_connected { "ok" } else { "error" }.to_string(),
        database_connected,
        api_version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn process_barcode(
    State(state): State<SharedState>,
    payload: Result<Json<BarcodeRequest>, JsonRejection>,
) -> Result<Json<ConfirmationResult>, ApiError> {
    let locale = state.service.locale();
    let Json(req) = payload.map_err(|rejection| {
        warn!(error = %rejection, "Malformed process-barcode request");
        ApiError::BadRequest(locale.malformed_request())
    })?;

    let result = state
        .service
        .process_barcode(&req.barcode)
        .await
        .map_err(|e| ApiError::from_intake(e, locale))?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::db::{DbHandle, IntakeDb};
    use crate::intake::models::{CompletionRecord, OrderDetail, OrderProgress};
    use crate::intake::store::{OrderStore, SqliteStore};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{DateTime, Utc};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let db = IntakeDb::new_in_memory().unwrap();
        db.seed_demo().unwrap();
        let store = SqliteStore::new(DbHandle::new(db));
        app_with_store(Arc::new(store))
    }

    fn app_with_store(store: Arc<dyn OrderStore>) -> Router {
        let state = Arc::new(AppState {
            service: CompletionService::new(store, Locale::Ru),
        });
        api_router().with_state(state)
    }

    async fn body_json<T: serde::de::DeserializeOwned>(body: Body) -> T {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn scan_request(barcode: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/process-barcode")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({ "barcode": barcode }).to_string(),
            ))
            .unwrap()
    }

    struct DownStore;

    #[async_trait]
    impl OrderStore for DownStore {
        async fn ping(&self) -> anyhow::Result<bool> {
            anyhow::bail!("unable to open database file /srv/intake.db")
        }
        async fn find_order_detail(&self, _: i64) -> anyhow::Result<Option<OrderDetail>> {
            anyhow::bail!("unable to open database file /srv/intake.db")
        }
        async fn completion_marked(
            &self,
            _: i64,
            _: u32,
        ) -> anyhow::Result<Option<CompletionRecord>> {
            anyhow::bail!("unable to open database file /srv/intake.db")
        }
        async fn mark_completion(&self, _: i64, _: u32, _: DateTime<Utc>) -> anyhow::Result<bool> {
            anyhow::bail!("unable to open database file /srv/intake.db")
        }
        async fn order_progress(&self, _: i64) -> anyhow::Result<OrderProgress> {
            anyhow::bail!("unable to open database file /srv/intake.db")
        }
    }

    /// Loses every insert race but never shows the winning record.
    struct VanishingStore;

    #[async_trait]
    impl OrderStore for VanishingStore {
        async fn ping(&self) -> anyhow::Result<bool> {
            Ok(true)
        }
        async fn find_order_detail(&self, id: i64) -> anyhow::Result<Option<OrderDetail>> {
            Ok(Some(OrderDetail {
                id,
                order_id: 1,
                order_number: "19561".to_string(),
                construction: "02".to_string(),
                name: "02".to_string(),
                qty: 1,
                width: None,
                height: None,
            }))
        }
        async fn completion_marked(
            &self,
            _: i64,
            _: u32,
        ) -> anyhow::Result<Option<CompletionRecord>> {
            Ok(None)
        }
        async fn mark_completion(&self, _: i64, _: u32, _: DateTime<Utc>) -> anyhow::Result<bool> {
            Ok(false)
        }
        async fn order_progress(&self, _: i64) -> anyhow::Result<OrderProgress> {
            Ok(OrderProgress::default())
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = test_app();

        let request = Request::builder()
            .method("GET")
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_status_reports_database() {
        let app = test_app();
        let request = Request::builder()
            .uri("/")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let health: HealthResponse = body_json(response.into_body()).await;
        assert_eq!(health.status, "ok");
        assert!(health.database_connected);
        assert_eq!(health.api_version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_status_with_store_down() {
        let app = app_with_store(Arc::new(DownStore));
        let request = Request::builder()
            .uri("/")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let health: HealthResponse = body_json(response.into_body()).await;
        assert_eq!(health.status, "error");
        assert!(!health.database_connected);
    }

    #[tokio::test]
    async fn test_process_barcode_success() {
        let app = test_app();

        let response = app.oneshot(scan_request("1109565")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = body_json(response.into_body()).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["already_completed"], false);
        assert_eq!(body["product_info"]["element_name"], "19561 / 02 / 1");
        assert_eq!(body["product_info"]["order_number"], "19561");
        assert_eq!(body["product_info"]["construction_number"], "02");
        assert_eq!(body["product_info"]["item_number"], 1);
        assert_eq!(body["product_info"]["orderitems_name"], "02");
        assert_eq!(body["product_info"]["qty"], 1);
        assert_eq!(body["product_info"]["width"], 1200);
        assert_eq!(body["product_info"]["height"], 1400);
        assert_eq!(body["product_info"]["grordersdetail_id"], 109565);
        let voice = body["voice_message"].as_str().unwrap();
        assert!(voice.contains("19561"));
        assert!(voice.contains("02"));
    }

    #[tokio::test]
    async fn test_process_barcode_repeat_scan() {
        let app = test_app();

        let first = app.clone().oneshot(scan_request("1109565")).await.unwrap();
        let first: serde_json::Value = body_json(first.into_body()).await;

        let second = app.oneshot(scan_request("1109565")).await.unwrap();
        assert_eq!(second.status(), StatusCode::OK);
        let second: serde_json::Value = body_json(second.into_body()).await;

        assert_eq!(second["success"], true);
        assert_eq!(second["already_completed"], true);
        assert_eq!(first["product_info"], second["product_info"]);
        assert_eq!(first["message"], second["message"]);
    }

    #[tokio::test]
    async fn test_process_barcode_invalid_format() {
        let app = test_app();

        let response = app.oneshot(scan_request("12a34")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: FailureResponse = body_json(response.into_body()).await;
        assert!(!body.success);
        assert!(!body.message.is_empty());
    }

    #[tokio::test]
    async fn test_process_barcode_not_found() {
        let app = test_app();

        let response = app.oneshot(scan_request("1999999")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body: FailureResponse = body_json(response.into_body()).await;
        assert!(!body.success);
        assert!(body.message.contains("999999"));
    }

    #[tokio::test]
    async fn test_process_barcode_out_of_range() {
        let app = test_app();

        let response = app.oneshot(scan_request("2109565")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: FailureResponse = body_json(response.into_body()).await;
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_process_barcode_storage_down() {
        let app = app_with_store(Arc::new(DownStore));

        let response = app.oneshot(scan_request("1109565")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body: FailureResponse = body_json(response.into_body()).await;
        assert!(!body.success);
        assert!(!body.message.contains("/srv/intake.db"));
    }

    #[tokio::test]
    async fn test_process_barcode_malformed_body() {
        let app = test_app();

        let request = Request::builder()
            .method("POST")
            .uri("/api/process-barcode")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"code": "1109565"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: FailureResponse = body_json(response.into_body()).await;
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_process_barcode_unexpected_failure() {
        let app = app_with_store(Arc::new(VanishingStore));

        let response = app.oneshot(scan_request("1109565")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: FailureResponse = body_json(response.into_body()).await;
        assert!(!body.success);
        assert_eq!(body.message, "Внутренняя ошибка сервера");
        assert_eq!(body.voice_message, "Неизвестная ошибка");
        assert!(!body.message.contains("vanished"));
    }
}
