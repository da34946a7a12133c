use std::sync::Arc;

use axum::{
    extract::State,
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE, ETAG, LAST_MODIFIED, ORIGIN, REFERER},
        HeaderMap, HeaderName, HeaderValue,
    },
    response::{Html, IntoResponse, Response},
    Json,
};

use crate::core::error::{AppError, Result};
use crate::features::districts::dtos::{LastRunDto, SyncReportDto, SyncStatusDto};
use crate::features::districts::services::DistrictSyncService;
use crate::shared::constants::{JSON_CONTENT_TYPE, UPDATED_AT_METADATA_KEY};
use crate::shared::datetime::format_display_time;
use crate::shared::templates::render_status_page;
use crate::shared::types::ApiResponse;

/// Path of the download endpoint, linked from the status page
pub const DOWNLOAD_PATH: &str = "/api/data";

/// State for district handlers
#[derive(Clone)]
pub struct DistrictState {
    pub sync_service: Arc<DistrictSyncService>,
}

/// Download the stored district tree
#[utoipa::path(
    get,
    path = "/api/data",
    responses(
        (status = 200, description = "Serialized district tree", content_type = "application/json", body = String),
        (status = 404, description = "No tree has been stored yet")
    ),
    tag = "districts"
)]
pub async fn download_districts(State(state): State<DistrictState>) -> Result<Response> {
    let stored = state
        .sync_service
        .stored_tree()
        .await?
        .ok_or_else(|| AppError::NotFound("Data not found".to_string()))?;

    let content_type = stored
        .metadata
        .content_type
        .as_deref()
        .unwrap_or(JSON_CONTENT_TYPE);
    let disposition = format!(
        "attachment; filename=\"{}\"",
        state.sync_service.settings().attachment_filename()
    );

    let mut headers = HeaderMap::new();
    insert_header(&mut headers, CONTENT_TYPE, content_type)?;
    insert_header(&mut headers, CONTENT_DISPOSITION, &disposition)?;
    if let Some(etag) = stored.metadata.etag.as_deref() {
        insert_header(&mut headers, ETAG, etag)?;
    }
    if let Some(modified) = stored.metadata.last_modified {
        let http_date = modified.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        insert_header(&mut headers, LAST_MODIFIED, &http_date)?;
    }

    Ok((headers, stored.body).into_response())
}

fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) -> Result<()> {
    let value = HeaderValue::from_str(value)
        .map_err(|e| AppError::Internal(format!("Invalid {} header value: {}", name, e)))?;
    headers.insert(name, value);
    Ok(())
}

/// Run one district synchronization now
#[utoipa::path(
    post,
    path = "/api/trigger",
    responses(
        (status = 200, description = "Synchronization completed", body = ApiResponse<SyncReportDto>),
        (status = 409, description = "A synchronization is already running"),
        (status = 500, description = "The tree could not be stored"),
        (status = 502, description = "Upstream error or empty upstream result"),
        (status = 503, description = "Upstream API key not configured")
    ),
    tag = "districts"
)]
pub async fn trigger_sync(
    State(state): State<DistrictState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<SyncReportDto>>> {
    let caller = headers
        .get(REFERER)
        .or_else(|| headers.get(ORIGIN))
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());

    let report = state.sync_service.run(caller).await?;

    Ok(Json(ApiResponse::success(
        Some(report.into()),
        Some("Districts updated".to_string()),
    )))
}

/// Current synchronization status
#[utoipa::path(
    get,
    path = "/api/status",
    responses(
        (status = 200, description = "Sync status", body = ApiResponse<SyncStatusDto>)
    ),
    tag = "districts"
)]
pub async fn get_status(
    State(state): State<DistrictState>,
) -> Result<Json<ApiResponse<SyncStatusDto>>> {
    let service = &state.sync_service;
    let metadata = service.stored_metadata().await?;
    let last_updated = metadata.as_ref().and_then(|m| m.last_updated());

    let dto = SyncStatusDto {
        key: service.settings().object_key.clone(),
        stage: service.stage().await.to_string(),
        stored: metadata.is_some(),
        last_updated,
        last_updated_display: format_display_time(last_updated),
        updated_at_metadata: metadata
            .as_ref()
            .and_then(|m| m.custom.get(UPDATED_AT_METADATA_KEY).cloned()),
        etag: metadata.as_ref().and_then(|m| m.etag.clone()),
        size: metadata.as_ref().and_then(|m| m.size),
        last_run: service.last_run().await.map(LastRunDto::from),
    };

    Ok(Json(ApiResponse::success(Some(dto), None)))
}

/// Human readable status page
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Status page", content_type = "text/html", body = String)
    ),
    tag = "districts"
)]
pub async fn status_page(State(state): State<DistrictState>) -> Result<Html<String>> {
    // A failing store still renders the page, just without a timestamp
    let last_updated = match state.sync_service.stored_metadata().await {
        Ok(metadata) => metadata.and_then(|m| m.last_updated()),
        Err(e) => {
            tracing::warn!("Could not read district metadata for status page: {}", e);
            None
        }
    };

    let html = render_status_page(
        &format_display_time(last_updated),
        DOWNLOAD_PATH,
        state.sync_service.settings().attachment_filename(),
    )
    .map_err(|e| AppError::Internal(format!("Failed to render status page: {}", e)))?;

    Ok(Html(html))
}
