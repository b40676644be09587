use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use serde::Deserialize;
use toolnav_core::favicon::{IconProber, ProbeResult};
use toolnav_core::settings::{ConfigRecord, FaviconApi, SiteInfo};

use crate::{error::ApiError, extract::ApiJson, response::ApiResponse, state::AppState};

pub async fn list_records<T: ConfigRecord>(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<T>>>, ApiError> {
    let db = state.db.lock().await;
    Ok(ResponseJson(ApiResponse::success(db.list_records::<T>()?)))
}

pub async fn create_record<T: ConfigRecord>(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<T::Input>,
) -> Result<ResponseJson<ApiResponse<T>>, ApiError> {
    let db = state.db.lock().await;
    Ok(ResponseJson(ApiResponse::success(db.create_record::<T>(&payload)?)))
}

pub async fn get_record<T: ConfigRecord>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<T>>, ApiError> {
    let db = state.db.lock().await;
    Ok(ResponseJson(ApiResponse::success(db.get_record::<T>(id)?)))
}

pub async fn update_record<T: ConfigRecord>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<T::Input>,
) -> Result<ResponseJson<ApiResponse<T>>, ApiError> {
    let db = state.db.lock().await;
    Ok(ResponseJson(ApiResponse::success(
        db.update_record::<T>(id, &payload)?,
    )))
}

pub async fn delete_record<T: ConfigRecord>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let db = state.db.lock().await;
    db.delete_record::<T>(id)?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        format!("{} {} deleted", T::ENTITY, id),
    )))
}

/// CRUD routes for one configuration table mounted at `base`.
pub fn record_router<T: ConfigRecord>(base: &str) -> Router<AppState> {
    Router::new()
        .route(base, get(list_records::<T>).post(create_record::<T>))
        .route(
            &format!("{base}/{{id}}"),
            get(get_record::<T>)
                .put(update_record::<T>)
                .delete(delete_record::<T>),
        )
}

/// GET /api/site-info
pub async fn get_site_info(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<SiteInfo>>, ApiError> {
    let db = state.db.lock().await;
    Ok(ResponseJson(ApiResponse::success(db.get_site_info()?)))
}

/// PUT /api/site-info
pub async fn update_site_info(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SiteInfo>,
) -> Result<ResponseJson<ApiResponse<SiteInfo>>, ApiError> {
    let db = state.db.lock().await;
    Ok(ResponseJson(ApiResponse::success(db.update_site_info(&payload)?)))
}

#[derive(Debug, Deserialize)]
pub struct ProbeRequest {
    pub domain: String,
}

/// POST /api/favicon-apis/{id}/test
pub async fn test_favicon_api(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<ProbeRequest>,
) -> Result<ResponseJson<ApiResponse<ProbeResult>>, ApiError> {
    if payload.domain.trim().is_empty() {
        return Err(ApiError::BadRequest("domain must not be empty".to_string()));
    }

    // Release the lock before going out to the network
    let api = {
        let db = state.db.lock().await;
        db.get_record::<FaviconApi>(id)?
    };

    let result = IconProber::new()?.probe(&api, &payload.domain).await?;
    Ok(ResponseJson(ApiResponse::success(result)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/site-info", get(get_site_info).put(update_site_info))
        .route("/api/favicon-apis/{id}/test", post(test_favicon_api))
}
