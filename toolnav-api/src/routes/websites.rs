use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use serde::Deserialize;
use toolnav_core::model::{Website, WebsiteFilter, WebsiteInput, WebsiteStatus};

use crate::{error::ApiError, extract::ApiJson, response::ApiResponse, state::AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteQuery {
    pub category_id: Option<i64>,
    pub status: Option<String>,
    pub q: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl WebsiteQuery {
    fn into_filter(self) -> Result<WebsiteFilter, ApiError> {
        let status = match self.status.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => Some(WebsiteStatus::from_str(raw).ok_or_else(|| {
                ApiError::BadRequest(format!(
                    "unknown status '{}', expected new, featured or hot",
                    raw
                ))
            })?),
            None => None,
        };
        Ok(WebsiteFilter {
            category_id: self.category_id,
            status,
            keyword: self.q,
            from: self.from,
            to: self.to,
        })
    }
}

/// GET /api/websites?categoryId=&status=&q=
pub async fn list_websites(
    State(state): State<AppState>,
    Query(query): Query<WebsiteQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Website>>>, ApiError> {
    let filter = query.into_filter()?;
    let db = state.db.lock().await;
    Ok(ResponseJson(ApiResponse::success(db.list_websites(&filter)?)))
}

/// POST /api/websites
pub async fn create_website(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<WebsiteInput>,
) -> Result<ResponseJson<ApiResponse<Website>>, ApiError> {
    let db = state.db.lock().await;
    Ok(ResponseJson(ApiResponse::success(db.create_website(&payload)?)))
}

/// GET /api/websites/{id}
pub async fn get_website(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Website>>, ApiError> {
    let db = state.db.lock().await;
    Ok(ResponseJson(ApiResponse::success(db.get_website(id)?)))
}

/// PUT /api/websites/{id}
pub async fn update_website(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<WebsiteInput>,
) -> Result<ResponseJson<ApiResponse<Website>>, ApiError> {
    let db = state.db.lock().await;
    Ok(ResponseJson(ApiResponse::success(db.update_website(id, &payload)?)))
}

/// DELETE /api/websites/{id}
pub async fn delete_website(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let db = state.db.lock().await;
    db.delete_website(id)?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/websites", get(list_websites).post(create_website))
        .route(
            "/api/websites/{id}",
            get(get_website).put(update_website).delete(delete_website),
        )
}
