use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{delete, get},
};
use toolnav_core::model::{LinkedCategory, Page, PageCategory, PageCategoryInput, PageInput};

use crate::{error::ApiError, extract::ApiJson, response::ApiResponse, state::AppState};

/// GET /api/pages
pub async fn list_pages(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Page>>>, ApiError> {
    let db = state.db.lock().await;
    Ok(ResponseJson(ApiResponse::success(db.list_pages()?)))
}

/// POST /api/pages
pub async fn create_page(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<PageInput>,
) -> Result<ResponseJson<ApiResponse<Page>>, ApiError> {
    let db = state.db.lock().await;
    Ok(ResponseJson(ApiResponse::success(db.create_page(&payload)?)))
}

/// GET /api/pages/{id}
pub async fn get_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Page>>, ApiError> {
    let db = state.db.lock().await;
    Ok(ResponseJson(ApiResponse::success(db.get_page(id)?)))
}

/// PUT /api/pages/{id}
pub async fn update_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<PageInput>,
) -> Result<ResponseJson<ApiResponse<Page>>, ApiError> {
    let db = state.db.lock().await;
    Ok(ResponseJson(ApiResponse::success(db.update_page(id, &payload)?)))
}

/// DELETE /api/pages/{id}
pub async fn delete_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let db = state.db.lock().await;
    db.delete_page(id)?;
    Ok(ResponseJson(ApiResponse::success(())))
}

/// GET /api/pages/{id}/categories
pub async fn list_page_categories(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Vec<LinkedCategory>>>, ApiError> {
    let db = state.db.lock().await;
    Ok(ResponseJson(ApiResponse::success(db.page_categories(id)?)))
}

/// POST /api/pages/{id}/categories
/// Link a top-level category, or update an existing link's order/visibility
pub async fn link_page_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<PageCategoryInput>,
) -> Result<ResponseJson<ApiResponse<PageCategory>>, ApiError> {
    let db = state.db.lock().await;
    Ok(ResponseJson(ApiResponse::success(db.link_category(id, &payload)?)))
}

/// DELETE /api/pages/{id}/categories/{category_id}
pub async fn unlink_page_category(
    State(state): State<AppState>,
    Path((id, category_id)): Path<(i64, i64)>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let db = state.db.lock().await;
    db.unlink_category(id, category_id)?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/pages", get(list_pages).post(create_page))
        .route(
            "/api/pages/{id}",
            get(get_page).put(update_page).delete(delete_page),
        )
        .route(
            "/api/pages/{id}/categories",
            get(list_page_categories).post(link_page_category),
        )
        .route(
            "/api/pages/{id}/categories/{category_id}",
            delete(unlink_page_category),
        )
}
