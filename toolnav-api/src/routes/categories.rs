use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use toolnav_core::model::{Category, CategoryInput, CategoryNode};

use crate::{error::ApiError, extract::ApiJson, response::ApiResponse, state::AppState};

/// GET /api/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Category>>>, ApiError> {
    let db = state.db.lock().await;
    Ok(ResponseJson(ApiResponse::success(db.list_categories()?)))
}

/// GET /api/categories/tree
pub async fn category_tree(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<CategoryNode>>>, ApiError> {
    let db = state.db.lock().await;
    Ok(ResponseJson(ApiResponse::success(db.category_tree()?)))
}

/// POST /api/categories
pub async fn create_category(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CategoryInput>,
) -> Result<ResponseJson<ApiResponse<Category>>, ApiError> {
    let db = state.db.lock().await;
    Ok(ResponseJson(ApiResponse::success(db.create_category(&payload)?)))
}

/// GET /api/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Category>>, ApiError> {
    let db = state.db.lock().await;
    Ok(ResponseJson(ApiResponse::success(db.get_category(id)?)))
}

/// PUT /api/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<CategoryInput>,
) -> Result<ResponseJson<ApiResponse<Category>>, ApiError> {
    let db = state.db.lock().await;
    Ok(ResponseJson(ApiResponse::success(db.update_category(id, &payload)?)))
}

/// DELETE /api/categories/{id}
/// Refused while the category still has subcategories or websites
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let db = state.db.lock().await;
    db.delete_category(id)?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list_categories).post(create_category))
        .route("/api/categories/tree", get(category_tree))
        .route(
            "/api/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
}
