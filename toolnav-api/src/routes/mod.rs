use axum::Router;
use axum::response::Json as ResponseJson;
use axum::routing::get;
use serde_json::{Value, json};
use toolnav_core::settings::{
    FaviconApi, FooterGroup, FooterLink, FriendLink, HotRecommendation, NavMenu, SocialMedia,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::response::ApiResponse;
use crate::state::AppState;

pub mod categories;
pub mod exports;
pub mod maintenance;
pub mod pages;
pub mod settings;
pub mod websites;

/// Build the axum router with all routes
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/health", get(health))
        .merge(categories::router())
        .merge(websites::router())
        .merge(pages::router())
        .merge(settings::record_router::<FriendLink>("/api/friend-links"))
        .merge(settings::record_router::<SocialMedia>("/api/social-media"))
        .merge(settings::record_router::<NavMenu>("/api/nav-menus"))
        .merge(settings::record_router::<FooterGroup>("/api/footer-groups"))
        .merge(settings::record_router::<FooterLink>("/api/footer-links"))
        .merge(settings::record_router::<FaviconApi>("/api/favicon-apis"))
        .merge(settings::record_router::<HotRecommendation>("/api/hot-recommendations"))
        .merge(settings::router())
        .merge(exports::router())
        .merge(maintenance::router());

    api.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> ResponseJson<ApiResponse<Value>> {
    ResponseJson(ApiResponse::success(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
