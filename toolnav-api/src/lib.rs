pub mod error;
pub mod extract;
pub mod response;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use extract::ApiJson;
pub use response::ApiResponse;
pub use routes::router;
pub use state::AppState;

use tracing::info;

/// Bind `addr` and serve the API until the listener fails.
pub async fn serve(state: AppState, addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}
