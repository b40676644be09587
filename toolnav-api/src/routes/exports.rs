use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Json as ResponseJson, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use toolnav_core::CoreError;
use toolnav_core::backup::{self, RestoreReport, Snapshot};
use toolnav_core::export::{ExportFile, ExportFilter, ExportFormat, ExportKind};
use tracing::info;

use crate::{error::ApiError, extract::ApiJson, response::ApiResponse, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub kind: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub filter: ExportFilter,
}

#[derive(Debug, Default, Deserialize)]
pub struct BackupRequest {
    #[serde(default)]
    pub format: Option<String>,
}

fn parse_kind(raw: &str) -> Result<ExportKind, ApiError> {
    ExportKind::from_str(raw).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "unknown export kind '{}', expected websites, categories, settings or backup",
            raw
        ))
    })
}

fn parse_format(raw: Option<&str>, default: ExportFormat) -> Result<ExportFormat, ApiError> {
    match raw {
        None => Ok(default),
        Some(raw) => ExportFormat::from_str(raw).ok_or_else(|| {
            ApiError::BadRequest(format!(
                "unknown export format '{}', expected csv, json or zip",
                raw
            ))
        }),
    }
}

fn content_type_for(name: &str) -> &'static str {
    match name.rsplit('.').next() {
        Some("json") => "application/json",
        Some("csv") => "text/csv; charset=utf-8",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}

/// A body that fails to parse as a snapshot is the caller's mistake.
fn snapshot_error(err: CoreError) -> ApiError {
    match err {
        CoreError::JsonError(e) => ApiError::BadRequest(format!("not a snapshot: {}", e)),
        other => ApiError::Core(other),
    }
}

/// POST /api/export
pub async fn create_export(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ExportRequest>,
) -> Result<ResponseJson<ApiResponse<ExportFile>>, ApiError> {
    let kind = parse_kind(&payload.kind)?;
    let format = parse_format(payload.format.as_deref(), ExportFormat::Json)?;

    let db = state.db.lock().await;
    let file = state.exports.create(&db, kind, format, &payload.filter)?;
    Ok(ResponseJson(ApiResponse::success(file)))
}

/// GET /api/export/files
pub async fn list_exports(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<ExportFile>>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(state.exports.list()?)))
}

/// GET /api/export/files/{name}
pub async fn download_export(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let path = state.exports.path_of(&name)?;
    let file = tokio::fs::File::open(&path).await?;
    let body = Body::from_stream(ReaderStream::new(file));

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&name).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", name),
            ),
        ],
        body,
    )
        .into_response())
}

/// DELETE /api/export/files/{name}
pub async fn delete_export(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    state.exports.delete(&name)?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        format!("{} deleted", name),
    )))
}

/// POST /api/export/files/{name}/restore
pub async fn restore_export(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<ResponseJson<ApiResponse<RestoreReport>>, ApiError> {
    let path = state.exports.path_of(&name)?;
    let snapshot = backup::read_snapshot(&path).map_err(snapshot_error)?;

    let db = state.db.lock().await;
    let report = backup::restore(&db, &snapshot)?;
    info!(name = %name, restored = report.restored, errors = report.errors.len(), "export restored");
    Ok(ResponseJson(ApiResponse::success(report)))
}

/// POST /api/backup
/// Full backup of settings and content, zipped unless `format` says otherwise
pub async fn create_backup(
    State(state): State<AppState>,
    payload: Option<ApiJson<BackupRequest>>,
) -> Result<ResponseJson<ApiResponse<ExportFile>>, ApiError> {
    let payload = payload.map(|ApiJson(p)| p).unwrap_or_default();
    let format = parse_format(payload.format.as_deref(), ExportFormat::Zip)?;
    if format == ExportFormat::Csv {
        return Err(ApiError::BadRequest(
            "backups are written as zip or json".to_string(),
        ));
    }

    let db = state.db.lock().await;
    let file = state
        .exports
        .create(&db, ExportKind::Backup, format, &ExportFilter::default())?;
    Ok(ResponseJson(ApiResponse::success(file)))
}

/// POST /api/restore
pub async fn restore_snapshot(
    State(state): State<AppState>,
    ApiJson(snapshot): ApiJson<Snapshot>,
) -> Result<ResponseJson<ApiResponse<RestoreReport>>, ApiError> {
    let db = state.db.lock().await;
    let report = backup::restore(&db, &snapshot)?;
    Ok(ResponseJson(ApiResponse::success(report)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/export", post(create_export))
        .route("/api/export/files", get(list_exports))
        .route(
            "/api/export/files/{name}",
            get(download_export).delete(delete_export),
        )
        .route("/api/export/files/{name}/restore", post(restore_export))
        .route("/api/backup", post(create_backup))
        .route("/api/restore", post(restore_snapshot))
}
