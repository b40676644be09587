use std::path::{Component, Path as FsPath, PathBuf};

use axum::{Router, extract::State, response::Json as ResponseJson, routing::post};
use serde::Deserialize;
use toolnav_core::reconcile::{
    self, DedupeReport, MatchRule, ReconcileOptions, ReconcileReport,
};
use toolnav_dataset::load_dataset;

use crate::{error::ApiError, extract::ApiJson, response::ApiResponse, state::AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupeRequest {
    #[serde(default)]
    pub dry_run: bool,
}

/// Rules arrive either as "slug,name" or as ["slug", "name"].
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RulesParam {
    Joined(String),
    List(Vec<String>),
}

impl RulesParam {
    fn parse(&self) -> Result<Vec<MatchRule>, ApiError> {
        let joined = match self {
            RulesParam::Joined(raw) => raw.clone(),
            RulesParam::List(items) => items.join(","),
        };
        Ok(MatchRule::parse_list(&joined)?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileRequest {
    pub page: String,
    pub source: String,
    #[serde(default)]
    pub rules: Option<RulesParam>,
    #[serde(default)]
    pub dry_run: bool,
}

/// Resolve a dataset path, keeping it under `root` when one is configured.
fn resolve_source(root: Option<&FsPath>, source: &str) -> Result<PathBuf, ApiError> {
    let source = source.trim();
    if source.is_empty() {
        return Err(ApiError::BadRequest("source must not be empty".to_string()));
    }

    let path = FsPath::new(source);
    match root {
        None => Ok(path.to_path_buf()),
        Some(root) => {
            let escapes = path
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            if escapes {
                return Err(ApiError::BadRequest(format!(
                    "source '{}' must be a relative path inside the dataset directory",
                    source
                )));
            }
            Ok(root.join(path))
        }
    }
}

/// POST /api/maintenance/dedupe
pub async fn dedupe(
    State(state): State<AppState>,
    payload: Option<ApiJson<DedupeRequest>>,
) -> Result<ResponseJson<ApiResponse<DedupeReport>>, ApiError> {
    let payload = payload.map(|ApiJson(p)| p).unwrap_or_default();
    let db = state.db.lock().await;
    let report = reconcile::remove_duplicate_urls(&db, payload.dry_run)?;
    Ok(ResponseJson(ApiResponse::success(report)))
}

/// POST /api/maintenance/reconcile
pub async fn reconcile_page(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ReconcileRequest>,
) -> Result<ResponseJson<ApiResponse<ReconcileReport>>, ApiError> {
    let mut options = ReconcileOptions::new(&payload.page);
    options.dry_run = payload.dry_run;
    if let Some(rules) = &payload.rules {
        options.rules = rules.parse()?;
    }

    let path = resolve_source(state.dataset_root.as_deref(), &payload.source)?;
    let dataset = load_dataset(&path)?;

    let db = state.db.lock().await;
    let report = reconcile::reconcile(&db, &dataset, &options, None)?;
    Ok(ResponseJson(ApiResponse::success(report)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/maintenance/dedupe", post(dedupe))
        .route("/api/maintenance/reconcile", post(reconcile_page))
}
