//! Route handlers: health, bulk upload and single-record form
//!
//! Both processing endpoints accept `?dry_run=true` and answer with one
//! result per record in input order.

use crate::normalize::{load_upload, record_from_form};
use crate::server::error::{ApiError, ApiResult};
use crate::server::state::AppState;
use crate::submit::{TracingProgress, process_batch};
use crate::types::{Batch, RecordOutcome};
use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Multipart, Query, State};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Query parameters shared by both processing endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ProcessParams {
    /// Render templates without opening PRs
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
pub struct BulkResponse {
    results: Vec<RecordOutcome>,
    total: usize,
    success: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    script_output: Option<String>,
}

#[derive(Serialize)]
pub struct FormResponse {
    message: String,
    pr_url: Option<String>,
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// POST /api/process-bulk -- multipart field `file` (csv, xlsx or xls)
pub async fn process_bulk(
    State(state): State<AppState>,
    params: Result<Query<ProcessParams>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<BulkResponse>> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let mut multipart =
        multipart.map_err(|_| ApiError::BadRequest("No file provided".to_string()))?;

    let (filename, bytes) = read_file_field(&mut multipart)
        .await?
        .ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;
    if filename.is_empty() {
        return Err(ApiError::BadRequest("No file selected".to_string()));
    }

    let scratch_dir = state.config.scratch_dir.clone();
    let batch = tokio::task::spawn_blocking(move || load_upload(&filename, &bytes, &scratch_dir))
        .await
        .map_err(|e| ApiError::Internal(format!("upload parsing aborted: {e}")))??;

    info!(records = batch.len(), dry_run = params.dry_run, "processing bulk upload");
    let report = process_batch(
        &batch,
        &state.submit_context(),
        &TracingProgress,
        params.dry_run,
    )
    .await?;

    info!(
        total = report.total(),
        success = report.success_count(),
        "bulk upload processed"
    );
    Ok(Json(BulkResponse {
        total: report.total(),
        success: report.success_count(),
        script_output: report.script_output(),
        results: report.outcomes,
    }))
}

/// POST /api/process-form -- one record as a JSON object
pub async fn process_form(
    State(state): State<AppState>,
    params: Result<Query<ProcessParams>, QueryRejection>,
    payload: Result<Json<IndexMap<String, Value>>, JsonRejection>,
) -> ApiResult<Json<FormResponse>> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let Json(form) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if form.is_empty() {
        return Err(ApiError::BadRequest("No data provided".to_string()));
    }

    let record = record_from_form(form)?;
    info!(app_name = record.app_name(), dry_run = params.dry_run, "processing form");

    let report = process_batch(
        &Batch::from_record(record),
        &state.submit_context(),
        &TracingProgress,
        params.dry_run,
    )
    .await?;

    if let Some(run) = report.run.as_ref().filter(|run| !run.success()) {
        return Err(ApiError::Internal(run.failure_detail()));
    }

    let outcome = report
        .outcomes
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::Internal("no outcome for submitted record".to_string()))?;

    if outcome.success {
        Ok(Json(FormResponse {
            message: outcome.message.unwrap_or_default(),
            pr_url: outcome.pr_url,
        }))
    } else {
        Err(ApiError::Internal(outcome.error.unwrap_or_default()))
    }
}

async fn read_file_field(multipart: &mut Multipart) -> ApiResult<Option<(String, Bytes)>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        return Ok(Some((filename, bytes)));
    }
    Ok(None)
}
