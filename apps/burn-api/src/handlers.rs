//! HTTP handlers for the burn API

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    Json,
};
use field_burner::{AuditRecord, BurnInput, BurnRequest};
use tracing::{debug, info};

use crate::audit;
use crate::error::ApiError;
use crate::models::{AuditTrailResponse, SignResponse};
use crate::state::AppState;
use crate::storage;

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Burn the request's fields into its PDF, store the result and record the audit trail
pub async fn sign_pdf(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<BurnRequest>, JsonRejection>,
) -> Result<Json<SignResponse>, ApiError> {
    let Json(req) = payload.map_err(body_rejection)?;
    let BurnInput {
        document_id,
        document,
        fields,
    } = req.into_input()?;

    // Parsing and drawing are CPU-bound; keep them off the async workers
    let output = tokio::task::spawn_blocking(move || field_burner::burn(&document, &fields))
        .await
        .map_err(|e| ApiError::BurnFailed(e.into()))??;

    let document_id = document_id.unwrap_or_else(|| output.original_hash.clone());
    let name = storage::store_signed(&state.storage_dir, &document_id, &output.bytes).await?;
    let url = format!("{}/files/{}", base_url(&state, &headers), name);

    let record = AuditRecord::from_output(&document_id, &url, &output);
    audit::insert(&state.db, &record).await?;

    info!(
        document_id = %document_id,
        accepted = output.accepted.len(),
        dropped = output.dropped.len(),
        "Signed PDF stored as {}",
        name
    );

    Ok(Json(SignResponse {
        document_id,
        original_hash: output.original_hash,
        final_hash: output.final_hash,
        url,
    }))
}

/// Report an unreadable body in the API's own error shape
fn body_rejection(rejection: JsonRejection) -> ApiError {
    match rejection {
        // Every member is optional, so only a non-object body fails here
        JsonRejection::JsonDataError(_) | JsonRejection::MissingJsonContentType(_) => {
            ApiError::MissingInput("documentBase64")
        }
        other if other.status() == StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge,
        other => {
            debug!("Unreadable request body: {}", other.body_text());
            ApiError::InvalidInput("request body")
        }
    }
}

/// Serve a stored PDF inline
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<([(HeaderName, String); 2], Vec<u8>), ApiError> {
    if !storage::is_stored_name(&name) {
        return Err(ApiError::NotFound(name));
    }

    let bytes = match tokio::fs::read(state.storage_dir.join(&name)).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound(name));
        }
        Err(e) => return Err(ApiError::BurnFailed(e.into())),
    };

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", name),
            ),
        ],
        bytes,
    ))
}

/// Audit records for a document, newest first
pub async fn get_audit_trail(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
) -> Result<Json<Vec<AuditTrailResponse>>, ApiError> {
    let rows = audit::list_for_document(&state.db, &document_id).await?;
    let trail = rows
        .into_iter()
        .map(AuditTrailResponse::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ApiError::BurnFailed(e.into()))?;
    Ok(Json(trail))
}

/// Configured public base URL, or one derived from the request
fn base_url(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(base) = &state.public_base_url {
        return base.clone();
    }

    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    format!("{}://{}", proto, host)
}
