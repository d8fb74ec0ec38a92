//! Data models for the burn API

use chrono::{DateTime, Utc};
use field_burner::AuditField;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Response for a successful burn
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    pub document_id: String,
    pub original_hash: String,
    pub final_hash: String,
    pub url: String,
}

/// Audit trail row as stored
#[derive(Debug, Clone, FromRow)]
pub struct DbAuditTrail {
    pub id: String,
    pub document_id: String,
    pub original_hash: String,
    pub final_hash: String,
    pub signed_url: String,
    pub fields_json: String,
    pub created_at: DateTime<Utc>,
}

/// Audit trail entry for the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditTrailResponse {
    pub id: String,
    pub document_id: String,
    pub original_hash: String,
    pub final_hash: String,
    pub signed_url: String,
    pub fields: Vec<AuditField>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbAuditTrail> for AuditTrailResponse {
    type Error = serde_json::Error;

    fn try_from(row: DbAuditTrail) -> Result<Self, Self::Error> {
        Ok(Self {
            fields: serde_json::from_str(&row.fields_json)?,
            id: row.id,
            document_id: row.document_id,
            original_hash: row.original_hash,
            final_hash: row.final_hash,
            signed_url: row.signed_url,
            created_at: row.created_at,
        })
    }
}
