//! Audit record of a burn
//!
//! The library only shapes the record; storing it is up to the caller.

use serde::{Deserialize, Serialize};

use crate::burn::BurnOutput;
use crate::field::{AcceptedField, FieldKind};

/// One burned field as it appears in the audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditField {
    pub id: String,
    pub page: u32,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub x_pct: f64,
    pub y_pct: f64,
    pub w_pct: f64,
    pub h_pct: f64,
}

impl From<&AcceptedField> for AuditField {
    fn from(field: &AcceptedField) -> Self {
        Self {
            id: field.id.clone(),
            page: field.page,
            kind: field.kind(),
            x_pct: field.rect.x_pct,
            y_pct: field.rect.y_pct,
            w_pct: field.rect.w_pct,
            h_pct: field.rect.h_pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub document_id: String,
    pub original_hash: String,
    pub final_hash: String,
    pub signed_url: String,
    pub fields: Vec<AuditField>,
}

impl AuditRecord {
    /// Record for a finished burn. Field values are not carried over.
    pub fn from_output(document_id: &str, signed_url: &str, output: &BurnOutput) -> Self {
        Self {
            document_id: document_id.to_string(),
            original_hash: output.original_hash.clone(),
            final_hash: output.final_hash.clone(),
            signed_url: signed_url.to_string(),
            fields: output.accepted.iter().map(AuditField::from).collect(),
        }
    }
}
