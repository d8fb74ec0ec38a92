//! Output file naming and storage
//!
//! Names embed the caller's document id, so the id is reduced to a safe
//! alphabet before it ever reaches the filesystem.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use uuid::Uuid;

const MAX_ID_LEN: usize = 64;

/// Keep `[A-Za-z0-9_-]`, replace everything else with `_`, cap the length.
pub fn sanitize_id(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .take(MAX_ID_LEN)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "document".to_string()
    } else {
        cleaned
    }
}

/// `signed_<id>_<unix millis>_<8 hex>.pdf`
pub fn signed_file_name(document_id: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!(
        "signed_{}_{}_{}.pdf",
        sanitize_id(document_id),
        Utc::now().timestamp_millis(),
        &token[..8]
    )
}

/// A name this service could have produced
pub fn is_stored_name(name: &str) -> bool {
    name.starts_with("signed_")
        && name.ends_with(".pdf")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !name.contains("..")
}

/// Write `bytes` under a fresh name and return the name.
pub async fn store_signed(dir: &Path, document_id: &str, bytes: &[u8]) -> Result<String> {
    let name = signed_file_name(document_id);
    let path = dir.join(&name);
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(name)
}
