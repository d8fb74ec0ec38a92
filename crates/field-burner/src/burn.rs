//! Burn orchestration
//!
//! Loads the source document, runs every field through
//! coerce → validate → page lookup → geometry → render, and serializes the
//! result. Only a document that cannot be parsed or written aborts the burn;
//! every per-field problem becomes an entry in `dropped`.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::error::BurnError;
use crate::field::{AcceptedField, FieldDescriptor};
use crate::geometry::map_to_page_rect;
use crate::hash::sha256_hex;
use crate::render::{render_field, RenderOutcome};
use crate::session::DocumentSession;
use crate::validate::accept;

/// Why a field was left out of the burn
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    #[error("failed validation")]
    Invalid,

    #[error("page {page} is beyond the document's {page_count} pages")]
    PageOutOfRange { page: u32, page_count: usize },

    #[error("content could not be rendered: {0}")]
    Content(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedField {
    /// Position in the input list
    pub index: usize,
    pub id: String,
    pub reason: DropReason,
}

#[derive(Debug, Clone)]
pub struct BurnOutput {
    pub bytes: Vec<u8>,
    pub original_hash: String,
    pub final_hash: String,
    /// Input order, minus dropped fields
    pub accepted: Vec<AcceptedField>,
    pub dropped: Vec<DroppedField>,
}

/// Burn loosely typed field JSON into `source`.
pub fn burn(source: &[u8], fields: &[Value]) -> Result<BurnOutput, BurnError> {
    burn_fields(source, fields.iter().map(FieldDescriptor::from_json))
}

/// Burn already coerced descriptors into `source`.
pub fn burn_fields(
    source: &[u8],
    fields: impl IntoIterator<Item = FieldDescriptor>,
) -> Result<BurnOutput, BurnError> {
    let mut session = DocumentSession::load(source)?;
    let mut accepted = Vec::new();
    let mut dropped = Vec::new();

    for (index, descriptor) in fields.into_iter().enumerate() {
        let id = descriptor.id.clone();
        match place(&mut session, descriptor) {
            Ok(field) => accepted.push(field),
            Err(reason) => {
                debug!(index, id = %id, %reason, "Dropping field");
                dropped.push(DroppedField { index, id, reason });
            }
        }
    }

    let bytes = session.finish()?;
    let original_hash = sha256_hex(source);
    let final_hash = sha256_hex(&bytes);

    info!(
        accepted = accepted.len(),
        dropped = dropped.len(),
        original_hash = %original_hash,
        final_hash = %final_hash,
        "Burned fields"
    );

    Ok(BurnOutput {
        bytes,
        original_hash,
        final_hash,
        accepted,
        dropped,
    })
}

/// Run one field through the pipeline
fn place(
    session: &mut DocumentSession,
    descriptor: FieldDescriptor,
) -> Result<AcceptedField, DropReason> {
    let field = accept(descriptor).ok_or(DropReason::Invalid)?;

    let page_id = session
        .page_id(field.page)
        .ok_or(DropReason::PageOutOfRange {
            page: field.page,
            page_count: session.page_count(),
        })?;

    let size = session.page_size(page_id);
    let rect = map_to_page_rect(&field.rect, size.width, size.height);

    match render_field(session, page_id, &field, &rect) {
        Ok(RenderOutcome::Drawn) | Ok(RenderOutcome::Blank) => Ok(field),
        Err(e) => Err(DropReason::Content(e.to_string())),
    }
}
