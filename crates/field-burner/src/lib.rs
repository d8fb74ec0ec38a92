//! Burn form field values permanently into PDF pages
//!
//! Fields are placed with page-normalized rectangles (top-left origin,
//! fractions of the page) and carry text, dates, radio marks, or signature
//! and image payloads. [`burn`] validates each field, maps it onto its page,
//! draws it as ordinary page content, and returns the new document together
//! with SHA-256 hashes of the input and output for the audit trail.
//!
//! Bad fields never abort a burn: they are reported in
//! [`BurnOutput::dropped`] and skipped. Only a document that cannot be parsed
//! is an error.

pub mod audit;
pub mod burn;
pub mod embed;
pub mod error;
pub mod field;
pub mod fit;
pub mod geometry;
pub mod hash;
pub mod payload;
pub mod render;
pub mod request;
pub mod session;
pub mod validate;

#[cfg(test)]
mod testutil;

pub use audit::{AuditField, AuditRecord};
pub use burn::{burn, burn_fields, BurnOutput, DropReason, DroppedField};
pub use error::{BurnError, RequestError};
pub use field::{
    AcceptedField, FieldContent, FieldDescriptor, FieldKind, NormalizedRect, RadioValue,
};
pub use geometry::{map_to_page_rect, PageRect, PageSize};
pub use hash::sha256_hex;
pub use request::{BurnInput, BurnRequest};
pub use validate::is_valid;
