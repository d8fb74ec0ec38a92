//! Structural field validation
//!
//! Page-count checks happen at dispatch time since the page count is a
//! property of the document, not of the field.

use crate::field::{AcceptedField, FieldDescriptor};

/// Geometric and type sanity. Never panics.
pub fn is_valid(field: &FieldDescriptor) -> bool {
    if !field.page.is_finite() || field.page < 1.0 || field.page.fract() != 0.0 {
        return false;
    }
    if field.content.is_none() {
        return false;
    }

    let r = &field.rect;
    let in_unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
    if ![r.x_pct, r.y_pct, r.w_pct, r.h_pct].into_iter().all(in_unit) {
        return false;
    }

    if r.w_pct <= 0.0 || r.h_pct <= 0.0 {
        return false;
    }
    if r.x_pct > 1.0 - r.w_pct || r.y_pct > 1.0 - r.h_pct {
        return false;
    }

    true
}

/// Validate and convert, or `None` to drop the field.
pub fn accept(field: FieldDescriptor) -> Option<AcceptedField> {
    if !is_valid(&field) || field.page > f64::from(u32::MAX) {
        return None;
    }
    let content = field.content?;
    Some(AcceptedField {
        id: field.id,
        page: field.page as u32,
        rect: field.rect,
        content,
    })
}
