//! Coordinate mapping from normalized field boxes to PDF user space

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::field::NormalizedRect;

/// US Letter, used when a page carries no MediaBox anywhere in its tree
pub const DEFAULT_PAGE_SIZE: PageSize = PageSize {
    width: 612.0,
    height: 792.0,
};

/// Absolute rectangle in PDF points, bottom-left origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// Convert a normalized (top-left origin) box into page coordinates (bottom-left origin)
pub fn map_to_page_rect(rect: &NormalizedRect, page_width: f64, page_height: f64) -> PageRect {
    let x = rect.x_pct * page_width;
    let w = rect.w_pct * page_width;
    let h = rect.h_pct * page_height;
    // Flip Y axis
    let y = page_height - rect.y_pct * page_height - h;
    PageRect { x, y, w, h }
}

/// Page size from the MediaBox, following /Parent for the inherited attribute.
pub fn page_size(doc: &Document, page_id: ObjectId) -> PageSize {
    let mut current = Some(page_id);
    // Bounded walk in case of a cyclic /Parent chain
    for _ in 0..64 {
        let Some(id) = current else { break };
        let Ok(dict) = doc.get_dictionary(id) else {
            break;
        };
        if let Some(size) = media_box_size(doc, dict) {
            return size;
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }
    DEFAULT_PAGE_SIZE
}

fn media_box_size(doc: &Document, dict: &Dictionary) -> Option<PageSize> {
    let raw = dict.get(b"MediaBox").ok()?;
    let resolved = match raw {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let arr = resolved.as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }
    let llx = obj_to_f64(doc, &arr[0])?;
    let lly = obj_to_f64(doc, &arr[1])?;
    let urx = obj_to_f64(doc, &arr[2])?;
    let ury = obj_to_f64(doc, &arr[3])?;
    let size = PageSize {
        width: (urx - llx).abs(),
        height: (ury - lly).abs(),
    };
    (size.width > 0.0 && size.height > 0.0).then_some(size)
}

fn obj_to_f64(doc: &Document, obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(f64::from(*f)),
        Object::Reference(id) => match doc.get_object(*id).ok()? {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(f) => Some(f64::from(*f)),
            _ => None,
        },
        _ => None,
    }
}
