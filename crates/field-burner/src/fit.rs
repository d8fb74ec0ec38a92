//! "Contain" fitting of images into field boxes

use crate::geometry::PageRect;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageFit {
    pub draw_x: f64,
    pub draw_y: f64,
    pub draw_w: f64,
    pub draw_h: f64,
}

/// Largest aspect-preserving size that fits inside `bounds`, centered.
///
/// `img_w` and `img_h` must be positive.
pub fn contain(bounds: &PageRect, img_w: f64, img_h: f64) -> ImageFit {
    let scale = (bounds.w / img_w).min(bounds.h / img_h);
    let draw_w = img_w * scale;
    let draw_h = img_h * scale;
    ImageFit {
        draw_x: bounds.x + (bounds.w - draw_w) / 2.0,
        draw_y: bounds.y + (bounds.h - draw_h) / 2.0,
        draw_w,
        draw_h,
    }
}
