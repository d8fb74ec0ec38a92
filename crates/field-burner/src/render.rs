//! Content renderers, one per field kind
//!
//! Each renderer turns an accepted field plus its page rectangle into drawing
//! operations appended to the page. A renderer either draws, reports the field
//! as blank (nothing to draw), or fails; failures never touch other fields.

use lopdf::content::{Content, Operation};
use lopdf::{Object, ObjectId, StringFormat};

use crate::embed::embed_image;
use crate::error::RenderError;
use crate::field::{AcceptedField, FieldContent, RadioValue};
use crate::fit;
use crate::geometry::PageRect;
use crate::payload::{detect_image_kind, parse_image_payload};
use crate::session::DocumentSession;

const MIN_FONT_SIZE: f64 = 8.0;
const MAX_FONT_SIZE: f64 = 14.0;
const TEXT_INSET: f64 = 4.0;

/// Bézier control distance for a quarter circle
const KAPPA: f64 = 0.552_284_749_8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Drawn,
    /// Valid field with nothing to draw (empty text, unchecked radio, empty image)
    Blank,
}

pub fn render_field(
    session: &mut DocumentSession,
    page_id: ObjectId,
    field: &AcceptedField,
    rect: &PageRect,
) -> Result<RenderOutcome, RenderError> {
    match &field.content {
        FieldContent::Text(text) | FieldContent::Date(text) => {
            render_text(session, page_id, text, rect)
        }
        FieldContent::Radio(radio) => render_radio(session, page_id, radio, rect),
        FieldContent::Signature(payload) | FieldContent::Image(payload) => {
            render_image(session, page_id, payload, rect)
        }
    }
}

/// Font size for a box of height `h`
pub fn font_size(h: f64) -> f64 {
    (h * 0.55).clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

fn render_text(
    session: &mut DocumentSession,
    page_id: ObjectId,
    text: &str,
    rect: &PageRect,
) -> Result<RenderOutcome, RenderError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(RenderOutcome::Blank);
    }

    let size = font_size(rect.h);
    let font = session.font_on_page(page_id)?;
    let operations = vec![
        Operation::new("q", vec![]),
        Operation::new("BT", vec![]),
        Operation::new("rg", vec![real(0.0), real(0.0), real(0.0)]),
        Operation::new("Tf", vec![Object::Name(font.into_bytes()), real(size)]),
        Operation::new(
            "Tm",
            vec![
                real(1.0),
                real(0.0),
                real(0.0),
                real(1.0),
                real(rect.x + TEXT_INSET),
                real(rect.y + (rect.h - size) / 2.0),
            ],
        ),
        Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
        Operation::new("Q", vec![]),
    ];

    session.append_content(page_id, Content { operations })?;
    Ok(RenderOutcome::Drawn)
}

fn render_radio(
    session: &mut DocumentSession,
    page_id: ObjectId,
    radio: &RadioValue,
    rect: &PageRect,
) -> Result<RenderOutcome, RenderError> {
    if !radio.checked {
        return Ok(RenderOutcome::Blank);
    }

    let r = rect.w.min(rect.h) * 0.5 / 2.2;
    let cx = rect.x + r * 1.375;
    let cy = rect.y + rect.h / 2.0;

    let mut operations = vec![
        Operation::new("q", vec![]),
        Operation::new("rg", vec![real(0.0), real(0.0), real(0.0)]),
    ];
    operations.extend(circle_path(cx, cy, r));
    operations.push(Operation::new("f", vec![]));
    operations.push(Operation::new("Q", vec![]));

    session.append_content(page_id, Content { operations })?;
    Ok(RenderOutcome::Drawn)
}

/// Closed circle path, counter-clockwise from the rightmost point
fn circle_path(cx: f64, cy: f64, r: f64) -> Vec<Operation> {
    let k = r * KAPPA;
    let curve = |pts: [f64; 6]| Operation::new("c", pts.iter().map(|v| real(*v)).collect());
    vec![
        Operation::new("m", vec![real(cx + r), real(cy)]),
        curve([cx + r, cy + k, cx + k, cy + r, cx, cy + r]),
        curve([cx - k, cy + r, cx - r, cy + k, cx - r, cy]),
        curve([cx - r, cy - k, cx - k, cy - r, cx, cy - r]),
        curve([cx + k, cy - r, cx + r, cy - k, cx + r, cy]),
        Operation::new("h", vec![]),
    ]
}

fn render_image(
    session: &mut DocumentSession,
    page_id: ObjectId,
    value: &str,
    rect: &PageRect,
) -> Result<RenderOutcome, RenderError> {
    let payload = parse_image_payload(value)?;
    if payload.data.is_empty() {
        return Ok(RenderOutcome::Blank);
    }

    let kind = detect_image_kind(&payload.data, payload.mime.as_deref());
    let image = embed_image(session.document_mut(), &payload.data, kind)?;
    let placed = fit::contain(rect, f64::from(image.width), f64::from(image.height));
    let name = match session.image_on_page(page_id, image.id) {
        Ok(name) => name,
        Err(e) => {
            session.discard_objects(image.object_ids());
            return Err(e);
        }
    };

    let operations = vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                real(placed.draw_w),
                real(0.0),
                real(0.0),
                real(placed.draw_h),
                real(placed.draw_x),
                real(placed.draw_y),
            ],
        ),
        Operation::new("Do", vec![Object::Name(name.into_bytes())]),
        Operation::new("Q", vec![]),
    ];

    session.append_content(page_id, Content { operations })?;
    Ok(RenderOutcome::Drawn)
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

/// Encode text for a WinAnsiEncoding font.
///
/// Control characters become spaces and anything without a WinAnsi code
/// becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            c if c.is_control() => b' ',
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u8,
            c => win_ansi_special(c).unwrap_or(b'?'),
        })
        .collect()
}

/// Codes 0x80..=0x9F, which WinAnsi assigns to non-Latin-1 characters
fn win_ansi_special(c: char) -> Option<u8> {
    Some(match c {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '•' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    })
}
