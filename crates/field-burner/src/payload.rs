//! Image payload parsing: bare base64 or `data:<mime>;base64,<data>`

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

use crate::error::PayloadError;

/// Tolerates missing padding and trailing bits, like browser-produced payloads.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// MIME type from the data-URL header, lowercased
    pub mime: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

/// Split a data-URL at the first comma and decode the payload.
pub fn parse_image_payload(value: &str) -> Result<ImagePayload, PayloadError> {
    let (mime, b64) = match value.split_once(',') {
        Some((meta, b64)) => (mime_from_meta(meta), b64),
        None => (None, value),
    };
    Ok(ImagePayload {
        mime,
        data: decode_base64_lenient(b64)?,
    })
}

/// Base64 decode ignoring ASCII whitespace
pub fn decode_base64_lenient(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = input
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    LENIENT.decode(compact)
}

fn mime_from_meta(meta: &str) -> Option<String> {
    let lower = meta.to_ascii_lowercase();
    let start = lower.find("data:")? + "data:".len();
    let rest = &lower[start..];
    let end = rest.find(";base64")?;
    Some(rest[..end].to_string())
}

type KindProbe = fn(&[u8], Option<&str>) -> Option<ImageKind>;

/// Checked in order; first match wins.
const KIND_PROBES: [KindProbe; 3] = [from_mime_hint, from_jpeg_magic, from_png_magic];

/// MIME hint, then magic bytes, then PNG.
pub fn detect_image_kind(data: &[u8], mime: Option<&str>) -> ImageKind {
    KIND_PROBES
        .iter()
        .find_map(|probe| probe(data, mime))
        .unwrap_or(ImageKind::Png)
}

fn from_mime_hint(_: &[u8], mime: Option<&str>) -> Option<ImageKind> {
    match mime? {
        "image/png" => Some(ImageKind::Png),
        "image/jpeg" | "image/jpg" => Some(ImageKind::Jpeg),
        _ => None,
    }
}

fn from_jpeg_magic(data: &[u8], _: Option<&str>) -> Option<ImageKind> {
    data.starts_with(&[0xFF, 0xD8]).then_some(ImageKind::Jpeg)
}

fn from_png_magic(data: &[u8], _: Option<&str>) -> Option<ImageKind> {
    data.starts_with(&[0x89, 0x50, 0x4E, 0x47])
        .then_some(ImageKind::Png)
}
