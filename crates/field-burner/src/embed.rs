//! Image XObject embedding for signature and image fields

use std::io::{Cursor, Write};

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::codecs::jpeg::JpegDecoder;
use image::{ExtendedColorType, ImageDecoder};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::error::EmbedError;
use crate::payload::ImageKind;

/// Upper bound on decoded pixel data. Headers are attacker-controlled and the
/// buffer is sized from them before any pixel is read.
pub const MAX_DECODED_BYTES: usize = 64 * 1024 * 1024;

/// An image XObject added to the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub id: ObjectId,
    /// Soft mask XObject, when the image has transparency
    pub smask_id: Option<ObjectId>,
    pub width: u32,
    pub height: u32,
}

impl EmbeddedImage {
    /// Every object this embed added
    pub fn object_ids(&self) -> impl Iterator<Item = ObjectId> {
        std::iter::once(self.id).chain(self.smask_id)
    }
}

struct ImageData {
    width: u32,
    height: u32,
    color_space: &'static str,
    filter: &'static str,
    decode: Option<Vec<Object>>,
    data: Vec<u8>,
    /// Flate-compressed soft mask, present only when some pixel is not opaque
    alpha: Option<Vec<u8>>,
}

/// Decode `data` as `kind` and add it to the document.
///
/// The document is only touched once decoding has succeeded, so a failed
/// embed leaves no objects behind.
pub fn embed_image(
    doc: &mut Document,
    data: &[u8],
    kind: ImageKind,
) -> Result<EmbeddedImage, EmbedError> {
    let image = match kind {
        ImageKind::Png => decode_png(data)?,
        ImageKind::Jpeg => probe_jpeg(data)?,
    };

    let smask_id = image.alpha.map(|alpha| {
        doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(image.width),
                "Height" => i64::from(image.height),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            alpha,
        ))
    });

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(image.width),
        "Height" => i64::from(image.height),
        "ColorSpace" => image.color_space,
        "BitsPerComponent" => 8,
        "Filter" => image.filter,
    };
    if let Some(decode) = image.decode {
        dict.set("Decode", Object::Array(decode));
    }
    if let Some(smask_id) = smask_id {
        dict.set("SMask", Object::Reference(smask_id));
    }

    let id = doc.add_object(Stream::new(dict, image.data));
    Ok(EmbeddedImage {
        id,
        smask_id,
        width: image.width,
        height: image.height,
    })
}

fn decode_png(data: &[u8]) -> Result<ImageData, EmbedError> {
    let mut decoder = png::Decoder::new(Cursor::new(data));
    // Palette and sub-byte depths expand to 8 bits; tRNS becomes an alpha channel
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;

    let (width, height) = {
        let info = reader.info();
        (info.width, info.height)
    };
    let (color_type, _) = reader.output_color_type();
    let decoded_bytes = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(color_type.samples()));
    match decoded_bytes {
        Some(bytes) if bytes <= MAX_DECODED_BYTES => {}
        _ => return Err(EmbedError::TooLarge { width, height }),
    }

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    buf.truncate(info.buffer_size());

    if info.width == 0 || info.height == 0 {
        return Err(EmbedError::EmptyImage);
    }

    let (channels, color_space, has_alpha) = match info.color_type {
        png::ColorType::Grayscale => (1, "DeviceGray", false),
        png::ColorType::GrayscaleAlpha => (2, "DeviceGray", true),
        png::ColorType::Rgb => (3, "DeviceRGB", false),
        png::ColorType::Rgba => (4, "DeviceRGB", true),
        other => return Err(EmbedError::UnsupportedLayout(other)),
    };
    let color_channels = if has_alpha { channels - 1 } else { channels };
    let pixel_count = info.width as usize * info.height as usize;

    let mut color = Vec::with_capacity(pixel_count * color_channels);
    let mut alpha = Vec::with_capacity(if has_alpha { pixel_count } else { 0 });
    for pixel in buf.chunks_exact(channels) {
        color.extend_from_slice(&pixel[..color_channels]);
        if has_alpha {
            alpha.push(pixel[channels - 1]);
        }
    }

    let alpha = if alpha.iter().any(|&a| a != 255) {
        Some(flate_compress(&alpha)?)
    } else {
        None
    };

    Ok(ImageData {
        width: info.width,
        height: info.height,
        color_space,
        filter: "FlateDecode",
        decode: None,
        data: flate_compress(&color)?,
        alpha,
    })
}

/// JPEG bytes are embedded untouched; only the header is parsed.
fn probe_jpeg(data: &[u8]) -> Result<ImageData, EmbedError> {
    let decoder = JpegDecoder::new(Cursor::new(data))?;
    let (width, height) = decoder.dimensions();
    if width == 0 || height == 0 {
        return Err(EmbedError::EmptyImage);
    }

    let (color_space, decode) = match decoder.original_color_type() {
        ExtendedColorType::L8 | ExtendedColorType::L16 => ("DeviceGray", None),
        // Adobe CMYK JPEGs store inverted components
        ExtendedColorType::Cmyk8 => (
            "DeviceCMYK",
            Some(
                [1, 0, 1, 0, 1, 0, 1, 0]
                    .into_iter()
                    .map(Object::Integer)
                    .collect(),
            ),
        ),
        _ => ("DeviceRGB", None),
    };

    Ok(ImageData {
        width,
        height,
        color_space,
        filter: "DCTDecode",
        decode,
        data: data.to_vec(),
        alpha: None,
    })
}

fn flate_compress(data: &[u8]) -> Result<Vec<u8>, EmbedError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
