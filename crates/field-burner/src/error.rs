use thiserror::Error;

/// Document-level failures. These are the only errors that abort a burn.
#[derive(Error, Debug)]
pub enum BurnError {
    #[error("Failed to parse PDF: {0}")]
    MalformedDocument(String),

    #[error("Failed to serialize PDF: {0}")]
    Serialization(String),
}

/// Burn request rejected before any document access.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RequestError {
    #[error("{0} is required")]
    MissingInput(&'static str),

    #[error("Invalid {0}")]
    InvalidInput(&'static str),
}

/// Image-bearing field value could not be turned into bytes.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Image bytes could not be embedded as the detected kind.
#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("PNG decode failed: {0}")]
    Png(#[from] png::DecodingError),

    #[error("JPEG decode failed: {0}")]
    Jpeg(#[from] image::ImageError),

    #[error("Image has zero width or height")]
    EmptyImage,

    #[error("Image of {width}x{height} pixels is too large to embed")]
    TooLarge { width: u32, height: u32 },

    #[error("Unsupported PNG layout: {0:?}")]
    UnsupportedLayout(png::ColorType),

    #[error("Compression failed: {0}")]
    Compression(#[from] std::io::Error),
}

/// A single field failed to render. Absorbed by the orchestrator as a drop.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Embed(#[from] EmbedError),

    #[error("PDF operation failed: {0}")]
    Pdf(String),
}

impl From<lopdf::Error> for RenderError {
    fn from(e: lopdf::Error) -> Self {
        RenderError::Pdf(e.to_string())
    }
}
