//! Field descriptors
//!
//! Raw field JSON arrives loosely typed (numbers as strings, radio values as
//! bare booleans, ...). `FieldDescriptor::from_json` coerces it once into
//! canonical types so nothing downstream looks at the raw shape again.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The closed set of field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Signature,
    Image,
    Date,
    Radio,
}

impl FieldKind {
    /// Parse the wire tag. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "text" => Some(FieldKind::Text),
            "signature" => Some(FieldKind::Signature),
            "image" => Some(FieldKind::Image),
            "date" => Some(FieldKind::Date),
            "radio" => Some(FieldKind::Radio),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Signature => "signature",
            FieldKind::Image => "image",
            FieldKind::Date => "date",
            FieldKind::Radio => "radio",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical radio payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioValue {
    pub checked: bool,
    pub label: String,
}

impl RadioValue {
    /// Accepts `{checked, label}`, a bare boolean, or any other value by truthiness.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Bool(checked) => RadioValue {
                checked: *checked,
                label: String::new(),
            },
            Value::Object(map) => RadioValue {
                checked: map.get("checked").map(is_truthy).unwrap_or(false),
                label: map
                    .get("label")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
            other => RadioValue {
                checked: is_truthy(other),
                label: String::new(),
            },
        }
    }
}

/// Field payload, one variant per kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldContent {
    Text(String),
    Date(String),
    Radio(RadioValue),
    /// Base64 or data-URL image payload
    Signature(String),
    /// Base64 or data-URL image payload
    Image(String),
}

impl FieldContent {
    fn from_json(kind: FieldKind, value: Option<&Value>) -> Self {
        let value = value.unwrap_or(&Value::Null);
        match kind {
            FieldKind::Text => FieldContent::Text(text_value(value)),
            FieldKind::Date => FieldContent::Date(text_value(value)),
            FieldKind::Radio => FieldContent::Radio(RadioValue::from_json(value)),
            FieldKind::Signature => FieldContent::Signature(image_value(value)),
            FieldKind::Image => FieldContent::Image(image_value(value)),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldContent::Text(_) => FieldKind::Text,
            FieldContent::Date(_) => FieldKind::Date,
            FieldContent::Radio(_) => FieldKind::Radio,
            FieldContent::Signature(_) => FieldKind::Signature,
            FieldContent::Image(_) => FieldKind::Image,
        }
    }
}

/// Box position and size as fractions of the page, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRect {
    pub x_pct: f64,
    pub y_pct: f64,
    pub w_pct: f64,
    pub h_pct: f64,
}

/// A coerced but not yet validated field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub id: String,
    /// 1-based; may be fractional or NaN until validated
    pub page: f64,
    pub rect: NormalizedRect,
    /// `None` when the type tag is not a known kind
    pub content: Option<FieldContent>,
}

impl FieldDescriptor {
    pub fn from_json(raw: &Value) -> Self {
        let get = |key: &str| raw.get(key);

        let id = match get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(true)) => "true".to_string(),
            _ => String::new(),
        };

        // Falsy page defaults to the first page
        let page = match get("page") {
            Some(v) if is_truthy(v) => coerce_number(Some(v)),
            _ => 1.0,
        };

        let rect = NormalizedRect {
            x_pct: coerce_number(get("xPct")),
            y_pct: coerce_number(get("yPct")),
            w_pct: coerce_number(get("wPct")),
            h_pct: coerce_number(get("hPct")),
        };

        let content = get("type")
            .and_then(Value::as_str)
            .and_then(FieldKind::from_tag)
            .map(|kind| FieldContent::from_json(kind, get("value")));

        FieldDescriptor {
            id,
            page,
            rect,
            content,
        }
    }
}

/// A field that passed validation and is ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedField {
    pub id: String,
    pub page: u32,
    pub rect: NormalizedRect,
    pub content: FieldContent,
}

impl AcceptedField {
    pub fn kind(&self) -> FieldKind {
        self.content.kind()
    }
}

/// Loose numeric coercion. Anything without a numeric reading becomes NaN.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Some(Value::Array(_)) | Some(Value::Object(_)) => f64::NAN,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn text_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if is_truthy(value) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        _ => String::new(),
    }
}

fn image_value(value: &Value) -> String {
    value.as_str().unwrap_or_default().to_string()
}
