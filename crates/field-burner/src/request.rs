//! Burn request contract, independent of any transport

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RequestError;
use crate::payload::decode_base64_lenient;

/// Request body as received. Members stay loose JSON so a wrong type is
/// reported as a contract error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BurnRequest {
    #[serde(alias = "pdfId")]
    pub document_id: Option<Value>,
    #[serde(alias = "pdfBase64")]
    pub document_base64: Option<Value>,
    pub fields: Option<Value>,
}

/// A checked request, ready for `burn`.
#[derive(Debug, Clone, PartialEq)]
pub struct BurnInput {
    pub document_id: Option<String>,
    pub document: Vec<u8>,
    pub fields: Vec<Value>,
}

impl BurnRequest {
    pub fn into_input(self) -> Result<BurnInput, RequestError> {
        let encoded = match self.document_base64 {
            Some(Value::String(s)) if !s.trim().is_empty() => s,
            _ => return Err(RequestError::MissingInput("documentBase64")),
        };
        let fields = match self.fields {
            Some(Value::Array(fields)) if !fields.is_empty() => fields,
            _ => return Err(RequestError::MissingInput("fields")),
        };

        // Tolerate a data-URL prefix
        let encoded = match encoded.split_once(',') {
            Some((meta, data)) if meta.starts_with("data:") => data,
            _ => encoded.as_str(),
        };
        let document = decode_base64_lenient(encoded)
            .map_err(|_| RequestError::InvalidInput("documentBase64"))?;
        if document.is_empty() {
            return Err(RequestError::InvalidInput("documentBase64"));
        }

        let document_id = match self.document_id {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        Ok(BurnInput {
            document_id,
            document,
            fields,
        })
    }
}
