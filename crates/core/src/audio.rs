//! Self-describing audio payloads
//!
//! Audio crosses the orchestrator boundary in both directions as a mime type
//! plus base64 data, matching the `data:<mime>;base64,<data>` URIs used by
//! browser clients.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// An encoded audio blob with its mime type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioPayload {
    /// Mime type, e.g. `audio/wav` or `audio/webm`
    pub mime_type: String,
    /// Base64-encoded audio bytes
    pub data: String,
}

impl AudioPayload {
    /// Encode raw bytes into a payload
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: BASE64.encode(bytes),
        }
    }

    /// Decode the payload back into raw bytes
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(&self.data)
    }

    /// Render as a `data:` URI for clients
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Parse a `data:<mime>;base64,<data>` URI
    pub fn from_data_uri(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix("data:")?;
        let (mime_type, data) = rest.split_once(";base64,")?;
        if mime_type.is_empty() || data.is_empty() {
            return None;
        }
        Some(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }

    /// Whether the payload carries any data at all
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
