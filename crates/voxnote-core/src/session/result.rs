use crate::session::mime::{DEFAULT_MIME_TYPE, extension_for_mime};

/// Assembled payload of one successful recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingResult {
    payload: Vec<u8>,
    mime_type: String,
    extension: &'static str,
}

impl RecordingResult {
    /// Concatenates `chunks` in order. A missing or blank MIME type falls
    /// back to [`DEFAULT_MIME_TYPE`].
    pub(crate) fn assemble(chunks: Vec<Vec<u8>>, mime_type: Option<String>) -> Self {
        let mime_type = mime_type
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

        Self {
            extension: extension_for_mime(&mime_type),
            payload: chunks.concat(),
            mime_type,
        }
    }

    /// Encoded audio bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Takes ownership of the encoded bytes.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Negotiated MIME type, codec parameters included.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// File-extension tag derived from the MIME type.
    pub fn extension(&self) -> &'static str {
        self.extension
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
