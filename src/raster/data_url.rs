/// Base64 data URLs (`data:image/png;base64,...`)

use base64::{engine::general_purpose, Engine as _};

const DATA_IMAGE_PREFIX: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataUrlError {
    #[error("not an image data URL")]
    MissingPrefix,

    #[error("data URL is not base64 encoded")]
    MissingBase64Marker,

    #[error("invalid base64 payload: {0}")]
    Base64(String),
}

/// Wrap raw bytes in a data URL with the given MIME type
pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Extract the payload bytes from an image data URL
pub fn decode(data_url: &str) -> Result<Vec<u8>, DataUrlError> {
    if !data_url.starts_with(DATA_IMAGE_PREFIX) {
        return Err(DataUrlError::MissingPrefix);
    }

    let marker = data_url
        .find(BASE64_MARKER)
        .ok_or(DataUrlError::MissingBase64Marker)?;

    general_purpose::STANDARD
        .decode(&data_url[marker + BASE64_MARKER.len()..])
        .map_err(|e| DataUrlError::Base64(e.to_string()))
}
