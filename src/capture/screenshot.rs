use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::GifawayError;

const BASE64_MARKER: &str = ";base64,";

/// Wrap encoded image bytes in a `data:` URL, the form stills are stored in.
pub fn encode_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{}{}{}", mime, BASE64_MARKER, STANDARD.encode(bytes))
}

/// Recover the image bytes from a stored still.
///
/// Accepts a base64 `data:` URL or a bare base64 payload.
pub fn decode_data_url(still: &str) -> Result<Vec<u8>, GifawayError> {
    let payload = match still.strip_prefix("data:") {
        Some(rest) => match rest.find(BASE64_MARKER) {
            Some(pos) => &rest[pos + BASE64_MARKER.len()..],
            None => {
                return Err(GifawayError::InvalidStill(
                    "data URL is not base64 encoded".into(),
                ))
            }
        },
        None => still,
    };
    Ok(STANDARD.decode(payload.trim())?)
}

/// MIME type declared by a `data:` URL, if any.
pub fn data_url_mime(still: &str) -> Option<&str> {
    let rest = still.strip_prefix("data:")?;
    let end = rest.find([';', ','])?;
    Some(&rest[..end])
}
