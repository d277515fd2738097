use base64::Engine as _;

use crate::foundation::core::ImageBuffer;
use crate::foundation::error::{HatError, HatResult};

/// Prefix of the PNG data URIs exchanged between hops.
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Render encoded PNG bytes as a `data:image/png;base64,...` URI.
pub fn to_png_data_uri(png: &ImageBuffer) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(png.as_bytes());
    let mut out = String::with_capacity(PNG_DATA_URI_PREFIX.len() + b64.len());
    out.push_str(PNG_DATA_URI_PREFIX);
    out.push_str(&b64);
    out
}

/// Decode a base64 data URI (any `image/*` media type) or a bare base64 payload into raw bytes.
pub fn from_data_uri(uri: &str) -> HatResult<ImageBuffer> {
    let uri = uri.trim();
    let payload = match uri.strip_prefix("data:") {
        Some(rest) => {
            let (header, data) = rest
                .split_once(',')
                .ok_or_else(|| HatError::malformed("data URI has no ',' separator"))?;
            if !header.ends_with(";base64") {
                return Err(HatError::malformed(format!(
                    "data URI '{header}' is not base64 encoded"
                )));
            }
            data
        }
        None => uri,
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| HatError::malformed(format!("decode base64 image payload: {e}")))?;
    if bytes.is_empty() {
        return Err(HatError::malformed("data URI carries no image bytes"));
    }
    Ok(ImageBuffer::new(bytes))
}

#[cfg(test)]
#[path = "../../tests/unit/codec/data_uri.rs"]
mod tests;
