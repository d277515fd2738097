use crate::codec::data_uri::{from_data_uri, to_png_data_uri};
use crate::foundation::core::{ImageBuffer, TransformKnobs};
use crate::foundation::error::{ErrorPayload, HatError, HatResult};

/// JSON field carrying the composited image in a hop response.
pub const FINAL_IMAGE_FIELD: &str = "finalBaby";
/// Multipart part name of the photo.
pub const FACE_PART: &str = "face";
/// Multipart part name of the hat.
pub const HAT_PART: &str = "hat";

/// Body returned by one compositing hop.
///
/// Intermediate hops are unwrapped with [`HopResponse::final_image`]; the terminal hop's body is
/// handed to the caller untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct HopResponse(serde_json::Value);

impl HopResponse {
    /// Wrap an arbitrary JSON body.
    pub fn from_json(body: serde_json::Value) -> Self {
        Self(body)
    }

    /// Standard response for an encoded PNG: `{"finalBaby": "data:image/png;base64,..."}`.
    pub fn from_png(png: &ImageBuffer) -> Self {
        let mut body = serde_json::Map::new();
        body.insert(
            FINAL_IMAGE_FIELD.to_string(),
            serde_json::Value::String(to_png_data_uri(png)),
        );
        Self(serde_json::Value::Object(body))
    }

    /// Borrow the raw body.
    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }

    /// Take the raw body.
    pub fn into_json(self) -> serde_json::Value {
        self.0
    }

    /// Decode the carried image, stripping the data URI prefix.
    ///
    /// Accepts either the `finalBaby` object or a body that is itself a data URI string.
    pub fn final_image(&self) -> HatResult<ImageBuffer> {
        let uri = match &self.0 {
            serde_json::Value::String(s) => s.as_str(),
            serde_json::Value::Object(map) => map
                .get(FINAL_IMAGE_FIELD)
                .and_then(serde_json::Value::as_str)
                .ok_or_else(|| {
                    HatError::malformed(format!(
                        "hop response has no string '{FINAL_IMAGE_FIELD}' field"
                    ))
                })?,
            other => {
                return Err(HatError::malformed(format!(
                    "hop response is not an object or string: {other}"
                )));
            }
        };
        from_data_uri(uri)
    }
}

/// Transform parameters carried as query parameters on a hop request.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HopParams {
    /// Raw translate factor.
    pub translate: f64,
    /// Rotation in degrees.
    pub rotate: f64,
}

impl From<TransformKnobs> for HopParams {
    fn from(k: TransformKnobs) -> Self {
        Self {
            translate: k.translate_factor,
            rotate: k.rotate_degrees,
        }
    }
}

/// Interpret an error body from a remote hop; falls back to a backend failure.
pub fn error_from_body(status: u16, body: &[u8]) -> HatError {
    match serde_json::from_slice::<ErrorPayload>(body) {
        Ok(payload) => payload.into_error(),
        Err(_) => HatError::backend(format!(
            "compositor answered {status}: {}",
            String::from_utf8_lossy(body).trim()
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/hop/wire.rs"]
mod tests;
