/// Convenience result type used across hatme.
pub type HatResult<T> = Result<T, HatError>;

/// Top-level error taxonomy used by pipeline APIs.
///
/// Every variant aborts the orchestration that produced it; nothing is recovered locally.
#[derive(thiserror::Error, Debug)]
pub enum HatError {
    /// The requested hat style is not in the approved catalog.
    #[error("invalid style: {0}")]
    InvalidStyle(String),

    /// The face locator found no face in the supplied image.
    #[error("no face detected: {0}")]
    NoFaceDetected(String),

    /// A detection backend or a compositing hop was unreachable, timed out, or failed.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Input bytes could not be decoded as a raster image.
    #[error("malformed image: {0}")]
    MalformedImage(String),

    /// Invalid user-provided input or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HatError {
    /// Build a [`HatError::InvalidStyle`] value.
    pub fn invalid_style(msg: impl Into<String>) -> Self {
        Self::InvalidStyle(msg.into())
    }

    /// Build a [`HatError::NoFaceDetected`] value.
    pub fn no_face(msg: impl Into<String>) -> Self {
        Self::NoFaceDetected(msg.into())
    }

    /// Build a [`HatError::BackendUnavailable`] value.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::BackendUnavailable(msg.into())
    }

    /// Build a [`HatError::MalformedImage`] value.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedImage(msg.into())
    }

    /// Build a [`HatError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Stable machine-readable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidStyle(_) => ErrorKind::InvalidStyle,
            Self::NoFaceDetected(_) => ErrorKind::NoFaceDetected,
            Self::BackendUnavailable(_) => ErrorKind::BackendUnavailable,
            Self::MalformedImage(_) => ErrorKind::MalformedImage,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Other(_) => ErrorKind::Internal,
        }
    }

    /// HTTP-style status code an upstream routing layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::InvalidStyle | ErrorKind::MalformedImage | ErrorKind::Validation => 400,
            ErrorKind::NoFaceDetected => 422,
            ErrorKind::BackendUnavailable => 503,
            ErrorKind::Internal => 500,
        }
    }

    /// Structured payload for the original caller.
    pub fn payload(&self) -> ErrorPayload {
        let kind = self.kind();
        ErrorPayload {
            kind,
            message: self.to_string(),
            retryable: kind.is_retryable(),
        }
    }
}

/// Machine-readable error class carried by [`ErrorPayload`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`HatError::InvalidStyle`].
    InvalidStyle,
    /// See [`HatError::NoFaceDetected`].
    NoFaceDetected,
    /// See [`HatError::BackendUnavailable`].
    BackendUnavailable,
    /// See [`HatError::MalformedImage`].
    MalformedImage,
    /// See [`HatError::Validation`].
    Validation,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    /// `true` for transient failures where resubmitting the same request may succeed.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::BackendUnavailable | Self::Internal)
    }
}

/// Error body returned to clients (and between hops).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ErrorPayload {
    /// Error class.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Whether retrying later may help.
    pub retryable: bool,
}

impl ErrorPayload {
    /// Rebuild a [`HatError`] from a payload received over the wire.
    pub fn into_error(self) -> HatError {
        // Messages are rendered with the variant's display prefix; drop it so it is not doubled.
        let detail = |prefix: &str| {
            self.message
                .strip_prefix(prefix)
                .unwrap_or(&self.message)
                .to_string()
        };
        match self.kind {
            ErrorKind::InvalidStyle => HatError::InvalidStyle(detail("invalid style: ")),
            ErrorKind::NoFaceDetected => HatError::NoFaceDetected(detail("no face detected: ")),
            ErrorKind::BackendUnavailable => {
                HatError::BackendUnavailable(detail("backend unavailable: "))
            }
            ErrorKind::MalformedImage => HatError::MalformedImage(detail("malformed image: ")),
            ErrorKind::Validation => HatError::Validation(detail("validation error: ")),
            ErrorKind::Internal => HatError::Other(anyhow::anyhow!(self.message)),
        }
    }
}

impl From<&HatError> for ErrorPayload {
    fn from(err: &HatError) -> Self {
        err.payload()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
