use thiserror::Error;

/// Broad classification of a fault.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FaultKind {
    /// The request could not be interpreted.
    MalformedInput,
    /// The request was well formed but the signature did not verify.
    Unauthenticated,
    /// The message derived from the request has the wrong shape.
    MessageShape,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed signature header: {0}")]
    MalformedSignatureHeader(String),

    #[error("signed header {0} is missing from the request")]
    MissingSignedHeader(String),

    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    #[error("signature from key {0} is not valid")]
    SignatureInvalid(String),

    #[error("malformed route header: {0}")]
    MalformedRoute(String),

    #[error("invalid date header: {0}")]
    InvalidDate(String),

    #[error("field {path} must be {expected}")]
    SchemaViolation {
        /// Dotted path to the offending field.
        path: String,
        /// Description of the expected type.
        expected: &'static str,
    },
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> FaultKind {
        match self {
            Self::MalformedSignatureHeader(_)
            | Self::MissingSignedHeader(_)
            | Self::InvalidKeyMaterial(_) => FaultKind::MalformedInput,
            Self::SignatureInvalid(_) => FaultKind::Unauthenticated,
            Self::MalformedRoute(_)
            | Self::InvalidDate(_)
            | Self::SchemaViolation { .. } => FaultKind::MessageShape,
        }
    }

    pub(crate) fn schema(path: impl Into<String>, expected: &'static str) -> Self {
        Self::SchemaViolation {
            path: path.into(),
            expected,
        }
    }
}
