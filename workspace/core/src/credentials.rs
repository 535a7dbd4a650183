use serde::{Deserialize, Serialize};

/// Credentials supplied with a listing request.
///
/// The values are opaque to this crate; they are handed to
/// whatever collaborator answers the listing.
#[derive(Debug, Clone, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    /// Identifier from the `auth_id` header.
    pub uuid: Option<String>,
    /// Token from the `auth_token` header.
    pub token: Option<String>,
}

impl Credentials {
    /// Create credentials from an identifier and token.
    pub fn new(uuid: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            uuid: Some(uuid.into()),
            token: Some(token.into()),
        }
    }

    /// Determine if both values are present.
    pub fn is_complete(&self) -> bool {
        self.uuid.is_some() && self.token.is_some()
    }
}
