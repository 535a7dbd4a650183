//! Collaborators the handlers hand accepted work to.
use async_trait::async_trait;
use serde_json::Value;
use std::{collections::HashSet, fmt, sync::Arc};

use meshblu_data_core::{Credentials, Envelope};

use crate::{
    layer::{Layer, Layers},
    query::DataQuery,
    Error, Result,
};

/// Stores validated envelopes.
#[async_trait]
pub trait SaveData {
    /// Store an envelope.
    async fn execute(&self, envelope: Envelope) -> Result<()>;
}

/// Answers listing requests.
#[async_trait]
pub trait ListData {
    /// List data visible to the credentials.
    async fn execute(
        &self,
        credentials: Credentials,
        query: DataQuery,
    ) -> std::result::Result<Value, ListingFault>;
}

/// Fault reported by a listing collaborator.
///
/// The code is surfaced to the caller as the response status.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ListingFault {
    /// Status code, when the collaborator provides one.
    pub code: Option<u16>,
    /// Message returned as the response body.
    pub message: String,
}

impl ListingFault {
    /// Create a fault with a code.
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }
}

impl fmt::Display for ListingFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ListingFault {}

/// Saves envelopes to the storage layers.
pub struct SaveDataInteractor {
    layers: Arc<Layers>,
}

impl SaveDataInteractor {
    pub fn new(layers: Arc<Layers>) -> Self {
        Self { layers }
    }
}

#[async_trait]
impl SaveData for SaveDataInteractor {
    async fn execute(&self, envelope: Envelope) -> Result<()> {
        self.layers.save(&envelope).await
    }
}

/// Lists envelopes from the primary storage layer.
pub struct ListDataInteractor {
    layers: Arc<Layers>,
    allowed: HashSet<Credentials>,
}

impl ListDataInteractor {
    /// Create a listing interactor; an empty set of allowed
    /// credentials accepts any complete credentials.
    pub fn new(
        layers: Arc<Layers>,
        allowed: impl IntoIterator<Item = Credentials>,
    ) -> Self {
        Self {
            layers,
            allowed: allowed.into_iter().collect(),
        }
    }

    fn authorize(
        &self,
        credentials: &Credentials,
    ) -> std::result::Result<(), ListingFault> {
        if !credentials.is_complete() {
            return Err(ListingFault::new(401, "missing credentials"));
        }
        if !self.allowed.is_empty() && !self.allowed.contains(credentials) {
            return Err(ListingFault::new(403, "forbidden"));
        }
        Ok(())
    }
}

#[async_trait]
impl ListData for ListDataInteractor {
    async fn execute(
        &self,
        credentials: Credentials,
        query: DataQuery,
    ) -> std::result::Result<Value, ListingFault> {
        self.authorize(&credentials)?;
        let envelopes = self.layers.list(&query).await.map_err(|e| match e {
            Error::ListingUnsupported(_) => ListingFault::new(501, e.to_string()),
            _ => ListingFault {
                code: None,
                message: e.to_string(),
            },
        })?;
        serde_json::to_value(envelopes).map_err(|e| ListingFault {
            code: None,
            message: e.to_string(),
        })
    }
}
