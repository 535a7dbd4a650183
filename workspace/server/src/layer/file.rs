use std::path::PathBuf;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use meshblu_data_core::Envelope;

use super::Layer;
use crate::{query::DataQuery, Result};

const EXTENSION: &str = "json";

/// Layer that writes one JSON document per envelope to a directory.
pub struct FileLayer {
    directory: PathBuf,
}

impl FileLayer {
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }

    /// File name for an envelope; identical envelopes share a name.
    fn key(envelope: &Envelope, contents: &[u8]) -> String {
        let checksum = Sha256::digest(contents);
        format!(
            "{}-{}.{}",
            envelope.metadata.date.timestamp_millis(),
            hex::encode(&checksum[..8]),
            EXTENSION
        )
    }
}

#[async_trait]
impl Layer for FileLayer {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn save(&self, envelope: &Envelope) -> Result<()> {
        let contents = serde_json::to_vec(envelope)?;
        let path = self.directory.join(Self::key(envelope, &contents));
        if !path.exists() {
            tokio::fs::write(&path, &contents).await?;
        }
        tracing::debug!(path = ?path, "wrote envelope");
        Ok(())
    }

    async fn list(&self, query: &DataQuery) -> Result<Vec<Envelope>> {
        let mut envelopes = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.directory).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let contents = tokio::fs::read(&path).await?;
            match serde_json::from_slice::<Envelope>(&contents) {
                Ok(envelope) => envelopes.push(envelope),
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "skip unreadable envelope")
                }
            }
        }
        Ok(query.apply(&envelopes))
    }
}
