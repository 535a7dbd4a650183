//! Traits and types for storage layers.
use async_trait::async_trait;

use meshblu_data_core::Envelope;

use crate::{config::LayerConfig, query::DataQuery, Error, Result, ServerConfig};

mod file;
mod forward;
mod memory;

pub use file::FileLayer;
pub use forward::ForwardLayer;
pub use memory::MemoryLayer;

/// Type for a primary and backup layer.
pub struct Layers {
    pub primary: Box<dyn Layer + Send + Sync + 'static>,
    pub backup: Option<Box<dyn Layer + Send + Sync + 'static>>,
}

#[async_trait]
impl Layer for Layers {
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    async fn save(&self, envelope: &Envelope) -> Result<()> {
        self.primary.save(envelope).await?;
        if let Some(backup) = &self.backup {
            backup.save(envelope).await?;
        }
        Ok(())
    }

    async fn list(&self, query: &DataQuery) -> Result<Vec<Envelope>> {
        self.primary.list(query).await
    }
}

/// Trait for a storage layer.
#[async_trait]
pub trait Layer {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Store an envelope.
    async fn save(&self, envelope: &Envelope) -> Result<()>;

    /// Find stored envelopes that match a query.
    async fn list(&self, query: &DataQuery) -> Result<Vec<Envelope>>;
}

/// Build the storage layers from configuration.
pub fn build(config: &ServerConfig) -> Result<Layers> {
    let mut layers = config.storage.layers.iter();
    let primary = layers.next().ok_or(Error::NoStorageLayers)?;
    let primary = build_layer(primary)?;
    let backup = layers.next().map(build_layer).transpose()?;
    Ok(Layers { primary, backup })
}

fn build_layer(
    config: &LayerConfig,
) -> Result<Box<dyn Layer + Send + Sync + 'static>> {
    tracing::debug!(layer = ?config, "storage layer");
    Ok(match config {
        LayerConfig::Forward {
            url,
            retry_limit,
            backoff_millis,
        } => Box::new(ForwardLayer::new(
            url.clone(),
            *retry_limit,
            *backoff_millis,
        )),
        LayerConfig::Memory { memory: true } => Box::new(MemoryLayer::new()),
        LayerConfig::Memory { memory: false } => {
            return Err(Error::MemoryLayerDisabled)
        }
        LayerConfig::File { directory } => {
            Box::new(FileLayer::new(directory.clone()))
        }
    })
}
