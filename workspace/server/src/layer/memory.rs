use async_trait::async_trait;
use tokio::sync::RwLock;

use meshblu_data_core::Envelope;

use super::Layer;
use crate::{query::DataQuery, Result};

/// Layer that keeps envelopes in memory.
#[derive(Default)]
pub struct MemoryLayer {
    envelopes: RwLock<Vec<Envelope>>,
}

impl MemoryLayer {
    pub fn new() -> Self {
        Self {
            envelopes: RwLock::new(Default::default()),
        }
    }
}

#[async_trait]
impl Layer for MemoryLayer {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn save(&self, envelope: &Envelope) -> Result<()> {
        let mut writer = self.envelopes.write().await;
        writer.push(envelope.clone());
        Ok(())
    }

    async fn list(&self, query: &DataQuery) -> Result<Vec<Envelope>> {
        let reader = self.envelopes.read().await;
        Ok(query.apply(reader.iter()))
    }
}
