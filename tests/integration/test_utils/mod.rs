use anyhow::Result;
use async_trait::async_trait;
use axum_server::Handle;
use serde_json::{json, Value};
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    thread,
};
use tokio::sync::oneshot;
use url::Url;

use meshblu_data_client::{RequestSigner, SigningKey};
use meshblu_data_core::{Credentials, Envelope, PublicKey};
use meshblu_data_server::{
    config::{LayerConfig, ServerConfig, StorageConfig},
    interactor::{ListData, ListingFault, SaveData},
    query::DataQuery,
    Server, ServerInfo, ServerState, State,
};

const ADDR: &str = "127.0.0.1:9009";
const SERVER: &str = "http://127.0.0.1:9009";

const RSA_PUBLIC: &str = include_str!("../../../fixtures/rsa-public.pem");
const RSA_PRIVATE: &str = include_str!("../../../fixtures/rsa-private.pem");

struct MockServer {
    handle: Handle,
}

impl MockServer {
    fn new() -> Result<Self> {
        Ok(Self {
            handle: Handle::new(),
        })
    }

    async fn start(&self, state: ServerState) -> Result<()> {
        let addr: SocketAddr = ADDR.parse::<SocketAddr>()?;

        tracing::info!("start mock server {:#?}", addr);

        let server = Server::new();
        server.start(addr, state, self.handle.clone()).await?;
        Ok(())
    }

    /// Run the mock server in a separate thread.
    fn spawn(
        tx: oneshot::Sender<SocketAddr>,
        state: ServerState,
    ) -> Result<ShutdownHandle> {
        let server = MockServer::new()?;
        let listen_handle = server.handle.clone();
        let user_handle = server.handle.clone();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async move {
                loop {
                    if let Some(addr) = listen_handle.listening().await {
                        tracing::info!("server has started {:#?}", addr);
                        tx.send(addr)
                            .expect("failed to send listening notification");
                        break;
                    }
                }
            });
        });

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async {
                server.start(state).await.expect("failed to start server");
            });
        });

        Ok(ShutdownHandle(user_handle))
    }
}

/// Ensure the server is shutdown when the handle is dropped.
pub struct ShutdownHandle(Handle);

impl Drop for ShutdownHandle {
    fn drop(&mut self) {
        tracing::info!("shutdown mock server");
        self.0.shutdown();
    }
}

fn server_info() -> ServerInfo {
    ServerInfo {
        name: String::from("integration-test"),
        version: String::from("0.0.0"),
    }
}

pub fn storage_server_config(layer: LayerConfig) -> ServerConfig {
    let storage: StorageConfig = layer.into();
    ServerConfig::new(base64::encode(RSA_PUBLIC), storage)
}

pub fn default_server_config() -> ServerConfig {
    storage_server_config(LayerConfig::Memory { memory: true })
}

/// State using the storage layers of the configuration.
pub fn config_state(config: ServerConfig) -> Result<ServerState> {
    Ok(Arc::new(State::new(config, server_info())?))
}

pub fn default_state() -> Result<ServerState> {
    config_state(default_server_config())
}

/// State with replacement collaborators.
pub fn mock_state(
    storage: Arc<dyn SaveData + Send + Sync>,
    listing: Arc<dyn ListData + Send + Sync>,
) -> Result<ServerState> {
    Ok(Arc::new(State {
        config: default_server_config(),
        info: server_info(),
        public_key: PublicKey::from_pem(RSA_PUBLIC)?,
        storage,
        listing,
    }))
}

pub fn spawn(
    state: ServerState,
) -> Result<(oneshot::Receiver<SocketAddr>, ShutdownHandle)> {
    let (tx, rx) = oneshot::channel::<SocketAddr>();
    let handle = MockServer::spawn(tx, state)?;
    Ok((rx, handle))
}

pub fn server() -> Url {
    Url::parse(SERVER).expect("failed to parse server URL")
}

pub fn signer() -> Result<RequestSigner> {
    Ok(RequestSigner::new("device", SigningKey::from_pem(RSA_PRIVATE)?))
}

pub fn credentials() -> Credentials {
    Credentials::new("5b86e5a8-ea2b-4aa8-9c53-3ecd5dc1b6bd", "token")
}

pub fn route(device: &str) -> Vec<Value> {
    vec![json!(device), json!("gateway")]
}

/// Storage collaborator that records every envelope.
#[derive(Default)]
pub struct RecordingStorage {
    pub calls: Mutex<Vec<Envelope>>,
}

impl RecordingStorage {
    pub fn calls(&self) -> Vec<Envelope> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SaveData for RecordingStorage {
    async fn execute(
        &self,
        envelope: Envelope,
    ) -> meshblu_data_server::Result<()> {
        self.calls.lock().unwrap().push(envelope);
        Ok(())
    }
}

/// Listing collaborator that always fails.
pub struct FailingListing(pub ListingFault);

#[async_trait]
impl ListData for FailingListing {
    async fn execute(
        &self,
        _credentials: Credentials,
        _query: DataQuery,
    ) -> std::result::Result<Value, ListingFault> {
        Err(self.0.clone())
    }
}
