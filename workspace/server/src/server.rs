use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, DATE},
        HeaderName, HeaderValue, Method,
    },
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use serde::Serialize;
use serde_json::json;
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use meshblu_data_core::{PublicKey, SIGNATURE, X_MESHBLU_ROUTE};

use crate::{
    config::TlsConfig,
    handlers::DataHandler,
    headers::{X_AUTH_ID, X_AUTH_TOKEN},
    interactor::{ListData, ListDataInteractor, SaveData, SaveDataInteractor},
    layer, Result, ServerConfig,
};

/// Shared server state.
pub type ServerState = Arc<State>;

/// Server state.
///
/// Nothing in the state changes after startup so it is shared
/// between requests without locking.
pub struct State {
    /// The server configuration.
    pub config: ServerConfig,
    /// Server information.
    pub info: ServerInfo,
    /// Key that verifies save requests.
    pub public_key: PublicKey,
    /// Storage pipeline for accepted messages.
    pub storage: Arc<dyn SaveData + Send + Sync>,
    /// Collaborator that answers listings.
    pub listing: Arc<dyn ListData + Send + Sync>,
}

impl State {
    /// Create state using the storage layers from the configuration.
    pub fn new(config: ServerConfig, info: ServerInfo) -> Result<Self> {
        let public_key = config.public_key()?;
        let layers = Arc::new(layer::build(&config)?);
        let storage = Arc::new(SaveDataInteractor::new(Arc::clone(&layers)));
        let listing = Arc::new(ListDataInteractor::new(
            layers,
            config.listing.credentials.clone(),
        ));
        Ok(Self {
            config,
            info,
            public_key,
            storage,
            listing,
        })
    }
}

/// Server information.
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    /// Name of the crate.
    pub name: String,
    /// Version of the crate.
    pub version: String,
}

#[derive(Default)]
pub struct Server;

impl Server {
    /// Create a server.
    pub fn new() -> Self {
        Self
    }

    /// Start the server.
    pub async fn start(
        &self,
        addr: SocketAddr,
        state: ServerState,
        handle: Handle,
    ) -> Result<()> {
        let origins = Server::read_origins(&state)?;
        let limit = state.config.request.body_limit;
        let tls = state.config.tls.as_ref().cloned();

        if let Some(tls) = tls {
            self.run_tls(addr, state, handle, origins, limit, tls).await
        } else {
            self.run(addr, state, handle, origins, limit).await
        }
    }

    /// Start the server running on HTTPS.
    async fn run_tls(
        &self,
        addr: SocketAddr,
        state: ServerState,
        handle: Handle,
        origins: Vec<HeaderValue>,
        limit: usize,
        tls: TlsConfig,
    ) -> Result<()> {
        let tls = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
        let app = Server::router(state, origins, limit)?;
        tracing::info!("listening on {}", addr);
        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(app.into_make_service())
            .await?;
        Ok(())
    }

    /// Start the server running on HTTP.
    async fn run(
        &self,
        addr: SocketAddr,
        state: ServerState,
        handle: Handle,
        origins: Vec<HeaderValue>,
        limit: usize,
    ) -> Result<()> {
        let app = Server::router(state, origins, limit)?;
        tracing::info!("listening on {}", addr);
        axum_server::bind(addr)
            .handle(handle)
            .serve(app.into_make_service())
            .await?;
        Ok(())
    }

    fn read_origins(state: &State) -> Result<Vec<HeaderValue>> {
        let mut origins = Vec::new();
        if let Some(cors) = &state.config.cors {
            for url in cors.origins.iter() {
                origins.push(HeaderValue::from_str(
                    url.as_str().trim_end_matches('/'),
                )?);
            }
        }
        Ok(origins)
    }

    fn router(
        state: ServerState,
        origins: Vec<HeaderValue>,
        limit: usize,
    ) -> Result<Router> {
        let cors = CorsLayer::new()
            .allow_methods(vec![Method::GET, Method::POST])
            .allow_credentials(true)
            .allow_headers(vec![
                AUTHORIZATION,
                CONTENT_TYPE,
                DATE,
                HeaderName::from_static(SIGNATURE),
                HeaderName::from_static(X_MESHBLU_ROUTE),
                X_AUTH_ID.clone(),
                X_AUTH_TOKEN.clone(),
            ])
            .allow_origin(origins);

        let app = Router::new()
            .route("/api", get(api))
            .route("/data", get(DataHandler::list).post(DataHandler::save))
            .route("/devices/:id/data", get(DataHandler::list_by_device))
            .route(
                "/devices/:id/sensors/:sensor_id/data",
                get(DataHandler::list_by_sensor),
            )
            .layer(RequestBodyLimitLayer::new(limit))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .layer(Extension(state));

        Ok(app)
    }
}

/// Serve the API identity page.
pub(crate) async fn api(
    Extension(state): Extension<ServerState>,
) -> impl IntoResponse {
    Json(json!(&state.info))
}
