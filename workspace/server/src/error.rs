use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("path {0} is not a file")]
    NotFile(PathBuf),

    #[error("path {0} is not a directory")]
    NotDirectory(PathBuf),

    #[error("no public key configured, set server.public_key or {0}")]
    NoPublicKey(&'static str),

    #[error("no storage layers configured")]
    NoStorageLayers,

    #[error("memory storage layer must set memory = true")]
    MemoryLayerDisabled,

    #[error("storage layer {0} does not support listing")]
    ListingUnsupported(&'static str),

    #[error("forwarding to {0} failed after {1} attempt(s)")]
    ForwardFailed(url::Url, u64),

    #[error(transparent)]
    Core(#[from] meshblu_data_core::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    AddrParse(#[from] std::net::AddrParseError),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    InvalidHeaderValue(#[from] axum::http::header::InvalidHeaderValue),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}
