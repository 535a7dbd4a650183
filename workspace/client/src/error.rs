use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("path {0} is not a file")]
    NotFile(PathBuf),

    #[error("path {0} is not a directory")]
    NotDirectory(PathBuf),

    #[error("file {0} already exists")]
    FileExists(PathBuf),

    #[error("private key is not a PKCS#8 or PKCS#1 RSA key or a PKCS#8 P-256 key")]
    UnsupportedKey,

    #[error("unexpected response status code {0}: {1}")]
    ResponseCode(u16, String),

    #[error(transparent)]
    Core(#[from] meshblu_data_core::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Http(#[from] http::Error),

    #[error(transparent)]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    Rsa(#[from] rsa::Error),

    #[error(transparent)]
    Pkcs8(#[from] rsa::pkcs8::Error),

    #[error(transparent)]
    Spki(#[from] rsa::pkcs8::spki::Error),
}
