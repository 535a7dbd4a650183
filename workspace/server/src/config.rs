use indexmap::set::IndexSet;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

use meshblu_data_core::{Credentials, PublicKey};

use crate::{Error, Result};

/// Environment variable that overrides the configured public key.
pub const PUBLIC_KEY_ENV: &str = "MESHBLU_DATA_PUBLIC_KEY";

#[derive(Debug, Default, Deserialize)]
pub struct ServerConfig {
    /// Service settings.
    #[serde(default)]
    pub server: ServiceConfig,

    /// Limits applied to requests.
    #[serde(default)]
    pub request: RequestConfig,

    /// Configuration for the storage layers.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Configuration for listing data.
    #[serde(default)]
    pub listing: ListingConfig,

    /// Configuration for TLS encryption.
    pub tls: Option<TlsConfig>,

    /// Configuration for CORS.
    pub cors: Option<CorsConfig>,

    /// Path the file was loaded from used to determine
    /// relative paths.
    #[serde(skip)]
    file: Option<PathBuf>,
}

impl ServerConfig {
    /// Create a new server config.
    pub fn new(public_key: String, storage: StorageConfig) -> Self {
        Self {
            server: ServiceConfig {
                public_key: Some(public_key),
            },
            storage,
            ..Default::default()
        }
    }

    /// Load a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().exists() {
            return Err(Error::NotFile(path.as_ref().to_path_buf()));
        }

        let contents = std::fs::read_to_string(path.as_ref())?;
        let mut config: ServerConfig = toml::from_str(&contents)?;
        config.file = Some(path.as_ref().canonicalize()?);

        if config.storage.layers.is_empty() {
            return Err(Error::NoStorageLayers);
        }

        let dir = config.directory();

        if let Some(tls) = config.tls.as_mut() {
            if tls.cert.is_relative() {
                tls.cert = dir.join(&tls.cert);
            }
            if tls.key.is_relative() {
                tls.key = dir.join(&tls.key);
            }

            tls.cert = tls.cert.canonicalize()?;
            tls.key = tls.key.canonicalize()?;
        }

        let mut layers = IndexSet::new();
        for mut layer in config.storage.layers.drain(..) {
            if let LayerConfig::File { directory } = &mut layer {
                // Make relative where necessary
                if directory.is_relative() {
                    *directory = dir.join(directory.clone());
                }

                // Resolve symlinks now
                *directory = directory.canonicalize()?;

                if !directory.is_dir() {
                    return Err(Error::NotDirectory(directory.clone()));
                }
            }
            layers.insert(layer);
        }

        config.storage.layers = layers;

        Ok(config)
    }

    /// Decode the public key used to verify save requests.
    ///
    /// The environment variable takes precedence over the
    /// configuration file.
    pub fn public_key(&self) -> Result<PublicKey> {
        let encoded = std::env::var(PUBLIC_KEY_ENV)
            .ok()
            .or_else(|| self.server.public_key.clone())
            .ok_or(Error::NoPublicKey(PUBLIC_KEY_ENV))?;
        Ok(PublicKey::from_base64(&encoded)?)
    }

    /// Parent directory of the configuration file.
    fn directory(&self) -> PathBuf {
        self.file
            .as_ref()
            .and_then(|p| p.parent())
            .map(|p| p.to_path_buf())
            .unwrap_or_default()
    }
}

/// Service settings.
#[derive(Debug, Default, Deserialize)]
pub struct ServiceConfig {
    /// Base64 encoded public key material.
    pub public_key: Option<String>,
}

fn default_body_limit() -> usize {
    1024 * 1024
}

#[derive(Debug, Deserialize)]
pub struct RequestConfig {
    /// Maximum size of body requests.
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            body_limit: default_body_limit(),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Collection of storage layers, the first is primary
    /// and the second a backup.
    pub layers: IndexSet<LayerConfig>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let mut layers = IndexSet::new();
        layers.insert(Default::default());
        Self { layers }
    }
}

impl From<LayerConfig> for StorageConfig {
    fn from(layer: LayerConfig) -> Self {
        let mut layers = IndexSet::new();
        layers.insert(layer);
        Self { layers }
    }
}

/// Listing configuration.
#[derive(Debug, Default, Deserialize)]
pub struct ListingConfig {
    /// Credentials allowed to list data; when empty any
    /// complete credentials are accepted.
    #[serde(default)]
    pub credentials: Vec<Credentials>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct TlsConfig {
    /// Path to the certificate.
    pub cert: PathBuf,
    /// Path to the certificate key file.
    pub key: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
pub struct CorsConfig {
    /// List of additional CORS origins for the server.
    pub origins: Vec<Url>,
}

fn default_retry_limit() -> u64 {
    1
}

fn default_backoff_millis() -> u64 {
    250
}

#[derive(Debug, Clone, Deserialize, Hash, Eq, PartialEq)]
#[serde(untagged)]
pub enum LayerConfig {
    Forward {
        /// Endpoint that receives envelopes.
        url: Url,
        /// Number of attempts for each envelope.
        #[serde(default = "default_retry_limit")]
        retry_limit: u64,
        /// Delay before the second attempt, doubled for
        /// each subsequent attempt.
        #[serde(default = "default_backoff_millis")]
        backoff_millis: u64,
    },
    Memory {
        memory: bool,
    },
    File {
        directory: PathBuf,
    },
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self::Memory { memory: true }
    }
}
