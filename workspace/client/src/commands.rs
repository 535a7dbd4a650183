use serde_json::Value;
use std::path::PathBuf;
use url::Url;

use meshblu_data_core::Credentials;

use crate::{helpers, DataClient, Error, Result};

/// Sign and save a message read from a JSON file.
pub async fn save(
    server: Url,
    key: PathBuf,
    key_id: String,
    route: Vec<String>,
    file: PathBuf,
) -> Result<()> {
    if !file.is_file() {
        return Err(Error::NotFile(file));
    }

    let signer = helpers::read_key_file(key, key_id)?;
    let data: Value = serde_json::from_slice(&std::fs::read(file)?)?;
    let route: Vec<Value> = route.into_iter().map(Value::String).collect();
    DataClient::save(server, &signer, &route, &data).await
}

/// List data, optionally scoped to a device and sensor.
pub async fn list(
    server: Url,
    credentials: Credentials,
    device: Option<String>,
    sensor: Option<String>,
    params: Vec<(String, String)>,
) -> Result<Value> {
    match (device, sensor) {
        (Some(device), Some(sensor)) => {
            DataClient::list_by_sensor(
                server,
                &credentials,
                &device,
                &sensor,
                &params,
            )
            .await
        }
        (Some(device), None) => {
            DataClient::list_by_device(server, &credentials, &device, &params)
                .await
        }
        _ => DataClient::list(server, &credentials, &params).await,
    }
}
