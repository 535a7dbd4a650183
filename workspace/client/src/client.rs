use chrono::{DateTime, Utc};
use http::{
    header::{CONTENT_TYPE, DATE},
    Method, Request,
};
use reqwest::{Client, Response};
use serde_json::Value;
use url::Url;

use meshblu_data_core::{Credentials, AUTH_ID, AUTH_TOKEN, X_MESHBLU_ROUTE};

use crate::{Error, RequestSigner, Result};

/// Format of the date header.
const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Data service client implementation.
pub struct DataClient;

impl DataClient {
    /// Save a message.
    pub async fn save(
        server: Url,
        signer: &RequestSigner,
        route: &[Value],
        data: &Value,
    ) -> Result<()> {
        DataClient::save_at(server, signer, route, data, Utc::now()).await
    }

    /// Save a message using an explicit date header.
    pub async fn save_at(
        server: Url,
        signer: &RequestSigner,
        route: &[Value],
        data: &Value,
        date: DateTime<Utc>,
    ) -> Result<()> {
        let url = server.join("data")?;
        let mut request = Request::builder()
            .method(Method::POST)
            .uri(url.as_str())
            .header(CONTENT_TYPE, "application/json")
            .header(DATE, date.format(DATE_FORMAT).to_string())
            .header(X_MESHBLU_ROUTE, serde_json::to_string(route)?)
            .body(serde_json::to_vec(data)?)?;

        let header = signer.sign(&mut request)?;
        tracing::debug!(key_id = %header.key_id, "signed request");

        let client = Client::new();
        let response = client.execute(request.try_into()?).await?;
        check_status(response).await?;
        Ok(())
    }

    /// List data.
    pub async fn list(
        server: Url,
        credentials: &Credentials,
        params: &[(String, String)],
    ) -> Result<Value> {
        let url = server.join("data")?;
        DataClient::get(url, credentials, params).await
    }

    /// List data sent by a device.
    pub async fn list_by_device(
        server: Url,
        credentials: &Credentials,
        device: &str,
        params: &[(String, String)],
    ) -> Result<Value> {
        let url = server.join(&format!("devices/{}/data", device))?;
        DataClient::get(url, credentials, params).await
    }

    /// List data for a sensor of a device.
    pub async fn list_by_sensor(
        server: Url,
        credentials: &Credentials,
        device: &str,
        sensor: &str,
        params: &[(String, String)],
    ) -> Result<Value> {
        let url = server
            .join(&format!("devices/{}/sensors/{}/data", device, sensor))?;
        DataClient::get(url, credentials, params).await
    }

    async fn get(
        url: Url,
        credentials: &Credentials,
        params: &[(String, String)],
    ) -> Result<Value> {
        let client = Client::new();
        let mut request = client.get(url).query(params);
        if let Some(uuid) = &credentials.uuid {
            request = request.header(AUTH_ID, uuid);
        }
        if let Some(token) = &credentials.token {
            request = request.header(AUTH_TOKEN, token);
        }

        let response = check_status(request.send().await?).await?;
        let doc: Value = response.json().await?;
        Ok(doc)
    }
}

/// Turn an unsuccessful response into an error carrying the body.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let message = response.text().await.unwrap_or_default();
        Err(Error::ResponseCode(status.into(), message))
    }
}
