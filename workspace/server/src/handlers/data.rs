use axum::{
    body::Bytes,
    extract::{Extension, Path, Query, TypedHeader},
    http::{HeaderMap, Method, StatusCode, Uri},
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

use meshblu_data_core::{authenticate, map_request, validate, RequestHead};

use crate::{
    headers::{credentials, AuthId, AuthToken},
    query::DataQuery,
    server::{ServerState, State},
    Error, Result,
};

type ListResponse = std::result::Result<Json<Value>, (StatusCode, String)>;

pub(crate) struct DataHandler;

impl DataHandler {
    /// Save a signed message.
    ///
    /// Every failure is reported to the caller as a bad request,
    /// the detail is only logged.
    pub(crate) async fn save(
        Extension(state): Extension<ServerState>,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> StatusCode {
        let request = RequestHead::new(&method, &uri, &headers);
        match DataHandler::accept(&state, &request, &body).await {
            Ok(_) => {
                tracing::info!("data saved");
                StatusCode::CREATED
            }
            Err(e) => {
                if let Error::Core(fault) = &e {
                    tracing::error!(
                        kind = ?fault.kind(),
                        "failed saving data: {}",
                        e
                    );
                } else {
                    tracing::error!("failed saving data: {}", e);
                }
                StatusCode::BAD_REQUEST
            }
        }
    }

    async fn accept(
        state: &State,
        request: &RequestHead<'_>,
        body: &[u8],
    ) -> Result<()> {
        let signature = authenticate(request, &state.public_key)?;
        tracing::debug!(
            key_id = %signature.key_id,
            algorithm = %signature.algorithm,
            "authenticated request"
        );

        let body: Value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(body)?
        };

        let envelope = validate(map_request(request, body)?)?;
        state.storage.execute(envelope).await
    }

    /// List data.
    pub(crate) async fn list(
        Extension(state): Extension<ServerState>,
        id: Option<TypedHeader<AuthId>>,
        token: Option<TypedHeader<AuthToken>>,
        Query(params): Query<HashMap<String, String>>,
    ) -> ListResponse {
        let query = DataQuery::new(params);
        DataHandler::respond(&state, id, token, query).await
    }

    /// List data sent by a device.
    pub(crate) async fn list_by_device(
        Extension(state): Extension<ServerState>,
        id: Option<TypedHeader<AuthId>>,
        token: Option<TypedHeader<AuthToken>>,
        Path(device_id): Path<String>,
        Query(params): Query<HashMap<String, String>>,
    ) -> ListResponse {
        let query = DataQuery::new(params).from_device(device_id);
        DataHandler::respond(&state, id, token, query).await
    }

    /// List data for a sensor of a device.
    pub(crate) async fn list_by_sensor(
        Extension(state): Extension<ServerState>,
        id: Option<TypedHeader<AuthId>>,
        token: Option<TypedHeader<AuthToken>>,
        Path((device_id, sensor_id)): Path<(String, String)>,
        Query(params): Query<HashMap<String, String>>,
    ) -> ListResponse {
        let query = DataQuery::new(params)
            .from_device(device_id)
            .from_sensor(sensor_id);
        DataHandler::respond(&state, id, token, query).await
    }

    async fn respond(
        state: &State,
        id: Option<TypedHeader<AuthId>>,
        token: Option<TypedHeader<AuthToken>>,
        query: DataQuery,
    ) -> ListResponse {
        let credentials = credentials(
            id.map(|TypedHeader(h)| h),
            token.map(|TypedHeader(h)| h),
        );

        tracing::debug!(query = ?query, "list data");

        match state.listing.execute(credentials, query).await {
            Ok(data) => {
                tracing::info!("data obtained");
                Ok(Json(data))
            }
            Err(fault) => {
                let status = status_code(fault.code);
                tracing::error!(
                    "failed to list data ({}): {}",
                    status.as_u16(),
                    fault.message
                );
                Err((status, fault.message))
            }
        }
    }
}

/// Status for a listing fault; codes that are missing or are
/// not errors become an internal server error.
fn status_code(code: Option<u16>) -> StatusCode {
    code.and_then(|c| StatusCode::from_u16(c).ok())
        .filter(|s| s.is_client_error() || s.is_server_error())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
