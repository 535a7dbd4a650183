use anyhow::Result;
use http::{
    header::{CONTENT_TYPE, DATE},
    HeaderValue, Method, Request,
};
use serial_test::serial;
use std::sync::Arc;

use crate::test_utils::*;

use meshblu_data_core::{SignatureHeader, X_MESHBLU_ROUTE};
use meshblu_data_server::interactor::ListingFault;

fn signed_request() -> Result<Request<Vec<u8>>> {
    Ok(sign_request()?.0)
}

fn sign_request() -> Result<(Request<Vec<u8>>, SignatureHeader)> {
    let url = server().join("data")?;
    let mut request = Request::builder()
        .method(Method::POST)
        .uri(url.as_str())
        .header(CONTENT_TYPE, "application/json")
        .header(DATE, "Tue, 07 Jun 2014 20:51:35 GMT")
        .header(X_MESHBLU_ROUTE, r#"["d1","gateway"]"#)
        .body(br#"{"topic":"t","payload":{}}"#.to_vec())?;
    let header = signer()?.sign(&mut request)?;
    Ok((request, header))
}

async fn send(request: Request<Vec<u8>>) -> Result<reqwest::StatusCode> {
    let client = reqwest::Client::new();
    let response = client.execute(request.try_into()?).await?;
    Ok(response.status())
}

#[tokio::test]
#[serial]
async fn integration_save_tampered_route() -> Result<()> {
    let storage = Arc::new(RecordingStorage::default());
    let listing = Arc::new(FailingListing(ListingFault::new(500, "unused")));
    let (rx, _handle) = spawn(mock_state(storage.clone(), listing)?)?;
    let _ = rx.await?;

    let mut request = signed_request()?;
    request.headers_mut().insert(
        X_MESHBLU_ROUTE,
        HeaderValue::from_static(r#"["d2","gateway"]"#),
    );

    assert_eq!(reqwest::StatusCode::BAD_REQUEST, send(request).await?);
    assert!(storage.calls().is_empty());
    Ok(())
}

#[tokio::test]
#[serial]
async fn integration_save_unsigned() -> Result<()> {
    let storage = Arc::new(RecordingStorage::default());
    let listing = Arc::new(FailingListing(ListingFault::new(500, "unused")));
    let (rx, _handle) = spawn(mock_state(storage.clone(), listing)?)?;
    let _ = rx.await?;

    let mut request = signed_request()?;
    request.headers_mut().remove(http::header::AUTHORIZATION);

    assert_eq!(reqwest::StatusCode::BAD_REQUEST, send(request).await?);
    assert!(storage.calls().is_empty());
    Ok(())
}

#[tokio::test]
#[serial]
async fn integration_save_corrupted_signature() -> Result<()> {
    let storage = Arc::new(RecordingStorage::default());
    let listing = Arc::new(FailingListing(ListingFault::new(500, "unused")));
    let (rx, _handle) = spawn(mock_state(storage.clone(), listing)?)?;
    let _ = rx.await?;

    let (mut request, mut header) = sign_request()?;
    let mut signature = header.signature_bytes()?;
    signature[0] ^= 0x01;
    header.signature = base64::encode(signature);
    request.headers_mut().insert(
        http::header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Signature {}", header))?,
    );

    assert_eq!(reqwest::StatusCode::BAD_REQUEST, send(request).await?);
    assert!(storage.calls().is_empty());
    Ok(())
}
