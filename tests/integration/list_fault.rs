use anyhow::Result;
use serial_test::serial;
use std::sync::Arc;

use crate::test_utils::*;

use meshblu_data_client::{DataClient, Error};
use meshblu_data_core::{AUTH_ID, AUTH_TOKEN};
use meshblu_data_server::interactor::ListingFault;

#[tokio::test]
#[serial]
async fn integration_list_fault_code() -> Result<()> {
    let storage = Arc::new(RecordingStorage::default());
    let listing = Arc::new(FailingListing(ListingFault::new(404, "not found")));
    let (rx, _handle) = spawn(mock_state(storage, listing)?)?;
    let _ = rx.await?;

    let url = server().join("devices/d1/data")?;
    let response = reqwest::Client::new()
        .get(url)
        .header(AUTH_ID, "id")
        .header(AUTH_TOKEN, "token")
        .send()
        .await?;

    assert_eq!(reqwest::StatusCode::NOT_FOUND, response.status());
    assert_eq!("not found", response.text().await?);

    let result = DataClient::list(server(), &credentials(), &[]).await;
    assert!(matches!(
        result,
        Err(Error::ResponseCode(404, message)) if message == "not found"
    ));
    Ok(())
}

#[tokio::test]
#[serial]
async fn integration_list_fault_without_code() -> Result<()> {
    let storage = Arc::new(RecordingStorage::default());
    let listing = Arc::new(FailingListing(ListingFault {
        code: None,
        message: "boom".to_owned(),
    }));
    let (rx, _handle) = spawn(mock_state(storage, listing)?)?;
    let _ = rx.await?;

    let result = DataClient::list_by_sensor(
        server(),
        &credentials(),
        "d1",
        "7",
        &[],
    )
    .await;
    assert!(matches!(result, Err(Error::ResponseCode(500, _))));
    Ok(())
}
