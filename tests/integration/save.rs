use anyhow::Result;
use chrono::{TimeZone, Utc};
use serde_json::json;
use serial_test::serial;
use std::sync::Arc;

use crate::test_utils::*;

use meshblu_data_client::DataClient;
use meshblu_data_core::{Data, Envelope, Metadata};
use meshblu_data_server::interactor::ListingFault;

#[tokio::test]
#[serial]
async fn integration_save_ok() -> Result<()> {
    let storage = Arc::new(RecordingStorage::default());
    let listing = Arc::new(FailingListing(ListingFault::new(500, "unused")));
    let (rx, _handle) = spawn(mock_state(storage.clone(), listing)?)?;
    let _ = rx.await?;

    // Signatures are accepted regardless of the age of the date
    let date = Utc.with_ymd_and_hms(2014, 6, 7, 20, 51, 35).unwrap();
    let data = json!({
        "topic": "temperature",
        "payload": {"sensorId": 7, "value": 21},
    });

    DataClient::save_at(server(), &signer()?, &route("d1"), &data, date)
        .await?;

    let expected = Envelope {
        data: Data {
            devices: None,
            topic: "temperature".to_owned(),
            payload: json!({"sensorId": 7, "value": 21})
                .as_object()
                .cloned()
                .unwrap(),
        },
        metadata: Metadata {
            route: route("d1"),
            date,
        },
    };

    assert_eq!(vec![expected], storage.calls());
    Ok(())
}

#[tokio::test]
#[serial]
async fn integration_save_invalid_message() -> Result<()> {
    let storage = Arc::new(RecordingStorage::default());
    let listing = Arc::new(FailingListing(ListingFault::new(500, "unused")));
    let (rx, _handle) = spawn(mock_state(storage.clone(), listing)?)?;
    let _ = rx.await?;

    // Missing topic
    let data = json!({"payload": {"value": 1}});
    let result =
        DataClient::save(server(), &signer()?, &route("d1"), &data).await;

    assert!(matches!(
        result,
        Err(meshblu_data_client::Error::ResponseCode(400, _))
    ));
    assert!(storage.calls().is_empty());
    Ok(())
}

#[tokio::test]
#[serial]
async fn integration_save_too_large() -> Result<()> {
    let mut config = default_server_config();
    config.request.body_limit = 16;
    let (rx, _handle) = spawn(config_state(config)?)?;
    let _ = rx.await?;

    let data = json!({"topic": "temperature", "payload": {"value": 21}});
    let result =
        DataClient::save(server(), &signer()?, &route("d1"), &data).await;

    assert!(matches!(
        result,
        Err(meshblu_data_client::Error::ResponseCode(413, _))
    ));
    Ok(())
}
