use anyhow::Result;
use serde_json::{json, Value};
use serial_test::serial;

use crate::test_utils::*;

use meshblu_data_client::{DataClient, Error};
use meshblu_data_core::Credentials;

async fn save(device: &str, sensor: u64, value: u64) -> Result<()> {
    let data = json!({
        "topic": "temperature",
        "payload": {"sensorId": sensor, "value": value},
    });
    DataClient::save(server(), &signer()?, &route(device), &data).await?;
    Ok(())
}

fn len(doc: &Value) -> usize {
    doc.as_array().map(|a| a.len()).unwrap_or(0)
}

#[tokio::test]
#[serial]
async fn integration_list_ok() -> Result<()> {
    let (rx, _handle) = spawn(default_state()?)?;
    let _ = rx.await?;

    save("d1", 1, 10).await?;
    save("d1", 2, 20).await?;
    save("d2", 1, 30).await?;

    let credentials = credentials();

    let all = DataClient::list(server(), &credentials, &[]).await?;
    assert_eq!(3, len(&all));

    let device =
        DataClient::list_by_device(server(), &credentials, "d1", &[]).await?;
    assert_eq!(2, len(&device));

    let sensor =
        DataClient::list_by_sensor(server(), &credentials, "d1", "2", &[])
            .await?;
    assert_eq!(1, len(&sensor));
    assert_eq!(json!(20), sensor[0]["data"]["payload"]["value"]);
    assert_eq!(json!("d1"), sensor[0]["metadata"]["route"][0]);

    let paged = DataClient::list(
        server(),
        &credentials,
        &[("take".to_owned(), "1".to_owned())],
    )
    .await?;
    assert_eq!(1, len(&paged));
    Ok(())
}

#[tokio::test]
#[serial]
async fn integration_list_missing_credentials() -> Result<()> {
    let (rx, _handle) = spawn(default_state()?)?;
    let _ = rx.await?;

    let result = DataClient::list(server(), &Credentials::default(), &[]).await;
    assert!(matches!(result, Err(Error::ResponseCode(401, _))));
    Ok(())
}
