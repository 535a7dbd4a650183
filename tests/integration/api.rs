use anyhow::Result;
use serial_test::serial;
use serde_json::Value;

use crate::test_utils::*;

#[tokio::test]
#[serial]
async fn integration_api_info() -> Result<()> {
    let (rx, _handle) = spawn(default_state()?)?;
    let _ = rx.await?;

    let url = server().join("api")?;
    let doc: Value = reqwest::get(url).await?.json().await?;

    assert_eq!(Some("integration-test"), doc["name"].as_str());
    assert_eq!(Some("0.0.0"), doc["version"].as_str());
    Ok(())
}
