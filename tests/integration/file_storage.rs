use anyhow::Result;
use serde_json::json;
use serial_test::serial;
use tempfile::tempdir;

use crate::test_utils::*;

use meshblu_data_client::DataClient;
use meshblu_data_server::config::LayerConfig;

#[tokio::test]
#[serial]
async fn integration_file_storage() -> Result<()> {
    let dir = tempdir()?;
    let config = storage_server_config(LayerConfig::File {
        directory: dir.path().to_path_buf(),
    });
    let (rx, _handle) = spawn(config_state(config)?)?;
    let _ = rx.await?;

    let data = json!({
        "devices": ["d9"],
        "topic": "status",
        "payload": {"online": true},
    });
    DataClient::save(server(), &signer()?, &route("d1"), &data).await?;

    let files = std::fs::read_dir(dir.path())?.count();
    assert_eq!(1, files);

    let found =
        DataClient::list_by_device(server(), &credentials(), "d1", &[]).await?;
    assert_eq!(json!(["d9"]), found[0]["data"]["devices"]);
    Ok(())
}
