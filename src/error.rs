use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] meshblu_data_core::Error),

    #[error(transparent)]
    Client(#[from] meshblu_data_client::Error),

    #[error(transparent)]
    Server(#[from] meshblu_data_server::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
