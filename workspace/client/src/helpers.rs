use std::path::PathBuf;

use crate::{Error, RequestSigner, Result, SigningKey};

/// Read a PEM private key file into a request signer.
pub(crate) fn read_key_file(key: PathBuf, key_id: String) -> Result<RequestSigner> {
    if !key.is_file() {
        return Err(Error::NotFile(key));
    }

    let pem = std::fs::read_to_string(key)?;
    let signing_key = SigningKey::from_pem(&pem)?;
    Ok(RequestSigner::new(key_id, signing_key))
}
