use rsa::{
    pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding},
    RsaPrivateKey, RsaPublicKey,
};
use std::path::{Path, PathBuf};

use meshblu_data_core::KeyFamily;

use crate::{Error, Result};

/// Bit size of generated RSA keys.
const RSA_BITS: usize = 2048;

/// File name of the generated private key.
pub const PRIVATE_KEY_FILE: &str = "private.pem";

/// File name of the generated public key.
pub const PUBLIC_KEY_FILE: &str = "public.pem";

/// Generate a signing key pair and write both keys as PEM files.
///
/// Returns the base64 encoded public key as expected by the
/// server configuration.
pub async fn keygen(dir: PathBuf, family: KeyFamily) -> Result<String> {
    if !dir.is_dir() {
        return Err(Error::NotDirectory(dir));
    }

    let private_file = dir.join(PRIVATE_KEY_FILE);
    let public_file = dir.join(PUBLIC_KEY_FILE);
    for file in [&private_file, &public_file] {
        if file.exists() {
            return Err(Error::FileExists(file.to_path_buf()));
        }
    }

    let (private_pem, public_pem) = match family {
        KeyFamily::Rsa => {
            let key = RsaPrivateKey::new(&mut rand::thread_rng(), RSA_BITS)?;
            let public = RsaPublicKey::from(&key);
            (
                key.to_pkcs8_pem(LineEnding::LF)?.to_string(),
                public.to_public_key_pem(LineEnding::LF)?,
            )
        }
        KeyFamily::Ecdsa => {
            let key = p256::SecretKey::random(&mut rand::thread_rng());
            (
                key.to_pkcs8_pem(LineEnding::LF)?.to_string(),
                key.public_key().to_public_key_pem(LineEnding::LF)?,
            )
        }
    };

    write_key(&private_file, &private_pem).await?;
    write_key(&public_file, &public_pem).await?;

    Ok(base64::encode(public_pem))
}

async fn write_key(file: &Path, pem: &str) -> Result<()> {
    tokio::fs::write(file, pem).await?;
    tracing::debug!(file = ?file, "wrote key");
    Ok(())
}
