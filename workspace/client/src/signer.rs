//! Sign requests with an HTTP signature.
use http::{
    header::{AUTHORIZATION, DATE},
    HeaderValue, Request,
};
use rsa::{
    pkcs1::DecodeRsaPrivateKey,
    pkcs8::DecodePrivateKey,
    signature::{SignatureEncoding, Signer},
    RsaPrivateKey,
};
use sha2::Sha256;

use meshblu_data_core::{
    signing_string, Algorithm, SignatureHeader, REQUEST_TARGET,
    X_MESHBLU_ROUTE,
};

use crate::{Error, Result};

/// Private key used to sign requests.
pub enum SigningKey {
    /// RSA key, signs with `rsa-sha256`.
    Rsa(rsa::pkcs1v15::SigningKey<Sha256>),
    /// P-256 key, signs with `ecdsa-sha256`.
    EcdsaP256(p256::ecdsa::SigningKey),
}

impl SigningKey {
    /// Decode a PEM encoded private key.
    pub fn from_pem(pem: &str) -> Result<Self> {
        if let Ok(key) = RsaPrivateKey::from_pkcs8_pem(pem) {
            return Ok(Self::Rsa(rsa::pkcs1v15::SigningKey::new(key)));
        }
        if let Ok(key) = RsaPrivateKey::from_pkcs1_pem(pem) {
            return Ok(Self::Rsa(rsa::pkcs1v15::SigningKey::new(key)));
        }
        if let Ok(key) = p256::SecretKey::from_pkcs8_pem(pem) {
            return Ok(Self::EcdsaP256(key.into()));
        }
        Err(Error::UnsupportedKey)
    }

    /// Algorithm of signatures made with this key.
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Self::Rsa(_) => Algorithm::RsaSha256,
            Self::EcdsaP256(_) => Algorithm::EcdsaSha256,
        }
    }

    fn sign(&self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::Rsa(key) => key.sign(message).to_vec(),
            Self::EcdsaP256(key) => {
                let signature: p256::ecdsa::Signature = key.sign(message);
                signature.to_der().as_bytes().to_vec()
            }
        }
    }
}

/// Adds a signature to outgoing requests.
pub struct RequestSigner {
    key_id: String,
    key: SigningKey,
}

impl RequestSigner {
    /// Create a signer.
    pub fn new(key_id: impl Into<String>, key: SigningKey) -> Self {
        Self {
            key_id: key_id.into(),
            key,
        }
    }

    /// Sign a request.
    ///
    /// The request must carry a `date` header; the request target
    /// and the route header (when present) are signed with it.
    pub fn sign<B>(&self, request: &mut Request<B>) -> Result<SignatureHeader> {
        let mut headers = vec![REQUEST_TARGET.to_owned(), DATE.to_string()];
        if request.headers().contains_key(X_MESHBLU_ROUTE) {
            headers.push(X_MESHBLU_ROUTE.to_owned());
        }

        let message = signing_string(&*request, &headers)?;
        let header = SignatureHeader {
            key_id: self.key_id.clone(),
            algorithm: self.key.algorithm(),
            headers,
            signature: base64::encode(self.key.sign(message.as_bytes())),
        };

        request.headers_mut().insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Signature {}", header))?,
        );
        Ok(header)
    }
}
