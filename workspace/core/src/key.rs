//! Public keys used to verify request signatures.
//!
//! Keys are configured as base64 text that decodes to either
//! PEM or DER. RSA keys may use the SubjectPublicKeyInfo or the
//! PKCS#1 encoding, ECDSA keys must be P-256 in SubjectPublicKeyInfo.
use p256::ecdsa::{signature::Verifier, Signature as EcdsaSignature};
use rsa::{
    pkcs1::DecodeRsaPublicKey, pkcs8::DecodePublicKey, Pkcs1v15Sign,
    RsaPublicKey,
};
use sha2::{Digest, Sha256, Sha512};
use std::{fmt, str::FromStr};

use crate::{Error, Result};

const PEM_PREFIX: &str = "-----BEGIN ";

/// Family of asymmetric key.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum KeyFamily {
    /// RSA keys.
    Rsa,
    /// Elliptic curve keys on the NIST P-256 curve.
    Ecdsa,
}

impl fmt::Display for KeyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Rsa => "rsa",
                Self::Ecdsa => "ecdsa",
            }
        )
    }
}

impl FromStr for KeyFamily {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "rsa" => Ok(Self::Rsa),
            "ecdsa" => Ok(Self::Ecdsa),
            _ => Err(Error::InvalidKeyMaterial(format!(
                "unknown key family {}",
                value
            ))),
        }
    }
}

/// Digest applied to the signing string.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum HashAlgorithm {
    /// SHA-256.
    Sha256,
    /// SHA-512.
    Sha512,
}

/// Decoded public key.
#[derive(Debug, Clone)]
pub enum PublicKey {
    /// RSA public key.
    Rsa(RsaPublicKey),
    /// ECDSA P-256 verifying key.
    EcdsaP256(p256::ecdsa::VerifyingKey),
}

impl PublicKey {
    /// Decode key material encoded as base64.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let compact: String =
            encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let material = base64::decode(compact)
            .map_err(|e| Error::InvalidKeyMaterial(e.to_string()))?;
        Self::from_bytes(&material)
    }

    /// Decode key material that is either PEM text or DER.
    pub fn from_bytes(material: &[u8]) -> Result<Self> {
        match std::str::from_utf8(material) {
            Ok(text) if text.trim_start().starts_with(PEM_PREFIX) => {
                Self::from_pem(text)
            }
            _ => Self::from_der(material),
        }
    }

    /// Decode a PEM encoded key.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let pem = pem.trim();
        if let Ok(key) = RsaPublicKey::from_public_key_pem(pem) {
            return Ok(Self::Rsa(key));
        }
        if let Ok(key) = RsaPublicKey::from_pkcs1_pem(pem) {
            return Ok(Self::Rsa(key));
        }
        p256::ecdsa::VerifyingKey::from_public_key_pem(pem)
            .map(Self::EcdsaP256)
            .map_err(|_| {
                Error::InvalidKeyMaterial(
                    "unsupported or corrupt PEM public key".to_owned(),
                )
            })
    }

    /// Decode a DER encoded key.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        if let Ok(key) = RsaPublicKey::from_public_key_der(der) {
            return Ok(Self::Rsa(key));
        }
        if let Ok(key) = RsaPublicKey::from_pkcs1_der(der) {
            return Ok(Self::Rsa(key));
        }
        p256::ecdsa::VerifyingKey::from_public_key_der(der)
            .map(Self::EcdsaP256)
            .map_err(|_| {
                Error::InvalidKeyMaterial(
                    "unsupported or corrupt DER public key".to_owned(),
                )
            })
    }

    /// Family of this key.
    pub fn family(&self) -> KeyFamily {
        match self {
            Self::Rsa(_) => KeyFamily::Rsa,
            Self::EcdsaP256(_) => KeyFamily::Ecdsa,
        }
    }

    /// Check a signature over a message.
    ///
    /// Returns `false` for any signature that does not verify,
    /// including signatures that cannot be decoded for this key.
    pub(crate) fn verify(
        &self,
        hash: HashAlgorithm,
        message: &[u8],
        signature: &[u8],
    ) -> bool {
        match self {
            Self::Rsa(key) => match hash {
                HashAlgorithm::Sha256 => {
                    let hashed = Sha256::digest(message);
                    key.verify(Pkcs1v15Sign::new::<Sha256>(), &hashed, signature)
                        .is_ok()
                }
                HashAlgorithm::Sha512 => {
                    let hashed = Sha512::digest(message);
                    key.verify(Pkcs1v15Sign::new::<Sha512>(), &hashed, signature)
                        .is_ok()
                }
            },
            Self::EcdsaP256(key) => {
                if hash != HashAlgorithm::Sha256 {
                    return false;
                }
                let decoded = EcdsaSignature::from_der(signature)
                    .or_else(|_| EcdsaSignature::from_slice(signature));
                match decoded {
                    Ok(signature) => {
                        let signature =
                            signature.normalize_s().unwrap_or(signature);
                        key.verify(message, &signature).is_ok()
                    }
                    Err(_) => false,
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use anyhow::Result;

    const RSA_PUBLIC: &str = include_str!("../../../fixtures/rsa-public.pem");
    const RSA_PUBLIC_PKCS1: &str =
        include_str!("../../../fixtures/rsa-public-pkcs1.pem");
    const EC_PUBLIC: &str = include_str!("../../../fixtures/ec-public.pem");

    #[test]
    fn decode_rsa_spki_from_base64() -> Result<()> {
        let encoded = base64::encode(RSA_PUBLIC);
        let key = PublicKey::from_base64(&encoded)?;
        assert_eq!(KeyFamily::Rsa, key.family());
        Ok(())
    }

    #[test]
    fn decode_rsa_pkcs1() -> Result<()> {
        let key = PublicKey::from_bytes(RSA_PUBLIC_PKCS1.as_bytes())?;
        assert_eq!(KeyFamily::Rsa, key.family());
        Ok(())
    }

    #[test]
    fn decode_ecdsa_spki() -> Result<()> {
        let key = PublicKey::from_pem(EC_PUBLIC)?;
        assert_eq!(KeyFamily::Ecdsa, key.family());
        Ok(())
    }

    #[test]
    fn decode_wrapped_base64() -> Result<()> {
        let encoded = base64::encode(RSA_PUBLIC);
        let wrapped = encoded
            .as_bytes()
            .chunks(76)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        assert!(PublicKey::from_base64(&wrapped).is_ok());
        Ok(())
    }

    #[test]
    fn reject_bad_key_material() {
        let result = PublicKey::from_base64("not base64!");
        assert!(matches!(result, Err(Error::InvalidKeyMaterial(_))));

        let result = PublicKey::from_base64(&base64::encode("garbage"));
        assert!(matches!(result, Err(Error::InvalidKeyMaterial(_))));

        let truncated = &RSA_PUBLIC[..200];
        let result = PublicKey::from_base64(&base64::encode(truncated));
        assert!(matches!(result, Err(Error::InvalidKeyMaterial(_))));
    }
}
