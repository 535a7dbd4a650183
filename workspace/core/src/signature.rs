//! HTTP request signatures.
//!
//! A signature is carried in either the `authorization` header
//! using the `Signature` scheme or in a bare `signature` header:
//!
//! ```text
//! keyId="device",algorithm="rsa-sha256",headers="(request-target) date",signature="..."
//! ```
//!
//! The signing string is rebuilt from the listed headers in the
//! listed order. The age of the `date` header is never checked.
use std::{fmt, str::FromStr};

use http::header::AUTHORIZATION;

use crate::{
    key::{HashAlgorithm, KeyFamily, PublicKey},
    Error, Result, SignedRequest, REQUEST_TARGET, SIGNATURE,
};

const SCHEME: &str = "signature";

/// Header that must always be covered by a signature.
const DATE: &str = "date";
const X_DATE: &str = "x-date";

/// Supported signature algorithms.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Algorithm {
    /// RSASSA-PKCS1-v1_5 with SHA-256.
    RsaSha256,
    /// RSASSA-PKCS1-v1_5 with SHA-512.
    RsaSha512,
    /// ECDSA on P-256 with SHA-256.
    EcdsaSha256,
}

impl Algorithm {
    /// Key family required by this algorithm.
    pub fn family(&self) -> KeyFamily {
        match self {
            Self::RsaSha256 | Self::RsaSha512 => KeyFamily::Rsa,
            Self::EcdsaSha256 => KeyFamily::Ecdsa,
        }
    }

    pub(crate) fn hash(&self) -> HashAlgorithm {
        match self {
            Self::RsaSha256 | Self::EcdsaSha256 => HashAlgorithm::Sha256,
            Self::RsaSha512 => HashAlgorithm::Sha512,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::RsaSha256 => "rsa-sha256",
                Self::RsaSha512 => "rsa-sha512",
                Self::EcdsaSha256 => "ecdsa-sha256",
            }
        )
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rsa-sha256" => Ok(Self::RsaSha256),
            "rsa-sha512" => Ok(Self::RsaSha512),
            "ecdsa-sha256" => Ok(Self::EcdsaSha256),
            _ => Err(Error::MalformedSignatureHeader(format!(
                "unsupported algorithm {}",
                s
            ))),
        }
    }
}

/// Parameters parsed from a signature header.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SignatureHeader {
    /// Identifier of the signing key.
    pub key_id: String,
    /// Declared signature algorithm.
    pub algorithm: Algorithm,
    /// Lowercase names of the signed headers in signing order.
    pub headers: Vec<String>,
    /// Base64 encoded signature value.
    pub signature: String,
}

impl SignatureHeader {
    /// Find and parse the signature parameters of a request.
    pub fn from_request<R: SignedRequest>(request: &R) -> Result<Self> {
        if let Some(value) = request.header(AUTHORIZATION.as_str()) {
            let value = value.trim_start();
            if let Some((scheme, params)) = value.split_once(' ') {
                if scheme.eq_ignore_ascii_case(SCHEME) {
                    return params.parse();
                }
            }
        }

        match request.header(SIGNATURE) {
            Some(value) => value.parse(),
            None => Err(Error::MalformedSignatureHeader(
                "no signature in request".to_owned(),
            )),
        }
    }

    /// Decode the signature value.
    pub fn signature_bytes(&self) -> Result<Vec<u8>> {
        base64::decode(&self.signature).map_err(|e| {
            Error::MalformedSignatureHeader(format!(
                "signature is not base64: {}",
                e
            ))
        })
    }

    /// Rebuild the signing string for a request.
    pub fn signing_string<R: SignedRequest>(&self, request: &R) -> Result<String> {
        signing_string(request, &self.headers)
    }
}

impl fmt::Display for SignatureHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"keyId="{}",algorithm="{}",headers="{}",signature="{}""#,
            self.key_id,
            self.algorithm,
            self.headers.join(" "),
            self.signature
        )
    }
}

impl FromStr for SignatureHeader {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let mut key_id = None;
        let mut algorithm = None;
        let mut headers = None;
        let mut signature = None;

        for (name, value) in Params::new(value) {
            let name = name?;
            let slot = match name {
                "keyId" => &mut key_id,
                "algorithm" => &mut algorithm,
                "headers" => &mut headers,
                "signature" => &mut signature,
                // Parameters such as created and expires are not used
                _ => continue,
            };
            if slot.replace(value).is_some() {
                return Err(Error::MalformedSignatureHeader(format!(
                    "duplicate parameter {}",
                    name
                )));
            }
        }

        let key_id = key_id.ok_or_else(|| missing("keyId"))?;
        let algorithm: Algorithm =
            algorithm.ok_or_else(|| missing("algorithm"))?.parse()?;
        let signature = signature.ok_or_else(|| missing("signature"))?;
        if signature.is_empty() {
            return Err(missing("signature"));
        }

        let headers = match headers {
            Some(list) => {
                let names: Vec<String> = list
                    .split(' ')
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_ascii_lowercase())
                    .collect();
                if names.is_empty() {
                    return Err(missing("headers"));
                }
                names
            }
            None => vec![DATE.to_owned()],
        };

        let header = SignatureHeader {
            key_id: key_id.to_owned(),
            algorithm,
            headers,
            signature: signature.to_owned(),
        };
        header.signature_bytes()?;
        Ok(header)
    }
}

fn missing(name: &str) -> Error {
    Error::MalformedSignatureHeader(format!("missing parameter {}", name))
}

/// Iterator over `name="value"` pairs separated by commas.
///
/// Yields an error for the name when the input cannot be
/// tokenized and then stops.
struct Params<'a> {
    input: &'a str,
    failed: bool,
}

impl<'a> Params<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            failed: false,
        }
    }

    fn fail(&mut self, reason: &str) -> Option<(Result<&'a str>, &'a str)> {
        self.failed = true;
        Some((Err(Error::MalformedSignatureHeader(reason.to_owned())), ""))
    }
}

impl<'a> Iterator for Params<'a> {
    type Item = (Result<&'a str>, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let rest = self
            .input
            .trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        if rest.is_empty() {
            return None;
        }

        let (name, rest) = match rest.split_once('=') {
            Some(pair) => pair,
            None => return self.fail("expected name=value"),
        };
        let name = name.trim();
        let valid = |c: char| c.is_ascii_alphanumeric() || c == '-';
        if name.is_empty() || !name.chars().all(valid) {
            return self.fail("invalid parameter name");
        }

        let rest = rest.trim_start();
        let (value, rest) = if let Some(quoted) = rest.strip_prefix('"') {
            match quoted.split_once('"') {
                Some(pair) => pair,
                None => return self.fail("unterminated quoted value"),
            }
        } else {
            // Unquoted values such as created=1402170695
            let end = rest.find(',').unwrap_or(rest.len());
            (rest[..end].trim_end(), &rest[end..])
        };

        let rest = rest.trim_start();
        if !rest.is_empty() && !rest.starts_with(',') {
            return self.fail("expected comma between parameters");
        }

        self.input = rest;
        Some((Ok(name), value))
    }
}

/// Rebuild the signing string for a request.
///
/// Each listed header becomes a `name: value` line in the listed
/// order, lines are joined by a newline with no trailing newline.
pub fn signing_string<R: SignedRequest>(
    request: &R,
    headers: &[String],
) -> Result<String> {
    let mut lines = Vec::with_capacity(headers.len());
    for name in headers {
        let name = name.to_ascii_lowercase();
        let value = if name == REQUEST_TARGET {
            format!(
                "{} {}",
                request.method().to_ascii_lowercase(),
                request.target()
            )
        } else {
            request
                .header(&name)
                .ok_or_else(|| Error::MissingSignedHeader(name.clone()))?
                .into_owned()
        };
        lines.push(format!("{}: {}", name, value));
    }
    Ok(lines.join("\n"))
}

/// Verify the signature of a request against a public key.
///
/// A signature that is well formed but does not match yields
/// `Ok(false)`; malformed input yields an error.
pub fn verify<R: SignedRequest>(request: &R, key: &PublicKey) -> Result<bool> {
    let header = SignatureHeader::from_request(request)?;
    verify_header(request, &header, key)
}

/// Verify the signature of a request and return the parsed
/// parameters when it is authentic.
pub fn authenticate<R: SignedRequest>(
    request: &R,
    key: &PublicKey,
) -> Result<SignatureHeader> {
    let header = SignatureHeader::from_request(request)?;
    if verify_header(request, &header, key)? {
        Ok(header)
    } else {
        Err(Error::SignatureInvalid(header.key_id))
    }
}

fn verify_header<R: SignedRequest>(
    request: &R,
    header: &SignatureHeader,
    key: &PublicKey,
) -> Result<bool> {
    if !header.headers.iter().any(|h| h == DATE || h == X_DATE) {
        return Err(Error::MissingSignedHeader(DATE.to_owned()));
    }

    let signing_string = header.signing_string(request)?;

    if header.algorithm.family() != key.family() {
        return Err(Error::InvalidKeyMaterial(format!(
            "algorithm {} cannot be verified with an {} key",
            header.algorithm,
            key.family()
        )));
    }

    let signature = header.signature_bytes()?;
    Ok(key.verify(
        header.algorithm.hash(),
        signing_string.as_bytes(),
        &signature,
    ))
}
