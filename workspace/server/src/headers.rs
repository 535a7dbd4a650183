//! Custom typed headers.
use axum::headers::{self, Header, HeaderName, HeaderValue};

use once_cell::sync::Lazy;

use meshblu_data_core::{Credentials, AUTH_ID, AUTH_TOKEN};

pub static X_AUTH_ID: Lazy<HeaderName> =
    Lazy::new(|| HeaderName::from_static(AUTH_ID));

pub static X_AUTH_TOKEN: Lazy<HeaderName> =
    Lazy::new(|| HeaderName::from_static(AUTH_TOKEN));

fn decode_text<'i, I>(values: &mut I) -> Result<String, headers::Error>
where
    I: Iterator<Item = &'i HeaderValue>,
{
    let value = values.next().ok_or_else(headers::Error::invalid)?;
    let value = value.to_str().map_err(|_| headers::Error::invalid())?;
    Ok(value.to_owned())
}

fn encode_text<E>(value: &str, values: &mut E)
where
    E: Extend<HeaderValue>,
{
    if let Ok(value) = HeaderValue::from_str(value) {
        values.extend(std::iter::once(value));
    }
}

/// Represents the `auth_id` header.
pub struct AuthId(pub String);

impl Header for AuthId {
    fn name() -> &'static HeaderName {
        &X_AUTH_ID
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        Ok(AuthId(decode_text(values)?))
    }

    fn encode<E>(&self, values: &mut E)
    where
        E: Extend<HeaderValue>,
    {
        encode_text(&self.0, values)
    }
}

/// Represents the `auth_token` header.
pub struct AuthToken(pub String);

impl Header for AuthToken {
    fn name() -> &'static HeaderName {
        &X_AUTH_TOKEN
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        Ok(AuthToken(decode_text(values)?))
    }

    fn encode<E>(&self, values: &mut E)
    where
        E: Extend<HeaderValue>,
    {
        encode_text(&self.0, values)
    }
}

/// Build listing credentials from the optional headers.
pub(crate) fn credentials(
    id: Option<AuthId>,
    token: Option<AuthToken>,
) -> Credentials {
    Credentials {
        uuid: id.map(|h| h.0),
        token: token.map(|h| h.0),
    }
}
