//! Read-only view of the parts of a request that are signed.
use http::{HeaderMap, HeaderValue, Method, Request, Uri};
use std::borrow::Cow;

/// Request metadata needed to rebuild a signing string.
pub trait SignedRequest {
    /// Request method, eg: `POST`.
    fn method(&self) -> &str;

    /// Path and query of the request, eg: `/data?x=1`.
    fn target(&self) -> &str;

    /// Value of a header using a case-insensitive name.
    ///
    /// When a header appears more than once the values are
    /// joined with `", "`. Values outside visible ASCII are decoded
    /// as UTF-8, invalid sequences become U+FFFD.
    fn header(&self, name: &str) -> Option<Cow<'_, str>>;
}

/// Borrowed request head built from extracted parts.
#[derive(Debug, Clone, Copy)]
pub struct RequestHead<'a> {
    method: &'a Method,
    uri: &'a Uri,
    headers: &'a HeaderMap,
}

impl<'a> RequestHead<'a> {
    /// Create a request head.
    pub fn new(method: &'a Method, uri: &'a Uri, headers: &'a HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
        }
    }
}

impl SignedRequest for RequestHead<'_> {
    fn method(&self) -> &str {
        self.method.as_str()
    }

    fn target(&self) -> &str {
        path_and_query(self.uri)
    }

    fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        header_value(self.headers, name)
    }
}

impl<B> SignedRequest for Request<B> {
    fn method(&self) -> &str {
        self.method().as_str()
    }

    fn target(&self) -> &str {
        path_and_query(self.uri())
    }

    fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        header_value(self.headers(), name)
    }
}

fn path_and_query(uri: &Uri) -> &str {
    uri.path_and_query().map(|p| p.as_str()).unwrap_or("/")
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<Cow<'a, str>> {
    let mut values = headers.get_all(name).iter().map(decode);
    let first = values.next()?;
    let rest: Vec<Cow<'a, str>> = values.collect();
    if rest.is_empty() {
        Some(first)
    } else {
        let mut joined = first.into_owned();
        for value in rest {
            joined.push_str(", ");
            joined.push_str(&value);
        }
        Some(Cow::Owned(joined))
    }
}

fn decode(value: &HeaderValue) -> Cow<'_, str> {
    match value.to_str() {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => String::from_utf8_lossy(value.as_bytes()),
    }
}
