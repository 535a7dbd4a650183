//! Types and verification logic shared by the data service
//! server and client.
//!
//! A save request is authenticated with an HTTP signature
//! (see [`signature`]), mapped into a message envelope and
//! validated before it reaches storage (see [`message`] and
//! [`validate`]).
mod credentials;
mod error;
pub mod key;
pub mod message;
mod request;
pub mod signature;
pub mod validate;

pub use credentials::Credentials;
pub use error::{Error, FaultKind};
pub use key::{KeyFamily, PublicKey};
pub use message::{map_request, Data, Envelope, Metadata, RawEnvelope};
pub use request::{RequestHead, SignedRequest};
pub use signature::{
    authenticate, signing_string, verify, Algorithm, SignatureHeader,
};
pub use validate::validate;

/// Header carrying the JSON encoded message route.
pub const X_MESHBLU_ROUTE: &str = "x-meshblu-route";

/// Header carrying signature parameters when the
/// `authorization` header is not used.
pub const SIGNATURE: &str = "signature";

/// Header carrying the identifier for listing credentials.
pub const AUTH_ID: &str = "auth_id";

/// Header carrying the token for listing credentials.
pub const AUTH_TOKEN: &str = "auth_token";

/// Pseudo header that signs the request method and target.
pub const REQUEST_TARGET: &str = "(request-target)";

pub type Result<T> = std::result::Result<T, error::Error>;
