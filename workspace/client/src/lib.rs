//! Client for the signed data service.
mod client;
mod commands;
mod error;
mod helpers;
mod keygen;
mod signer;

pub type Result<T> = std::result::Result<T, error::Error>;

pub use client::DataClient;
pub use commands::{list, save};
pub use error::Error;
pub use keygen::{keygen, PRIVATE_KEY_FILE, PUBLIC_KEY_FILE};
pub use signer::{RequestSigner, SigningKey};
