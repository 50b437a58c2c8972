//! AES-keyed PDU chaining for encrypted Satel Integra channels (TCP port
//! 17094). Plain channels never touch this crate.

mod error;
mod handler;

pub use error::CryptoError;
pub use handler::EncryptionHandler;
