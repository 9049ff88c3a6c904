// Fingerprint provider
// MD5 content digests used as the only change-detection signal

pub mod error;
pub mod fingerprint;

pub use error::HashError;
pub use fingerprint::{Fingerprint, Fingerprinter, DEFAULT_CHUNK_SIZE};
