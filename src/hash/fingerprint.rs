// Content fingerprints
// Streams a file through MD5 in fixed-size chunks so memory use does not
// depend on file size

use std::fmt;
use std::io::{self, Read};
use std::path::Path;

use md5::{Digest, Md5};

use super::error::HashError;
use crate::fs::{Backend, LocalFs};

/// Default read size for fingerprinting
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// 128-bit MD5 digest of a file's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    /// Lowercase hex, 32 chars
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Fingerprint provider with streaming I/O
#[derive(Debug, Clone, Copy)]
pub struct Fingerprinter {
    chunk_size: usize,
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Fingerprinter {
    /// Create a Fingerprinter reading in 4 KiB chunks
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Create a Fingerprinter with a custom chunk size (at least one byte)
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Fold everything `reader` yields into an MD5 state.
    pub fn fingerprint_reader<R: Read>(&self, mut reader: R) -> io::Result<Fingerprint> {
        let mut hasher = Md5::new();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            let bytes_read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buffer[..bytes_read]);
        }

        let digest = hasher.finalize();
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest);
        Ok(Fingerprint(bytes))
    }

    /// Fingerprint `path`, opening it through `backend`.
    pub fn fingerprint<B: Backend + ?Sized>(
        &self,
        backend: &B,
        path: &Path,
    ) -> Result<Fingerprint, HashError> {
        let reader = backend
            .open(path)
            .map_err(|e| HashError::from_io_error(e, "opening", path))?;

        self.fingerprint_reader(reader)
            .map_err(|e| HashError::from_io_error(e, "reading", path))
    }

    /// Fingerprint a file on the local filesystem
    pub fn fingerprint_file(&self, path: &Path) -> Result<Fingerprint, HashError> {
        self.fingerprint(&LocalFs, path)
    }
}
