//! Encryption Configuration Port
//!
//! Consulted by `init` only when an encrypted connection is requested.

use std::path::{Path, PathBuf};

/// Encryption configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum EncryptionError {
    /// The private key file could not be read.
    #[error("Failed to read RSA private key '{}': {source}", path.display())]
    KeyFileRead {
        /// Key file path.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// The file does not contain a PEM private key.
    #[error("'{}' does not contain a PEM private key", path.display())]
    InvalidKey {
        /// Key file path.
        path: PathBuf,
    },
}

/// Port for the transport's protocol-encryption settings.
pub trait ProtoEncryption: Send + Sync {
    /// Turn protocol encryption on or off.
    fn enable_proto_encrypt(&mut self, enabled: bool) -> Result<(), EncryptionError>;

    /// Set the RSA private key used for the connection handshake.
    fn set_init_rsa_file(&mut self, path: &Path) -> Result<(), EncryptionError>;
}
