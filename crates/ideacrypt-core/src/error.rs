//! Error types for message encryption and configuration.
//!
//! [`DecryptError`] displays as the short lowercase reason shown to users, one
//! per pipeline stage. The underlying cause is logged, not displayed.

use ideacrypt_crypto::CryptoError;
use ideacrypt_proto::ProtocolError;
use thiserror::Error;

/// Why an inbound line could not be decrypted.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecryptError {
    /// Line is not an envelope
    #[error("invalid message format")]
    InvalidFormat,

    /// Envelope names an algorithm other than IDEA
    #[error("unknown algorithm")]
    UnknownAlgorithm,

    /// Version is not one of the supported `major.0` pairs
    #[error("unknown version")]
    UnknownVersion,

    /// No known key has the envelope's fingerprint
    #[error("unknown key")]
    UnknownKey,

    /// Base64, block length or checksum failure
    #[error("decryption failed")]
    DecryptionFailed,

    /// Decrypted plaintext is not a valid inner payload
    #[error("invalid data contents")]
    InvalidContents,
}

/// Why an outbound message could not be encrypted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncryptError {
    /// No default key is set for the target address
    #[error("no key for {address}")]
    NoKey {
        /// Target channel or nick
        address: String,
    },

    /// Nick or message cannot be packed
    #[error("cannot pack message: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Invalid configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Key expansion version is not supported
    #[error("unsupported key version {version} (expected 1, 2 or 3)")]
    UnsupportedVersion {
        /// Rejected version number
        version: u32,
    },

    /// Configuration document is malformed
    #[error("invalid configuration: {reason}")]
    Parse {
        /// Parser diagnostic
        reason: String,
    },
}

impl From<CryptoError> for ConfigError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::UnsupportedVersion { version } => Self::UnsupportedVersion { version },
            other => Self::Parse { reason: other.to_string() },
        }
    }
}
