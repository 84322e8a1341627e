//! Error types for cryptographic operations.

use thiserror::Error;

/// Errors from buffer decryption and key handling.
///
/// Encryption cannot fail: any byte string pads to a whole number of blocks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Ciphertext is not valid standard base64.
    #[error("invalid base64 ciphertext: {reason}")]
    InvalidEncoding {
        /// Decoder diagnostic
        reason: String,
    },

    /// Ciphertext is not a whole number of blocks or too short to hold padding
    /// and the checksum tag.
    #[error("invalid ciphertext length {len}")]
    InvalidLength {
        /// Decoded ciphertext length in bytes
        len: usize,
    },

    /// Checksum tag did not match the recovered plaintext.
    ///
    /// Indicates a wrong key or a corrupted message.
    #[error("checksum mismatch")]
    ChecksumMismatch,

    /// Key expansion version is not supported.
    #[error("unsupported key version {version}")]
    UnsupportedVersion {
        /// Version number that was requested
        version: u32,
    },
}

impl From<base64::DecodeError> for CryptoError {
    fn from(err: base64::DecodeError) -> Self {
        Self::InvalidEncoding { reason: err.to_string() }
    }
}
