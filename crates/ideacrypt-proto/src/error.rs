//! Error types for wire protocol codec operations.

use thiserror::Error;

/// Errors from packing or unpacking the inner payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A field contains the `0x01` separator and would not survive a round trip
    #[error("field {field} contains the 0x01 separator")]
    SeparatorInField {
        /// Name of the offending field
        field: &'static str,
    },

    /// Decrypted payload does not have exactly three fields
    #[error("expected 3 payload fields, found {count}")]
    InvalidFieldCount {
        /// Number of fields found
        count: usize,
    },

    /// Timestamp field is not a hexadecimal `u64`
    #[error("invalid timestamp field: {value:?}")]
    InvalidTimestamp {
        /// Raw field contents
        value: String,
    },
}
