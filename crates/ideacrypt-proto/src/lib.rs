//! ideacrypt Wire Protocol
//!
//! Text framing for encrypted chat messages. Two layers:
//!
//! - [`Envelope`]: the outer `|*E*|IDEA|{major}.{minor}|{fingerprint}|{payload}|`
//!   line that travels over the chat transport in the clear.
//! - [`InnerPayload`]: the `nick 0x01 timestamp 0x01 message` record that is
//!   encrypted into the envelope's payload.
//!
//! Parsing borrows from the input line and never panics on malformed input.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod envelope;
pub mod error;
pub mod payload;

pub use envelope::{ALGORITHM, Envelope, MARKER, is_envelope};
pub use error::ProtocolError;
pub use payload::{FIELD_SEPARATOR, InnerPayload};
